use crate::error::{FoldError, Result};
use serde::Deserialize;
use std::path::Path;

/// How a cluster path is recognised as nested below another one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescendantMatch {
    /// `a.b` is below `a`, `ab` is not.
    #[default]
    Segment,
    /// Plain string prefix: `ab` is treated as below `a`.
    Prefix,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleConfig {
    pub highlight_stroke: String,
    pub extra_css: Option<String>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            highlight_stroke: "blue".to_string(),
            extra_css: None,
        }
    }
}

/// Names and markers the fold logic reads from a rendered graph.
///
/// Deserializes from camelCase keys; any key left out keeps its default,
/// so `{"hiddenClass":"gone"}` is a complete config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FoldConfig {
    pub hidden_class: String,
    pub collapsed_class: String,
    pub cluster_attribute: String,
    pub target_attribute: String,
    pub href_attributes: Vec<String>,
    pub frame_class: String,
    pub frame_title_prefix: String,
    pub placeholder_prefix: String,
    pub separator: String,
    pub container_depth: usize,
    pub descendant_match: DescendantMatch,
}

impl Default for FoldConfig {
    fn default() -> Self {
        Self {
            hidden_class: "hide".to_string(),
            collapsed_class: "collapsed".to_string(),
            cluster_attribute: "cluster".to_string(),
            target_attribute: "target".to_string(),
            href_attributes: vec!["xlink:href".to_string(), "href".to_string()],
            frame_class: "cluster".to_string(),
            frame_title_prefix: "cluster_".to_string(),
            placeholder_prefix: "not_".to_string(),
            separator: ".".to_string(),
            container_depth: 2,
            descendant_match: DescendantMatch::Segment,
        }
    }
}

impl FoldConfig {
    pub fn placeholder_for(&self, cluster: &str) -> String {
        format!("{}{}", self.placeholder_prefix, cluster)
    }

    pub fn is_placeholder(&self, cluster: &str) -> bool {
        cluster.starts_with(&self.placeholder_prefix)
    }

    /// Rejects values the fold logic cannot work with.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.separator.is_empty() {
            return Err("separator must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

/// Fold keys sit at the top level of a config file; `style` and `render`
/// are nested objects.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(flatten)]
    pub fold: FoldConfig,
    pub style: StyleConfig,
    pub render: RenderConfig,
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let contents = std::fs::read_to_string(path)?;
    let is_json5 = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json5"));
    let config: Config = if is_json5 {
        json5::from_str(&contents).map_err(|err| FoldError::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?
    } else {
        serde_json::from_str(&contents).map_err(|err| FoldError::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?
    };

    config.fold.validate().map_err(|message| FoldError::Config {
        path: path.to_path_buf(),
        message,
    })?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).expect("write config");
        path
    }

    #[test]
    fn defaults_without_path() {
        let config = load_config(None).unwrap();
        assert_eq!(config.fold.hidden_class, "hide");
        assert_eq!(config.fold.placeholder_prefix, "not_");
        assert_eq!(config.fold.container_depth, 2);
        assert_eq!(config.fold.descendant_match, DescendantMatch::Segment);
    }

    #[test]
    fn json_overrides_merge_over_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "overrides.json",
            r#"{"hiddenClass":"gone","descendantMatch":"prefix","style":{"highlightStroke":"red"},"render":{"width":640}}"#,
        );
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.fold.hidden_class, "gone");
        assert_eq!(config.fold.collapsed_class, "collapsed");
        assert_eq!(config.fold.descendant_match, DescendantMatch::Prefix);
        assert_eq!(config.style.highlight_stroke, "red");
        assert_eq!(config.render.width, 640.0);
        assert_eq!(config.render.height, 800.0);
    }

    #[test]
    fn json5_allows_comments() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "commented.json5",
            "{\n  // slashes instead of dots\n  separator: '/',\n  containerDepth: 3,\n}\n",
        );
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.fold.separator, "/");
        assert_eq!(config.fold.container_depth, 3);
    }

    #[test]
    fn empty_separator_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "empty-sep.json", r#"{"separator":""}"#);
        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, FoldError::Config { .. }));
    }

    #[test]
    fn malformed_file_names_its_path() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "broken.json", "{\"hiddenClass\":");
        match load_config(Some(&path)).unwrap_err() {
            FoldError::Config { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn fold_config_reads_every_key_in_camel_case() {
        let config: FoldConfig = serde_json::from_str(
            r#"{"hrefAttributes":["href"],"containerDepth":1,"frameTitlePrefix":"c_","targetAttribute":"data-target"}"#,
        )
        .unwrap();
        assert_eq!(config.href_attributes, vec!["href"]);
        assert_eq!(config.container_depth, 1);
        assert_eq!(config.frame_title_prefix, "c_");
        assert_eq!(config.target_attribute, "data-target");
        assert_eq!(config.hidden_class, "hide");
    }

    #[test]
    fn placeholder_names() {
        let config = FoldConfig::default();
        assert_eq!(config.placeholder_for("a.b"), "not_a.b");
        assert!(config.is_placeholder("not_a"));
        assert!(!config.is_placeholder("a"));
    }
}
