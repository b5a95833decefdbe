use crate::config::{Config, RenderConfig};
use crate::error::Result;
use crate::style::{PrepareOptions, prepare};
use crate::tree::SvgTree;
use std::path::Path;

/// A static view of a graph after a sequence of header clicks.
#[derive(Debug, Clone)]
pub struct FoldedSvg {
    pub svg: String,
    /// Requested clusters that have no header link in the document.
    pub unknown: Vec<String>,
}

/// Prepares `source` with an inline stylesheet, then clicks the header of
/// each cluster in `clicks`, in order.
pub fn render_folded(source: &str, config: &Config, clicks: &[String]) -> Result<FoldedSvg> {
    let mut tree = SvgTree::parse(source)?;
    let options = PrepareOptions {
        inline_style: true,
        script_href: None,
    };
    let interaction = prepare(&mut tree, &config.fold, &config.style, &options)?;

    let mut unknown = Vec::new();
    for cluster in clicks {
        match interaction.header_for(&tree, &config.fold, cluster) {
            Some(header) => {
                let outcome = interaction.click(&mut tree, &config.fold, &header);
                tracing::debug!(cluster = %cluster, toggled = ?outcome.toggled, "clicked");
            }
            None => unknown.push(cluster.clone()),
        }
    }

    Ok(FoldedSvg {
        svg: tree.to_svg_string(),
        unknown,
    })
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> anyhow::Result<()> {
    let mut opt = usvg::Options::default();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("Invalid render size"))?;
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;
    if let Some(color) = parse_hex_color(&render_cfg.background) {
        pixmap.fill(color);
    }

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> anyhow::Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

#[cfg(feature = "png")]
fn parse_hex_color(value: &str) -> Option<resvg::tiny_skia::Color> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(resvg::tiny_skia::Color::from_rgba8(
        channel(0..2)?,
        channel(2..4)?,
        channel(4..6)?,
        255,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
<g id="clust1" class="cluster"><title>cluster_main</title></g>
<g id="node1" class="node"><g><a xlink:href="main" target="other"/></g></g>
<g id="node2" class="node"><g><a xlink:href="main"/></g></g>
</svg>"#;

    #[test]
    fn folded_snapshot_collapses_requested_clusters() {
        let folded = render_folded(
            DOC,
            &Config::default(),
            &["main".to_string(), "nowhere".to_string()],
        )
        .unwrap();
        assert_eq!(folded.unknown, vec!["nowhere".to_string()]);
        assert!(folded.svg.contains(r#"id="clust1" class="cluster hide""#));
        assert!(folded.svg.contains(r#"id="node1" class="node collapsed""#));
        assert!(folded.svg.contains(r#"id="node2" class="node hide""#));
        assert!(folded.svg.contains(".hide { display: none;}"));
    }

    #[test]
    fn clicking_twice_restores_the_expanded_view() {
        let clicks = vec!["main".to_string(), "main".to_string()];
        let folded = render_folded(DOC, &Config::default(), &clicks).unwrap();
        assert!(folded.unknown.is_empty());
        assert!(folded.svg.contains(r#"id="node1" class="node""#));
        assert!(folded.svg.contains(r#"id="clust1" class="cluster""#));
    }

    #[cfg(feature = "png")]
    #[test]
    fn parses_background_colors() {
        assert!(parse_hex_color("#FFFFFF").is_some());
        assert!(parse_hex_color("white").is_none());
        assert!(parse_hex_color("#FFF").is_none());
    }
}
