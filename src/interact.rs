use crate::cluster::is_strict_descendant;
use crate::config::FoldConfig;
use crate::document::DocumentModel;
use crate::visibility::set_cluster_visibility;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRole {
    /// Cluster header carrying a `target`; clicking folds its cluster.
    Header,
    /// Body member link; clicks are swallowed.
    Silent,
}

/// What a click did. Callers suppress the link's navigation for every click,
/// header or not.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClickOutcome {
    /// Clusters toggled, descendants first, the clicked one last.
    pub toggled: Vec<String>,
    /// `Some(true)` when expanding, `Some(false)` when collapsing.
    pub expanded: Option<bool>,
}

/// Link classification computed once when a document is wired.
#[derive(Debug, Clone)]
pub struct Interaction<E> {
    headers: Vec<E>,
    silent: Vec<E>,
    placeholders: Vec<E>,
}

impl<E: Clone + PartialEq> Interaction<E> {
    /// Stamps every anchor with its cluster attribute, classifies it, and
    /// hides all placeholder edges so every cluster starts expanded.
    pub fn initialize<D>(doc: &mut D, config: &FoldConfig) -> Self
    where
        D: DocumentModel<Element = E>,
    {
        let mut headers = Vec::new();
        let mut silent = Vec::new();
        let mut placeholder_links = Vec::new();

        for link in doc.anchors() {
            let reference = config
                .href_attributes
                .iter()
                .find_map(|name| doc.attribute(&link, name));
            if let Some(cluster) = reference.as_deref() {
                doc.set_attribute(&link, &config.cluster_attribute, cluster);
                if config.is_placeholder(cluster) {
                    placeholder_links.push(link.clone());
                }
            }
            if doc.attribute(&link, &config.target_attribute).is_some() {
                headers.push(link);
            } else {
                silent.push(link);
            }
        }

        let placeholders: Vec<E> = placeholder_links
            .iter()
            .filter_map(|link| doc.ancestor(link, config.container_depth))
            .collect();
        for container in &placeholders {
            doc.set_class(container, &config.hidden_class, true);
        }

        tracing::debug!(
            headers = headers.len(),
            silent = silent.len(),
            placeholders = placeholders.len(),
            "document wired"
        );

        Self {
            headers,
            silent,
            placeholders,
        }
    }

    pub fn headers(&self) -> &[E] {
        &self.headers
    }

    pub fn silent_links(&self) -> &[E] {
        &self.silent
    }

    pub fn placeholders(&self) -> &[E] {
        &self.placeholders
    }

    pub fn role(&self, link: &E) -> Option<LinkRole> {
        if self.headers.contains(link) {
            Some(LinkRole::Header)
        } else if self.silent.contains(link) {
            Some(LinkRole::Silent)
        } else {
            None
        }
    }

    /// First header link for `cluster`.
    pub fn header_for<D>(&self, doc: &D, config: &FoldConfig, cluster: &str) -> Option<E>
    where
        D: DocumentModel<Element = E>,
    {
        self.headers
            .iter()
            .find(|link| doc.attribute(link, &config.cluster_attribute).as_deref() == Some(cluster))
            .cloned()
    }

    /// Cluster identifiers of all headers, in document order, without repeats.
    pub fn clusters<D>(&self, doc: &D, config: &FoldConfig) -> Vec<String>
    where
        D: DocumentModel<Element = E>,
    {
        let mut clusters: Vec<String> = Vec::new();
        for link in &self.headers {
            if let Some(cluster) = doc.attribute(link, &config.cluster_attribute) {
                if !clusters.contains(&cluster) {
                    clusters.push(cluster);
                }
            }
        }
        clusters
    }

    /// Handles activation of `link`.
    pub fn click<D>(&self, doc: &mut D, config: &FoldConfig, link: &E) -> ClickOutcome
    where
        D: DocumentModel<Element = E>,
    {
        match self.role(link) {
            Some(LinkRole::Header) => click_header(doc, config, &self.headers, link),
            _ => ClickOutcome::default(),
        }
    }
}

fn click_header<D: DocumentModel>(
    doc: &mut D,
    config: &FoldConfig,
    headers: &[D::Element],
    link: &D::Element,
) -> ClickOutcome {
    let Some(cluster) = doc.attribute(link, &config.cluster_attribute) else {
        return ClickOutcome::default();
    };
    let Some(container) = doc.ancestor(link, config.container_depth) else {
        return ClickOutcome::default();
    };
    let visible = doc.has_class(&container, &config.collapsed_class);

    let mut toggled = Vec::new();
    for header in headers {
        let Some(sub) = doc.attribute(header, &config.cluster_attribute) else {
            continue;
        };
        if is_strict_descendant(&sub, &cluster, &config.separator, config.descendant_match) {
            set_cluster_visibility(doc, config, &sub, None, visible);
            toggled.push(sub);
        }
    }
    set_cluster_visibility(doc, config, &cluster, Some(&container), visible);
    toggled.push(cluster);

    ClickOutcome {
        toggled,
        expanded: Some(visible),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DescendantMatch;
    use crate::tree::{ElementRef, SvgTree};

    const NESTED: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
<g class="cluster"><title>cluster_a</title></g>
<g class="cluster"><title>cluster_b</title></g>
<g id="A1" class="node"><g><a xlink:href="a" target="other"/></g></g>
<g id="A2" class="node"><g><a xlink:href="a"/></g></g>
<g id="B1" class="node"><g><a xlink:href="a.b" target="other"/></g></g>
<g id="B2" class="node"><g><a xlink:href="a.b"/></g></g>
<g id="AB1" class="node"><g><a xlink:href="ab" target="other"/></g></g>
<g id="EA" class="edge"><g><a xlink:href="not_a"/></g></g>
<g id="EB" class="edge"><g><a xlink:href="not_a.b"/></g></g>
</svg>"#;

    fn by_id(tree: &SvgTree, id: &str) -> ElementRef {
        tree.elements_named("g")
            .into_iter()
            .find(|el| tree.attribute(el, "id").as_deref() == Some(id))
            .unwrap()
    }

    fn link_in(tree: &SvgTree, id: &str) -> ElementRef {
        let container = by_id(tree, id);
        tree.anchors()
            .into_iter()
            .find(|link| tree.ancestor(link, 2) == Some(container))
            .unwrap()
    }

    fn wired() -> (SvgTree, Interaction<ElementRef>, FoldConfig) {
        let mut tree = SvgTree::parse(NESTED).unwrap();
        let config = FoldConfig::default();
        let interaction = Interaction::initialize(&mut tree, &config);
        (tree, interaction, config)
    }

    #[test]
    fn initialize_stamps_clusters_and_hides_placeholders() {
        let (tree, interaction, config) = wired();
        assert_eq!(interaction.headers().len(), 3);
        assert_eq!(interaction.silent_links().len(), 4);
        assert_eq!(interaction.placeholders().len(), 2);
        let link = link_in(&tree, "B2");
        assert_eq!(tree.attribute(&link, "cluster").as_deref(), Some("a.b"));
        assert!(tree.has_class(&by_id(&tree, "EA"), "hide"));
        assert!(tree.has_class(&by_id(&tree, "EB"), "hide"));
        assert!(!tree.has_class(&by_id(&tree, "A1"), "hide"));
        assert_eq!(interaction.clusters(&tree, &config), vec!["a", "a.b", "ab"]);
    }

    #[test]
    fn roles_follow_target_presence() {
        let (tree, interaction, _) = wired();
        assert_eq!(interaction.role(&link_in(&tree, "A1")), Some(LinkRole::Header));
        assert_eq!(interaction.role(&link_in(&tree, "A2")), Some(LinkRole::Silent));
        assert_eq!(interaction.role(&by_id(&tree, "A2")), None);
    }

    #[test]
    fn click_collapses_descendants_before_parent() {
        let (mut tree, interaction, config) = wired();
        let link = link_in(&tree, "A1");
        let outcome = interaction.click(&mut tree, &config, &link);

        assert_eq!(outcome.toggled, vec!["a.b".to_string(), "a".to_string()]);
        assert_eq!(outcome.expanded, Some(false));

        // Sub-cluster collapsed without a trigger: everything hidden.
        assert!(tree.has_class(&by_id(&tree, "B1"), "hide"));
        assert!(tree.has_class(&by_id(&tree, "B2"), "hide"));
        assert!(tree.has_class(&by_id(&tree, "EB"), "hide"));
        // Clicked cluster collapsed around its header.
        assert!(tree.has_class(&by_id(&tree, "A1"), "collapsed"));
        assert!(!tree.has_class(&by_id(&tree, "A1"), "hide"));
        assert!(tree.has_class(&by_id(&tree, "A2"), "hide"));
        assert!(!tree.has_class(&by_id(&tree, "EA"), "hide"));
        // `ab` only shares a string prefix with `a`.
        assert!(!tree.has_class(&by_id(&tree, "AB1"), "hide"));
    }

    #[test]
    fn second_click_expands_everything() {
        let (mut tree, interaction, config) = wired();
        let header = link_in(&tree, "A1");
        interaction.click(&mut tree, &config, &header);
        let outcome = interaction.click(&mut tree, &config, &header);

        assert_eq!(outcome.expanded, Some(true));
        for id in ["A1", "A2", "B1", "B2"] {
            let el = by_id(&tree, id);
            assert!(!tree.has_class(&el, "hide"), "{id} still hidden");
            assert!(!tree.has_class(&el, "collapsed"), "{id} still collapsed");
        }
        assert!(tree.has_class(&by_id(&tree, "EA"), "hide"));
        assert!(tree.has_class(&by_id(&tree, "EB"), "hide"));
        for frame in tree.elements_with_class("cluster") {
            assert!(!tree.has_class(&frame, "hide"));
        }
    }

    #[test]
    fn collapsing_a_leaf_cluster_leaves_parent_alone() {
        let (mut tree, interaction, config) = wired();
        let link = link_in(&tree, "B1");
        let outcome = interaction.click(&mut tree, &config, &link);
        assert_eq!(outcome.toggled, vec!["a.b".to_string()]);
        assert!(tree.has_class(&by_id(&tree, "B1"), "collapsed"));
        assert!(tree.has_class(&by_id(&tree, "B2"), "hide"));
        assert!(!tree.has_class(&by_id(&tree, "EB"), "hide"));
        assert!(!tree.has_class(&by_id(&tree, "A2"), "hide"));
    }

    #[test]
    fn silent_links_change_nothing() {
        let (mut tree, interaction, config) = wired();
        let before = tree.to_svg_string();
        let link = link_in(&tree, "A2");
        let outcome = interaction.click(&mut tree, &config, &link);
        assert_eq!(outcome, ClickOutcome::default());
        assert_eq!(tree.to_svg_string(), before);
    }

    #[test]
    fn prefix_mode_treats_shared_prefix_as_descendant() {
        let mut tree = SvgTree::parse(NESTED).unwrap();
        let config = FoldConfig {
            descendant_match: DescendantMatch::Prefix,
            ..FoldConfig::default()
        };
        let interaction = Interaction::initialize(&mut tree, &config);
        let link = link_in(&tree, "A1");
        let outcome = interaction.click(&mut tree, &config, &link);
        assert_eq!(
            outcome.toggled,
            vec!["a.b".to_string(), "ab".to_string(), "a".to_string()]
        );
        assert!(tree.has_class(&by_id(&tree, "AB1"), "hide"));
    }

    #[test]
    fn header_lookup_by_cluster() {
        let (tree, interaction, config) = wired();
        assert_eq!(
            interaction.header_for(&tree, &config, "a.b"),
            Some(link_in(&tree, "B1"))
        );
        assert_eq!(interaction.header_for(&tree, &config, "zzz"), None);
    }
}
