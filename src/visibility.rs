use crate::cluster::frame_title;
use crate::config::FoldConfig;
use crate::document::DocumentModel;

/// Node containers of every link whose cluster attribute equals `cluster`.
pub fn cluster_members<D: DocumentModel>(
    doc: &D,
    config: &FoldConfig,
    cluster: &str,
) -> Vec<D::Element> {
    doc.anchors()
        .iter()
        .filter(|link| doc.attribute(link, &config.cluster_attribute).as_deref() == Some(cluster))
        .filter_map(|link| doc.ancestor(link, config.container_depth))
        .collect()
}

/// Bounding frame Graphviz drew around `cluster`, matched by its title.
pub fn cluster_frame<D: DocumentModel>(
    doc: &D,
    config: &FoldConfig,
    cluster: &str,
) -> Option<D::Element> {
    let title = frame_title(cluster, config);
    doc.elements_with_class(&config.frame_class)
        .into_iter()
        .find(|frame| doc.descendant_text(frame, "title").as_deref() == Some(title.as_str()))
}

/// Shows (`on`) or hides each element; `except` flips `collapsed` instead.
fn toggle_elements<D: DocumentModel>(
    doc: &mut D,
    config: &FoldConfig,
    elements: &[D::Element],
    except: Option<&D::Element>,
    on: bool,
) {
    for element in elements {
        if except == Some(element) {
            doc.set_class(element, &config.collapsed_class, !on);
        } else {
            doc.set_class(element, &config.hidden_class, !on);
        }
    }
}

/// Expands (`visible`) or collapses one cluster.
///
/// `trigger` is the clicked node container. It alone gets the `collapsed`
/// flag, and collapsing reveals the cluster's placeholder edges only when a
/// trigger is present: a cluster collapsed because its parent was clicked
/// disappears entirely.
pub fn set_cluster_visibility<D: DocumentModel>(
    doc: &mut D,
    config: &FoldConfig,
    cluster: &str,
    trigger: Option<&D::Element>,
    visible: bool,
) {
    tracing::debug!(cluster, visible, triggered = trigger.is_some(), "set cluster visibility");

    let members = cluster_members(doc, config, cluster);
    if let Some(frame) = cluster_frame(doc, config, cluster) {
        doc.set_class(&frame, &config.hidden_class, !visible);
    }
    toggle_elements(doc, config, &members, trigger, visible);

    let placeholders = cluster_members(doc, config, &config.placeholder_for(cluster));
    let show_placeholders = trigger.is_some() && !visible;
    toggle_elements(doc, config, &placeholders, None, show_placeholders);

    tracing::trace!(
        cluster,
        members = members.len(),
        placeholders = placeholders.len(),
        "cluster toggled"
    );
}
