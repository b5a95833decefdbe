use crate::config::{DescendantMatch, FoldConfig};

/// Last component of a cluster path (`"a.b.c"` -> `"c"`).
pub fn last_segment<'a>(cluster: &'a str, separator: &str) -> &'a str {
    if separator.is_empty() {
        return cluster;
    }
    cluster.rsplit(separator).next().unwrap_or(cluster)
}

/// Number of separators in the path; top-level clusters have depth 0.
pub fn depth(cluster: &str, separator: &str) -> usize {
    if separator.is_empty() {
        return 0;
    }
    cluster.matches(separator).count()
}

/// True when `candidate` is nested strictly inside `ancestor`.
pub fn is_strict_descendant(
    candidate: &str,
    ancestor: &str,
    separator: &str,
    mode: DescendantMatch,
) -> bool {
    if candidate == ancestor {
        return false;
    }
    let Some(rest) = candidate.strip_prefix(ancestor) else {
        return false;
    };
    match mode {
        DescendantMatch::Prefix => true,
        DescendantMatch::Segment => !separator.is_empty() && rest.starts_with(separator),
    }
}

/// Title text Graphviz gives the frame drawn around `cluster`.
pub fn frame_title(cluster: &str, config: &FoldConfig) -> String {
    format!(
        "{}{}",
        config.frame_title_prefix,
        last_segment(cluster, &config.separator)
    )
}
