use crate::config::{FoldConfig, StyleConfig};
use crate::document::DocumentModel;
use crate::error::{FoldError, Result};
use crate::interact::Interaction;
use crate::tree::{ElementRef, SvgTree};

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Companion stylesheet for prepared graphs.
pub fn stylesheet(fold: &FoldConfig, style: &StyleConfig) -> String {
    let mut css = format!(
        ".node-highlight {{ stroke: {}; opacity: 1;}}\n.{} {{ display: none;}}\n",
        style.highlight_stroke, fold.hidden_class
    );
    if let Some(extra) = style.extra_css.as_deref() {
        css.push_str(extra);
        if !extra.ends_with('\n') {
            css.push('\n');
        }
    }
    css
}

#[derive(Debug, Clone, Default)]
pub struct PrepareOptions {
    /// Embed the stylesheet as a `<style>` element.
    pub inline_style: bool,
    /// Reference to an external script appended to the root `<svg>`.
    pub script_href: Option<String>,
}

/// Wires `tree` for folding and adds the stylesheet and optional script
/// reference to its `<svg>` element.
pub fn prepare(
    tree: &mut SvgTree,
    fold: &FoldConfig,
    style: &StyleConfig,
    options: &PrepareOptions,
) -> Result<Interaction<ElementRef>> {
    let svg = tree.svg_root().ok_or(FoldError::MissingRoot)?;
    let interaction = Interaction::initialize(tree, fold);

    if options.inline_style {
        inject_style(tree, svg, &stylesheet(fold, style));
    }
    if let Some(href) = options.script_href.as_deref() {
        inject_script(tree, svg, href);
    }
    Ok(interaction)
}

fn inject_style(tree: &mut SvgTree, svg: ElementRef, css: &str) {
    let already_present = tree
        .elements_named("style")
        .into_iter()
        .any(|style| tree.text_of(style) == css);
    if already_present {
        return;
    }
    let style = tree.create_element("style", &[("type", "text/css")]);
    tree.append_text(style, css);
    tree.insert_child(svg, 0, style);
}

fn inject_script(tree: &mut SvgTree, svg: ElementRef, href: &str) {
    tree.ensure_namespace("xlink", XLINK_NS);
    let already_present = tree
        .elements_named("script")
        .iter()
        .any(|script| tree.attribute(script, "xlink:href").as_deref() == Some(href));
    if already_present {
        return;
    }
    let script = tree.create_element(
        "script",
        &[("xlink:href", href), ("type", "text/javascript")],
    );
    tree.append_child(svg, script);
}
