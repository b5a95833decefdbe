use crate::document::{DocumentModel, class_tokens, toggle_class_token};
use crate::error::{FoldError, Result};

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Handle to an element of an [`SvgTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementRef(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        name: String,
        namespaces: Vec<(Option<String>, String)>,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
    ProcessingInstruction {
        target: String,
        value: Option<String>,
    },
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Owned, mutable copy of a rendered SVG (or XHTML) document.
///
/// Element and attribute names are stored with the prefixes they were
/// written with, so `xlink:href` is looked up as `"xlink:href"`.
/// Comments and processing instructions around the root element (an
/// `<?xml-stylesheet?>` line, say) are kept and written back in place.
#[derive(Debug, Clone)]
pub struct SvgTree {
    nodes: Vec<Node>,
    root: usize,
    prologue: Vec<usize>,
    epilogue: Vec<usize>,
}

impl SvgTree {
    pub fn parse(text: &str) -> Result<Self> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        };
        let doc = roxmltree::Document::parse_with_options(text, options)?;
        if !doc.descendants().any(|n| n.has_tag_name("svg")) {
            return Err(FoldError::MissingRoot);
        }

        let mut tree = Self {
            nodes: Vec::new(),
            root: 0,
            prologue: Vec::new(),
            epilogue: Vec::new(),
        };
        let mut seen_root = false;
        for node in doc.root().children() {
            if node.is_element() {
                let Some(root) = tree.build(node, None) else {
                    return Err(FoldError::MissingRoot);
                };
                tree.root = root;
                seen_root = true;
            } else if node.is_comment() || node.is_pi() {
                if let Some(id) = tree.build(node, None) {
                    if seen_root {
                        tree.epilogue.push(id);
                    } else {
                        tree.prologue.push(id);
                    }
                }
            }
        }
        if !seen_root {
            return Err(FoldError::MissingRoot);
        }
        Ok(tree)
    }

    fn build(&mut self, node: roxmltree::Node<'_, '_>, parent: Option<usize>) -> Option<usize> {
        let kind = if node.is_element() {
            let tag = node.tag_name();
            let name = qualified_name(node, tag.namespace(), tag.name());
            let inherited: Vec<(Option<&str>, &str)> = node
                .parent_element()
                .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
                .unwrap_or_default();
            let namespaces = node
                .namespaces()
                .filter(|ns| ns.name() != Some("xml"))
                .filter(|ns| !inherited.contains(&(ns.name(), ns.uri())))
                .map(|ns| (ns.name().map(str::to_string), ns.uri().to_string()))
                .collect();
            let attributes = node
                .attributes()
                .map(|a| {
                    (
                        qualified_name(node, a.namespace(), a.name()),
                        a.value().to_string(),
                    )
                })
                .collect();
            NodeKind::Element {
                name,
                namespaces,
                attributes,
            }
        } else if node.is_text() {
            NodeKind::Text(node.text().unwrap_or_default().to_string())
        } else if node.is_comment() {
            NodeKind::Comment(node.text().unwrap_or_default().to_string())
        } else if let Some(pi) = node.pi() {
            NodeKind::ProcessingInstruction {
                target: pi.target.to_string(),
                value: pi.value.map(str::to_string),
            }
        } else {
            return None;
        };

        let id = self.push(kind, parent);
        for child in node.children() {
            if let Some(child_id) = self.build(child, Some(id)) {
                self.nodes[id].children.push(child_id);
            }
        }
        Some(id)
    }

    fn push(&mut self, kind: NodeKind, parent: Option<usize>) -> usize {
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    pub fn root(&self) -> ElementRef {
        ElementRef(self.root)
    }

    /// First `<svg>` element, which is the root itself for a plain SVG file.
    pub fn svg_root(&self) -> Option<ElementRef> {
        self.descendants(self.root)
            .find(|&id| self.local_name(id) == Some("svg"))
            .map(ElementRef)
    }

    pub fn name(&self, element: ElementRef) -> Option<&str> {
        match &self.nodes.get(element.0)?.kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Elements with local name `local`, in document order.
    pub fn elements_named(&self, local: &str) -> Vec<ElementRef> {
        self.descendants(self.root)
            .filter(|&id| self.local_name(id) == Some(local))
            .map(ElementRef)
            .collect()
    }

    /// Creates a detached element; attach it with [`SvgTree::insert_child`].
    pub fn create_element(&mut self, name: &str, attributes: &[(&str, &str)]) -> ElementRef {
        let kind = NodeKind::Element {
            name: name.to_string(),
            namespaces: Vec::new(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        ElementRef(self.push(kind, None))
    }

    pub fn append_text(&mut self, parent: ElementRef, text: &str) {
        let id = self.push(NodeKind::Text(text.to_string()), Some(parent.0));
        self.nodes[parent.0].children.push(id);
    }

    /// Inserts `child` at `index` among `parent`'s children, clamped to the end.
    pub fn insert_child(&mut self, parent: ElementRef, index: usize, child: ElementRef) {
        self.nodes[child.0].parent = Some(parent.0);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child.0);
    }

    pub fn append_child(&mut self, parent: ElementRef, child: ElementRef) {
        let end = self.nodes[parent.0].children.len();
        self.insert_child(parent, end, child);
    }

    /// Declares `prefix` on the root element unless it is already in scope there.
    pub fn ensure_namespace(&mut self, prefix: &str, uri: &str) {
        if let NodeKind::Element { namespaces, .. } = &mut self.nodes[self.root].kind {
            if !namespaces
                .iter()
                .any(|(name, _)| name.as_deref() == Some(prefix))
            {
                namespaces.push((Some(prefix.to_string()), uri.to_string()));
            }
        }
    }

    pub fn to_svg_string(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n");
        for &id in &self.prologue {
            self.write_node(id, &mut out);
            out.push('\n');
        }
        self.write_node(self.root, &mut out);
        out.push('\n');
        for &id in &self.epilogue {
            self.write_node(id, &mut out);
            out.push('\n');
        }
        out
    }

    fn write_node(&self, id: usize, out: &mut String) {
        let node = &self.nodes[id];
        match &node.kind {
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeKind::ProcessingInstruction { target, value } => {
                out.push_str("<?");
                out.push_str(target);
                if let Some(value) = value {
                    out.push(' ');
                    out.push_str(value);
                }
                out.push_str("?>");
            }
            NodeKind::Element {
                name,
                namespaces,
                attributes,
            } => {
                out.push('<');
                out.push_str(name);
                for (prefix, uri) in namespaces {
                    match prefix {
                        Some(prefix) => out.push_str(&format!(" xmlns:{prefix}=\"")),
                        None => out.push_str(" xmlns=\""),
                    }
                    out.push_str(&escape_attr(uri));
                    out.push('"');
                }
                for (key, value) in attributes {
                    out.push_str(&format!(" {key}=\"{}\"", escape_attr(value)));
                }
                if node.children.is_empty() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                for &child in &node.children {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
    }

    fn descendants(&self, from: usize) -> impl Iterator<Item = usize> + '_ {
        let mut stack = vec![from];
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.nodes[id].children.iter().rev());
            Some(id)
        })
    }

    fn local_name(&self, id: usize) -> Option<&str> {
        match &self.nodes[id].kind {
            NodeKind::Element { name, .. } => {
                Some(name.rsplit_once(':').map_or(name.as_str(), |(_, local)| local))
            }
            _ => None,
        }
    }

    fn attributes(&self, id: usize) -> Option<&[(String, String)]> {
        match &self.nodes.get(id)?.kind {
            NodeKind::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// Concatenated text below `element`, e.g. the rules of a `<style>`.
    pub fn text_of(&self, element: ElementRef) -> String {
        self.text_content(element.0)
    }

    fn text_content(&self, id: usize) -> String {
        self.descendants(id)
            .filter_map(|n| match &self.nodes[n].kind {
                NodeKind::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl DocumentModel for SvgTree {
    type Element = ElementRef;

    fn anchors(&self) -> Vec<ElementRef> {
        self.elements_named("a")
    }

    fn elements_with_class(&self, class: &str) -> Vec<ElementRef> {
        self.descendants(self.root)
            .map(ElementRef)
            .filter(|&el| self.has_class(&el, class))
            .collect()
    }

    fn attribute(&self, element: &ElementRef, name: &str) -> Option<String> {
        self.attributes(element.0)?
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    fn set_attribute(&mut self, element: &ElementRef, name: &str, value: &str) {
        let Some(node) = self.nodes.get_mut(element.0) else {
            return;
        };
        if let NodeKind::Element { attributes, .. } = &mut node.kind {
            match attributes.iter_mut().find(|(key, _)| key == name) {
                Some((_, existing)) => *existing = value.to_string(),
                None => attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    fn parent(&self, element: &ElementRef) -> Option<ElementRef> {
        let parent = self.nodes.get(element.0)?.parent?;
        Some(ElementRef(parent))
    }

    fn descendant_text(&self, element: &ElementRef, tag: &str) -> Option<String> {
        let found = self
            .descendants(element.0)
            .skip(1)
            .find(|&id| self.local_name(id) == Some(tag))?;
        Some(self.text_content(found))
    }

    fn has_class(&self, element: &ElementRef, class: &str) -> bool {
        self.attribute(element, "class")
            .is_some_and(|value| class_tokens(&value).any(|token| token == class))
    }

    fn add_class(&mut self, element: &ElementRef, class: &str) {
        let current = self.attribute(element, "class").unwrap_or_default();
        self.set_attribute(element, "class", &toggle_class_token(&current, class, true));
    }

    fn remove_class(&mut self, element: &ElementRef, class: &str) {
        let Some(current) = self.attribute(element, "class") else {
            return;
        };
        self.set_attribute(element, "class", &toggle_class_token(&current, class, false));
    }
}

fn qualified_name(node: roxmltree::Node<'_, '_>, namespace: Option<&str>, local: &str) -> String {
    match namespace {
        Some(XML_NS) => format!("xml:{local}"),
        Some(uri) => match node.lookup_prefix(uri) {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
            _ => local.to_string(),
        },
        None => local.to_string(),
    }
}

fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// Whitespace other than the space is normalised away by XML parsers unless
// it is written as a character reference.
fn escape_attr(input: &str) -> String {
    escape_text(input)
        .replace('"', "&quot;")
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;")
}
