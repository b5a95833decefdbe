/// The slice of a rendered document the fold logic needs.
///
/// Implemented by the owned SVG tree in [`crate::tree`] and by the browser
/// DOM in the wasm crate. Element handles are cheap to clone and compare by
/// identity.
pub trait DocumentModel {
    type Element: Clone + PartialEq;

    /// Every anchor (`<a>`) element, in document order.
    fn anchors(&self) -> Vec<Self::Element>;

    /// Every element whose `class` list contains `class`, in document order.
    fn elements_with_class(&self, class: &str) -> Vec<Self::Element>;

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

    fn set_attribute(&mut self, element: &Self::Element, name: &str, value: &str);

    fn parent(&self, element: &Self::Element) -> Option<Self::Element>;

    /// Text of the first descendant element named `tag`.
    fn descendant_text(&self, element: &Self::Element, tag: &str) -> Option<String>;

    fn has_class(&self, element: &Self::Element, class: &str) -> bool;

    fn add_class(&mut self, element: &Self::Element, class: &str);

    fn remove_class(&mut self, element: &Self::Element, class: &str);

    fn ancestor(&self, element: &Self::Element, depth: usize) -> Option<Self::Element> {
        let mut current = element.clone();
        for _ in 0..depth {
            current = self.parent(&current)?;
        }
        Some(current)
    }

    fn set_class(&mut self, element: &Self::Element, class: &str, on: bool) {
        if on {
            self.add_class(element, class);
        } else {
            self.remove_class(element, class);
        }
    }
}

/// Splits a `class` attribute value the way `classList` does.
pub fn class_tokens(value: &str) -> impl Iterator<Item = &str> {
    value.split_ascii_whitespace()
}

/// `value` with `class` added (`on`) or removed, other tokens kept in order.
pub fn toggle_class_token(value: &str, class: &str, on: bool) -> String {
    let mut tokens: Vec<&str> = Vec::new();
    for token in class_tokens(value) {
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    if on {
        if !tokens.contains(&class) {
            tokens.push(class);
        }
    } else {
        tokens.retain(|token| *token != class);
    }
    tokens.join(" ")
}
