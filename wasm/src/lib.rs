use std::rc::Rc;

use cluster_fold::{DocumentModel, FoldConfig, Interaction};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, HtmlCollection};

/// Reads the same camelCase keys as a `cfold` config file; missing keys keep
/// their defaults.
fn build_fold_config(options_json: Option<&str>) -> Result<FoldConfig, String> {
    let Some(raw) = options_json else {
        return Ok(FoldConfig::default());
    };
    let config: FoldConfig = serde_json::from_str(raw).map_err(|error| error.to_string())?;
    config.validate()?;
    Ok(config)
}

/// The live page, seen through [`DocumentModel`].
pub struct DomDocument {
    document: Document,
}

impl DomDocument {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

fn collect(collection: HtmlCollection) -> Vec<Element> {
    (0..collection.length())
        .filter_map(|i| collection.item(i))
        .collect()
}

impl DocumentModel for DomDocument {
    type Element = Element;

    fn anchors(&self) -> Vec<Element> {
        collect(self.document.get_elements_by_tag_name("a"))
    }

    fn elements_with_class(&self, class: &str) -> Vec<Element> {
        collect(self.document.get_elements_by_class_name(class))
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn set_attribute(&mut self, element: &Element, name: &str, value: &str) {
        let _ = element.set_attribute(name, value);
    }

    fn parent(&self, element: &Element) -> Option<Element> {
        element.parent_element()
    }

    fn descendant_text(&self, element: &Element, tag: &str) -> Option<String> {
        element
            .get_elements_by_tag_name(tag)
            .item(0)
            .map(|title| title.inner_html())
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn add_class(&mut self, element: &Element, class: &str) {
        let _ = element.class_list().add_1(class);
    }

    fn remove_class(&mut self, element: &Element, class: &str) {
        let _ = element.class_list().remove_1(class);
    }
}

/// Wires every anchor of the current page: headers fold their cluster on
/// click, body links only swallow the click.
#[wasm_bindgen]
pub fn install(options_json: Option<String>) -> Result<(), JsValue> {
    let config = build_fold_config(options_json.as_deref())
        .map_err(|error| JsValue::from_str(&error))?;
    let config = Rc::new(config);

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("document not available"))?;
    let mut dom = DomDocument::new(document.clone());
    let interaction = Rc::new(Interaction::initialize(&mut dom, &config));

    for link in dom.anchors() {
        let interaction = Rc::clone(&interaction);
        let config = Rc::clone(&config);
        let document = document.clone();
        let target = link.clone();
        let handler = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            event.prevent_default();
            let mut dom = DomDocument::new(document.clone());
            interaction.click(&mut dom, &config, &target);
        });
        link.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref())?;
        handler.forget();
    }

    Ok(())
}
