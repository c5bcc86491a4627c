use crate::document::Document;
use crate::error::{BridgeError, Result};
use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

fn dom_error(value: JsValue) -> BridgeError {
    BridgeError::Dom(
        value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value)),
    )
}

/// The live browser document.
#[derive(Clone)]
pub struct WebDocument {
    document: web_sys::Document,
}

impl WebDocument {
    pub fn new() -> std::result::Result<Self, JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        Ok(Self { document })
    }

    pub fn raw(&self) -> &web_sys::Document {
        &self.document
    }
}

impl Document for WebDocument {
    type Node = Element;

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn query_in(&self, scope: &Element, selector: &str) -> Option<Element> {
        scope.query_selector(selector).ok().flatten()
    }

    fn query_all_in(&self, scope: &Element, selector: &str) -> Vec<Element> {
        let Ok(list) = scope.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn create_element(&self, tag: &str) -> Result<Element> {
        self.document.create_element(tag).map_err(dom_error)
    }

    fn append_child(&self, parent: &Element, child: &Element) -> Result<()> {
        parent.append_child(child).map(|_| ()).map_err(dom_error)
    }

    fn remove(&self, node: &Element) {
        node.remove();
    }

    fn set_class_name(&self, node: &Element, class_name: &str) {
        node.set_class_name(class_name);
    }

    fn set_style(&self, node: &Element, property: &str, value: &str) -> Result<()> {
        let element: &HtmlElement = node
            .dyn_ref()
            .ok_or_else(|| BridgeError::Dom(format!("<{}> has no style", node.tag_name())))?;
        element
            .style()
            .set_property(property, value)
            .map_err(dom_error)
    }

    fn set_text(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn remove_after(&self, node: Element, delay_ms: u32) {
        Timeout::new(delay_ms, move || node.remove()).forget();
    }
}
