//! Live page access through web-sys.

use engine::dom::PageDom;
use engine::error::DomError;
use js_sys::{Object, Reflect, WeakMap};
use std::cell::Cell;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CssStyleDeclaration, Document, DomTokenList, Element, HtmlElement, SvgElement, Window};

/// Element handle with a stable identity.
///
/// JS objects cannot be hashed from Rust, so every element gets a numeric
/// key from the [`ElementRegistry`] the first time it is seen.
#[derive(Debug, Clone)]
pub struct ElementRef {
    key: u32,
    element: Element,
}

impl ElementRef {
    pub fn element(&self) -> &Element {
        &self.element
    }
}

impl PartialEq for ElementRef {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ElementRef {}

impl Hash for ElementRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// Hands out element keys. Keys live in a `WeakMap`, so the registry never
/// keeps a removed element alive.
pub struct ElementRegistry {
    keys: WeakMap,
    next_key: Cell<u32>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self {
            keys: WeakMap::new(),
            next_key: Cell::new(1),
        }
    }

    pub fn handle(&self, element: Element) -> ElementRef {
        let object = element.unchecked_ref::<Object>();
        let key = match self.keys.get(object).as_f64() {
            Some(key) => key as u32,
            None => {
                let key = self.next_key.get();
                self.next_key.set(key + 1);
                self.keys.set(object, &JsValue::from(key));
                key
            }
        };
        ElementRef { key, element }
    }
}

impl Default for ElementRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub struct WebDom {
    window: Window,
    document: Document,
    registry: Rc<ElementRegistry>,
    cursor: String,
}

impl WebDom {
    pub fn new(window: Window, document: Document, registry: Rc<ElementRegistry>, cursor: String) -> Self {
        Self {
            window,
            document,
            registry,
            cursor,
        }
    }

    fn handles(&self, elements: impl Iterator<Item = Element>) -> Vec<ElementRef> {
        elements.map(|element| self.registry.handle(element)).collect()
    }
}

/// Inline style of HTML and SVG elements alike
fn inline_style(element: &Element) -> Option<CssStyleDeclaration> {
    if let Some(html) = element.dyn_ref::<HtmlElement>() {
        return Some(html.style());
    }
    element.dyn_ref::<SvgElement>().map(SvgElement::style)
}

fn set_style(element: &Element, property: &str, value: &str) {
    let Some(style) = inline_style(element) else {
        log::debug!("<{}> has no inline style", element.local_name());
        return;
    };
    let result = if value.is_empty() {
        style.remove_property(property).map(|_| ())
    } else {
        style.set_property(property, value)
    };
    if result.is_err() {
        log::warn!("Could not set `{}` on <{}>", property, element.local_name());
    }
}

impl PageDom for WebDom {
    type Handle = ElementRef;

    fn is_live(&self, element: &ElementRef) -> bool {
        element.element.is_connected()
    }

    fn computed_display(&self, element: &ElementRef) -> Option<String> {
        self.window
            .get_computed_style(&element.element)
            .ok()
            .flatten()?
            .get_property_value("display")
            .ok()
    }

    fn set_inline_display(&self, element: &ElementRef, value: &str) {
        set_style(&element.element, "display", value);
    }

    fn query_all(&self, selector: &str) -> Result<Vec<ElementRef>, DomError> {
        let nodes = self
            .document
            .query_selector_all(selector)
            .map_err(|_| DomError::InvalidSelector(selector.to_string()))?;
        Ok(self.handles(
            (0..nodes.length())
                .filter_map(|i| nodes.get(i))
                .filter_map(|node| node.dyn_into::<Element>().ok()),
        ))
    }

    fn set_outline(&self, element: &ElementRef, value: &str) {
        set_style(&element.element, "outline", value);
    }

    fn element_id(&self, element: &ElementRef) -> Option<String> {
        let id = element.element.id();
        (!id.is_empty()).then_some(id)
    }

    fn tag_name(&self, element: &ElementRef) -> Option<String> {
        let name = element.element.local_name();
        (!name.is_empty()).then(|| name.to_lowercase())
    }

    fn class_names(&self, element: &ElementRef) -> Result<Vec<String>, DomError> {
        // Read reflectively: some exotic nodes expose no usable classList.
        let list = Reflect::get(&element.element, &JsValue::from_str("classList"))
            .map_err(|_| DomError::Unsupported("classList getter threw".to_string()))?;
        let list = list.dyn_into::<DomTokenList>().map_err(|_| {
            DomError::Unsupported(format!("<{}> has no classList", element.element.local_name()))
        })?;
        Ok(list.value().split_whitespace().map(String::from).collect())
    }

    fn parent(&self, element: &ElementRef) -> Option<ElementRef> {
        element
            .element
            .parent_element()
            .map(|parent| self.registry.handle(parent))
    }

    fn children(&self, element: &ElementRef) -> Vec<ElementRef> {
        let children = element.element.children();
        self.handles((0..children.length()).filter_map(|i| children.item(i)))
    }

    fn is_content_root(&self, element: &ElementRef) -> bool {
        let is_body = self
            .document
            .body()
            .map(|body| body.unchecked_ref::<Element>() == &element.element)
            .unwrap_or(false);
        is_body || self.document.document_element().as_ref() == Some(&element.element)
    }

    fn set_crosshair(&self, enabled: bool) {
        if let Some(body) = self.document.body() {
            let cursor = if enabled { self.cursor.as_str() } else { "" };
            set_style(&body, "cursor", cursor);
        }
    }
}
