use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

pub(crate) fn document() -> Option<Document> {
    web_sys::window()?.document()
}

pub(crate) fn by_id<T: JsCast>(id: &str) -> Option<T> {
    document()?.get_element_by_id(id)?.dyn_into::<T>().ok()
}

/// Every element matching `selector`, skipping anything that is not a `T`.
pub(crate) fn query_all<T: JsCast>(selector: &str) -> Vec<T> {
    let Some(list) = document().and_then(|doc| doc.query_selector_all(selector).ok()) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<T>().ok())
        .collect()
}

/// Text of an inline `<script type="application/json">` block.
pub(crate) fn inline_text(id: &str) -> Option<String> {
    let text = document()?.get_element_by_id(id)?.text_content()?;
    (!text.trim().is_empty()).then_some(text)
}

pub(crate) fn set_text(element: Option<&HtmlElement>, text: &str) {
    if let Some(element) = element {
        element.set_text_content(Some(text));
    }
}

pub(crate) fn set_pressed(element: &Element, pressed: bool) {
    let _ = element.set_attribute("aria-pressed", if pressed { "true" } else { "false" });
}

/// Monotonic milliseconds for the round clock.
pub(crate) fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
        .unwrap_or_else(js_sys::Date::now)
}

pub(crate) fn js_err(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{value:?}")
}
