use puzzleboard_core::PuzzleError;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Event, HtmlImageElement};

use crate::dom::js_err;

/// Fetches and decodes `src`. Resolves once the bitmap has known natural
/// dimensions; network and decode failures come back as
/// [`PuzzleError::ImageLoad`].
pub(crate) async fn load_image(src: &str) -> Result<HtmlImageElement, PuzzleError> {
    let image_err = |reason: String| PuzzleError::ImageLoad {
        src: src.to_string(),
        reason,
    };
    let image = HtmlImageElement::new().map_err(|err| image_err(js_err(&err)))?;
    // canvas pixels stay readable for cross-origin CDNs
    image.set_cross_origin(Some("anonymous"));
    let loaded = image_to_promise(&image);
    image.set_src(src);
    JsFuture::from(loaded).await.map_err(|err| image_err(js_err(&err)))?;
    if image.natural_width() == 0 || image.natural_height() == 0 {
        return Err(image_err("image has no pixels".to_string()));
    }
    Ok(image)
}

fn image_to_promise(image: &HtmlImageElement) -> js_sys::Promise {
    js_sys::Promise::new(&mut |resolve, reject| {
        let on_load = Closure::once(move |_event: Event| {
            let _ = resolve.call0(&JsValue::NULL);
        });
        let on_error = Closure::once(move |_event: Event| {
            let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("image failed to load"));
        });
        image.set_onload(Some(on_load.as_ref().unchecked_ref()));
        image.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        on_load.forget();
        on_error.forget();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const PIXEL: &str = "data:image/gif;base64,R0lGODlhAQABAIAAAP///wAAACH5BAEAAAAALAAAAAABAAEAAAICRAEAOw==";

    #[wasm_bindgen_test(async)]
    async fn data_url_loads_with_dimensions() {
        let image = load_image(PIXEL).await.expect("inline gif");
        assert_eq!((image.natural_width(), image.natural_height()), (1, 1));
    }

    #[wasm_bindgen_test(async)]
    async fn broken_source_reports_image_error() {
        let err = load_image("data:image/png;base64,AAAA").await.expect_err("broken image");
        assert!(matches!(err, PuzzleError::ImageLoad { .. }), "{err}");
    }
}
