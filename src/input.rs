use std::rc::Rc;

use gloo::events::EventListener;
use puzzleboard_core::{PointerId, PointerInput, PointerPhase};
use wasm_bindgen::JsCast;
use web_sys::{EventTarget, PointerEvent};

pub(crate) type PointerHandler = Rc<dyn Fn(PointerInput)>;

/// A lost capture ends the drag like a cancel; after a normal release the
/// controller has no active drag and ignores it.
const POINTER_EVENTS: [&str; 5] = [
    "pointerdown",
    "pointermove",
    "pointerup",
    "pointercancel",
    "lostpointercapture",
];

pub(crate) fn phase_for(event_type: &str) -> Option<PointerPhase> {
    match event_type {
        "pointerdown" => Some(PointerPhase::Down),
        "pointermove" => Some(PointerPhase::Move),
        "pointerup" => Some(PointerPhase::Up),
        "pointercancel" | "lostpointercapture" => Some(PointerPhase::Cancel),
        _ => None,
    }
}

pub(crate) fn pointer_input(event: &PointerEvent) -> Option<PointerInput> {
    Some(PointerInput {
        phase: phase_for(&event.type_())?,
        pointer_id: PointerId(event.pointer_id()),
        client_x: event.client_x() as f32,
        client_y: event.client_y() as f32,
    })
}

/// Forwards the board's pointer stream to `handler`. Dropping the returned
/// listeners detaches them.
pub(crate) fn attach_pointer_listeners(target: &EventTarget, handler: PointerHandler) -> Vec<EventListener> {
    POINTER_EVENTS
        .iter()
        .map(|name| {
            let handler = Rc::clone(&handler);
            EventListener::new(target, *name, move |event| {
                let Some(event) = event.dyn_ref::<PointerEvent>() else {
                    return;
                };
                if let Some(input) = pointer_input(event) {
                    (handler)(input);
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn dom_event_names_map_to_phases() {
        assert_eq!(phase_for("pointerdown"), Some(PointerPhase::Down));
        assert_eq!(phase_for("pointercancel"), Some(PointerPhase::Cancel));
        assert_eq!(phase_for("lostpointercapture"), Some(PointerPhase::Cancel));
        assert_eq!(phase_for("click"), None);
    }

    #[wasm_bindgen_test]
    fn every_registered_event_has_a_phase() {
        assert!(POINTER_EVENTS.iter().all(|name| phase_for(name).is_some()));
        assert!(POINTER_EVENTS.contains(&"lostpointercapture"));
    }
}
