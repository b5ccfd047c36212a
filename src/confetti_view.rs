use std::cell::RefCell;
use std::rc::Rc;

use gloo::render::{request_animation_frame, AnimationFrame};
use gloo::timers::callback::Timeout;
use puzzleboard_core::confetti::CONFETTI_CLEAR_DELAY_MS;
use puzzleboard_core::ConfettiBurst;

use crate::canvas_view::Surface;

type FrameSlot = Rc<RefCell<Option<AnimationFrame>>>;
type ClearSlot = Rc<RefCell<Option<Timeout>>>;

/// Celebration overlay. One burst at a time; launching again restarts it.
pub(crate) struct ConfettiView {
    surface: Surface,
    frame: FrameSlot,
    clear: ClearSlot,
}

impl ConfettiView {
    pub(crate) fn new(surface: Surface) -> Self {
        Self {
            surface,
            frame: Rc::new(RefCell::new(None)),
            clear: Rc::new(RefCell::new(None)),
        }
    }

    pub(crate) fn surface(&self) -> &Surface {
        &self.surface
    }

    pub(crate) fn is_running(&self) -> bool {
        self.frame.borrow().is_some()
    }

    pub(crate) fn launch(&self, seed: u32) {
        self.cancel();
        let burst = ConfettiBurst::new(self.surface.size(), seed);
        step(
            self.surface.clone(),
            burst,
            Rc::clone(&self.frame),
            Rc::clone(&self.clear),
        );
    }

    /// Stops the animation and wipes the overlay.
    pub(crate) fn cancel(&self) {
        self.frame.borrow_mut().take();
        self.clear.borrow_mut().take();
        self.surface.clear();
    }
}

fn step(surface: Surface, mut burst: ConfettiBurst, frame: FrameSlot, clear: ClearSlot) {
    surface.clear();
    let falling = burst.step();
    paint(&surface, &burst);
    if falling {
        let slot = Rc::clone(&frame);
        let next = request_animation_frame(move |_timestamp| step(surface, burst, slot, clear));
        *frame.borrow_mut() = Some(next);
        return;
    }
    frame.borrow_mut().take();
    let wipe = Timeout::new(CONFETTI_CLEAR_DELAY_MS, move || surface.clear());
    *clear.borrow_mut() = Some(wipe);
}

fn paint(surface: &Surface, burst: &ConfettiBurst) {
    let ctx = surface.ctx();
    for particle in burst.particles() {
        ctx.set_fill_style_str(&format!("hsl({}, 90%, 60%)", particle.hue));
        ctx.fill_rect(
            f64::from(particle.x),
            f64::from(particle.y),
            f64::from(particle.size),
            f64::from(particle.size),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;
    use web_sys::HtmlCanvasElement;

    wasm_bindgen_test_configure!(run_in_browser);

    fn overlay() -> ConfettiView {
        let canvas = crate::dom::document()
            .and_then(|doc| doc.create_element("canvas").ok())
            .and_then(|element| element.dyn_into::<HtmlCanvasElement>().ok())
            .expect("canvas element");
        canvas.set_width(200);
        canvas.set_height(120);
        ConfettiView::new(Surface::from_canvas(canvas).expect("2d surface"))
    }

    #[wasm_bindgen_test]
    fn launch_schedules_frames_until_cancelled() {
        let view = overlay();
        view.launch(9);
        assert!(view.is_running());
        view.cancel();
        assert!(!view.is_running());
        assert_eq!(view.surface().size().width, 200);
    }
}
