use puzzleboard_core::{BoardRect, CanvasSize, Piece, PointerId, PuzzleSession};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::app_core::BoardController;
use crate::dom::{by_id, js_err};

const GRID_STROKE: &str = "rgba(2,89,64,0.15)";
const GRID_DASH: [f64; 2] = [6.0, 10.0];
const OUTLINE_STROKE: &str = "rgba(15,23,42,0.3)";
const GLOW_SHADOW: &str = "rgba(2,89,64,0.7)";
const GLOW_STROKE: &str = "rgba(2,89,64,0.9)";
const GLOW_BLUR: f64 = 12.0;

/// A canvas plus its 2d context.
#[derive(Clone)]
pub(crate) struct Surface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Surface {
    pub(crate) fn from_id(id: &str) -> Result<Self, String> {
        let canvas: HtmlCanvasElement = by_id(id).ok_or_else(|| format!("missing canvas #{id}"))?;
        Self::from_canvas(canvas)
    }

    pub(crate) fn from_canvas(canvas: HtmlCanvasElement) -> Result<Self, String> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|err| js_err(&err))?
            .ok_or_else(|| "canvas has no 2d context".to_string())?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "unexpected canvas context type".to_string())?;
        Ok(Self { canvas, ctx })
    }

    pub(crate) fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub(crate) fn ctx(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }

    pub(crate) fn size(&self) -> CanvasSize {
        CanvasSize::new(self.canvas.width(), self.canvas.height())
    }

    pub(crate) fn set_size(&self, size: CanvasSize) {
        self.canvas.set_width(size.width);
        self.canvas.set_height(size.height);
    }

    pub(crate) fn clear(&self) {
        let size = self.size();
        self.ctx
            .clear_rect(0.0, 0.0, f64::from(size.width), f64::from(size.height));
    }
}

/// The board surface: pieces, guide grid and pointer capture.
pub(crate) struct BoardCanvas {
    surface: Surface,
}

impl BoardCanvas {
    pub(crate) fn new(surface: Surface) -> Self {
        Self { surface }
    }

    pub(crate) fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Backing-store size that fills the wrapper element, floored to
    /// whole pixels. Falls back to the current size when detached.
    pub(crate) fn measure_wrapper(&self) -> CanvasSize {
        match self.surface.canvas.parent_element() {
            Some(parent) => {
                let rect = parent.get_bounding_client_rect();
                CanvasSize::from_css(rect.width(), rect.height())
            }
            None => self.surface.size(),
        }
    }

    /// Where the canvas sits on screen right now, for client→canvas mapping.
    pub(crate) fn client_rect(&self) -> BoardRect {
        let rect = self.surface.canvas.get_bounding_client_rect();
        BoardRect {
            left: rect.left() as f32,
            top: rect.top() as f32,
            width: rect.width() as f32,
            height: rect.height() as f32,
        }
    }

    pub(crate) fn capture_pointer(&self, pointer: PointerId) {
        if let Err(err) = self.surface.canvas.set_pointer_capture(pointer.0) {
            gloo::console::warn!("pointer capture failed", js_err(&err));
        }
    }

    pub(crate) fn release_pointer(&self, pointer: PointerId) {
        if self.surface.canvas.has_pointer_capture(pointer.0) {
            let _ = self.surface.canvas.release_pointer_capture(pointer.0);
        }
    }

    /// Repaints the whole board. Nothing but a blank canvas is drawn until
    /// both the round and its image exist.
    pub(crate) fn draw(&self, controller: &BoardController, image: Option<&HtmlImageElement>) {
        let (Some(session), Some(image)) = (controller.session(), image) else {
            return;
        };
        self.surface.clear();
        self.draw_grid(session);
        let ctx = &self.surface.ctx;
        let piece_w = f64::from(session.piece_width());
        let piece_h = f64::from(session.piece_height());
        let image_size = (f64::from(image.natural_width()), f64::from(image.natural_height()));
        let drag = controller.drag();
        for piece in session.pieces() {
            let (sx, sy, sw, sh) = source_rect(piece, session, image_size);
            let (x, y) = (f64::from(piece.x()), f64::from(piece.y()));
            let _ = ctx.draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image, sx, sy, sw, sh, x, y, piece_w, piece_h,
            );
            if !piece.locked() {
                ctx.set_stroke_style_str(OUTLINE_STROKE);
                ctx.set_line_width(1.0);
                ctx.stroke_rect(x + 0.5, y + 0.5, piece_w - 1.0, piece_h - 1.0);
            }
            if drag.is_highlighted(piece.id()) {
                ctx.save();
                ctx.set_shadow_color(GLOW_SHADOW);
                ctx.set_shadow_blur(GLOW_BLUR);
                ctx.set_line_width(2.0);
                ctx.set_stroke_style_str(GLOW_STROKE);
                ctx.stroke_rect(x + 0.5, y + 0.5, piece_w - 1.0, piece_h - 1.0);
                ctx.restore();
            }
        }
    }

    fn draw_grid(&self, session: &PuzzleSession) {
        let ctx = &self.surface.ctx;
        let size = session.canvas();
        let (width, height) = (f64::from(size.width), f64::from(size.height));
        ctx.save();
        ctx.set_stroke_style_str(GRID_STROKE);
        ctx.set_line_width(1.0);
        let dash = js_sys::Array::of2(&JsValue::from_f64(GRID_DASH[0]), &JsValue::from_f64(GRID_DASH[1]));
        let _ = ctx.set_line_dash(&dash);
        for x in guide_lines(session.grid().cols, session.piece_width()) {
            ctx.begin_path();
            ctx.move_to(x, 0.0);
            ctx.line_to(x, height);
            ctx.stroke();
        }
        for y in guide_lines(session.grid().rows, session.piece_height()) {
            ctx.begin_path();
            ctx.move_to(0.0, y);
            ctx.line_to(width, y);
            ctx.stroke();
        }
        ctx.restore();
    }
}

/// Interior piece boundaries on one axis, offset half a pixel so a 1px
/// stroke stays crisp.
pub(crate) fn guide_lines(count: u32, piece_extent: f32) -> impl Iterator<Item = f64> {
    (1..count).map(move |index| (f64::from(index) * f64::from(piece_extent)).round() + 0.5)
}

/// Region of the source image that belongs to `piece`: its home rectangle
/// scaled from board pixels to image pixels.
pub(crate) fn source_rect(piece: &Piece, session: &PuzzleSession, image_size: (f64, f64)) -> (f64, f64, f64, f64) {
    let canvas = session.canvas();
    let scale_x = image_size.0 / f64::from(canvas.width.max(1));
    let scale_y = image_size.1 / f64::from(canvas.height.max(1));
    (
        f64::from(piece.correct_x()) * scale_x,
        f64::from(piece.correct_y()) * scale_y,
        f64::from(session.piece_width()) * scale_x,
        f64::from(session.piece_height()) * scale_y,
    )
}
