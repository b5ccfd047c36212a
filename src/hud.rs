use std::cell::Cell;

use puzzleboard_core::Difficulty;
use web_sys::{HtmlAnchorElement, HtmlElement, HtmlImageElement};

use crate::dom::{by_id, query_all, set_pressed, set_text};

pub(crate) const PREVIEW_LIMIT_MESSAGE: &str = "You have viewed the preview twice already.";

/// Handles on the page chrome around the board. Every element is optional;
/// a host page that leaves one out just loses that readout.
pub(crate) struct Hud {
    timer: Option<HtmlElement>,
    best: Option<HtmlElement>,
    progress: Option<HtmlElement>,
    title: Option<HtmlElement>,
    year: Option<HtmlElement>,
    cta_link: Option<HtmlAnchorElement>,
    modal: Option<HtmlElement>,
    promo: Option<HtmlElement>,
    preview: Option<HtmlImageElement>,
    preview_button: Option<HtmlElement>,
    difficulty_buttons: Vec<(HtmlElement, Difficulty)>,
    preview_visible: Cell<bool>,
}

impl Hud {
    pub(crate) fn find() -> Self {
        let difficulty_buttons = query_all::<HtmlElement>(".btn-diff")
            .into_iter()
            .map(|button| {
                let level = button.get_attribute("data-diff").unwrap_or_default();
                (button, Difficulty::parse_or_default(&level))
            })
            .collect();
        Self {
            timer: by_id("timer"),
            best: by_id("best"),
            progress: by_id("progress"),
            title: by_id("puzzle-title"),
            year: by_id("year"),
            cta_link: by_id("cta-link"),
            modal: by_id("modal"),
            promo: by_id("promo"),
            preview: by_id("preview"),
            preview_button: by_id("btn-preview"),
            difficulty_buttons,
            preview_visible: Cell::new(false),
        }
    }

    pub(crate) fn set_clock(&self, text: &str) {
        set_text(self.timer.as_ref(), text);
    }

    pub(crate) fn set_best(&self, label: &str) {
        set_text(self.best.as_ref(), label);
    }

    pub(crate) fn set_progress(&self, percent: u8) {
        set_text(self.progress.as_ref(), &format!("{percent}%"));
    }

    pub(crate) fn set_title(&self, title: &str) {
        set_text(self.title.as_ref(), title);
    }

    pub(crate) fn show_year(&self) {
        let year = js_sys::Date::new_0().get_full_year();
        set_text(self.year.as_ref(), &year.to_string());
    }

    pub(crate) fn set_cta(&self, url: &str) {
        if let Some(link) = &self.cta_link {
            link.set_href(url);
        }
    }

    pub(crate) fn difficulty_buttons(&self) -> &[(HtmlElement, Difficulty)] {
        &self.difficulty_buttons
    }

    pub(crate) fn mark_difficulty(&self, current: Difficulty) {
        for (button, level) in &self.difficulty_buttons {
            set_pressed(button, *level == current);
        }
    }

    pub(crate) fn modal(&self) -> Option<&HtmlElement> {
        self.modal.as_ref()
    }

    pub(crate) fn promo(&self) -> Option<&HtmlElement> {
        self.promo.as_ref()
    }

    pub(crate) fn open_modal(&self) {
        reveal(self.modal.as_ref());
    }

    pub(crate) fn close_modal(&self) {
        conceal(self.modal.as_ref());
    }

    pub(crate) fn open_promo(&self) {
        reveal(self.promo.as_ref());
    }

    pub(crate) fn close_promo(&self) {
        conceal(self.promo.as_ref());
    }

    /// Escape closes whichever overlays are open.
    pub(crate) fn dismiss_overlays(&self) {
        for overlay in [self.modal.as_ref(), self.promo.as_ref()].into_iter().flatten() {
            if !overlay.hidden() {
                overlay.set_hidden(true);
            }
        }
    }

    pub(crate) fn set_preview_source(&self, src: &str) {
        if let Some(preview) = &self.preview {
            preview.set_src(src);
        }
    }

    pub(crate) fn preview_visible(&self) -> bool {
        self.preview_visible.get()
    }

    pub(crate) fn set_preview_visible(&self, visible: bool) {
        self.preview_visible.set(visible);
        if let Some(preview) = &self.preview {
            preview.set_hidden(!visible);
        }
        if let Some(button) = &self.preview_button {
            set_pressed(button, visible);
            button.set_text_content(Some(if visible { "Hide Preview" } else { "Show Preview" }));
        }
    }
}

fn reveal(element: Option<&HtmlElement>) {
    if let Some(element) = element {
        element.set_hidden(false);
        let _ = element.focus();
    }
}

fn conceal(element: Option<&HtmlElement>) {
    if let Some(element) = element {
        element.set_hidden(true);
    }
}
