use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use gloo::events::EventListener;
use gloo::render::{request_animation_frame, AnimationFrame};
use gloo::timers::callback::Timeout;
use puzzleboard_core::store::{PREVIEW_AUTO_HIDE_MS, PREVIEW_VISIBLE_KEY};
use puzzleboard_core::timer::{format_best, format_clock};
use puzzleboard_core::{AlignmentRules, CanvasSize, Difficulty, KeyValueStore, PuzzleController, PuzzleEvent};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{EventTarget, KeyboardEvent};

use crate::app_core::{AppCore, AppSubscription};
use crate::boot::{read_boot_config, wait_for_puzzle_ready};
use crate::canvas_view::{BoardCanvas, Surface};
use crate::confetti_view::ConfettiView;
use crate::dom::{by_id, now_ms};
use crate::hud::{Hud, PREVIEW_LIMIT_MESSAGE};
use crate::input::attach_pointer_listeners;
use crate::puzzle_image::load_image;
use crate::storage::LocalStore;

const BOARD_CANVAS_ID: &str = "puzzle";
const CONFETTI_CANVAS_ID: &str = "confetti";

thread_local! {
    static RUNTIME: RefCell<Option<Runtime>> = RefCell::new(None);
}

/// Keeps the widget and everything bound to the page alive.
struct Runtime {
    _widget: Rc<Widget>,
    _subscription: AppSubscription,
    _listeners: Vec<EventListener>,
}

pub(crate) fn start() {
    let widget = match Widget::mount() {
        Ok(widget) => widget,
        Err(err) => {
            gloo::console::error!("puzzle widget not mounted", err);
            return;
        }
    };
    let weak = Rc::downgrade(&widget);
    let subscription = widget.core.subscribe(Rc::new(move |event: &PuzzleEvent| {
        if let Some(widget) = weak.upgrade() {
            widget.on_event(event);
        }
    }));
    let listeners = widget.bind_controls();
    widget.hud.open_promo();
    let first = widget.core.controller().current_index();
    widget.spawn_load(first);
    RUNTIME.with(|slot| {
        *slot.borrow_mut() = Some(Runtime {
            _widget: widget,
            _subscription: subscription,
            _listeners: listeners,
        });
    });
}

struct Widget {
    core: Rc<AppCore>,
    board: BoardCanvas,
    confetti: ConfettiView,
    hud: Hud,
    pending_index: Cell<usize>,
    clock_frame: RefCell<Option<AnimationFrame>>,
    preview_timer: RefCell<Option<Timeout>>,
}

impl Widget {
    fn mount() -> Result<Rc<Self>, String> {
        let board = BoardCanvas::new(Surface::from_id(BOARD_CANVAS_ID)?);
        let confetti = ConfettiView::new(Surface::from_id(CONFETTI_CANVAS_ID)?);
        let boot = read_boot_config();
        let mut controller = PuzzleController::new(LocalStore::open(), boot.catalog, AlignmentRules::default());
        controller.select_puzzle(boot.start_index);
        let hud = Hud::find();
        hud.show_year();
        hud.set_cta(&boot.widget.cta_url);
        hud.mark_difficulty(controller.difficulty());
        hud.set_preview_visible(false);
        hud.set_clock(&format_clock(0.0));
        hud.set_best(&controller.best_label());
        Ok(Rc::new(Self {
            core: AppCore::new(controller, boot.widget),
            board,
            confetti,
            hud,
            pending_index: Cell::new(boot.start_index),
            clock_frame: RefCell::new(None),
            preview_timer: RefCell::new(None),
        }))
    }

    fn on_event(self: &Rc<Self>, event: &PuzzleEvent) {
        match event {
            PuzzleEvent::Redraw => self.redraw(),
            PuzzleEvent::Progress(percent) => self.hud.set_progress(*percent),
            PuzzleEvent::TimerStarted => self.run_clock(),
            PuzzleEvent::CapturePointer(pointer) => self.board.capture_pointer(*pointer),
            PuzzleEvent::ReleasePointer(pointer) => self.board.release_pointer(*pointer),
            PuzzleEvent::Completed(report) => {
                self.stop_clock();
                self.hud.set_clock(&format_clock(report.elapsed_ms));
                self.hud.set_best(&format_best(report.best_ms));
                self.confetti.launch(nonce());
                self.hud.open_modal();
                gloo::console::log!(
                    "puzzle completed",
                    report.puzzle_id.clone(),
                    format_clock(report.elapsed_ms),
                    report.new_best
                );
            }
        }
    }

    fn redraw(&self) {
        let image = self.core.image();
        self.board.draw(&self.core.controller(), image.as_ref());
    }

    fn run_clock(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let frame = request_animation_frame(move |_timestamp| {
            if let Some(widget) = weak.upgrade() {
                widget.tick_clock();
            }
        });
        *self.clock_frame.borrow_mut() = Some(frame);
    }

    fn tick_clock(self: &Rc<Self>) {
        let (running, text) = {
            let controller = self.core.controller();
            let running = controller
                .session()
                .is_some_and(|session| session.timer().is_running());
            (running, controller.clock_text(now_ms()))
        };
        if !running {
            self.stop_clock();
            return;
        }
        self.hud.set_clock(&text);
        self.run_clock();
    }

    fn stop_clock(&self) {
        self.clock_frame.borrow_mut().take();
    }

    /// Clears whatever the previous round left on screen.
    fn reset_round_chrome(&self) {
        self.stop_clock();
        self.confetti.cancel();
        self.hud.close_modal();
        self.hud.set_clock(&format_clock(0.0));
        self.hud.set_best(&self.core.controller().best_label());
    }

    fn fit_surfaces(&self) -> CanvasSize {
        let size = self.board.measure_wrapper();
        self.board.surface().set_size(size);
        self.confetti.surface().set_size(size);
        size
    }

    fn spawn_load(self: &Rc<Self>, index: usize) {
        self.pending_index.set(index);
        let widget = Rc::clone(self);
        spawn_local(async move { widget.load_puzzle(index).await });
    }

    /// Loads the catalog entry's image, then installs a fresh round for it.
    /// A failed or superseded load leaves the current round untouched.
    async fn load_puzzle(self: Rc<Self>, index: usize) {
        let ticket = self.core.begin_load();
        let (title, src) = {
            let controller = self.core.controller();
            let puzzle = controller.catalog().wrapped(index);
            (puzzle.title.clone(), puzzle.optimized_image_url())
        };
        let image = match load_image(&src).await {
            Ok(image) => image,
            Err(err) => {
                gloo::console::warn!("puzzle image not loaded", err.to_string());
                return;
            }
        };
        if !self.core.is_current_load(ticket) {
            return;
        }
        self.hud.set_title(&title);
        self.hud.set_preview_source(&src);
        self.set_preview(false);
        let size = self.fit_surfaces();
        self.core.set_image(image);
        let seed = nonce();
        self.core.apply(|controller| {
            controller.select_puzzle(index);
            controller.install_puzzle(size, seed)
        });
        self.reset_round_chrome();
    }

    fn select_difficulty(&self, difficulty: Difficulty) {
        self.hud.mark_difficulty(difficulty);
        let seed = nonce();
        self.core
            .apply(|controller| controller.select_difficulty(difficulty, seed));
        self.reset_round_chrome();
    }

    fn shuffle(&self) {
        let was_completed = self.core.controller().is_completed();
        let seed = nonce();
        self.core.apply(|controller| controller.shuffle(seed));
        if was_completed {
            self.reset_round_chrome();
        }
    }

    fn resize(&self) {
        let size = self.fit_surfaces();
        self.core.apply(|controller| controller.resize(size));
    }

    fn step_catalog(self: &Rc<Self>, forward: bool) {
        let index = {
            let controller = self.core.controller();
            let catalog = controller.catalog();
            let from = self.pending_index.get();
            if forward {
                catalog.next_index(from)
            } else {
                catalog.prev_index(from)
            }
        };
        self.spawn_load(index);
    }

    fn set_preview(&self, visible: bool) {
        self.hud.set_preview_visible(visible);
        let flag = if visible { "1" } else { "0" };
        let saved = self
            .core
            .with_controller_mut(|controller| controller.store_mut().set(PREVIEW_VISIBLE_KEY, flag));
        if let Err(err) = saved {
            gloo::console::warn!("preview state not saved", err.to_string());
        }
    }

    fn toggle_preview(self: &Rc<Self>) {
        if self.hud.preview_visible() {
            self.preview_timer.borrow_mut().take();
            self.set_preview(false);
            return;
        }
        match self.core.with_controller_mut(|controller| controller.request_preview()) {
            Ok(false) => {
                gloo::dialogs::alert(PREVIEW_LIMIT_MESSAGE);
                return;
            }
            Ok(true) => {}
            Err(err) => gloo::console::warn!("preview count not saved", err.to_string()),
        }
        self.set_preview(true);
        let weak = Rc::downgrade(self);
        let hide = Timeout::new(PREVIEW_AUTO_HIDE_MS, move || {
            if let Some(widget) = weak.upgrade() {
                widget.set_preview(false);
            }
        });
        *self.preview_timer.borrow_mut() = Some(hide);
    }

    /// Demo path behind the simulate buttons: switch preset, wait for the
    /// board, then win without touching the best time.
    fn simulate_win(self: &Rc<Self>, difficulty: Difficulty) {
        self.select_difficulty(difficulty);
        let widget = Rc::clone(self);
        spawn_local(async move {
            if let Err(err) = wait_for_puzzle_ready(&widget.core).await {
                gloo::console::warn!("simulated win skipped", err.to_string());
                return;
            }
            widget.force_win();
        });
    }

    fn force_win(&self) {
        let outcome = self.core.with_controller_mut(|controller| {
            let now = now_ms();
            let report = match controller.force_win(false, now)? {
                Some(report) => Some(report),
                None => controller.completed_report(now),
            };
            Ok::<_, puzzleboard_core::PuzzleError>((report, controller.progress()))
        });
        match outcome {
            Ok((Some(report), progress)) => self.core.emit(&[
                PuzzleEvent::Progress(progress),
                PuzzleEvent::Redraw,
                PuzzleEvent::Completed(report),
            ]),
            Ok((None, _)) => {}
            Err(err) => gloo::console::warn!("force win failed", err.to_string()),
        }
    }

    fn bind_controls(self: &Rc<Self>) -> Vec<EventListener> {
        let mut listeners = Vec::new();

        let weak = Rc::downgrade(self);
        let board: &EventTarget = self.board.surface().canvas();
        listeners.extend(attach_pointer_listeners(
            board,
            Rc::new(move |input| {
                let Some(widget) = weak.upgrade() else {
                    return;
                };
                let rect = widget.board.client_rect();
                widget
                    .core
                    .apply(|controller| controller.handle_pointer(input, rect, now_ms()));
            }),
        ));

        let clicks: [(&str, fn(&Rc<Widget>)); 10] = [
            ("btn-new", |w| w.spawn_load(w.pending_index.get())),
            ("btn-shuffle", |w| w.shuffle()),
            ("btn-prev", |w| w.step_catalog(false)),
            ("btn-next", |w| w.step_catalog(true)),
            ("btn-preview", |w| w.toggle_preview()),
            ("btn-close", |w| w.hud.close_modal()),
            ("promo-go-hard", |w| {
                w.hud.close_promo();
                w.select_difficulty(Difficulty::Hard);
            }),
            ("promo-stay-easy", |w| w.hud.close_promo()),
            ("simulate-easy", |w| w.simulate_win(Difficulty::Easy)),
            ("simulate-hard", |w| w.simulate_win(Difficulty::Hard)),
        ];
        for (id, action) in clicks {
            let Some(target) = by_id::<EventTarget>(id) else {
                continue;
            };
            listeners.push(on_widget(&target, "click", self, move |widget, _event| action(widget)));
        }

        for (button, level) in self.hud.difficulty_buttons() {
            let level = *level;
            listeners.push(on_widget(button, "click", self, move |widget, _event| {
                widget.select_difficulty(level);
            }));
        }

        // backdrop clicks land on the overlay element itself
        if let Some(modal) = self.hud.modal() {
            let backdrop = modal.clone();
            listeners.push(on_widget(modal, "click", self, move |widget, event| {
                if is_target(event, &backdrop) {
                    widget.hud.close_modal();
                }
            }));
        }
        if let Some(promo) = self.hud.promo() {
            let backdrop = promo.clone();
            listeners.push(on_widget(promo, "click", self, move |widget, event| {
                if is_target(event, &backdrop) {
                    widget.hud.close_promo();
                }
            }));
        }

        if let Some(window) = web_sys::window() {
            listeners.push(on_widget(&window, "keydown", self, |widget, event| {
                let escape = event
                    .dyn_ref::<KeyboardEvent>()
                    .is_some_and(|key| key.key() == "Escape");
                if escape {
                    widget.hud.dismiss_overlays();
                }
            }));
            listeners.push(on_widget(&window, "resize", self, |widget, _event| widget.resize()));
        }

        listeners
    }
}

/// Listener that only holds a weak handle, so the page never keeps a
/// torn-down widget alive.
fn on_widget<F>(target: &EventTarget, event_type: &'static str, widget: &Rc<Widget>, handler: F) -> EventListener
where
    F: Fn(&Rc<Widget>, &web_sys::Event) + 'static,
{
    let weak: Weak<Widget> = Rc::downgrade(widget);
    EventListener::new(target, event_type, move |event| {
        if let Some(widget) = weak.upgrade() {
            handler(&widget, event);
        }
    })
}

fn is_target(event: &web_sys::Event, element: &web_sys::HtmlElement) -> bool {
    let element: &EventTarget = element.as_ref();
    event.target().is_some_and(|target| &target == element)
}

fn nonce() -> u32 {
    (js_sys::Math::random() * f64::from(u32::MAX)) as u32
}
