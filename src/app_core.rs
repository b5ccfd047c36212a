use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use puzzleboard_core::{PuzzleController, PuzzleEvent, WidgetConfig};
use web_sys::HtmlImageElement;

use crate::storage::LocalStore;

pub(crate) type BoardController = PuzzleController<LocalStore>;
pub(crate) type AppSubscriber = Rc<dyn Fn(&PuzzleEvent)>;

/// Shared state of the widget: the controller, the decoded image of the
/// current puzzle and the listeners that react to board events.
pub(crate) struct AppCore {
    controller: RefCell<BoardController>,
    image: RefCell<Option<HtmlImageElement>>,
    config: WidgetConfig,
    load_generation: Cell<u32>,
    subscribers: Rc<RefCell<Vec<AppSubscriber>>>,
}

impl AppCore {
    pub(crate) fn new(controller: BoardController, config: WidgetConfig) -> Rc<Self> {
        Rc::new(Self {
            controller: RefCell::new(controller),
            image: RefCell::new(None),
            config,
            load_generation: Cell::new(0),
            subscribers: Rc::new(RefCell::new(Vec::new())),
        })
    }

    pub(crate) fn subscribe(&self, subscriber: AppSubscriber) -> AppSubscription {
        self.subscribers.borrow_mut().push(subscriber.clone());
        AppSubscription {
            subscriber,
            subscribers: Rc::clone(&self.subscribers),
        }
    }

    pub(crate) fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub(crate) fn controller(&self) -> Ref<'_, BoardController> {
        self.controller.borrow()
    }

    /// Runs `action` on the controller and fans the events it produced out
    /// to subscribers after the borrow is released.
    pub(crate) fn apply<F>(&self, action: F)
    where
        F: FnOnce(&mut BoardController) -> Vec<PuzzleEvent>,
    {
        let events = action(&mut self.controller.borrow_mut());
        self.emit(&events);
    }

    pub(crate) fn with_controller_mut<R>(&self, action: impl FnOnce(&mut BoardController) -> R) -> R {
        action(&mut self.controller.borrow_mut())
    }

    pub(crate) fn emit(&self, events: &[PuzzleEvent]) {
        let subscribers = self.subscribers.borrow().clone();
        for event in events {
            for subscriber in &subscribers {
                (subscriber)(event);
            }
        }
    }

    pub(crate) fn image(&self) -> Option<HtmlImageElement> {
        self.image.borrow().clone()
    }

    pub(crate) fn set_image(&self, image: HtmlImageElement) {
        *self.image.borrow_mut() = Some(image);
    }

    /// Ready means the controller has pieces and their image is decoded.
    pub(crate) fn is_ready(&self) -> bool {
        self.image.borrow().is_some() && self.controller.borrow().is_ready()
    }

    /// Starts a new image load and returns its ticket; a load whose ticket
    /// is no longer current must not install anything.
    pub(crate) fn begin_load(&self) -> u32 {
        let ticket = self.load_generation.get().wrapping_add(1);
        self.load_generation.set(ticket);
        ticket
    }

    pub(crate) fn is_current_load(&self, ticket: u32) -> bool {
        self.load_generation.get() == ticket
    }
}

pub(crate) struct AppSubscription {
    subscriber: AppSubscriber,
    subscribers: Rc<RefCell<Vec<AppSubscriber>>>,
}

impl Drop for AppSubscription {
    fn drop(&mut self) {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|item| !Rc::ptr_eq(item, &self.subscriber));
    }
}
