use gloo::timers::future::TimeoutFuture;
use puzzleboard_core::rules::READY_TIMEOUT_MS;
use puzzleboard_core::{PuzzleCatalog, PuzzleError, WidgetConfig};

use crate::app_core::AppCore;
use crate::dom::{inline_text, now_ms};

pub(crate) const CONFIG_SCRIPT_ID: &str = "config-json";
pub(crate) const CATALOG_SCRIPT_ID: &str = "puzzles-json";
const READY_POLL_MS: u32 = 16;

/// What the host page hands the widget through inline JSON.
pub(crate) struct BootConfig {
    pub(crate) widget: WidgetConfig,
    pub(crate) catalog: PuzzleCatalog,
    pub(crate) start_index: usize,
}

pub(crate) fn read_boot_config() -> BootConfig {
    let widget = WidgetConfig::from_json_or_default(inline_text(CONFIG_SCRIPT_ID).as_deref());
    let catalog = PuzzleCatalog::from_json_or_default(inline_text(CATALOG_SCRIPT_ID).as_deref());
    let start_index = catalog.week_index(js_sys::Date::now());
    gloo::console::log!("puzzle catalog", catalog.len() as u32, "featured", start_index as u32);
    BootConfig {
        widget,
        catalog,
        start_index,
    }
}

/// Polls until the board has pieces and a decoded image, giving up after
/// [`READY_TIMEOUT_MS`].
pub(crate) async fn wait_for_puzzle_ready(core: &AppCore) -> Result<(), PuzzleError> {
    let started = now_ms();
    loop {
        if core.is_ready() {
            return Ok(());
        }
        let waited = now_ms() - started;
        if waited > f64::from(READY_TIMEOUT_MS) {
            return Err(PuzzleError::ReadyTimeout {
                waited_ms: waited as u32,
            });
        }
        TimeoutFuture::new(READY_POLL_MS).await;
    }
}
