use puzzleboard_core::{KeyValueStore, StoreError};
use web_sys::Storage;

use crate::dom::js_err;

/// Best times and preview counters in `localStorage`.
///
/// When the browser refuses storage every read misses and every write
/// fails with [`StoreError::Unavailable`]; the board keeps working.
pub(crate) struct LocalStore {
    storage: Option<Storage>,
}

impl LocalStore {
    pub(crate) fn open() -> Self {
        let storage = web_sys::window().and_then(|window| window.local_storage().ok().flatten());
        if storage.is_none() {
            gloo::console::warn!("localStorage unavailable; best times will not persist");
        }
        Self { storage }
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let Some(storage) = self.storage.as_ref() else {
            return Err(StoreError::Unavailable);
        };
        storage.set_item(key, value).map_err(|err| StoreError::Write {
            key: key.to_string(),
            reason: js_err(&err),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use puzzleboard_core::store::{read_best, record_best};
    use puzzleboard_core::Difficulty;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn best_time_round_trips_through_local_storage() {
        let mut store = LocalStore::open();
        let puzzle = "wasm-test-puzzle";
        if let Some(storage) = store.storage.as_ref() {
            let _ = storage.remove_item(&puzzleboard_core::store::best_time_key(puzzle, Difficulty::Hard));
        }
        assert_eq!(read_best(&store, puzzle, Difficulty::Hard), None);
        assert_eq!(record_best(&mut store, puzzle, Difficulty::Hard, 83_400.0), Ok(true));
        assert_eq!(record_best(&mut store, puzzle, Difficulty::Hard, 90_000.0), Ok(false));
        assert_eq!(LocalStore::open().get("best:wasm-test-puzzle:hard").as_deref(), Some("83400"));
    }
}
