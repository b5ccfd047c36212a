use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::grid::Difficulty;

pub const PREVIEW_MAX_VIEWS: u32 = 2;
pub const PREVIEW_AUTO_HIDE_MS: u32 = 10_000;
pub const PREVIEW_VISIBLE_KEY: &str = "preview:visible";

/// Synchronous string store; a missing key means "no record yet".
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

pub fn best_time_key(puzzle_id: &str, difficulty: Difficulty) -> String {
    format!("best:{puzzle_id}:{difficulty}")
}

pub fn preview_views_key(puzzle_id: &str) -> String {
    format!("preview:views:{puzzle_id}")
}

fn read_number(store: &impl KeyValueStore, key: &str) -> f64 {
    store
        .get(key)
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Stored best in milliseconds; zero, garbage or absence read as `None`.
pub fn read_best(store: &impl KeyValueStore, puzzle_id: &str, difficulty: Difficulty) -> Option<f64> {
    let value = read_number(store, &best_time_key(puzzle_id, difficulty));
    (value > 0.0).then_some(value)
}

/// Whole milliseconds as written to the store, never below 1 so the record
/// cannot read back as "no best".
fn stored_best_ms(elapsed_ms: f64) -> u64 {
    (elapsed_ms.max(0.0).round() as u64).max(1)
}

/// Writes `elapsed_ms` when no best exists or its stored form is strictly
/// faster than the current record.
///
/// Returns whether a write happened.
pub fn record_best(
    store: &mut impl KeyValueStore,
    puzzle_id: &str,
    difficulty: Difficulty,
    elapsed_ms: f64,
) -> Result<bool, StoreError> {
    let candidate = stored_best_ms(elapsed_ms);
    let improved = match read_best(&*store, puzzle_id, difficulty) {
        None => true,
        Some(best) => (candidate as f64) < best,
    };
    if !improved {
        return Ok(false);
    }
    let key = best_time_key(puzzle_id, difficulty);
    store.set(&key, &candidate.to_string())?;
    Ok(true)
}

pub fn preview_views(store: &impl KeyValueStore, puzzle_id: &str) -> u32 {
    read_number(store, &preview_views_key(puzzle_id)).max(0.0) as u32
}

pub fn can_show_preview(store: &impl KeyValueStore, puzzle_id: &str) -> bool {
    preview_views(store, puzzle_id) < PREVIEW_MAX_VIEWS
}

/// Consumes one preview view; `Ok(false)` when the allowance is used up.
pub fn consume_preview_view(store: &mut impl KeyValueStore, puzzle_id: &str) -> Result<bool, StoreError> {
    let views = preview_views(&*store, puzzle_id);
    if views >= PREVIEW_MAX_VIEWS {
        return Ok(false);
    }
    store.set(&preview_views_key(puzzle_id), &(views + 1).to_string())?;
    Ok(true)
}
