//! Browser front end of the puzzle board. Everything here targets
//! `wasm32`; the board logic itself lives in `puzzleboard_core`.

#[cfg(target_arch = "wasm32")]
mod app_core;
#[cfg(target_arch = "wasm32")]
mod boot;
#[cfg(target_arch = "wasm32")]
mod canvas_view;
#[cfg(target_arch = "wasm32")]
mod confetti_view;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod hud;
#[cfg(target_arch = "wasm32")]
mod input;
#[cfg(target_arch = "wasm32")]
mod puzzle_image;
#[cfg(target_arch = "wasm32")]
mod runtime;
#[cfg(target_arch = "wasm32")]
mod storage;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    runtime::start();
}
