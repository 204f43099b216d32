//! Weave Application
//!
//! Host shell wiring the Weave board to the platform's storage, with a
//! `wasm-bindgen` surface for browser renderers.

mod app;
mod shortcuts;

pub use app::{App, AppConfig, AppError, BoardSummary};
pub use shortcuts::{Shortcut, ShortcutRegistry};

#[cfg(not(target_arch = "wasm32"))]
pub use app::CONFIG_FILE;

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{WeaveBoard, open_board};
