//! The Tour Data Store: one authoritative `TourData` snapshot per session.

pub mod error;
pub mod events;
pub mod ops;
#[cfg(not(target_arch = "wasm32"))]
mod save_queue;
pub mod store;

pub use error::StoreError;
pub use events::{LoadSource, ResetOutcome, SceneImage, StoreEvent};
pub use store::TourStore;
