//! Composition root for the tour: configuration, backend wiring and the
//! authenticated editing session.

pub mod config;
pub mod session;

pub use config::{Backend, ConfigError, TourConfig, build_adapter, build_auth};
pub use session::{SessionError, TourSession};
