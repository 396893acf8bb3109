pub mod bounds;
pub mod math;
pub mod observers;
pub mod time;

// Foundation crate: small, well-tested primitives only.
pub use bounds::*;
pub use observers::*;
pub use time::*;
