pub mod cover_fit;

pub use cover_fit::*;
