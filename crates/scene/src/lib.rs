pub mod codec;
pub mod ids;
pub mod model;
pub mod seed;

pub use codec::CodecError;
pub use model::*;
pub use seed::default_tour;
