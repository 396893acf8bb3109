//! Administrator authentication.

pub mod adapter;
pub mod local;
pub mod password;

pub use adapter::{AuthAdapter, AuthCallback, AuthError, Session};
pub use local::{AdminCredentials, LocalAuth};
pub use password::{hash_password, verify_password};
