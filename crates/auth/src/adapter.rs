use async_trait::async_trait;
use foundation::{Millis, Subscription};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: String,
    pub signed_in_at: Millis,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("no administrator account configured")]
    NotConfigured,
    #[error("authentication service unavailable")]
    Unavailable,
    #[error("stored password hash unusable: {0}")]
    Hash(String),
}

pub type AuthCallback = Box<dyn Fn(&Option<Session>) + Send + Sync>;

/// Administrator sign-in capability.
#[async_trait]
pub trait AuthAdapter: Send + Sync {
    async fn sign_in(&self, identifier: &str, secret: &str) -> Result<Session, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Registers `callback` for session changes.
    ///
    /// The callback is invoked once with the current state before this returns,
    /// then on every sign-in and sign-out until the subscription is released.
    fn on_auth_change(&self, callback: AuthCallback) -> Subscription;

    fn current(&self) -> Option<Session>;
}
