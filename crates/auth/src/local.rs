use async_trait::async_trait;
use foundation::{Millis, Observers, Subscription};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::adapter::{AuthAdapter, AuthCallback, AuthError, Session};
use crate::password::verify_password;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub user: String,
    /// Argon2 PHC string.
    pub password_hash: String,
}

/// Single-administrator auth against a configured argon2 hash.
#[derive(Debug, Default)]
pub struct LocalAuth {
    admin: Option<AdminCredentials>,
    session: Mutex<Option<Session>>,
    observers: Observers<Option<Session>>,
}

impl LocalAuth {
    pub fn new(admin: Option<AdminCredentials>) -> Self {
        Self {
            admin,
            ..Self::default()
        }
    }

    pub fn is_configured(&self) -> bool {
        self.admin.is_some()
    }

    fn set_session(&self, session: Option<Session>) {
        *self.session.lock() = session.clone();
        self.observers.notify(&session);
    }
}

#[async_trait]
impl AuthAdapter for LocalAuth {
    async fn sign_in(&self, identifier: &str, secret: &str) -> Result<Session, AuthError> {
        let admin = self.admin.as_ref().ok_or(AuthError::NotConfigured)?;
        let password_ok = verify_password(secret, &admin.password_hash)?;
        if identifier != admin.user || !password_ok {
            warn!(user = identifier, "sign-in rejected");
            return Err(AuthError::InvalidCredentials);
        }
        let session = Session {
            user: admin.user.clone(),
            signed_in_at: Millis::now(),
        };
        info!(user = %session.user, "administrator signed in");
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let was = self.session.lock().take();
        if let Some(session) = was {
            info!(user = %session.user, "administrator signed out");
            self.observers.notify(&None);
        }
        Ok(())
    }

    fn on_auth_change(&self, callback: AuthCallback) -> Subscription {
        callback(&self.current());
        self.observers.subscribe(callback)
    }

    fn current(&self) -> Option<Session> {
        self.session.lock().clone()
    }
}
