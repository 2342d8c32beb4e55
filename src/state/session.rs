//! Auth-session state for the current storefront user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Read by the header (greeting, login/logout links), the cart sync (which
//! user's cart to load), and the gateway (which bearer token to send).
//!
//! INVARIANTS
//! ==========
//! - `is_logged_in == access_token.is_some()`
//! - `current_user.is_some() == is_logged_in`
//! - `access_token` mirrors `current_user.token`
//!
//! The reducer is pure; durable storage side effects live in
//! [`persist_session`] / [`forget_session`] and are driven by the store.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use crate::net::types::User;
use crate::storage::{ACCESS_TOKEN_KEY, CURRENT_USER_KEY, DurableStorage, StorageError, load_json, save_json};

/// Which request an auth attempt sends. Both share one state contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthAttemptKind {
    Login,
    Register,
}

impl std::fmt::Display for AuthAttemptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Login => f.write_str("login"),
            Self::Register => f.write_str("register"),
        }
    }
}

/// Authentication state tracking the current user and in-flight status.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    pub is_logged_in: bool,
    pub is_authenticating: bool,
    pub current_user: Option<User>,
    pub access_token: Option<String>,
    /// Message of the last failed attempt; cleared when a new attempt starts.
    pub last_error: Option<String>,
}

/// State transitions of the session slice.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionAction {
    AttemptPending { kind: AuthAttemptKind },
    AttemptFulfilled { kind: AuthAttemptKind, user: User },
    AttemptRejected { kind: AuthAttemptKind, error: String },
    LoggedOut,
}

impl SessionState {
    /// Restore a session from durable storage.
    ///
    /// A session is restored only when both a non-empty token and a decodable
    /// user record are present; anything less starts logged out. Storage read
    /// failures are logged and treated as an empty area.
    pub fn from_storage(storage: &dyn DurableStorage) -> Self {
        let token = storage
            .get_item(ACCESS_TOKEN_KEY)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to read stored access token");
                None
            })
            .filter(|token| !token.is_empty());
        let user = load_json::<User>(storage, CURRENT_USER_KEY).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to read stored user");
            None
        });

        match (token, user) {
            (Some(token), Some(user)) => {
                tracing::debug!(user_id = %user.id, "restored session from storage");
                Self {
                    is_logged_in: true,
                    is_authenticating: false,
                    current_user: Some(user),
                    access_token: Some(token),
                    last_error: None,
                }
            }
            (Some(_), None) => {
                tracing::warn!("stored access token has no user record; starting logged out");
                Self::default()
            }
            _ => Self::default(),
        }
    }

    /// Apply one transition.
    pub fn apply(&mut self, action: SessionAction) {
        match action {
            SessionAction::AttemptPending { .. } => {
                self.is_authenticating = true;
                self.last_error = None;
            }
            SessionAction::AttemptFulfilled { user, .. } => {
                self.is_authenticating = false;
                self.is_logged_in = true;
                self.access_token = Some(user.token.clone());
                self.current_user = Some(user);
                self.last_error = None;
            }
            SessionAction::AttemptRejected { error, .. } => {
                self.is_authenticating = false;
                self.is_logged_in = false;
                self.current_user = None;
                self.access_token = None;
                self.last_error = Some(error);
            }
            SessionAction::LoggedOut => *self = Self::default(),
        }
    }

    /// Id of the logged-in user, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.current_user.as_ref().map(|u| u.id.as_str())
    }
}

/// Write the token and user record under their fixed keys.
///
/// # Errors
///
/// Returns a [`StorageError`] if either write fails.
pub fn persist_session(storage: &dyn DurableStorage, user: &User) -> Result<(), StorageError> {
    storage.set_item(ACCESS_TOKEN_KEY, &user.token)?;
    save_json(storage, CURRENT_USER_KEY, user)
}

/// Remove only the session keys, leaving the rest of the area alone.
///
/// # Errors
///
/// Returns a [`StorageError`] if either removal fails.
pub fn forget_session(storage: &dyn DurableStorage) -> Result<(), StorageError> {
    storage.remove_item(ACCESS_TOKEN_KEY)?;
    storage.remove_item(CURRENT_USER_KEY)
}
