//! Client state container: session + cart slices behind one injected store.
//!
//! ARCHITECTURE
//! ============
//! `AppStore` owns the [`RootState`] and the two capabilities the slices need
//! (gateway, durable storage). A UI shell constructs one at startup and
//! passes it by reference; there is no ambient global.
//!
//! Every async operation is split into a begin step (pending transition,
//! returns a ticket) and a settle step (fulfilled/rejected transition for that
//! ticket). The async convenience methods run both around one gateway call;
//! callers that overlap requests drive the two steps themselves.
//!
//! ERROR HANDLING
//! ==============
//! Rejections are reflected in state (`last_error`) and also returned as a
//! typed [`StoreError`], so a caller can log and continue without losing
//! the reason.

pub mod cart;
pub mod selectors;
pub mod session;


use std::sync::Arc;

use crate::error::ErrorCode;
use crate::net::api;
use crate::net::gateway::{GatewayError, RemoteGateway};
use crate::net::types::{Credentials, LineItem, RegisterDetails, User};
use crate::storage::{DurableStorage, StorageError};
use cart::{CartAction, CartState};
use session::{AuthAttemptKind, SessionAction, SessionState, forget_session, persist_session};

/// Errors surfaced by store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A login/register attempt is already pending.
    #[error("an auth attempt is already in flight")]
    AttemptInFlight,

    /// The settled request is no longer the latest one; its result was discarded.
    #[error("request {seq} was superseded by a newer request")]
    Superseded { seq: u64 },
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Gateway(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::AttemptInFlight => "E_ATTEMPT_IN_FLIGHT",
            Self::Superseded { .. } => "E_SUPERSEDED",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Gateway(e) => e.retryable(),
            Self::AttemptInFlight => true,
            Self::Storage(_) | Self::Superseded { .. } => false,
        }
    }
}

/// Combined state of both slices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RootState {
    pub session: SessionState,
    pub cart: CartState,
}

/// Handle for one pending login/register attempt.
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct AuthTicket {
    seq: u64,
    kind: AuthAttemptKind,
}

impl AuthTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn kind(&self) -> AuthAttemptKind {
        self.kind
    }
}

/// Handle for one pending cart fetch.
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct CartTicket {
    seq: u64,
    user_id: Option<String>,
}

impl CartTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

/// The storefront's client-side state container.
pub struct AppStore {
    state: RootState,
    gateway: Arc<dyn RemoteGateway>,
    storage: Arc<dyn DurableStorage>,
    auth_seq: u64,
    auth_in_flight: Option<u64>,
}

impl AppStore {
    /// Build a store and restore any persisted session.
    pub fn new(gateway: Arc<dyn RemoteGateway>, storage: Arc<dyn DurableStorage>) -> Self {
        let mut store = Self { state: RootState::default(), gateway, storage, auth_seq: 0, auth_in_flight: None };
        store.initialize_from_storage();
        store
    }

    /// Re-read the session from durable storage, replacing the session slice.
    ///
    /// Leaves `last_error` unset and `is_authenticating` false, and hands the
    /// restored token (or none) to the gateway.
    pub fn initialize_from_storage(&mut self) {
        self.state.session = SessionState::from_storage(self.storage.as_ref());
        self.auth_in_flight = None;
        self.gateway.set_access_token(self.state.session.access_token.clone());
        tracing::info!(logged_in = self.state.session.is_logged_in, "session initialized from storage");
    }

    #[must_use]
    pub fn state(&self) -> &RootState {
        &self.state
    }

    #[must_use]
    pub fn gateway(&self) -> &Arc<dyn RemoteGateway> {
        &self.gateway
    }

    // =========================================================================
    // SESSION
    // =========================================================================

    /// Enter the pending state for a new auth attempt.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AttemptInFlight`] if another attempt is pending.
    pub fn begin_auth_attempt(&mut self, kind: AuthAttemptKind) -> Result<AuthTicket, StoreError> {
        if self.auth_in_flight.is_some() {
            return Err(StoreError::AttemptInFlight);
        }
        self.auth_seq += 1;
        self.auth_in_flight = Some(self.auth_seq);
        self.state.session.apply(SessionAction::AttemptPending { kind });
        tracing::debug!(%kind, seq = self.auth_seq, "auth attempt pending");
        Ok(AuthTicket { seq: self.auth_seq, kind })
    }

    /// Settle a pending auth attempt with the gateway outcome.
    ///
    /// On success the token and user are persisted and the gateway starts
    /// sending the token; a persistence failure is logged, not returned. On
    /// failure the session ends logged out with the error text in `last_error`
    /// and the cart is emptied.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Superseded`] if `ticket` is not the pending attempt
    /// (for example after a logout), or the gateway error on rejection.
    pub fn settle_auth_attempt(
        &mut self,
        ticket: AuthTicket,
        outcome: Result<User, GatewayError>,
    ) -> Result<User, StoreError> {
        if self.auth_in_flight != Some(ticket.seq) {
            tracing::debug!(seq = ticket.seq, "discarding superseded auth result");
            return Err(StoreError::Superseded { seq: ticket.seq });
        }
        self.auth_in_flight = None;
        let kind = ticket.kind;

        match outcome {
            Ok(user) => {
                if let Err(e) = persist_session(self.storage.as_ref(), &user) {
                    tracing::warn!(error = %e, "failed to persist session");
                }
                self.gateway.set_access_token(Some(user.token.clone()));
                self.state.session.apply(SessionAction::AttemptFulfilled { kind, user: user.clone() });
                tracing::info!(%kind, user_id = %user.id, "auth attempt fulfilled");
                Ok(user)
            }
            Err(e) => {
                if let Err(storage_err) = forget_session(self.storage.as_ref()) {
                    tracing::warn!(error = %storage_err, "failed to drop stored session");
                }
                self.gateway.set_access_token(None);
                self.state.session.apply(SessionAction::AttemptRejected { kind, error: e.to_string() });
                self.state.cart.apply(CartAction::Reset);
                tracing::warn!(%kind, error = %e, "auth attempt rejected");
                Err(e.into())
            }
        }
    }

    /// Log in with email/password.
    ///
    /// # Errors
    ///
    /// See [`AppStore::begin_auth_attempt`] and [`AppStore::settle_auth_attempt`].
    pub async fn login_attempt(&mut self, credentials: &Credentials) -> Result<User, StoreError> {
        let ticket = self.begin_auth_attempt(AuthAttemptKind::Login)?;
        let gateway = Arc::clone(&self.gateway);
        let outcome = api::login(gateway.as_ref(), credentials).await;
        self.settle_auth_attempt(ticket, outcome)
    }

    /// Register a new account; success logs the new user in.
    ///
    /// # Errors
    ///
    /// See [`AppStore::begin_auth_attempt`] and [`AppStore::settle_auth_attempt`].
    pub async fn register_attempt(&mut self, details: &RegisterDetails) -> Result<User, StoreError> {
        let ticket = self.begin_auth_attempt(AuthAttemptKind::Register)?;
        let gateway = Arc::clone(&self.gateway);
        let outcome = api::register(gateway.as_ref(), details).await;
        self.settle_auth_attempt(ticket, outcome)
    }

    /// Reset the session and cart, and wipe the entire durable storage area.
    ///
    /// The in-memory reset happens first and always completes; a pending auth
    /// attempt or cart fetch settled afterwards is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if clearing durable storage fails.
    pub fn logout(&mut self) -> Result<(), StoreError> {
        self.auth_in_flight = None;
        self.state.session.apply(SessionAction::LoggedOut);
        self.state.cart.apply(CartAction::Reset);
        self.gateway.set_access_token(None);
        tracing::info!("logged out");
        self.storage.clear()?;
        Ok(())
    }

    // =========================================================================
    // CART
    // =========================================================================

    /// Issue a cart fetch for `user_id` and enter the pending state.
    pub fn begin_cart_fetch(&mut self, user_id: Option<&str>) -> CartTicket {
        let seq = self.state.cart.next_seq();
        self.state.cart.apply(CartAction::FetchPending { seq });
        CartTicket { seq, user_id: user_id.map(str::to_owned) }
    }

    /// Settle a cart fetch. Only the most recently issued fetch is applied.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Superseded`] for a stale ticket (state untouched),
    /// or the gateway error on rejection (items untouched).
    pub fn settle_cart_fetch(
        &mut self,
        ticket: CartTicket,
        outcome: Result<Vec<LineItem>, GatewayError>,
    ) -> Result<&[LineItem], StoreError> {
        let CartTicket { seq, user_id } = ticket;
        match outcome {
            Ok(items) => {
                let count = items.len();
                if !self.state.cart.apply(CartAction::FetchFulfilled { seq, user_id, items }) {
                    tracing::debug!(seq, "discarding superseded cart response");
                    return Err(StoreError::Superseded { seq });
                }
                tracing::debug!(seq, count, "cart fetch fulfilled");
                Ok(&self.state.cart.items)
            }
            Err(e) => {
                if !self.state.cart.apply(CartAction::FetchRejected { seq, error: e.to_string() }) {
                    tracing::debug!(seq, "discarding superseded cart failure");
                    return Err(StoreError::Superseded { seq });
                }
                tracing::warn!(seq, error = %e, "cart fetch failed; keeping previous items");
                Err(e.into())
            }
        }
    }

    /// Load the cart for `user_id`. With no user the cart becomes empty
    /// without any request.
    ///
    /// # Errors
    ///
    /// See [`AppStore::settle_cart_fetch`].
    pub async fn fetch_cart_items(&mut self, user_id: Option<&str>) -> Result<&[LineItem], StoreError> {
        let ticket = self.begin_cart_fetch(user_id);
        let outcome = match user_id {
            Some(id) => {
                let gateway = Arc::clone(&self.gateway);
                api::fetch_cart(gateway.as_ref(), id).await
            }
            None => Ok(Vec::new()),
        };
        self.settle_cart_fetch(ticket, outcome)
    }

    /// Refetch the cart when the session's user differs from the cart's owner.
    ///
    /// Returns `Ok(false)` when the cart already belongs to the current user.
    ///
    /// # Errors
    ///
    /// See [`AppStore::fetch_cart_items`].
    pub async fn sync_cart(&mut self) -> Result<bool, StoreError> {
        let user_id = self.state.session.user_id().map(str::to_owned);
        if self.state.cart.owner == user_id {
            return Ok(false);
        }
        self.fetch_cart_items(user_id.as_deref()).await?;
        Ok(true)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use crate::net::types::{LineItem, User};

    #[must_use]
    pub fn user(id: &str, token: &str) -> User {
        User {
            id: id.to_owned(),
            name: "A".to_owned(),
            token: token.to_owned(),
            email: None,
            phone: None,
            profile: serde_json::Map::new(),
        }
    }

    #[must_use]
    pub fn line_item(id: &str, unit_price: f64, discount_percent: f64, quantity: u32) -> LineItem {
        LineItem {
            id: id.to_owned(),
            title: format!("Item {id}"),
            thumbnail: format!("{id}.png"),
            unit_price,
            discount_percent,
            quantity,
        }
    }
}
