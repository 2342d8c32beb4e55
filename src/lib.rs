//! Storefront client core: session and cart state over a REST backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! A UI shell (the bundled CLI, or any other front end) builds one
//! [`state::AppStore`] with a [`net::gateway::RemoteGateway`] and a
//! [`storage::DurableStorage`], dispatches operations into it, and renders
//! from [`state::selectors`].

pub mod config;
pub mod error;
pub mod format;
pub mod net;
pub mod state;
pub mod storage;

pub use config::StorefrontConfig;
pub use error::ErrorCode;
pub use state::{AppStore, RootState, StoreError};
