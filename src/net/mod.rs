//! Networking: wire types, the remote gateway seam, and typed endpoint helpers.

pub mod api;
pub mod gateway;
pub mod types;

// =============================================================================
// TEST HELPERS
// =============================================================================
