//! Sessions domain: exchange ID tokens for session cookies, inspect the
//! current principal, revoke sessions

pub mod api;
pub mod domain;

pub use domain::lifetime::{resolve_session_duration, ONE_DAY};

// Re-export API types
pub use api::routes;
pub use api::SessionsState;
