//! Authentication middleware for Gatehouse
//!
//! Extracts a credential from the request, verifies it with the identity
//! provider (ID token first, session cookie second), and exposes the
//! resulting principal through axum extractors.

mod backend;
mod config;
mod context;
pub mod cookies;
mod credential;
mod error;
mod extractors;
mod middleware;
mod principal;

pub use backend::{AuthBackend, VerificationFailure, VerifiedCredential};
pub use config::AuthConfig;
pub use context::AuthContext;
pub use cookies::{clear_session_cookie, session_cookie, SESSION_COOKIE_NAME};
pub use credential::{cookie_value, extract_credential, Credential, CredentialSource};
pub use error::AuthError;
pub use extractors::{AuthUser, MaybeAuthUser};
pub use middleware::{optional_auth, require_auth};
pub use principal::{CredentialKind, Principal};
