//! Greetings domain state and auth backend integration

use axum::extract::FromRef;
use gatehouse_auth::AuthBackend;

/// Application state for the Greetings domain
#[derive(Clone)]
pub struct GreetingsState {
    pub auth: AuthBackend,
}

impl GreetingsState {
    pub fn new(auth: AuthBackend) -> Self {
        Self { auth }
    }
}

impl FromRef<GreetingsState> for AuthBackend {
    fn from_ref(state: &GreetingsState) -> Self {
        state.auth.clone()
    }
}
