//! Greetings domain: hello endpoints for anonymous and signed-in callers

pub mod api;

pub use api::routes;
pub use api::GreetingsState;
