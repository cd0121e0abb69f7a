//! API layer for the Greetings domain

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::GreetingsState;
pub use routes::routes;
