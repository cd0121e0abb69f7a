//! Sessions domain layer

pub mod lifetime;
