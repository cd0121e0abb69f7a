//! Shared configuration and error handling for Gatehouse
//!
//! This crate provides common functionality used across the application:
//! - Configuration management following 12-factor principles
//! - The HTTP-facing error type

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};
