//! API endpoint integration tests
//!
//! Drives the fully composed router against the in-memory identity
//! provider: credential extraction, session lifecycle, greetings, and
//! infrastructure routes.

#![allow(dead_code)]

mod auth;
mod common;
mod greetings;
mod health;
mod sessions;
