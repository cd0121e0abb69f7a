//! Session lifetime policy

use std::time::Duration;

/// Lifetime granted when the caller does not ask to be remembered
pub const ONE_DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Lifetime for a new session.
///
/// Remembered sessions get the configured maximum; all others are capped
/// at one day and never exceed the maximum.
pub fn resolve_session_duration(remember: bool, max_age: Duration) -> Duration {
    if remember {
        max_age
    } else {
        max_age.min(ONE_DAY)
    }
}
