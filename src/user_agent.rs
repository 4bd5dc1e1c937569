//! Shared User-Agent string for all client HTTP traffic.
//!
//! Single source for the fixed client identifier header so API and
//! signed-content traffic stay consistent and easy to update.

/// Fixed client identifier sent as the User-Agent on every request.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("raindrop-client/{version}")
}
