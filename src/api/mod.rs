//! Authenticated transport dispatcher and response classification.
//!
//! This module owns the low-level conversation with the remote API:
//! building authenticated requests, normalizing replies into
//! [`TransportReply`], and classifying them against the service's
//! `{result, item, items, errorMessage, error}` envelope convention.
//!
//! # Architecture
//!
//! - [`ApiClient`] - Transport dispatcher; attaches the bearer credential
//!   and fixed client identifier, never follows redirects on
//!   authenticated calls
//! - [`classify`] - Response decoder separating transport success from
//!   semantic success
//! - [`ApiError`] - Classified failure taxonomy

mod client;
mod envelope;
mod error;

pub use client::{ApiClient, RequestDescriptor, SignedFetch};
pub(crate) use client::redacted_url;
pub use envelope::{Envelope, ReplyBody, TransportReply, classify, extract_error_message, parse_envelope};
pub use error::ApiError;
