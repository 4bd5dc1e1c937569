//! Error types for API client operations.
//!
//! This module defines the classified failure taxonomy shared by the
//! transport dispatcher, the response decoder, and the permanent-copy
//! resolution layers. Every variant renders to a user-presentable message.

use thiserror::Error;

/// Errors that can occur while calling the remote API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    ///
    /// No HTTP status is attached; the request never completed.
    #[error("request to {url} failed: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("request to {url} timed out")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (status outside 200..300).
    #[error("HTTP {status} from {endpoint}: {message}")]
    HttpStatus {
        /// The endpoint that returned an error status.
        endpoint: String,
        /// The HTTP status code.
        status: u16,
        /// Message extracted from the payload, or a synthesized status line.
        message: String,
        /// Raw response payload, retained for diagnostics.
        payload: Option<serde_json::Value>,
    },

    /// Semantic failure: HTTP success but the envelope carried `result: false`.
    #[error("API error from {endpoint}: {message}")]
    Api {
        /// The endpoint whose envelope signaled failure.
        endpoint: String,
        /// Message extracted from `errorMessage`/`error` fields.
        message: String,
        /// Raw response payload, retained for diagnostics.
        payload: Option<serde_json::Value>,
    },

    /// A declared-JSON body could not be parsed.
    #[error("invalid JSON from {endpoint}: {source}")]
    Decode {
        /// The endpoint that returned the malformed body.
        endpoint: String,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A 307 reply arrived without a `location` header.
    #[error("could not obtain signed URL for {endpoint}: redirect carried no location header")]
    MissingRedirect {
        /// The endpoint that was expected to redirect.
        endpoint: String,
    },

    /// The redirect step received something other than 307.
    #[error("unexpected response from {endpoint}: {status}")]
    UnexpectedStatus {
        /// The endpoint that was expected to redirect.
        endpoint: String,
        /// The status actually received.
        status: u16,
    },

    /// The redirect target is not on an allowed signing domain, or is not
    /// an absolute http(s) URL.
    #[error("redirect from {endpoint} points at untrusted host '{host}'")]
    UntrustedRedirect {
        /// The endpoint that redirected.
        endpoint: String,
        /// The offending target host (or the raw value when unparseable).
        host: String,
    },

    /// The redirect succeeded but fetching the signed URL itself failed.
    #[error("signed URL for {endpoint} resolved but the content fetch failed: {source}")]
    SignedFetch {
        /// The endpoint whose signed URL could not be fetched.
        endpoint: String,
        /// The underlying fetch failure.
        #[source]
        source: Box<ApiError>,
    },

    /// The referenced resource does not exist upstream.
    #[error("raindrop with ID {id} not found")]
    NotFound {
        /// The missing resource identifier.
        id: u64,
    },

    /// The operation requires a paid account tier.
    #[error(
        "Permanent copy feature requires a Pro subscription. Please upgrade your Raindrop.io account to access this feature."
    )]
    EntitlementRequired,
}

impl ApiError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(
        endpoint: impl Into<String>,
        status: u16,
        message: impl Into<String>,
        payload: Option<serde_json::Value>,
    ) -> Self {
        Self::HttpStatus {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
            payload,
        }
    }

    /// Creates a semantic API failure.
    pub fn api(
        endpoint: impl Into<String>,
        message: impl Into<String>,
        payload: Option<serde_json::Value>,
    ) -> Self {
        Self::Api {
            endpoint: endpoint.into(),
            message: message.into(),
            payload,
        }
    }

    /// Creates a JSON decode error.
    pub fn decode(endpoint: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// Creates a missing-redirect error.
    pub fn missing_redirect(endpoint: impl Into<String>) -> Self {
        Self::MissingRedirect {
            endpoint: endpoint.into(),
        }
    }

    /// Creates an unexpected-status error for the redirect step.
    pub fn unexpected_status(endpoint: impl Into<String>, status: u16) -> Self {
        Self::UnexpectedStatus {
            endpoint: endpoint.into(),
            status,
        }
    }

    /// Creates an untrusted-redirect error.
    pub fn untrusted_redirect(endpoint: impl Into<String>, host: impl Into<String>) -> Self {
        Self::UntrustedRedirect {
            endpoint: endpoint.into(),
            host: host.into(),
        }
    }

    /// Wraps a post-redirect fetch failure with resolution context.
    pub fn signed_fetch(endpoint: impl Into<String>, source: ApiError) -> Self {
        Self::SignedFetch {
            endpoint: endpoint.into(),
            source: Box::new(source),
        }
    }

    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(id: u64) -> Self {
        Self::NotFound { id }
    }

    /// Returns the attached HTTP status code, when one exists.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } | Self::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            Self::SignedFetch { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Returns the message the remote payload carried, when one was extracted.
    #[must_use]
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::HttpStatus { message, .. } | Self::Api { message, .. } => Some(message),
            _ => None,
        }
    }
}
