//! Signed-URL resolution via manual redirect inspection.
//!
//! Permanent copies are not served directly: the API answers the file and
//! cache sub-endpoints with HTTP 307 pointing at a time-limited,
//! pre-signed storage URL. The resolver dispatches with
//! redirect-following disabled, extracts the `location` target, and
//! validates it against a per-resource-kind signing policy before anyone
//! fetches it.

use tracing::{debug, instrument};
use url::Url;

use crate::api::{ApiClient, ApiError, RequestDescriptor, TransportReply};

/// A short-lived, credential-free URL granting access to a stored object.
///
/// The signature lives in the query string, so the full value is
/// secret-bearing: `Debug` renders only scheme, host, and path. Not
/// persisted; valid only for the provider-defined window.
#[derive(Clone)]
pub struct SignedUrl {
    raw: String,
}

impl SignedUrl {
    pub(crate) fn new(raw: String) -> Self {
        Self { raw }
    }

    /// The full signed URL. Handle with care; do not log.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Consumes the wrapper, returning the full signed URL.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.raw
    }

    /// Scheme, host, and path only; safe for logs.
    #[must_use]
    pub fn redacted(&self) -> String {
        crate::api::redacted_url(&self.raw)
    }
}

impl std::fmt::Debug for SignedUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SignedUrl").field(&self.redacted()).finish()
    }
}

/// Which hosts a redirect target may point at for one resource kind.
///
/// An empty list accepts any host. Matching is by host suffix with a
/// label boundary, so `amazonaws.com` permits
/// `bucket.s3.amazonaws.com` but not `evilamazonaws.com`.
#[derive(Debug, Clone, Default)]
pub struct SigningPolicy {
    allowed_hosts: Vec<String>,
}

impl SigningPolicy {
    /// Accepts any host.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Accepts only the given hosts (and their subdomains).
    #[must_use]
    pub fn allow_hosts<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_hosts: hosts.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true when the host is acceptable under this policy.
    #[must_use]
    pub fn permits(&self, host: &str) -> bool {
        if self.allowed_hosts.is_empty() {
            return true;
        }
        self.allowed_hosts.iter().any(|allowed| {
            host.eq_ignore_ascii_case(allowed)
                || host
                    .to_ascii_lowercase()
                    .ends_with(&format!(".{}", allowed.to_ascii_lowercase()))
        })
    }
}

/// Resolves sub-endpoints to pre-signed storage URLs.
///
/// One resolver per resource kind, since file and cache redirects land on
/// different signing domains. The caller performs the second,
/// credential-free fetch via [`ApiClient::fetch_signed`].
#[derive(Debug, Clone)]
pub struct SignedUrlResolver {
    api: ApiClient,
    policy: SigningPolicy,
}

impl SignedUrlResolver {
    /// Creates a resolver with the given signing policy.
    #[must_use]
    pub fn new(api: ApiClient, policy: SigningPolicy) -> Self {
        Self { api, policy }
    }

    /// Resolves an endpoint to its signed URL.
    ///
    /// Exactly HTTP 307 with a valid, policy-approved `location` target
    /// succeeds; every other reply is a hard failure, never retried or
    /// reinterpreted.
    ///
    /// # Errors
    ///
    /// - [`ApiError::MissingRedirect`] when 307 arrives without `location`.
    /// - [`ApiError::UntrustedRedirect`] when the target is not an
    ///   absolute http(s) URL on an allowed host.
    /// - [`ApiError::UnexpectedStatus`] for any non-307 status.
    /// - Transport errors from the underlying dispatch.
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn resolve(&self, endpoint: &str) -> Result<SignedUrl, ApiError> {
        let reply = self.api.dispatch(RequestDescriptor::get(endpoint)).await?;
        self.extract(endpoint, &reply)
    }

    fn extract(&self, endpoint: &str, reply: &TransportReply) -> Result<SignedUrl, ApiError> {
        if reply.status != reqwest::StatusCode::TEMPORARY_REDIRECT {
            return Err(ApiError::unexpected_status(endpoint, reply.status.as_u16()));
        }

        let location = ApiClient::location_header(reply)
            .ok_or_else(|| ApiError::missing_redirect(endpoint))?;

        let parsed = Url::parse(&location)
            .map_err(|_| ApiError::untrusted_redirect(endpoint, location.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::untrusted_redirect(endpoint, location));
        }
        let Some(host) = parsed.host_str() else {
            return Err(ApiError::untrusted_redirect(endpoint, location));
        };
        if !self.policy.permits(host) {
            return Err(ApiError::untrusted_redirect(endpoint, host.to_string()));
        }

        debug!(host, "signed URL resolved");
        Ok(SignedUrl::new(location))
    }
}
