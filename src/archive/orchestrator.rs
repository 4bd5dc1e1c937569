//! Permanent-copy orchestration: the state-machine driver per resource ID.
//!
//! Given a resource identifier, the orchestrator fetches metadata, decides
//! between the downloadable-file and cached-page retrieval paths, resolves
//! signed URLs when the copy is ready, and otherwise requests creation and
//! reports the provider's asynchronous readiness state. Every branch ends
//! in a terminal, user-presentable outcome; the degradable case (copy
//! ready but the signed link unavailable) becomes data, not an error.
//!
//! # Concurrency
//!
//! A single resolution is strictly sequential: metadata fetch, redirect
//! resolution, signed fetch, each awaiting the previous result.
//! Cancellation is drop-based; dropping the in-flight future aborts the
//! current hop and no later hop is issued. Independent resolutions may run
//! concurrently, but create-then-poll for one ID must stay sequential.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::api::{ApiClient, ApiError, Envelope, RequestDescriptor, SignedFetch};
use crate::config::ClientConfig;
use crate::raindrop::Raindrop;

use super::cache::CacheDescriptor;
use super::signed_url::{SignedUrl, SignedUrlResolver, SigningPolicy};

/// Upper bound on page content returned by [`ArchiveClient::permanent_copy_content`].
///
/// A deliberate bound to keep rendered outcomes within downstream size
/// limits, not an error condition.
pub const MAX_CONTENT_CHARS: usize = 8000;

/// Verbs tried, in order, when requesting cache creation. The remote API
/// is inconsistently documented on which one it accepts; the first
/// success short-circuits.
const CREATION_VERBS: [Method; 2] = [Method::POST, Method::PUT];

/// Keywords that mark a failure message as an entitlement restriction.
const ENTITLEMENT_KEYWORDS: [&str; 4] = ["pro", "premium", "upgrade", "subscription"];

/// Returns true when a failure message indicates the operation needs a
/// paid account tier.
///
/// The upstream API exposes no verified machine-readable signal for this
/// condition, so detection is case-insensitive substring matching against
/// [`ENTITLEMENT_KEYWORDS`], kept compatible with the service's observed
/// wording. Replace the body of this predicate if a structured error code
/// ever becomes available.
#[must_use]
fn requires_pro_subscription(error: &ApiError) -> bool {
    let message = match error.remote_message() {
        Some(message) => message.to_ascii_lowercase(),
        None => error.to_string().to_ascii_lowercase(),
    };
    ENTITLEMENT_KEYWORDS
        .iter()
        .any(|keyword| message.contains(keyword))
}

/// Keeps the first `max_chars` characters of `text`, reporting whether
/// anything was dropped. Cuts on a character boundary.
fn truncate_chars(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => (text[..byte_index].to_string(), true),
        None => (text.to_string(), false),
    }
}

/// Outcome of [`ArchiveClient::permanent_copy_link`].
#[derive(Debug)]
pub enum CopyLink {
    /// Document resource: signed download URL for the stored file.
    FileLink {
        /// The resource the link belongs to.
        raindrop: Raindrop,
        /// Time-limited signed download URL.
        url: SignedUrl,
    },
    /// Page resource with a ready copy: signed URL for the cached content.
    CacheLink {
        /// The resource the link belongs to.
        raindrop: Raindrop,
        /// The ready cache descriptor.
        descriptor: CacheDescriptor,
        /// Time-limited signed cache URL.
        url: SignedUrl,
    },
    /// Copy is ready but the signed link could not be retrieved; partial
    /// information beats total failure.
    CacheInfo {
        /// The resource observed.
        raindrop: Raindrop,
        /// The descriptor that was still retrievable.
        descriptor: CacheDescriptor,
        /// Why the signed link is unavailable.
        reason: String,
    },
    /// No ready copy existed; creation was requested and the provider's
    /// status is reported verbatim.
    CreationReported {
        /// The resource observed.
        raindrop: Raindrop,
        /// Status returned by the creation call.
        descriptor: CacheDescriptor,
    },
}

impl std::fmt::Display for CopyLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileLink { raindrop, url } => write!(
                f,
                "Document download link retrieved successfully!\n\n  Title: {}\n  Type: document\n  Original URL: {}\n\nSigned download URL:\n{}\n\nThis is a temporary signed URL that provides direct access to the document file. It expires after a provider-defined time period.",
                raindrop.title,
                raindrop.link,
                url.as_str()
            ),
            Self::CacheLink {
                raindrop,
                descriptor,
                url,
            } => write!(
                f,
                "Cached content link retrieved successfully!\n\n  Title: {}\n  {}\n  Source URL: {}\n\nSigned cache URL:\n{}\n\nThis is a temporary signed URL that provides direct access to the cached webpage content. It expires after a provider-defined time period.",
                raindrop.title,
                descriptor.summary(),
                raindrop.link,
                url.as_str()
            ),
            Self::CacheInfo {
                raindrop,
                descriptor,
                reason,
            } => write!(
                f,
                "Permanent copy exists for \"{}\" but a signed link could not be retrieved.\n\n  {}\n\nReason: {reason}",
                raindrop.title,
                descriptor.summary()
            ),
            Self::CreationReported {
                raindrop,
                descriptor,
            } => {
                write!(
                    f,
                    "Permanent copy request for \"{}\":\n\n{}",
                    raindrop.title,
                    descriptor.status.advisory()
                )?;
                if descriptor.is_ready() {
                    write!(
                        f,
                        "\n  {}\n\nRequest the link again to obtain the signed URL.",
                        descriptor.summary()
                    )?;
                }
                Ok(())
            }
        }
    }
}

/// Outcome of [`ArchiveClient::permanent_copy_content`].
#[derive(Debug)]
pub enum CopyContent {
    /// Document resource: the stored file, base64-encoded.
    File {
        /// The resource the content belongs to.
        raindrop: Raindrop,
        /// File bytes, base64-encoded.
        content_base64: String,
        /// Declared content type of the stored file.
        content_type: String,
        /// Raw (pre-encoding) size in bytes.
        size: usize,
    },
    /// Page resource: cached content, bounded to [`MAX_CONTENT_CHARS`].
    Page {
        /// The resource the content belongs to.
        raindrop: Raindrop,
        /// The ready cache descriptor.
        descriptor: CacheDescriptor,
        /// Cached content, possibly truncated.
        content: String,
        /// Whether the content was truncated.
        truncated: bool,
        /// Untruncated length in characters.
        total_chars: usize,
    },
    /// Copy is ready but its content could not be fetched.
    CacheInfo {
        /// The resource observed.
        raindrop: Raindrop,
        /// The descriptor that was still retrievable.
        descriptor: CacheDescriptor,
        /// Why the content is unavailable.
        reason: String,
    },
    /// No ready copy existed; creation was requested and the provider's
    /// status is reported verbatim.
    CreationReported {
        /// The resource observed.
        raindrop: Raindrop,
        /// Status returned by the creation call.
        descriptor: CacheDescriptor,
    },
}

impl std::fmt::Display for CopyContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File {
                raindrop,
                content_base64,
                content_type,
                size,
            } => write!(
                f,
                "Document content for \"{}\" ({content_type}, {size} bytes, base64-encoded):\n\n{content_base64}",
                raindrop.title
            ),
            Self::Page {
                raindrop,
                descriptor,
                content,
                truncated,
                total_chars,
            } => {
                write!(
                    f,
                    "Permanent copy content for \"{}\":\n\n  {}\n  Source URL: {}\n\n--- CACHED CONTENT ---\n{content}",
                    raindrop.title,
                    descriptor.summary(),
                    raindrop.link
                )?;
                if *truncated {
                    write!(
                        f,
                        "\n\n... [content truncated; total length: {total_chars} characters]"
                    )?;
                }
                Ok(())
            }
            Self::CacheInfo {
                raindrop,
                descriptor,
                reason,
            } => write!(
                f,
                "Permanent copy exists for \"{}\" but its content could not be fetched.\n\n  {}\n\nReason: {reason}",
                raindrop.title,
                descriptor.summary()
            ),
            Self::CreationReported {
                raindrop,
                descriptor,
            } => {
                write!(
                    f,
                    "Permanent copy request for \"{}\":\n\n{}",
                    raindrop.title,
                    descriptor.status.advisory()
                )?;
                if descriptor.is_ready() {
                    write!(
                        f,
                        "\n  {}\n\nRequest the content again to retrieve it.",
                        descriptor.summary()
                    )?;
                }
                Ok(())
            }
        }
    }
}

/// State-machine driver for permanent-copy retrieval.
///
/// Wraps an [`ApiClient`] plus one [`SignedUrlResolver`] per resource
/// kind (files and cached pages redirect to different signing domains).
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    api: ApiClient,
    file_resolver: SignedUrlResolver,
    cache_resolver: SignedUrlResolver,
}

impl ArchiveClient {
    /// Creates an orchestrator from a configuration.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        let api = ApiClient::new(config);
        Self::with_api(
            api,
            signing_policy(&config.file_signing_hosts),
            signing_policy(&config.cache_signing_hosts),
        )
    }

    /// Creates an orchestrator around an existing client with explicit
    /// per-kind signing policies.
    #[must_use]
    pub fn with_api(api: ApiClient, file_policy: SigningPolicy, cache_policy: SigningPolicy) -> Self {
        Self {
            file_resolver: SignedUrlResolver::new(api.clone(), file_policy),
            cache_resolver: SignedUrlResolver::new(api.clone(), cache_policy),
            api,
        }
    }

    /// Fetches resource metadata, failing fast when the ID does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the envelope carries no item,
    /// plus any dispatch/classification error.
    pub async fn fetch_raindrop(&self, id: u64) -> Result<Raindrop, ApiError> {
        let envelope: Envelope<Raindrop> = self.api.get(&format!("/raindrop/{id}")).await?;
        envelope.item.ok_or_else(|| ApiError::not_found(id))
    }

    /// Retrieves the permanent-copy link for a resource.
    ///
    /// Documents resolve the file sub-endpoint directly; pages with a
    /// ready copy resolve the cache sub-endpoint, degrading to the bare
    /// descriptor when the signed link cannot be obtained; everything
    /// else goes through the creation path and reports the provider's
    /// status.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the resource does not exist
    /// (no further calls are attempted), resolution errors for the
    /// document path, and creation-path errors including
    /// [`ApiError::EntitlementRequired`].
    #[instrument(skip(self))]
    pub async fn permanent_copy_link(&self, id: u64) -> Result<CopyLink, ApiError> {
        let raindrop = self.fetch_raindrop(id).await?;

        if raindrop.is_document() {
            let url = self
                .file_resolver
                .resolve(&format!("/raindrop/{id}/file"))
                .await?;
            return Ok(CopyLink::FileLink { raindrop, url });
        }

        match raindrop.cache.clone() {
            Some(descriptor) if descriptor.is_ready() => {
                match self
                    .cache_resolver
                    .resolve(&format!("/raindrop/{id}/cache"))
                    .await
                {
                    Ok(url) => Ok(CopyLink::CacheLink {
                        raindrop,
                        descriptor,
                        url,
                    }),
                    Err(error) => {
                        warn!(id, error = %error, "copy ready but signed link unavailable; returning descriptor");
                        Ok(CopyLink::CacheInfo {
                            raindrop,
                            descriptor,
                            reason: error.to_string(),
                        })
                    }
                }
            }
            _ => {
                let descriptor = self.request_cache_creation(id).await?;
                Ok(CopyLink::CreationReported {
                    raindrop,
                    descriptor,
                })
            }
        }
    }

    /// Retrieves the permanent-copy content for a resource.
    ///
    /// Documents are fetched through their signed URL and returned
    /// base64-encoded. Page content is fetched through the cache's signed
    /// URL and bounded to [`MAX_CONTENT_CHARS`] characters, with the
    /// untruncated length reported separately.
    ///
    /// # Errors
    ///
    /// As [`Self::permanent_copy_link`], plus [`ApiError::SignedFetch`]
    /// when a document's signed URL resolves but cannot be fetched.
    #[instrument(skip(self))]
    pub async fn permanent_copy_content(&self, id: u64) -> Result<CopyContent, ApiError> {
        let raindrop = self.fetch_raindrop(id).await?;

        if raindrop.is_document() {
            let endpoint = format!("/raindrop/{id}/file");
            let url = self.file_resolver.resolve(&endpoint).await?;
            let fetched = self
                .api
                .fetch_signed(url.as_str())
                .await
                .map_err(|error| ApiError::signed_fetch(&endpoint, error))?;
            let size = fetched.bytes.len();
            let content_type = fetched
                .content_type
                .clone()
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let content_base64 = BASE64_STANDARD.encode(&fetched.bytes);
            return Ok(CopyContent::File {
                raindrop,
                content_base64,
                content_type,
                size,
            });
        }

        match raindrop.cache.clone() {
            Some(descriptor) if descriptor.is_ready() => {
                let endpoint = format!("/raindrop/{id}/cache");
                match self.fetch_cached_page(&endpoint).await {
                    Ok(fetched) => {
                        let text = fetched.into_text();
                        let total_chars = text.chars().count();
                        let (content, truncated) = truncate_chars(&text, MAX_CONTENT_CHARS);
                        Ok(CopyContent::Page {
                            raindrop,
                            descriptor,
                            content,
                            truncated,
                            total_chars,
                        })
                    }
                    Err(error) => {
                        warn!(id, error = %error, "copy ready but content unavailable; returning descriptor");
                        Ok(CopyContent::CacheInfo {
                            raindrop,
                            descriptor,
                            reason: error.to_string(),
                        })
                    }
                }
            }
            _ => {
                let descriptor = self.request_cache_creation(id).await?;
                Ok(CopyContent::CreationReported {
                    raindrop,
                    descriptor,
                })
            }
        }
    }

    async fn fetch_cached_page(&self, endpoint: &str) -> Result<SignedFetch, ApiError> {
        let url = self.cache_resolver.resolve(endpoint).await?;
        self.api
            .fetch_signed(url.as_str())
            .await
            .map_err(|error| ApiError::signed_fetch(endpoint, error))
    }

    /// Requests cache creation, trying each candidate verb in order.
    ///
    /// The first success short-circuits. When every verb fails, the
    /// primary verb's error surfaces, unless its message indicates an
    /// entitlement restriction, in which case
    /// [`ApiError::EntitlementRequired`] is returned instead.
    ///
    /// # Errors
    ///
    /// The primary verb's failure, [`ApiError::EntitlementRequired`], or
    /// a decode error when the creation reply carries no usable cache
    /// descriptor.
    #[instrument(skip(self))]
    pub async fn request_cache_creation(&self, id: u64) -> Result<CacheDescriptor, ApiError> {
        let endpoint = format!("/raindrop/{id}/cache");
        let mut primary_failure: Option<ApiError> = None;

        for verb in CREATION_VERBS {
            let attempt = self
                .api
                .request_json(RequestDescriptor::new(verb.clone(), endpoint.clone()))
                .await;
            match attempt {
                Ok(payload) => {
                    debug!(id, verb = %verb, "cache creation accepted");
                    return parse_creation_reply(&endpoint, payload);
                }
                Err(error) => {
                    debug!(id, verb = %verb, error = %error, "cache creation attempt failed");
                    if primary_failure.is_none() {
                        primary_failure = Some(error);
                    }
                }
            }
        }

        // CREATION_VERBS is non-empty, so a failure was recorded.
        let primary = primary_failure
            .unwrap_or_else(|| ApiError::api(&endpoint, "cache creation never attempted", None));
        if requires_pro_subscription(&primary) {
            return Err(ApiError::EntitlementRequired);
        }
        Err(primary)
    }
}

fn signing_policy(hosts: &[String]) -> SigningPolicy {
    if hosts.is_empty() {
        SigningPolicy::any()
    } else {
        SigningPolicy::allow_hosts(hosts.iter().cloned())
    }
}

/// Extracts the cache descriptor from a creation reply.
fn parse_creation_reply(endpoint: &str, payload: Value) -> Result<CacheDescriptor, ApiError> {
    let Some(cache) = payload.get("cache").cloned() else {
        return Err(ApiError::api(
            endpoint,
            "Cache information not available in response",
            Some(payload),
        ));
    };
    serde_json::from_value(cache).map_err(|error| ApiError::decode(endpoint, error))
}
