//! Permanent-copy retrieval: signed-URL resolution and orchestration.
//!
//! Permanent copies are archived snapshots of bookmarked pages and files,
//! stored by the remote service and served through time-limited signed
//! URLs reached via HTTP 307 redirects. This module layers the retrieval
//! protocol on top of the [`crate::api`] dispatcher:
//!
//! - [`SignedUrlResolver`] - manual redirect inspection with per-kind
//!   signing-domain validation
//! - [`ArchiveClient`] - the per-resource state machine: metadata, kind
//!   branching, readiness reporting, creation with verb fallback
//! - [`CacheDescriptor`] / [`CacheStatus`] - provider-owned readiness
//!   state with fixed advisory narratives

mod cache;
mod orchestrator;
mod signed_url;

pub use cache::{CacheDescriptor, CacheStatus};
pub use orchestrator::{ArchiveClient, CopyContent, CopyLink, MAX_CONTENT_CHARS};
pub use signed_url::{SignedUrl, SignedUrlResolver, SigningPolicy};
