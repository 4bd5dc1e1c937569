//! Domain models for bookmark resources returned by the remote API.

use serde::Deserialize;

use crate::archive::CacheDescriptor;

/// Classification of a bookmark, determining which permanent-copy
/// retrieval path applies: documents are downloadable files behind the
/// file endpoint, every other kind is a cacheable web page behind the
/// cache endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaindropKind {
    /// Plain link bookmark.
    Link,
    /// Parsed article.
    Article,
    /// Image bookmark.
    Image,
    /// Video bookmark.
    Video,
    /// Uploaded or linked document file.
    Document,
    /// Audio bookmark.
    Audio,
}

/// A single bookmark resource, as embedded in the API envelope's `item`.
///
/// Only the fields the retrieval client acts on are modeled; unknown
/// fields in the payload are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Raindrop {
    /// Resource identifier.
    #[serde(rename = "_id")]
    pub id: u64,
    /// Bookmark title.
    #[serde(default)]
    pub title: String,
    /// Original bookmarked URL.
    #[serde(default)]
    pub link: String,
    /// Resource kind; absent on some legacy records.
    #[serde(rename = "type")]
    pub kind: Option<RaindropKind>,
    /// Short excerpt of the page content.
    pub excerpt: Option<String>,
    /// User note.
    pub note: Option<String>,
    /// Source domain.
    pub domain: Option<String>,
    /// Cover image URL.
    pub cover: Option<String>,
    /// User tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creation timestamp (RFC 3339, as sent by the service).
    pub created: Option<String>,
    /// Last-update timestamp.
    #[serde(rename = "lastUpdate")]
    pub last_update: Option<String>,
    /// Marked important by the user.
    pub important: Option<bool>,
    /// Link detected as broken by the service.
    pub broken: Option<bool>,
    /// Permanent-copy descriptor, present once a cache has been requested.
    pub cache: Option<CacheDescriptor>,
}

impl Raindrop {
    /// Returns true when the resource is a downloadable file rather than a
    /// cacheable page.
    #[must_use]
    pub fn is_document(&self) -> bool {
        self.kind == Some(RaindropKind::Document)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::archive::CacheStatus;

    #[test]
    fn test_raindrop_deserializes_minimal_payload() {
        let raindrop: Raindrop = serde_json::from_value(serde_json::json!({
            "_id": 42,
            "title": "Example",
            "link": "https://example.com/page"
        }))
        .unwrap();
        assert_eq!(raindrop.id, 42);
        assert_eq!(raindrop.kind, None);
        assert!(raindrop.cache.is_none());
        assert!(raindrop.tags.is_empty());
        assert!(!raindrop.is_document());
    }

    #[test]
    fn test_raindrop_deserializes_document_kind() {
        let raindrop: Raindrop = serde_json::from_value(serde_json::json!({
            "_id": 7,
            "title": "Paper",
            "link": "https://example.com/paper.pdf",
            "type": "document"
        }))
        .unwrap();
        assert!(raindrop.is_document());
    }

    #[test]
    fn test_raindrop_deserializes_embedded_cache_descriptor() {
        let raindrop: Raindrop = serde_json::from_value(serde_json::json!({
            "_id": 9,
            "title": "Archived",
            "link": "https://example.com",
            "type": "article",
            "cache": {
                "status": "ready",
                "size": 2_097_152,
                "created": "2024-05-01T12:00:00Z"
            }
        }))
        .unwrap();
        let cache = raindrop.cache.unwrap();
        assert_eq!(cache.status, CacheStatus::Ready);
        assert_eq!(cache.size, 2_097_152);
    }

    #[test]
    fn test_raindrop_ignores_unknown_fields() {
        let raindrop: Raindrop = serde_json::from_value(serde_json::json!({
            "_id": 1,
            "title": "t",
            "link": "https://example.com",
            "collection": { "$id": 5 },
            "creatorRef": 99
        }))
        .unwrap();
        assert_eq!(raindrop.id, 1);
    }
}
