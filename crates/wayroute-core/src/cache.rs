//! Process-wide response cache.
//!
//! Entries are keyed first by fingerprint, then by content encoding: the
//! same logical response may be cached once per encoding the clients
//! accept. Entries are never invalidated automatically — eviction is
//! explicit: everything, one fingerprint, or all fingerprints matching a
//! pattern.

use std::collections::HashMap;

use bytes::Bytes;
use dashmap::DashMap;
use regex::Regex;
use wayroute_model::ContentEncoding;

/// A cached response: the body bytes exactly as they were sent (already
/// encoded) and the content type recorded when the entry was written.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Encoded body bytes.
    pub body: Bytes,
    /// Content type to replay on a hit, exactly as recorded at write time.
    pub content_type: Option<String>,
}

/// Fingerprint → encoding → cached response.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: DashMap<String, HashMap<ContentEncoding, CacheEntry>>,
}

impl ResponseCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a response under `fingerprint` for the given encoding,
    /// overwriting any previous entry.
    pub fn store(&self, fingerprint: &str, encoding: ContentEncoding, entry: CacheEntry) {
        tracing::debug!(fingerprint, %encoding, bytes = entry.body.len(), "cached response");
        self.entries
            .entry(fingerprint.to_owned())
            .or_default()
            .insert(encoding, entry);
    }

    /// Look up a cached response. `Bytes` makes the clone cheap.
    #[must_use]
    pub fn get(&self, fingerprint: &str, encoding: ContentEncoding) -> Option<CacheEntry> {
        self.entries
            .get(fingerprint)
            .and_then(|by_encoding| by_encoding.get(&encoding).cloned())
    }

    /// Evict every entry.
    pub fn clear_all(&self) {
        self.entries.clear();
    }

    /// Evict one fingerprint (all encodings).
    pub fn clear(&self, fingerprint: &str) {
        self.entries.remove(fingerprint);
    }

    /// Evict every fingerprint matching the pattern.
    pub fn clear_matching(&self, pattern: &Regex) {
        self.entries.retain(|fingerprint, _| !pattern.is_match(fingerprint));
    }

    /// Number of cached fingerprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
