//! Cache module for incremental generation
//!
//! Serialized documents are memoized by a hash of the raw markdown and the
//! plugin settings, so unchanged posts skip the transform on rebuild.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use crate::content::{PluginConfig, SerializedDocument};

/// Cache directory, relative to the site base directory
pub const CACHE_DIR: &str = ".folio-cache";

/// Cache file name
const CACHE_FILE: &str = ".folio-cache/db.json";

/// Cached transform result for one post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Key the document was produced under
    pub content_hash: String,
    pub document: SerializedDocument,
}

/// Cache database of serialized documents, keyed by slug
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheDb {
    /// Version of the cache format
    pub version: u32,
    pub posts: HashMap<String, CacheEntry>,
}

impl CacheDb {
    /// Current cache format version
    const VERSION: u32 = 1;

    /// Load cache from disk, or create a new empty cache
    pub fn load(base_dir: &Path) -> Self {
        let cache_path = base_dir.join(CACHE_FILE);
        if let Ok(content) = fs::read_to_string(&cache_path) {
            match serde_json::from_str::<CacheDb>(&content) {
                Ok(cache) if cache.version == Self::VERSION => return cache,
                Ok(_) => tracing::info!("Cache version mismatch, rebuilding cache"),
                Err(e) => tracing::warn!("Ignoring unreadable cache: {}", e),
            }
        }
        Self::new()
    }

    /// Save cache to disk
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        fs::create_dir_all(base_dir.join(CACHE_DIR))?;

        let cache_path = base_dir.join(CACHE_FILE);
        let content = serde_json::to_string(self)?;
        fs::write(cache_path, content)?;
        Ok(())
    }

    /// Create a new cache with version set
    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            ..Default::default()
        }
    }

    /// Cached document for `slug`, if it was produced under `key`
    pub fn get(&self, slug: &str, key: &str) -> Option<&SerializedDocument> {
        self.posts
            .get(slug)
            .filter(|entry| entry.content_hash == key)
            .map(|entry| &entry.document)
    }

    pub fn insert(&mut self, slug: &str, document: SerializedDocument) {
        self.posts.insert(
            slug.to_string(),
            CacheEntry {
                content_hash: document.content_hash.clone(),
                document,
            },
        );
    }

    /// Drop entries for slugs that no longer exist
    pub fn retain_slugs(&mut self, slugs: &BTreeSet<String>) -> usize {
        let before = self.posts.len();
        self.posts.retain(|slug, _| slugs.contains(slug));
        before - self.posts.len()
    }
}

/// Hit/miss counters for one build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

impl CacheStats {
    pub fn summary(&self) -> String {
        format!("{} cached, {} transformed", self.hits, self.misses)
    }
}

/// Key of a serialized document: hash of the raw source and plugin settings
pub fn document_key(raw: &str, plugins: &PluginConfig) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(plugins.locale.as_bytes());
    hasher.update(&[0]);
    hasher.update(plugins.highlight_themes.light.as_bytes());
    hasher.update(&[0]);
    hasher.update(plugins.highlight_themes.dark.as_bytes());
    hasher.update(&[0]);
    hasher.update(raw.as_bytes());
    hasher.finalize().to_hex().to_string()
}
