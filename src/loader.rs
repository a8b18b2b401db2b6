//! The loader seam (§4.G).
//!
//! This crate ships the trait and a caching wrapper around it; resolving a
//! key to bytes (filesystem, network, an in-memory map the caller
//! populates) is the embedding application's concern, not this crate's.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::model::Document;

/// Resolves a decision key to a parsed [`Document`].
pub trait Loader: Send + Sync {
    /// Look up and fully parse the document for `key`.
    ///
    /// Implementations should return [`EngineError::NotFound`] when `key`
    /// does not resolve to anything, rather than panicking.
    fn load(&self, key: &str) -> EngineResult<Arc<Document>>;

    /// Whether [`DocumentCache`] should cache this loader's results. A
    /// loader backed by data that can change underneath a stable key (a
    /// live filesystem watch, say) should return `false`.
    fn supports_caching(&self) -> bool {
        true
    }
}

/// Wraps a [`Loader`], memoizing parsed documents (including their cached
/// ASTs) behind a `parking_lot::RwLock` so concurrent `evaluate` calls on
/// distinct or identical keys do not serialize on a coarse mutex (§5).
pub struct DocumentCache<L> {
    inner: L,
    cache: RwLock<HashMap<String, Arc<Document>>>,
}

impl<L: Loader> DocumentCache<L> {
    pub fn new(inner: L) -> Self {
        DocumentCache {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> EngineResult<Arc<Document>> {
        if self.inner.supports_caching() {
            if let Some(doc) = self.cache.read().get(key) {
                return Ok(Arc::clone(doc));
            }
        }

        warn!(key, "document cache miss, loading from source loader");
        let doc = self.inner.load(key)?;
        info!(
            key,
            node_count = doc.nodes.len(),
            edge_count = doc.edges.len(),
            "document loaded"
        );

        if self.inner.supports_caching() {
            self.cache.write().insert(key.to_string(), Arc::clone(&doc));
        }

        Ok(doc)
    }
}

/// A [`Loader`] backed by documents the caller supplies up front — the
/// minimal fixture this crate's own tests need (§4.G).
pub struct StaticLoader {
    documents: HashMap<String, Arc<Document>>,
}

impl StaticLoader {
    pub fn new() -> Self {
        StaticLoader {
            documents: HashMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, document: Document) -> Self {
        self.documents.insert(key.into(), Arc::new(document));
        self
    }
}

impl Default for StaticLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader for StaticLoader {
    fn load(&self, key: &str) -> EngineResult<Arc<Document>> {
        self.documents
            .get(key)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use once_cell::sync::Lazy;
    use std::fs;

    static SHARED_DOCUMENT: Lazy<Arc<Document>> = Lazy::new(|| Arc::new(minimal_document("shared")));

    fn minimal_document(id: &str) -> Document {
        let mut nodes = IndexMap::new();
        nodes.insert(
            "in".to_string(),
            crate::model::Node {
                id: "in".into(),
                name: "Input".into(),
                kind: crate::model::NodeKind::Input,
                content: None,
            },
        );
        nodes.insert(
            "out".to_string(),
            crate::model::Node {
                id: "out".into(),
                name: "Output".into(),
                kind: crate::model::NodeKind::Output,
                content: None,
            },
        );
        let edges = vec![crate::model::Edge {
            id: "e1".into(),
            source_id: "in".into(),
            target_id: "out".into(),
            source_handle: None,
        }];
        Document::new(id, "Doc", nodes, edges).unwrap()
    }

    #[test]
    fn unknown_key_yields_not_found() {
        let loader = StaticLoader::new();
        let cache = DocumentCache::new(loader);
        let err = cache.get("missing").unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn caches_across_repeated_lookups() {
        let loader = StaticLoader::new().with("doc1", minimal_document("doc1"));
        let cache = DocumentCache::new(loader);
        let a = cache.get("doc1").unwrap();
        let b = cache.get("doc1").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    /// A minimal `Loader` fixture resolving a key only when a same-named
    /// marker file exists on disk — exercises the seam against real I/O
    /// without committing this crate to a concrete ingestion format.
    struct MarkerFileLoader {
        root: tempfile::TempDir,
    }

    impl Loader for MarkerFileLoader {
        fn load(&self, key: &str) -> EngineResult<Arc<Document>> {
            let marker = self.root.path().join(format!("{key}.marker"));
            if !marker.exists() {
                return Err(EngineError::NotFound(key.to_string()));
            }
            Ok(Arc::clone(&SHARED_DOCUMENT))
        }
    }

    #[test]
    fn filesystem_backed_loader_resolves_present_keys_only() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("present.marker"), b"").unwrap();
        let loader = MarkerFileLoader { root };
        let cache = DocumentCache::new(loader);

        assert!(cache.get("present").is_ok());
        assert!(matches!(
            cache.get("absent").unwrap_err(),
            EngineError::NotFound(_)
        ));
    }
}
