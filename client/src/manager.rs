use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use common::{Document, DocumentId, Version};
use tracing::{info, warn};

use crate::error::PageError;
use crate::source::DocumentSource;

#[derive(Default)]
struct Cache {
    documents: Vec<Document>,
    index: HashMap<DocumentId, usize>,
}

/// In-memory collection of the documents shown on the page.
#[derive(Default)]
pub struct DocumentManager {
    cache: Mutex<Cache>,
}

impl DocumentManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Cache> {
        match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("document cache mutex was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Replaces the whole cached collection with `documents`.
    ///
    /// Ids stay unique: a repeated id keeps the slot of its first occurrence
    /// and the content of its last.
    pub fn cache_documents(&self, documents: Vec<Document>) {
        let mut next = Cache::default();

        for doc in documents {
            match next.index.get(&doc.id()) {
                Some(&pos) => {
                    warn!(id = %doc.id(), "duplicate document id, keeping the later one");
                    next.documents[pos] = doc;
                }
                None => {
                    next.index.insert(doc.id(), next.documents.len());
                    next.documents.push(doc);
                }
            }
        }

        info!(count = next.documents.len(), "document cache replaced");
        *self.lock() = next;
    }

    /// Cached documents in cache order. Empty before the first cache.
    pub fn get_all(&self) -> Vec<Document> {
        self.lock().documents.clone()
    }

    pub fn get(&self, id: DocumentId) -> Option<Document> {
        let cache = self.lock();
        cache.index.get(&id).map(|&pos| cache.documents[pos].clone())
    }

    pub fn len(&self) -> usize {
        self.lock().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn add_version(&self, id: DocumentId, version: Version) -> Result<(), PageError> {
        let mut cache = self.lock();
        let pos = *cache.index.get(&id).ok_or(PageError::UnknownDocument(id))?;
        cache.documents[pos].add_version(version);
        Ok(())
    }

    /// Pulls every document from `source` and caches them.
    pub async fn fetch(&self, source: &dyn DocumentSource) -> Result<Vec<Document>, PageError> {
        let documents = source.fetch_all().await?;
        info!(source = source.name(), count = documents.len(), "documents fetched");
        self.cache_documents(documents.clone());
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::source::StubSource;
    use async_trait::async_trait;

    fn titles(manager: &DocumentManager) -> Vec<String> {
        manager.get_all().iter().map(|d| d.title().to_string()).collect()
    }

    #[test]
    fn get_all_is_empty_before_any_cache() {
        let manager = DocumentManager::new();
        assert!(manager.get_all().is_empty());
        assert!(manager.is_empty());
    }

    #[test]
    fn second_cache_replaces_the_first() {
        let manager = DocumentManager::new();
        manager.cache_documents(vec![Document::new(1, "one"), Document::new(2, "two")]);
        manager.cache_documents(vec![Document::new(3, "three")]);

        assert_eq!(titles(&manager), vec!["three"]);
        assert!(manager.get(DocumentId(1)).is_none());
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn caching_empty_clears_everything() {
        let manager = DocumentManager::new();
        manager.cache_documents(vec![Document::new(1, "one")]);
        manager.cache_documents(Vec::new());
        assert!(manager.is_empty());
    }

    #[test]
    fn duplicate_ids_keep_first_slot_and_last_content() {
        let manager = DocumentManager::new();
        manager.cache_documents(vec![
            Document::new(1, "old"),
            Document::new(2, "two"),
            Document::new(1, "new"),
        ]);

        assert_eq!(titles(&manager), vec!["new", "two"]);
        assert_eq!(manager.get(DocumentId(1)).unwrap().title(), "new");
    }

    #[test]
    fn add_version_appends_to_cached_document() {
        let manager = DocumentManager::new();
        let mut doc = Document::new(5, "five");
        doc.add_version(Version::parse(1, "2020-01-01").unwrap());
        manager.cache_documents(vec![doc]);

        manager
            .add_version(DocumentId(5), Version::parse(2, "2020-03-01").unwrap())
            .unwrap();

        let numbers: Vec<u32> = manager
            .get(DocumentId(5))
            .unwrap()
            .versions()
            .iter()
            .map(Version::number)
            .collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn add_version_to_unknown_document_fails() {
        let manager = DocumentManager::new();
        let err = manager
            .add_version(DocumentId(9), Version::parse(1, "2020-01-01").unwrap())
            .unwrap_err();
        assert!(matches!(err, PageError::UnknownDocument(DocumentId(9))));
    }

    #[tokio::test]
    async fn fetch_caches_what_the_source_returns() {
        let manager = DocumentManager::new();
        let fetched = manager.fetch(&StubSource::new(3)).await.unwrap();

        assert_eq!(fetched.len(), 3);
        assert_eq!(titles(&manager), vec!["Document 1", "Document 2", "Document 3"]);
    }

    struct BrokenSource;

    #[async_trait]
    impl DocumentSource for BrokenSource {
        fn name(&self) -> &str {
            "broken"
        }

        async fn fetch_all(&self) -> Result<Vec<Document>, SourceError> {
            Err(SourceError {
                source_name: "broken".to_string(),
                reason: "offline".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn fetch_failure_leaves_cache_untouched() {
        let manager = DocumentManager::new();
        manager.cache_documents(vec![Document::new(1, "kept")]);

        let err = manager.fetch(&BrokenSource).await.unwrap_err();

        assert!(matches!(err, PageError::Source(_)));
        assert_eq!(titles(&manager), vec!["kept"]);
    }
}
