use async_trait::async_trait;
use common::{Document, Version};
use tracing::debug;

use crate::error::SourceError;

/// Where the page gets its documents from.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_all(&self) -> Result<Vec<Document>, SourceError>;
}

/// Placeholder source until documents are served over the network.
///
/// Yields `Document 1..=count`, each seeded with version 1 dated 2020-01-01.
pub struct StubSource {
    count: u64,
}

impl StubSource {
    pub const SEED_DATE: &'static str = "2020-01-01";

    pub fn new(count: u64) -> Self {
        Self { count }
    }
}

impl Default for StubSource {
    fn default() -> Self {
        Self::new(8)
    }
}

#[async_trait]
impl DocumentSource for StubSource {
    fn name(&self) -> &str {
        "stub"
    }

    async fn fetch_all(&self) -> Result<Vec<Document>, SourceError> {
        let seed = Version::parse(1, Self::SEED_DATE).map_err(|e| SourceError {
            source_name: self.name().to_string(),
            reason: e.to_string(),
        })?;

        let documents: Vec<Document> = (1..=self.count)
            .map(|id| {
                let mut doc = Document::new(id, format!("Document {}", id));
                doc.add_version(seed.clone());
                doc
            })
            .collect();

        debug!(count = documents.len(), "stub documents generated");
        Ok(documents)
    }
}
