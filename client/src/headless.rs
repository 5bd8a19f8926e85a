//! In-process stand-ins for the browser-side collaborators.
//!
//! Used by the `landing` binary to run a page without a browser, and by the
//! tests to observe what the page asked for.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::{Document, DocumentId};
use tracing::{debug, info, warn};

use crate::capability::{AssetLoader, ClickCallback, TemplateFactory, TemplateManager};
use crate::error::LoadError;

/// Records every asset request; scripts can be made to fail by path.
#[derive(Default)]
pub struct HeadlessLoader {
    stylesheets: Mutex<Vec<String>>,
    scripts: Mutex<HashMap<String, usize>>,
    failing: Mutex<HashSet<String>>,
}

impl HeadlessLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, path: &str) {
        self.failing.lock().unwrap_or_else(|p| p.into_inner()).insert(path.to_string());
    }

    pub fn clear_failures(&self) {
        self.failing.lock().unwrap_or_else(|p| p.into_inner()).clear();
    }

    pub fn stylesheets(&self) -> Vec<String> {
        self.stylesheets.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// How many times `path` was requested, failed attempts included.
    pub fn load_count(&self, path: &str) -> usize {
        self.scripts
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(path)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl AssetLoader for HeadlessLoader {
    fn add_stylesheet(&self, path: &str) {
        debug!(path, "stylesheet added");
        self.stylesheets
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(path.to_string());
    }

    async fn load_script(&self, path: &str) -> Result<(), LoadError> {
        *self
            .scripts
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .entry(path.to_string())
            .or_insert(0) += 1;

        // Loading is a real suspension point in a browser.
        tokio::task::yield_now().await;

        if self.failing.lock().unwrap_or_else(|p| p.into_inner()).contains(path) {
            warn!(path, "script load failed");
            return Err(LoadError {
                asset: path.to_string(),
                reason: "load refused".to_string(),
            });
        }
        Ok(())
    }
}

/// Template manager that keeps rendered documents in memory.
pub struct HeadlessTemplateManager {
    container: String,
    rendered: Mutex<Vec<Document>>,
    on_click: Mutex<Vec<ClickCallback>>,
}

impl HeadlessTemplateManager {
    fn new(container: &str) -> Self {
        Self {
            container: container.to_string(),
            rendered: Mutex::new(Vec::new()),
            on_click: Mutex::new(Vec::new()),
        }
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn rendered(&self) -> Vec<Document> {
        self.rendered.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Simulates a click on the rendered card of `id`.
    /// Returns `false` if no such card was rendered.
    pub fn click(&self, id: DocumentId) -> bool {
        let present = self
            .rendered
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .any(|doc| doc.id() == id);
        if !present {
            return false;
        }

        let callbacks = self.on_click.lock().unwrap_or_else(|p| p.into_inner()).clone();
        for callback in callbacks {
            callback(id);
        }
        true
    }
}

#[async_trait]
impl TemplateManager for HeadlessTemplateManager {
    async fn add_documents(&self, documents: &[Document]) -> Result<(), LoadError> {
        tokio::task::yield_now().await;
        let mut rendered = self.rendered.lock().unwrap_or_else(|p| p.into_inner());
        rendered.extend(documents.iter().cloned());
        info!(container = %self.container, count = documents.len(), "documents rendered");
        Ok(())
    }

    fn on_document_clicked(&self, callback: ClickCallback) {
        self.on_click.lock().unwrap_or_else(|p| p.into_inner()).push(callback);
    }
}

/// Factory that remembers every template manager it hands out.
#[derive(Default)]
pub struct HeadlessTemplates {
    created: Mutex<Vec<Arc<HeadlessTemplateManager>>>,
}

impl HeadlessTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<Arc<HeadlessTemplateManager>> {
        self.created.lock().unwrap_or_else(|p| p.into_inner()).last().cloned()
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

#[async_trait]
impl TemplateFactory for HeadlessTemplates {
    async fn create(&self, container: &str) -> Result<Arc<dyn TemplateManager>, LoadError> {
        let manager = Arc::new(HeadlessTemplateManager::new(container));
        self.created
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(Arc::clone(&manager));
        Ok(manager as Arc<dyn TemplateManager>)
    }
}
