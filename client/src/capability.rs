//! Lazy, memoized instantiation of the rendering machinery.
//!
//! The loader and the template factory are outside collaborators. The
//! [`Instantiator`] decides *when* they run: each initializer computes once
//! and hands out the cached result afterwards. A failed attempt is not
//! cached, so the next caller tries again.

use std::sync::Arc;

use async_trait::async_trait;
use common::{Document, DocumentId};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::{LoadError, PageError};
use crate::manager::DocumentManager;

pub type ClickCallback = Arc<dyn Fn(DocumentId) + Send + Sync>;

/// Loads stylesheets and scripts into the page.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    /// Fire-and-forget; the stylesheet applies whenever it arrives.
    fn add_stylesheet(&self, path: &str);

    async fn load_script(&self, path: &str) -> Result<(), LoadError>;
}

/// Renders documents into a container and reports clicks on them.
#[async_trait]
pub trait TemplateManager: Send + Sync {
    async fn add_documents(&self, documents: &[Document]) -> Result<(), LoadError>;

    fn on_document_clicked(&self, callback: ClickCallback);
}

#[async_trait]
pub trait TemplateFactory: Send + Sync {
    async fn create(&self, container: &str) -> Result<Arc<dyn TemplateManager>, LoadError>;
}

pub struct Instantiator {
    loader: Arc<dyn AssetLoader>,
    templates: Arc<dyn TemplateFactory>,
    manager_scripts: Vec<String>,
    document_scripts: Vec<String>,
    manager: OnceCell<Arc<DocumentManager>>,
    document_scripts_loaded: OnceCell<()>,
}

impl Instantiator {
    pub fn new(
        loader: Arc<dyn AssetLoader>,
        templates: Arc<dyn TemplateFactory>,
        manager_scripts: Vec<String>,
        document_scripts: Vec<String>,
    ) -> Self {
        Self {
            loader,
            templates,
            manager_scripts,
            document_scripts,
            manager: OnceCell::new(),
            document_scripts_loaded: OnceCell::new(),
        }
    }

    pub fn loader(&self) -> &Arc<dyn AssetLoader> {
        &self.loader
    }

    async fn load_all(&self, scripts: &[String]) -> Result<(), LoadError> {
        for script in scripts {
            debug!(script = %script, "loading script");
            self.loader.load_script(script).await?;
        }
        Ok(())
    }

    /// The shared document manager, instantiated on first call.
    pub async fn document_manager(&self) -> Result<Arc<DocumentManager>, PageError> {
        let manager = self
            .manager
            .get_or_try_init(|| async {
                self.load_all(&self.manager_scripts)
                    .await
                    .map_err(PageError::ManagerInstantiation)?;
                info!("document manager instantiated");
                Ok::<_, PageError>(Arc::new(DocumentManager::new()))
            })
            .await?;
        Ok(Arc::clone(manager))
    }

    /// The manager if it has already been instantiated.
    pub fn manager(&self) -> Option<Arc<DocumentManager>> {
        self.manager.get().cloned()
    }

    /// Loads the document rendering scripts once.
    pub async fn add_document_scripts(&self) -> Result<(), PageError> {
        self.document_scripts_loaded
            .get_or_try_init(|| async {
                self.load_all(&self.document_scripts)
                    .await
                    .map_err(PageError::CapabilityImport)?;
                info!("document rendering scripts imported");
                Ok::<_, PageError>(())
            })
            .await?;
        Ok(())
    }

    /// A template manager bound to `container`. Imports the rendering
    /// scripts first if nobody has yet.
    pub async fn document_template_manager(
        &self,
        container: &str,
    ) -> Result<Arc<dyn TemplateManager>, PageError> {
        self.add_document_scripts().await?;
        self.templates
            .create(container)
            .await
            .map_err(PageError::CapabilityImport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessLoader, HeadlessTemplates};

    fn instantiator(loader: Arc<HeadlessLoader>) -> Instantiator {
        Instantiator::new(
            loader,
            Arc::new(HeadlessTemplates::new()),
            vec!["manager.js".to_string()],
            vec!["template.js".to_string()],
        )
    }

    #[tokio::test]
    async fn document_manager_is_instantiated_once() {
        let loader = Arc::new(HeadlessLoader::new());
        let inst = instantiator(Arc::clone(&loader));
        assert!(inst.manager().is_none());

        let first = inst.document_manager().await.unwrap();
        let second = inst.document_manager().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &inst.manager().unwrap()));
        assert_eq!(loader.load_count("manager.js"), 1);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_manager() {
        let loader = Arc::new(HeadlessLoader::new());
        let inst = instantiator(Arc::clone(&loader));

        let (a, b) = tokio::join!(inst.document_manager(), inst.document_manager());

        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(loader.load_count("manager.js"), 1);
    }

    #[tokio::test]
    async fn failed_instantiation_is_not_cached() {
        let loader = Arc::new(HeadlessLoader::new());
        loader.fail_on("manager.js");
        let inst = instantiator(Arc::clone(&loader));

        let err = inst.document_manager().await.err().unwrap();
        assert!(matches!(err, PageError::ManagerInstantiation(_)));
        assert!(inst.manager().is_none());

        loader.clear_failures();
        inst.document_manager().await.unwrap();
        assert_eq!(loader.load_count("manager.js"), 2);
    }

    #[tokio::test]
    async fn document_scripts_import_once_across_template_managers() {
        let loader = Arc::new(HeadlessLoader::new());
        let inst = instantiator(Arc::clone(&loader));

        inst.add_document_scripts().await.unwrap();
        inst.document_template_manager("main").await.unwrap();
        inst.document_template_manager("main").await.unwrap();

        assert_eq!(loader.load_count("template.js"), 1);
    }

    #[tokio::test]
    async fn capability_import_failure_is_reported() {
        let loader = Arc::new(HeadlessLoader::new());
        loader.fail_on("template.js");
        let inst = instantiator(loader);

        let err = inst.document_template_manager("main").await.err().unwrap();
        assert!(matches!(err, PageError::CapabilityImport(_)));
    }
}
