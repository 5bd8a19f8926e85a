//! The landing page controller.
//!
//! Construction subscribes to both auth signals before anything can
//! suspend. [`LandingPage::bootstrap`] then walks
//! `Bootstrapping → ManagerReady → CapabilityReady → DocumentsDisplayed`
//! and finally asks the auth subsystem to check, which settles the add
//! control even if a signal was missed before the page existed.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use common::{AuthSignal, DocumentId};
use tracing::{error, info, warn};

use crate::affordance::{AddAffordance, Page};
use crate::bus::{AuthCheck, SignalBus, Subscription};
use crate::capability::{AssetLoader, Instantiator, TemplateFactory};
use crate::config::PageConfig;
use crate::error::PageError;
use crate::popup::{PopupDispatch, PopupIntent};
use crate::source::DocumentSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Bootstrapping,
    ManagerReady,
    CapabilityReady,
    DocumentsDisplayed,
    AuthChecked,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Collaborators a page is wired to.
pub struct PageDeps {
    pub bus: Arc<SignalBus>,
    pub auth: Arc<dyn AuthCheck>,
    pub popups: Arc<dyn PopupDispatch>,
    pub loader: Arc<dyn AssetLoader>,
    pub templates: Arc<dyn TemplateFactory>,
    pub source: Arc<dyn DocumentSource>,
}

pub struct LandingPage {
    config: PageConfig,
    auth: Arc<dyn AuthCheck>,
    popups: Arc<dyn PopupDispatch>,
    source: Arc<dyn DocumentSource>,
    instantiator: Arc<Instantiator>,
    affordance: Arc<AddAffordance>,
    subscriptions: Mutex<Vec<Subscription>>,
    phase: Mutex<Phase>,
    started: AtomicBool,
}

impl LandingPage {
    /// Builds the page and subscribes it to auth signals. Does not suspend.
    pub fn new(deps: PageDeps, page: &Page, config: PageConfig) -> Result<Arc<Self>, PageError> {
        let control = page.control(&config.add_control_id)?;

        let instantiator = Arc::new(Instantiator::new(
            Arc::clone(&deps.loader),
            deps.templates,
            config.manager_scripts.clone(),
            config.document_scripts.clone(),
        ));
        deps.loader.add_stylesheet(&config.stylesheet);

        let affordance = Arc::new(AddAffordance::new(
            control,
            Arc::clone(&deps.popups),
            Arc::clone(&instantiator),
        ));

        let on_login = {
            let affordance = Arc::clone(&affordance);
            deps.bus
                .subscribe(AuthSignal::LoggedIn, move |_| affordance.enable())
        };
        let on_logout = {
            let affordance = Arc::clone(&affordance);
            deps.bus
                .subscribe(AuthSignal::NotLoggedIn, move |_| affordance.disable())
        };

        info!(container = %config.container, "landing page constructed");

        Ok(Arc::new(Self {
            config,
            auth: deps.auth,
            popups: deps.popups,
            source: deps.source,
            instantiator,
            affordance,
            subscriptions: Mutex::new(vec![on_login, on_logout]),
            phase: Mutex::new(Phase::Bootstrapping),
            started: AtomicBool::new(false),
        }))
    }

    fn phase_guard(&self) -> MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn enter(&self, phase: Phase) {
        *self.phase_guard() = phase;
        info!(%phase, "landing page phase");
    }

    pub fn phase(&self) -> Phase {
        *self.phase_guard()
    }

    pub fn affordance(&self) -> &Arc<AddAffordance> {
        &self.affordance
    }

    pub fn instantiator(&self) -> &Arc<Instantiator> {
        &self.instantiator
    }

    /// Runs the page lifecycle to completion. Any failure leaves the page
    /// in [`Phase::Failed`] and is returned to the caller.
    ///
    /// Runs at most once per page: any later call, concurrent or not, gets
    /// [`PageError::AlreadyBootstrapped`] and leaves the phase alone.
    pub async fn bootstrap(&self) -> Result<(), PageError> {
        if self.started.swap(true, Ordering::SeqCst) {
            warn!(phase = %self.phase(), "bootstrap requested twice");
            return Err(PageError::AlreadyBootstrapped);
        }

        if let Err(e) = self.run().await {
            error!(error = %e, "landing page bootstrap failed");
            self.enter(Phase::Failed);
            return Err(e);
        }
        Ok(())
    }

    async fn run(&self) -> Result<(), PageError> {
        self.instantiator.document_manager().await?;
        self.enter(Phase::ManagerReady);

        self.instantiator.add_document_scripts().await?;
        self.enter(Phase::CapabilityReady);

        self.display_fetched_documents().await?;
        self.enter(Phase::DocumentsDisplayed);

        self.auth.check();
        self.enter(Phase::AuthChecked);
        Ok(())
    }

    async fn display_fetched_documents(&self) -> Result<(), PageError> {
        let templates = self
            .instantiator
            .document_template_manager(&self.config.container)
            .await?;
        let manager = self.instantiator.document_manager().await?;

        let documents = manager.fetch(self.source.as_ref()).await?;

        templates
            .add_documents(&documents)
            .await
            .map_err(PageError::Render)?;

        let popups = Arc::clone(&self.popups);
        templates.on_document_clicked(Arc::new(move |id: DocumentId| {
            popups.open(PopupIntent::Clicked {
                id,
                popup_manager: Arc::downgrade(&popups),
                manager: Arc::clone(&manager),
            });
        }));

        Ok(())
    }

    /// Drops the auth subscriptions. Safe to call more than once.
    pub fn teardown(&self) {
        let subscriptions: Vec<Subscription> = self
            .subscriptions
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .drain(..)
            .collect();
        if !subscriptions.is_empty() {
            info!("landing page torn down");
        }
        for subscription in subscriptions {
            subscription.cancel();
        }
    }
}

impl Drop for LandingPage {
    fn drop(&mut self) {
        self.teardown();
    }
}
