//! The add control and the controller that toggles it.
//!
//! Every toggle first detaches the click listener it attached last, so the
//! control carries at most one live listener whatever the signal order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use common::PopupState;
use tracing::{debug, info, warn};

use crate::capability::Instantiator;
use crate::error::PageError;
use crate::listeners::{ListenerId, Listeners};
use crate::popup::{PopupDispatch, PopupIntent};

/// An interactive element of the page.
#[derive(Default)]
pub struct Control {
    enabled: AtomicBool,
    clicks: Listeners<()>,
}

impl Control {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn on_click<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&()) + Send + Sync + 'static,
    {
        self.clicks.attach(callback)
    }

    pub fn remove_click(&self, id: ListenerId) -> bool {
        self.clicks.detach(id)
    }

    pub fn listener_count(&self) -> usize {
        self.clicks.len()
    }

    /// User click. A disabled control swallows it.
    pub fn click(&self) -> usize {
        if !self.is_enabled() {
            return 0;
        }
        self.clicks.emit(&())
    }
}

/// Page markup: the controls that can be looked up by id.
#[derive(Default)]
pub struct Page {
    controls: HashMap<String, Arc<Control>>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Markup containing a single, initially disabled control.
    pub fn with_control(id: &str) -> Self {
        let mut page = Self::new();
        page.insert(id, Arc::new(Control::new()));
        page
    }

    pub fn insert(&mut self, id: &str, control: Arc<Control>) {
        self.controls.insert(id.to_string(), control);
    }

    pub fn control(&self, id: &str) -> Result<Arc<Control>, PageError> {
        self.controls
            .get(id)
            .cloned()
            .ok_or_else(|| PageError::MissingControl(id.to_string()))
    }
}

/// Drives the add control from authentication signals.
pub struct AddAffordance {
    control: Arc<Control>,
    popups: Arc<dyn PopupDispatch>,
    instantiator: Arc<Instantiator>,
    click_handle: Mutex<Option<ListenerId>>,
}

impl AddAffordance {
    pub fn new(
        control: Arc<Control>,
        popups: Arc<dyn PopupDispatch>,
        instantiator: Arc<Instantiator>,
    ) -> Self {
        Self {
            control,
            popups,
            instantiator,
            click_handle: Mutex::new(None),
        }
    }

    pub fn control(&self) -> &Arc<Control> {
        &self.control
    }

    /// Enables the control with exactly one click listener.
    ///
    /// A click asks for the add popup. If the document manager is not
    /// instantiated yet the intent still goes out, without a manager.
    pub fn enable(&self) {
        let mut handle = self.click_handle.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(id) = handle.take() {
            self.control.remove_click(id);
        }

        self.control.set_enabled(true);

        let popups = Arc::clone(&self.popups);
        let instantiator = Arc::clone(&self.instantiator);
        *handle = Some(self.control.on_click(move |_| {
            let manager = instantiator.manager();
            if manager.is_none() {
                warn!("add clicked before the document manager was ready");
            }
            popups.open(PopupIntent::Document {
                state: PopupState::Add,
                manager,
            });
        }));

        info!("add control enabled");
    }

    pub fn disable(&self) {
        let mut handle = self.click_handle.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(id) = handle.take() {
            self.control.remove_click(id);
        }

        self.control.set_enabled(false);
        debug!("add control disabled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessLoader, HeadlessTemplates};
    use crate::popup::RecordingPopups;
    use common::PopupKind;
    use proptest::prelude::*;

    fn affordance() -> (AddAffordance, Arc<RecordingPopups>, Arc<Instantiator>) {
        let popups = Arc::new(RecordingPopups::new());
        let instantiator = Arc::new(Instantiator::new(
            Arc::new(HeadlessLoader::new()),
            Arc::new(HeadlessTemplates::new()),
            Vec::new(),
            Vec::new(),
        ));
        let affordance = AddAffordance::new(
            Arc::new(Control::new()),
            popups.clone(),
            Arc::clone(&instantiator),
        );
        (affordance, popups, instantiator)
    }

    #[test]
    fn control_starts_disabled_without_listeners() {
        let (affordance, _, _) = affordance();
        assert!(!affordance.control().is_enabled());
        assert_eq!(affordance.control().listener_count(), 0);
    }

    #[test]
    fn repeated_enable_keeps_a_single_listener() {
        let (affordance, _, _) = affordance();
        for _ in 0..5 {
            affordance.enable();
        }
        assert!(affordance.control().is_enabled());
        assert_eq!(affordance.control().listener_count(), 1);
    }

    #[test]
    fn disable_strips_the_listener() {
        let (affordance, _, _) = affordance();
        affordance.enable();
        affordance.disable();
        affordance.disable();

        assert!(!affordance.control().is_enabled());
        assert_eq!(affordance.control().listener_count(), 0);
        assert_eq!(affordance.control().click(), 0);
    }

    #[tokio::test]
    async fn click_opens_one_add_popup() {
        let (affordance, popups, instantiator) = affordance();
        instantiator.document_manager().await.unwrap();

        affordance.enable();
        affordance.enable();
        affordance.control().click();

        let opened = popups.opened();
        assert_eq!(opened.len(), 1);
        match &opened[0] {
            PopupIntent::Document { state, manager } => {
                assert_eq!(*state, PopupState::Add);
                let manager = manager.as_ref().unwrap();
                assert!(Arc::ptr_eq(manager, &instantiator.manager().unwrap()));
            }
            other => panic!("unexpected intent {:?}", other),
        }
    }

    #[test]
    fn click_before_manager_is_ready_still_opens_add_popup() {
        let (affordance, popups, _) = affordance();
        affordance.enable();

        assert_eq!(affordance.control().click(), 1);
        let opened = popups.opened();
        assert_eq!(opened.len(), 1);
        assert!(matches!(
            &opened[0],
            PopupIntent::Document { state: PopupState::Add, manager: None }
        ));
    }

    #[test]
    fn missing_control_is_an_error() {
        let page = Page::with_control("add-card");
        assert!(page.control("add-card").is_ok());
        assert!(matches!(
            page.control("nope"),
            Err(PageError::MissingControl(id)) if id == "nope"
        ));
    }

    proptest! {
        #[test]
        fn any_toggle_sequence_leaves_at_most_one_listener(toggles in proptest::collection::vec(any::<bool>(), 1..64)) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let (affordance, popups, instantiator) = affordance();
            rt.block_on(instantiator.document_manager()).unwrap();

            for &on in &toggles {
                if on { affordance.enable() } else { affordance.disable() }
            }

            let last = *toggles.last().unwrap();
            let control = affordance.control();
            prop_assert_eq!(control.is_enabled(), last);
            prop_assert_eq!(control.listener_count(), usize::from(last));

            control.click();
            prop_assert_eq!(popups.count(PopupKind::Document), usize::from(last));
        }
    }
}
