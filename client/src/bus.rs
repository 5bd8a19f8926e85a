//! Page-level delivery of authentication signals.
//!
//! The auth subsystem publishes [`AuthSignal`]s onto a [`SignalBus`]; pages
//! subscribe and keep the returned [`Subscription`] for as long as they want
//! to be told. Delivery is synchronous with `publish`, so a subscriber
//! registered before a signal is published always sees it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use common::AuthSignal;
use tracing::debug;

use crate::listeners::{ListenerId, Listeners};

#[derive(Default)]
pub struct SignalBus {
    logged_in: Arc<Listeners<AuthSignal>>,
    not_logged_in: Arc<Listeners<AuthSignal>>,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self, signal: AuthSignal) -> &Arc<Listeners<AuthSignal>> {
        match signal {
            AuthSignal::LoggedIn => &self.logged_in,
            AuthSignal::NotLoggedIn => &self.not_logged_in,
        }
    }

    pub fn subscribe<F>(&self, signal: AuthSignal, callback: F) -> Subscription
    where
        F: Fn(&AuthSignal) + Send + Sync + 'static,
    {
        let registry = Arc::clone(self.registry(signal));
        let id = registry.attach(callback);
        Subscription {
            signal,
            registry,
            id: Some(id),
        }
    }

    /// Delivers `signal` to its subscribers. Returns how many were reached.
    pub fn publish(&self, signal: AuthSignal) -> usize {
        let delivered = self.registry(signal).emit(&signal);
        debug!(%signal, delivered, "auth signal published");
        delivered
    }

    pub fn subscriber_count(&self, signal: AuthSignal) -> usize {
        self.registry(signal).len()
    }
}

/// Owned registration on a [`SignalBus`]. Unsubscribes when dropped.
pub struct Subscription {
    signal: AuthSignal,
    registry: Arc<Listeners<AuthSignal>>,
    id: Option<ListenerId>,
}

impl Subscription {
    pub fn signal(&self) -> AuthSignal {
        self.signal
    }

    pub fn cancel(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(id) = self.id.take() {
            self.registry.detach(id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

/// The authentication subsystem as seen from a page: asking it to check
/// makes it publish one of the two signals.
pub trait AuthCheck: Send + Sync {
    fn check(&self);
}

/// Session-flag backed [`AuthCheck`] that answers on a [`SignalBus`].
pub struct SessionAuth {
    bus: Arc<SignalBus>,
    logged_in: AtomicBool,
}

impl SessionAuth {
    pub fn new(bus: Arc<SignalBus>, logged_in: bool) -> Self {
        Self {
            bus,
            logged_in: AtomicBool::new(logged_in),
        }
    }

    /// Updates the session and publishes the matching signal right away.
    pub fn set_logged_in(&self, logged_in: bool) {
        self.logged_in.store(logged_in, Ordering::SeqCst);
        self.bus.publish(AuthSignal::from_logged_in(logged_in));
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::SeqCst)
    }
}

impl AuthCheck for SessionAuth {
    fn check(&self) {
        self.bus
            .publish(AuthSignal::from_logged_in(self.is_logged_in()));
    }
}
