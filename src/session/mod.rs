//! Session State Machine
//!
//! One `WalletSession` owns the four session fields and is their only writer.
//! Readers go through the [`Observable`] handles.
//!
//! ```text
//!  Idle ──refresh──▶ Discovered ──connect──▶ Connecting ──┬──▶ Connected
//!                                                         └──▶ ConnectFailed
//!  (any) ──disconnect──▶ Disconnected
//! ```
//!
//! Invariant after every single publish: `connected` implies `facade`,
//! and `facade` implies `selected`.
//!
//! Every `connect` and `disconnect` starts a new generation. A `connect`
//! whose generation has moved on by the time an await returns publishes
//! nothing more.

mod observable;

pub use observable::Observable;

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::discovery::{self, ProviderDescriptor, ProviderList};
use crate::enabler;
use crate::error::{ProviderError, WalletResult};
use crate::facade::WalletFacade;
use crate::provider::ProviderRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    #[default]
    Idle,
    Discovered,
    Connecting,
    Connected,
    ConnectFailed,
    Disconnected,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Discovered => "discovered",
            SessionPhase::Connecting => "connecting",
            SessionPhase::Connected => "connected",
            SessionPhase::ConnectFailed => "connectFailed",
            SessionPhase::Disconnected => "disconnected",
        }
    }
}

/// Point-in-time copy of every session field.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub providers: ProviderList,
    pub selected: Option<ProviderDescriptor>,
    pub facade: Option<Rc<WalletFacade>>,
    pub connected: bool,
    pub phase: SessionPhase,
}

pub struct WalletSession<R: ProviderRegistry> {
    registry: R,
    config: SessionConfig,
    providers: Observable<ProviderList>,
    selected: Observable<Option<ProviderDescriptor>>,
    facade: Observable<Option<Rc<WalletFacade>>>,
    connected: Observable<bool>,
    phase: Observable<SessionPhase>,
    generation: Cell<u64>,
}

impl<R: ProviderRegistry> WalletSession<R> {
    pub fn new(registry: R) -> Self { Self::with_config(registry, SessionConfig::default()) }

    pub fn with_config(registry: R, config: SessionConfig) -> Self {
        Self {
            registry,
            config,
            providers: Observable::new(Vec::new()),
            selected: Observable::new(None),
            facade: Observable::new(None),
            connected: Observable::new(false),
            phase: Observable::new(SessionPhase::Idle),
            generation: Cell::new(0),
        }
    }

    pub fn registry(&self) -> &R { &self.registry }
    pub fn config(&self) -> &SessionConfig { &self.config }

    pub fn providers(&self) -> &Observable<ProviderList> { &self.providers }
    pub fn selected(&self) -> &Observable<Option<ProviderDescriptor>> { &self.selected }
    pub fn facade(&self) -> &Observable<Option<Rc<WalletFacade>>> { &self.facade }
    pub fn connected(&self) -> &Observable<bool> { &self.connected }
    pub fn phase(&self) -> &Observable<SessionPhase> { &self.phase }

    pub fn is_connected(&self) -> bool { self.connected.get() }

    pub fn snapshot(&self) -> SessionState {
        SessionState {
            providers: self.providers.get(),
            selected: self.selected.get(),
            facade: self.facade.get(),
            connected: self.connected.get(),
            phase: self.phase.get(),
        }
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Re-run discovery and replace the provider list.
    pub fn refresh(&self) -> usize {
        let list = discovery::discover(&self.registry, &self.config);
        let count = list.len();
        self.providers.set(list);
        if matches!(self.phase.get(), SessionPhase::Idle | SessionPhase::Discovered) {
            self.phase.set(if count == 0 { SessionPhase::Idle } else { SessionPhase::Discovered });
        }
        debug!(providers = count, "session: refreshed");
        count
    }

    /// Select, enable and probe the provider listed under `name`.
    ///
    /// Unknown names are ignored. `connected` is set from a fresh
    /// `isEnabled()` after the facade is published, so a facade can be
    /// present while `connected` stays false.
    pub async fn connect(&self, name: &str) -> WalletResult<()> {
        let Some(descriptor) = self.listed(name) else {
            debug!(wallet = name, "connect: not in provider list, ignored");
            return Ok(());
        };

        let ticket = self.advance();
        self.connected.set(false);
        self.facade.set(None);
        self.selected.set(Some(descriptor));
        self.phase.set(SessionPhase::Connecting);
        info!(wallet = name, "session: connecting");

        let outcome = enabler::enable(&self.registry, name).await;
        if self.superseded(ticket, name) {
            return Ok(());
        }
        let api = match outcome {
            Ok(Some(api)) => api,
            Ok(None) => {
                self.phase.set(SessionPhase::ConnectFailed);
                warn!(wallet = name, "session: provider vanished before enable");
                return Err(ProviderError::other(format!("provider '{}' is no longer injected", name)).into());
            }
            Err(e) => {
                self.phase.set(SessionPhase::ConnectFailed);
                return Err(e.into());
            }
        };
        self.facade.set(Some(Rc::new(WalletFacade::new(api))));

        let enabled = match self.registry.lookup(name) {
            Some(provider) => provider.is_enabled().await,
            None => Ok(false),
        };
        if self.superseded(ticket, name) {
            return Ok(());
        }
        match enabled {
            Ok(true) => {
                self.connected.set(true);
                self.phase.set(SessionPhase::Connected);
                info!(wallet = name, "session: connected");
                Ok(())
            }
            Ok(false) => {
                self.phase.set(SessionPhase::ConnectFailed);
                warn!(wallet = name, "session: enabled but provider reports disabled");
                Ok(())
            }
            Err(e) => {
                self.phase.set(SessionPhase::ConnectFailed);
                warn!(wallet = name, error = %e, "session: isEnabled failed");
                Err(e.into())
            }
        }
    }

    /// Clear facade, selection and connectivity. Idempotent.
    pub fn disconnect(&self) {
        self.advance();
        self.connected.set(false);
        self.facade.set(None);
        self.selected.set(None);
        self.phase.set(SessionPhase::Disconnected);
        info!("session: disconnected");
    }

    fn advance(&self) -> u64 {
        let next = self.generation.get().wrapping_add(1);
        self.generation.set(next);
        next
    }

    fn superseded(&self, ticket: u64, name: &str) -> bool {
        let stale = self.generation.get() != ticket;
        if stale {
            debug!(wallet = name, "connect: superseded, result dropped");
        }
        stale
    }

    fn listed(&self, name: &str) -> Option<ProviderDescriptor> {
        self.providers.get().into_iter().find(|(key, _)| key == name).map(|(_, d)| d)
    }
}
