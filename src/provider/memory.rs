//! In-memory host - a `window.cardano` stand-in for native hosts and tests.
//!
//! Wallets are described by a JSON fixture:
//!
//! ```json
//! {
//!   "cardano": {
//!     "nami": {
//!       "name": "Nami", "icon": "data:...", "apiVersion": "0.1.0",
//!       "networkId": 1,
//!       "changeAddress": "01...",
//!       "balance": "821a...",
//!       "signature": { "signature": "84...", "key": "a4..." }
//!     },
//!     "_events": 3
//!   }
//! }
//! ```
//!
//! Non-object values become malformed entries, exactly like a foreign value
//! sitting under `window.cardano`.

use async_trait::async_trait;
use futures::channel::oneshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use super::{
    Cip30Api, DataSignature, EventCallback, ExperimentalApi, InjectedEntry, Paginate, ProviderError, ProviderRegistry,
    ProviderResult, WalletProvider,
};

/// CIP-30 `APIErrorCode.Refused`.
pub const API_REFUSED: i64 = -3;
/// CIP-30 `DataSignErrorCode.UserDeclined`.
pub const DATA_SIGN_DECLINED: i64 = 3;
/// CIP-30 `TxSignErrorCode.UserDeclined`.
pub const TX_SIGN_DECLINED: i64 = 2;

/// Behaviour of one in-memory wallet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WalletFixture {
    pub name: String,
    pub icon: String,
    pub api_version: String,
    /// Current `isEnabled()` answer; `enable()` flips it to true.
    pub enabled: bool,
    /// `isEnabled()` keeps answering false even after a successful enable.
    pub report_disabled: bool,
    pub decline_enable: bool,
    pub decline_sign: bool,
    pub network_id: u32,
    pub change_address: String,
    pub balance: String,
    pub utxos: Vec<String>,
    pub collateral: Option<Vec<String>>,
    pub used_addresses: Vec<String>,
    pub unused_addresses: Vec<String>,
    pub reward_addresses: Vec<String>,
    pub signature: Option<DataSignature>,
}

/// Top-level fixture document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostFixture {
    /// `None` models a host without any provider registry.
    pub cardano: Option<BTreeMap<String, Value>>,
}

#[derive(Default)]
struct WalletState {
    fixture: WalletFixture,
    enable_calls: u32,
    signed: Vec<(String, String)>,
    submitted: Vec<String>,
    listeners: Vec<(String, EventCallback)>,
    gate: Option<oneshot::Receiver<()>>,
}

/// A wallet extension living in memory. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryWallet {
    state: Rc<RefCell<WalletState>>,
}

impl MemoryWallet {
    pub fn new(fixture: WalletFixture) -> Self {
        Self { state: Rc::new(RefCell::new(WalletState { fixture, ..Default::default() })) }
    }

    pub fn fixture(&self) -> WalletFixture { self.state.borrow().fixture.clone() }
    pub fn update(&self, f: impl FnOnce(&mut WalletFixture)) { f(&mut self.state.borrow_mut().fixture) }
    pub fn enable_calls(&self) -> u32 { self.state.borrow().enable_calls }
    pub fn signed_payloads(&self) -> Vec<(String, String)> { self.state.borrow().signed.clone() }
    pub fn submitted(&self) -> Vec<String> { self.state.borrow().submitted.clone() }
    pub fn listener_count(&self) -> usize { self.state.borrow().listeners.len() }

    /// Hold the next `enable()` pending until the returned sender fires or drops.
    pub fn hold_enable(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state.borrow_mut().gate = Some(rx);
        tx
    }

    /// Deliver an `experimental` event to every registered listener.
    pub fn emit(&self, event: &str, payload: Value) {
        let listeners: Vec<EventCallback> = self
            .state
            .borrow()
            .listeners
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, cb)| cb.clone())
            .collect();
        for cb in listeners {
            cb(payload.clone());
        }
    }
}

#[async_trait(?Send)]
impl WalletProvider for MemoryWallet {
    fn name(&self) -> String { self.state.borrow().fixture.name.clone() }
    fn icon(&self) -> String { self.state.borrow().fixture.icon.clone() }
    fn api_version(&self) -> String { self.state.borrow().fixture.api_version.clone() }

    async fn enable(&self) -> ProviderResult<Box<dyn Cip30Api>> {
        let gate = {
            let mut state = self.state.borrow_mut();
            state.enable_calls += 1;
            state.gate.take()
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let mut state = self.state.borrow_mut();
        if state.fixture.decline_enable {
            return Err(ProviderError::new(Some(API_REFUSED), "user declined access"));
        }
        state.fixture.enabled = true;
        Ok(Box::new(MemoryApi { wallet: self.clone() }))
    }

    async fn is_enabled(&self) -> ProviderResult<bool> {
        let state = self.state.borrow();
        Ok(state.fixture.enabled && !state.fixture.report_disabled)
    }
}

/// Enabled API handle over a [`MemoryWallet`].
pub struct MemoryApi {
    wallet: MemoryWallet,
}

impl MemoryApi {
    fn state(&self) -> std::cell::Ref<'_, WalletState> { self.wallet.state.borrow() }
}

/// Zero-based `page` of `limit` items. Offsets past the end give an empty page.
fn page(items: Vec<String>, paginate: Option<Paginate>) -> Vec<String> {
    match paginate {
        Some(p) => {
            let offset = (p.page as usize).saturating_mul(p.limit as usize);
            items.into_iter().skip(offset).take(p.limit as usize).collect()
        }
        None => items,
    }
}

#[async_trait(?Send)]
impl Cip30Api for MemoryApi {
    async fn get_network_id(&self) -> ProviderResult<u32> { Ok(self.state().fixture.network_id) }

    async fn get_utxos(&self, _amount: Option<&str>, paginate: Option<Paginate>) -> ProviderResult<Option<Vec<String>>> {
        Ok(Some(page(self.state().fixture.utxos.clone(), paginate)))
    }

    async fn get_balance(&self) -> ProviderResult<String> { Ok(self.state().fixture.balance.clone()) }

    async fn get_used_addresses(&self, paginate: Option<Paginate>) -> ProviderResult<Vec<String>> {
        Ok(page(self.state().fixture.used_addresses.clone(), paginate))
    }

    async fn get_unused_addresses(&self) -> ProviderResult<Vec<String>> { Ok(self.state().fixture.unused_addresses.clone()) }
    async fn get_change_address(&self) -> ProviderResult<String> { Ok(self.state().fixture.change_address.clone()) }
    async fn get_reward_addresses(&self) -> ProviderResult<Vec<String>> { Ok(self.state().fixture.reward_addresses.clone()) }

    async fn sign_tx(&self, _tx: &str, _partial_sign: bool) -> ProviderResult<String> {
        if self.state().fixture.decline_sign {
            return Err(ProviderError::new(Some(TX_SIGN_DECLINED), "user declined to sign"));
        }
        // empty witness set
        Ok("a0".to_string())
    }

    async fn sign_data(&self, address: &str, payload: &str) -> ProviderResult<DataSignature> {
        let mut state = self.wallet.state.borrow_mut();
        if state.fixture.decline_sign {
            return Err(ProviderError::new(Some(DATA_SIGN_DECLINED), "user declined to sign"));
        }
        state.signed.push((address.to_string(), payload.to_string()));
        state
            .fixture
            .signature
            .clone()
            .ok_or_else(|| ProviderError::other("no signature configured"))
    }

    async fn submit_tx(&self, tx: &str) -> ProviderResult<String> {
        self.wallet.state.borrow_mut().submitted.push(tx.to_string());
        Ok(format!("{:064x}", self.wallet.submitted().len()))
    }

    async fn get_collateral(&self) -> ProviderResult<Option<Vec<String>>> { Ok(self.state().fixture.collateral.clone()) }

    fn experimental(&self) -> &dyn ExperimentalApi { self }
}

#[async_trait(?Send)]
impl ExperimentalApi for MemoryApi {
    async fn get_collateral(&self) -> ProviderResult<Option<Vec<String>>> { Ok(self.state().fixture.collateral.clone()) }

    fn on(&self, event: &str, callback: EventCallback) {
        self.wallet.state.borrow_mut().listeners.push((event.to_string(), callback));
    }

    fn off(&self, event: &str, callback: &EventCallback) {
        self.wallet
            .state
            .borrow_mut()
            .listeners
            .retain(|(name, cb)| !(name == event && Rc::ptr_eq(cb, callback)));
    }
}

enum MemoryEntry {
    Wallet(MemoryWallet),
    Malformed(String),
}

/// Registry backed by memory. Insertion order is preserved.
pub struct MemoryRegistry {
    entries: RefCell<Option<Vec<(String, MemoryEntry)>>>,
}

impl Default for MemoryRegistry {
    fn default() -> Self { Self::new() }
}

impl MemoryRegistry {
    /// A host with an empty registry.
    pub fn new() -> Self { Self { entries: RefCell::new(Some(Vec::new())) } }

    /// A host with no registry at all (no extension ever injected).
    pub fn absent() -> Self { Self { entries: RefCell::new(None) } }

    pub fn from_fixture(fixture: HostFixture) -> anyhow::Result<Self> {
        let Some(cardano) = fixture.cardano else { return Ok(Self::absent()) };
        let registry = Self::new();
        for (key, value) in cardano {
            if value.is_object() {
                let wallet: WalletFixture = serde_json::from_value(value)
                    .map_err(|e| anyhow::anyhow!("wallet '{}': {}", key, e))?;
                registry.inject(key, MemoryWallet::new(wallet));
            } else {
                registry.inject_malformed(key, "not an object");
            }
        }
        Ok(registry)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("read {}: {}", path.display(), e))?;
        let fixture: HostFixture = serde_json::from_str(&contents)?;
        Self::from_fixture(fixture)
    }

    fn push(&self, key: String, entry: MemoryEntry) {
        let mut entries = self.entries.borrow_mut();
        let list = entries.get_or_insert_with(Vec::new);
        list.retain(|(k, _)| *k != key);
        list.push((key, entry));
    }

    /// Inject (or replace) a wallet, as an extension does when it loads.
    pub fn inject(&self, key: impl Into<String>, wallet: MemoryWallet) { self.push(key.into(), MemoryEntry::Wallet(wallet)) }

    pub fn inject_malformed(&self, key: impl Into<String>, reason: impl Into<String>) {
        self.push(key.into(), MemoryEntry::Malformed(reason.into()))
    }

    pub fn remove(&self, key: &str) {
        if let Some(list) = self.entries.borrow_mut().as_mut() {
            list.retain(|(k, _)| k != key);
        }
    }

    pub fn wallet(&self, key: &str) -> Option<MemoryWallet> {
        self.entries.borrow().as_ref()?.iter().find_map(|(k, entry)| match entry {
            MemoryEntry::Wallet(w) if k == key => Some(w.clone()),
            _ => None,
        })
    }
}

impl ProviderRegistry for MemoryRegistry {
    fn injected(&self) -> Option<Vec<(String, InjectedEntry)>> {
        let entries = self.entries.borrow();
        Some(
            entries
                .as_ref()?
                .iter()
                .map(|(key, entry)| {
                    let entry = match entry {
                        MemoryEntry::Wallet(w) => InjectedEntry::Provider(Rc::new(w.clone())),
                        MemoryEntry::Malformed(reason) => InjectedEntry::Malformed(reason.clone()),
                    };
                    (key.clone(), entry)
                })
                .collect(),
        )
    }
}
