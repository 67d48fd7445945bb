//! CIP-30 provider surface
//!
//! The host injects one object per installed wallet extension. These traits
//! are the only view the rest of the crate has of those objects, so the
//! facade and session never touch a host binding directly.
//!
//! ```text
//! ProviderRegistry (window.cardano, or MemoryRegistry)
//!     │
//!     └── key → InjectedEntry::Provider(WalletProvider)
//!                     │ enable()
//!                     ▼
//!                 Cip30Api  ── experimental() ──▶ ExperimentalApi
//! ```

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::rc::Rc;

pub use crate::error::ProviderError;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Listener for `experimental.on/off`. Compared by pointer identity.
pub type EventCallback = Rc<dyn Fn(Value)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginate {
    pub page: u32,
    pub limit: u32,
}

/// CIP-8 `COSE_Sign1` / `COSE_Key` pair, CBOR hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSignature {
    pub signature: String,
    pub key: String,
}

/// The enabled API handle. Every payload stays raw hex/CBOR here.
#[async_trait(?Send)]
pub trait Cip30Api {
    async fn get_network_id(&self) -> ProviderResult<u32>;
    async fn get_utxos(&self, amount: Option<&str>, paginate: Option<Paginate>) -> ProviderResult<Option<Vec<String>>>;
    async fn get_balance(&self) -> ProviderResult<String>;
    async fn get_used_addresses(&self, paginate: Option<Paginate>) -> ProviderResult<Vec<String>>;
    async fn get_unused_addresses(&self) -> ProviderResult<Vec<String>>;
    async fn get_change_address(&self) -> ProviderResult<String>;
    async fn get_reward_addresses(&self) -> ProviderResult<Vec<String>>;
    async fn sign_tx(&self, tx: &str, partial_sign: bool) -> ProviderResult<String>;
    async fn sign_data(&self, address: &str, payload: &str) -> ProviderResult<DataSignature>;
    async fn submit_tx(&self, tx: &str) -> ProviderResult<String>;
    async fn get_collateral(&self) -> ProviderResult<Option<Vec<String>>>;
    fn experimental(&self) -> &dyn ExperimentalApi;
}

/// Non-standard `api.experimental` object.
#[async_trait(?Send)]
pub trait ExperimentalApi {
    async fn get_collateral(&self) -> ProviderResult<Option<Vec<String>>>;
    fn on(&self, event: &str, callback: EventCallback);
    fn off(&self, event: &str, callback: &EventCallback);
}

/// One injected wallet extension.
#[async_trait(?Send)]
pub trait WalletProvider {
    fn name(&self) -> String;
    fn icon(&self) -> String;
    fn api_version(&self) -> String;
    /// May prompt the user and stay pending until they answer.
    async fn enable(&self) -> ProviderResult<Box<dyn Cip30Api>>;
    async fn is_enabled(&self) -> ProviderResult<bool>;
}

/// A raw registry entry, before discovery validates it.
#[derive(Clone)]
pub enum InjectedEntry {
    Provider(Rc<dyn WalletProvider>),
    /// Present under the key but not a usable provider object.
    Malformed(String),
}

impl std::fmt::Debug for InjectedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InjectedEntry::Provider(p) => write!(f, "Provider({})", p.name()),
            InjectedEntry::Malformed(reason) => write!(f, "Malformed({})", reason),
        }
    }
}

/// The host's injected-provider map.
pub trait ProviderRegistry {
    /// `None` when the host has no registry at all.
    fn injected(&self) -> Option<Vec<(String, InjectedEntry)>>;

    /// Currently injected provider under `key`, if it is a usable object.
    fn lookup(&self, key: &str) -> Option<Rc<dyn WalletProvider>> {
        self.injected()?.into_iter().find_map(|(k, entry)| match entry {
            InjectedEntry::Provider(p) if k == key => Some(p),
            _ => None,
        })
    }
}

impl<R: ProviderRegistry + ?Sized> ProviderRegistry for Rc<R> {
    fn injected(&self) -> Option<Vec<(String, InjectedEntry)>> { (**self).injected() }
    fn lookup(&self, key: &str) -> Option<Rc<dyn WalletProvider>> { (**self).lookup(key) }
}
