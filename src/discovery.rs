//! Provider Discovery - enumerate injected wallets as typed descriptors.
//!
//! Never fails: a host without a registry, or a registry without usable
//! providers, yields an empty list. Each call rebuilds the list from scratch.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::rc::Rc;
use tracing::debug;

use crate::config::SessionConfig;
use crate::provider::{InjectedEntry, ProviderRegistry, WalletProvider};

/// Display metadata of one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub name: String,
    pub icon: String,
    pub api_version: String,
}

/// A validated provider: metadata plus its enable/isEnabled capabilities.
#[derive(Clone)]
pub struct ProviderDescriptor {
    pub info: ProviderInfo,
    provider: Rc<dyn WalletProvider>,
}

impl ProviderDescriptor {
    pub fn new(provider: Rc<dyn WalletProvider>) -> Self {
        let info = ProviderInfo { name: provider.name(), icon: provider.icon(), api_version: provider.api_version() };
        Self { info, provider }
    }

    pub fn name(&self) -> &str { &self.info.name }
    pub fn icon(&self) -> &str { &self.info.icon }
    pub fn api_version(&self) -> &str { &self.info.api_version }
    pub fn provider(&self) -> &Rc<dyn WalletProvider> { &self.provider }
}

impl std::fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderDescriptor").field("info", &self.info).finish()
    }
}

impl PartialEq for ProviderDescriptor {
    fn eq(&self, other: &Self) -> bool { self.info == other.info && Rc::ptr_eq(&self.provider, &other.provider) }
}

/// Ordered `(registry key, descriptor)` pairs, keys unique.
pub type ProviderList = Vec<(String, ProviderDescriptor)>;

/// Why a registry entry was not published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Reserved,
    Denied,
    Malformed(String),
    Duplicate,
}

/// Turn one raw registry entry into a descriptor, or reject it.
pub fn validate_entry(key: &str, entry: &InjectedEntry, config: &SessionConfig) -> Result<ProviderDescriptor, Rejection> {
    if config.is_reserved(key) {
        return Err(Rejection::Reserved);
    }
    if config.is_denied(key) {
        return Err(Rejection::Denied);
    }
    match entry {
        InjectedEntry::Provider(provider) => Ok(ProviderDescriptor::new(provider.clone())),
        InjectedEntry::Malformed(reason) => Err(Rejection::Malformed(reason.clone())),
    }
}

pub fn discover<R: ProviderRegistry + ?Sized>(registry: &R, config: &SessionConfig) -> ProviderList {
    let Some(entries) = registry.injected() else {
        debug!("discovery: no provider registry on host");
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut providers = Vec::with_capacity(entries.len());
    for (key, entry) in entries {
        let result = if seen.contains(&key) {
            Err(Rejection::Duplicate)
        } else {
            validate_entry(&key, &entry, config)
        };
        match result {
            Ok(descriptor) => {
                seen.insert(key.clone());
                providers.push((key, descriptor));
            }
            Err(rejection) => debug!(key = %key, ?rejection, "discovery: entry skipped"),
        }
    }
    debug!("discovery: {} providers", providers.len());
    providers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::memory::{MemoryRegistry, MemoryWallet, WalletFixture};

    fn wallet(name: &str) -> MemoryWallet {
        MemoryWallet::new(WalletFixture { name: name.into(), api_version: "0.1.0".into(), ..Default::default() })
    }

    #[test]
    fn no_registry_yields_empty_list() {
        assert!(discover(&MemoryRegistry::absent(), &SessionConfig::new()).is_empty());
        assert!(discover(&MemoryRegistry::new(), &SessionConfig::new()).is_empty());
    }

    #[test]
    fn filters_reserved_denied_and_malformed() {
        let registry = MemoryRegistry::new();
        registry.inject("nami", wallet("Nami"));
        registry.inject("_events", wallet("bus"));
        registry.inject("typhon", wallet("Typhon"));
        registry.inject_malformed("flag", "not an object");
        registry.inject("eternl", wallet("Eternl"));

        let list = discover(&registry, &SessionConfig::new());
        let keys: Vec<_> = list.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["nami", "eternl"]);
        assert_eq!(list[0].1.name(), "Nami");
        assert_eq!(list[1].1.api_version(), "0.1.0");
    }

    #[test]
    fn validate_entry_reports_reason() {
        let config = SessionConfig::new();
        let malformed = InjectedEntry::Malformed("number".into());
        assert_eq!(validate_entry("x", &malformed, &config).unwrap_err(), Rejection::Malformed("number".into()));
        let provider = InjectedEntry::Provider(Rc::new(wallet("Typhon")));
        assert_eq!(validate_entry("typhon", &provider, &config).unwrap_err(), Rejection::Denied);
        assert_eq!(validate_entry("_events", &provider, &config).unwrap_err(), Rejection::Reserved);
    }

    #[test]
    fn repeated_discovery_reflects_late_injection() {
        let registry = MemoryRegistry::new();
        let config = SessionConfig::new();
        assert!(discover(&registry, &config).is_empty());
        registry.inject("lace", wallet("Lace"));
        assert_eq!(discover(&registry, &config).len(), 1);
        registry.remove("lace");
        assert!(discover(&registry, &config).is_empty());
    }
}
