//! Session Enabler - ask a named provider for its API handle.

use tracing::{debug, warn};

use crate::provider::{Cip30Api, ProviderRegistry, ProviderResult};

/// `Ok(None)` when nothing usable is injected under `name`.
///
/// Calls the provider's `enable()` exactly once. That call may stay pending
/// while the user decides; dropping the returned future is the only way to
/// abandon it. A rejection (user declined, account change) is passed through.
pub async fn enable<R: ProviderRegistry + ?Sized>(registry: &R, name: &str) -> ProviderResult<Option<Box<dyn Cip30Api>>> {
    let Some(provider) = registry.lookup(name) else {
        debug!(wallet = name, "enable: provider not injected");
        return Ok(None);
    };
    match provider.enable().await {
        Ok(api) => Ok(Some(api)),
        Err(e) => {
            warn!(wallet = name, error = %e, "enable: provider rejected");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::memory::{MemoryRegistry, MemoryWallet, WalletFixture, API_REFUSED};
    use futures::executor::block_on;

    #[test]
    fn missing_provider_is_not_an_error() {
        let registry = MemoryRegistry::absent();
        assert!(block_on(enable(&registry, "nami")).unwrap().is_none());
    }

    #[test]
    fn enables_exactly_once() {
        let registry = MemoryRegistry::new();
        let wallet = MemoryWallet::new(WalletFixture { network_id: 1, ..Default::default() });
        registry.inject("nami", wallet.clone());

        let api = block_on(enable(&registry, "nami")).unwrap().unwrap();
        assert_eq!(block_on(api.get_network_id()).unwrap(), 1);
        assert_eq!(wallet.enable_calls(), 1);
    }

    #[test]
    fn propagates_user_rejection() {
        let registry = MemoryRegistry::new();
        registry.inject("nami", MemoryWallet::new(WalletFixture { decline_enable: true, ..Default::default() }));
        let err = block_on(enable(&registry, "nami")).err().unwrap();
        assert_eq!(err.code, Some(API_REFUSED));
    }
}
