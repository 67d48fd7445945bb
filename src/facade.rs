//! Wallet Facade - decoded-data view over one enabled CIP-30 API.
//!
//! Passthrough calls forward to the wrapped API unchanged. `get_address` and
//! `get_assets` fetch the raw payload on every call and hand it to the
//! decoder; failures are logged and returned, never half-decoded.

use tracing::error;

use crate::decode::{self, AddressForm, AddressFormat, AssetFilter, Balance};
use crate::error::{WalletError, WalletResult};
use crate::provider::{Cip30Api, DataSignature, EventCallback, Paginate, ProviderResult};

pub struct WalletFacade {
    api: Box<dyn Cip30Api>,
}

impl std::fmt::Debug for WalletFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_struct("WalletFacade").finish_non_exhaustive() }
}

impl WalletFacade {
    pub fn new(api: Box<dyn Cip30Api>) -> Self { Self { api } }

    // =========================================================================
    // PASSTHROUGH
    // =========================================================================

    /// 0 is testnet, 1 is mainnet. Other ids are wallet-defined.
    pub async fn get_network_id(&self) -> ProviderResult<u32> { self.api.get_network_id().await }

    /// All UTXOs, or only those needed to reach `amount` (`None` if unreachable).
    pub async fn get_utxos(&self, amount: Option<&str>, paginate: Option<Paginate>) -> ProviderResult<Option<Vec<String>>> {
        self.api.get_utxos(amount, paginate).await
    }

    /// Balance as CBOR hex. See [`WalletFacade::get_assets`] for the decoded form.
    pub async fn get_balance(&self) -> ProviderResult<String> { self.api.get_balance().await }

    pub async fn get_used_addresses(&self, paginate: Option<Paginate>) -> ProviderResult<Vec<String>> {
        self.api.get_used_addresses(paginate).await
    }

    pub async fn get_unused_addresses(&self) -> ProviderResult<Vec<String>> { self.api.get_unused_addresses().await }
    pub async fn get_change_address(&self) -> ProviderResult<String> { self.api.get_change_address().await }
    pub async fn get_reward_addresses(&self) -> ProviderResult<Vec<String>> { self.api.get_reward_addresses().await }

    /// Returns only the witnesses produced by this call.
    pub async fn sign_tx(&self, tx: &str, partial_sign: bool) -> ProviderResult<String> { self.api.sign_tx(tx, partial_sign).await }

    /// CIP-8 data signature over `payload` (hex).
    pub async fn sign_data(&self, address: &str, payload: &str) -> ProviderResult<DataSignature> {
        self.api.sign_data(address, payload).await
    }

    /// Transaction id on success.
    pub async fn submit_tx(&self, tx: &str) -> ProviderResult<String> { self.api.submit_tx(tx).await }

    pub async fn get_collateral(&self) -> ProviderResult<Option<Vec<String>>> { self.api.get_collateral().await }

    pub async fn experimental_get_collateral(&self) -> ProviderResult<Option<Vec<String>>> {
        self.api.experimental().get_collateral().await
    }

    pub fn experimental_on(&self, event: &str, callback: EventCallback) { self.api.experimental().on(event, callback) }
    pub fn experimental_off(&self, event: &str, callback: &EventCallback) { self.api.experimental().off(event, callback) }

    // =========================================================================
    // DECODED
    // =========================================================================

    /// Change address in the requested format.
    pub async fn get_address(&self, format: AddressFormat) -> WalletResult<AddressForm> {
        let result = async {
            let raw = self.api.get_change_address().await?;
            Ok::<_, WalletError>(decode::decode_address(&raw, format)?)
        }
        .await;
        if let Err(e) = &result {
            error!(format = format.as_str(), error = %e, "Error getting address");
        }
        result
    }

    /// Balance filtered by `filter`. `policy_id` is only read by [`AssetFilter::Policy`].
    pub async fn get_assets(&self, filter: AssetFilter, policy_id: &str) -> WalletResult<Balance> {
        let result = async {
            let raw = self.api.get_balance().await?;
            Ok::<_, WalletError>(decode::decode_balance(&raw, filter, policy_id)?)
        }
        .await;
        if let Err(e) = &result {
            error!(filter = filter.as_str(), error = %e, "Error getting assets");
        }
        result
    }

    /// String-typed variant used by the JS surface; unknown filters fail up front.
    pub async fn get_assets_str(&self, filter: &str, policy_id: &str) -> WalletResult<Balance> {
        let filter = AssetFilter::parse(filter).inspect_err(|e| error!(error = %e, "Error getting assets"))?;
        self.get_assets(filter, policy_id).await
    }

    /// Sign `message` (UTF-8) with `address` via `signData`.
    pub async fn get_authorization(&self, address: &str, message: &str) -> WalletResult<DataSignature> {
        let payload = hex::encode(message.as_bytes());
        self.api.sign_data(address, &payload).await.map_err(|source| {
            error!(error = %source, "Error signing data");
            WalletError::Authorization { context: format!("signData for {} failed", address), source }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::memory::{MemoryWallet, WalletFixture, DATA_SIGN_DECLINED};
    use crate::provider::WalletProvider;
    use futures::executor::block_on;

    const BASE: &str = "019493315cd92eb5d8c4304e67b7e16ae36d61d34502694657811a2c8e337b62cfff6403a06a3acbc34f8c46003c69fe79a3628cefa9c47251";

    fn facade(fixture: WalletFixture) -> (MemoryWallet, WalletFacade) {
        let wallet = MemoryWallet::new(fixture);
        let api = block_on(wallet.enable()).ok().unwrap();
        (wallet, WalletFacade::new(api))
    }

    #[test]
    fn get_address_decodes_every_call() {
        let (wallet, facade) = facade(WalletFixture { change_address: BASE.into(), ..Default::default() });
        let first = block_on(facade.get_address(AddressFormat::StakeHex)).unwrap();
        assert_eq!(first.as_text().unwrap(), "e1337b62cfff6403a06a3acbc34f8c46003c69fe79a3628cefa9c47251");

        // Enterprise address: no stake part any more
        wallet.update(|f| f.change_address = "619493315cd92eb5d8c4304e67b7e16ae36d61d34502694657811a2c8e".into());
        let err = block_on(facade.get_address(AddressFormat::StakeKey)).unwrap_err();
        assert!(matches!(err, WalletError::Decode(crate::error::DecodeError::InvalidAddressFormat { .. })));
    }

    #[test]
    fn get_assets_reports_decode_failure() {
        let (_, facade) = facade(WalletFixture { balance: "zz".into(), ..Default::default() });
        assert!(matches!(block_on(facade.get_assets(AssetFilter::Lovelace, "")), Err(WalletError::Decode(_))));
        assert!(matches!(block_on(facade.get_assets_str("bogus", "")), Err(WalletError::InvalidAssetFilter(_))));
    }

    #[test]
    fn get_authorization_hex_encodes_message() {
        let signature = DataSignature { signature: "84a0".into(), key: "a401".into() };
        let (wallet, facade) = facade(WalletFixture { signature: Some(signature.clone()), ..Default::default() });
        let got = block_on(facade.get_authorization(BASE, "hi ✓")).unwrap();
        assert_eq!(got, signature);
        assert_eq!(wallet.signed_payloads(), vec![(BASE.to_string(), "686920e29c93".to_string())]);
    }

    #[test]
    fn get_authorization_annotates_rejection() {
        let (_, facade) = facade(WalletFixture { decline_sign: true, ..Default::default() });
        match block_on(facade.get_authorization(BASE, "login")) {
            Err(WalletError::Authorization { source, .. }) => assert_eq!(source.code, Some(DATA_SIGN_DECLINED)),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn passthrough_forwards_unchanged() {
        let (wallet, facade) = facade(WalletFixture {
            network_id: 0,
            utxos: vec!["aa".into(), "bb".into(), "cc".into()],
            collateral: Some(vec!["aa".into()]),
            ..Default::default()
        });
        assert_eq!(block_on(facade.get_network_id()).unwrap(), 0);
        let page = block_on(facade.get_utxos(None, Some(Paginate { page: 1, limit: 2 }))).unwrap().unwrap();
        assert_eq!(page, vec!["cc".to_string()]);
        assert_eq!(block_on(facade.experimental_get_collateral()).unwrap(), Some(vec!["aa".to_string()]));
        block_on(facade.submit_tx("84a400")).unwrap();
        assert_eq!(wallet.submitted(), vec!["84a400".to_string()]);
    }
}
