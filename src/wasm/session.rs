//! CardanoWallet: the JS-facing session class

use futures::StreamExt;
use serde::Serialize;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

use super::log;
use super::registry::WindowRegistry;
use crate::decode::{AddressForm, AddressFormat};
use crate::discovery::ProviderInfo;
use crate::facade::WalletFacade;
use crate::session::WalletSession;

fn js_error(message: impl ToString) -> JsValue {
    JsValue::from_str(&message.to_string())
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value.serialize(&serializer).map_err(js_error)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListedProvider<'a> {
    key: &'a str,
    name: &'a str,
    icon: &'a str,
    api_version: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StateView {
    phase: &'static str,
    connected: bool,
    selected: Option<ProviderInfo>,
    providers: usize,
}

/// Browser wallet session over `window.cardano`
#[wasm_bindgen]
pub struct CardanoWallet {
    session: Rc<WalletSession<WindowRegistry>>,
}

impl Default for CardanoWallet {
    fn default() -> Self { Self::new() }
}

impl CardanoWallet {
    fn facade(&self) -> Result<Rc<WalletFacade>, JsValue> {
        self.session.facade().get().ok_or_else(|| js_error("wallet not connected"))
    }

    fn state(&self) -> StateView {
        let state = self.session.snapshot();
        StateView {
            phase: state.phase.as_str(),
            connected: state.connected,
            selected: state.selected.map(|d| d.info),
            providers: state.providers.len(),
        }
    }
}

#[wasm_bindgen]
impl CardanoWallet {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self { session: Rc::new(WalletSession::new(WindowRegistry)) }
    }

    // =========================================================================
    // SESSION
    // =========================================================================

    /// Re-read `window.cardano`. Returns the number of usable providers.
    #[wasm_bindgen]
    pub fn refresh(&self) -> u32 {
        let count = self.session.refresh() as u32;
        log!("refresh: {} providers", count);
        count
    }

    /// `[{key, name, icon, apiVersion}]`
    #[wasm_bindgen]
    pub fn list(&self) -> Result<JsValue, JsValue> {
        let providers = self.session.providers().get();
        let listed: Vec<ListedProvider> = providers
            .iter()
            .map(|(key, d)| ListedProvider { key, name: d.name(), icon: d.icon(), api_version: d.api_version() })
            .collect();
        to_js(&listed)
    }

    /// Enable the provider under `name`. Unknown names resolve without effect.
    #[wasm_bindgen]
    pub async fn connect(&self, name: &str) -> Result<(), JsValue> {
        self.session.connect(name).await.map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn disconnect(&self) {
        self.session.disconnect();
    }

    #[wasm_bindgen(getter, js_name = "isConnected")]
    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// `{name, icon, apiVersion}` of the selected provider, or `null`.
    #[wasm_bindgen(getter)]
    pub fn selected(&self) -> Result<JsValue, JsValue> {
        match self.session.selected().get() {
            Some(descriptor) => to_js(&descriptor.info),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn phase(&self) -> String {
        self.session.phase().get().as_str().to_string()
    }

    /// Call `callback({phase, connected, selected, providers})` on every
    /// phase or provider-list change, starting with the current state.
    #[wasm_bindgen(js_name = "onChange")]
    pub fn on_change(&self, callback: js_sys::Function) {
        let phases = self.session.phase().subscribe().map(|_| ());
        // The provider list's first value duplicates the phase's initial one
        let providers = self.session.providers().subscribe().skip(1).map(|_| ());
        let wallet = CardanoWallet { session: self.session.clone() };
        wasm_bindgen_futures::spawn_local(async move {
            let mut changes = futures::stream::select(phases, providers);
            while changes.next().await.is_some() {
                if let Ok(view) = to_js(&wallet.state()) {
                    let _ = callback.call1(&JsValue::NULL, &view);
                }
            }
        });
    }

    // =========================================================================
    // DECODED DATA
    // =========================================================================

    /// Change address as `bech32` (default), `cbor`, `bytes`, `stakehex` or `stakekey`.
    #[wasm_bindgen(js_name = "getAddress")]
    pub async fn get_address(&self, format: Option<String>) -> Result<JsValue, JsValue> {
        let format = AddressFormat::parse(format.as_deref().unwrap_or_default());
        match self.facade()?.get_address(format).await.map_err(js_error)? {
            AddressForm::Text(text) => Ok(JsValue::from_str(&text)),
            AddressForm::Bytes(bytes) => Ok(js_sys::Uint8Array::from(bytes.as_slice()).into()),
        }
    }

    /// Balance filtered by `lovelace` (default), `ada`, `ft`, `nft`, `asset`, `handles` or `policy`.
    #[wasm_bindgen(js_name = "getAssets")]
    pub async fn get_assets(&self, filter: Option<String>, policy_id: Option<String>) -> Result<JsValue, JsValue> {
        let facade = self.facade()?;
        let balance = facade
            .get_assets_str(filter.as_deref().unwrap_or("lovelace"), policy_id.as_deref().unwrap_or_default())
            .await
            .map_err(js_error)?;
        to_js(&balance)
    }

    /// `signData(address, hex(utf8(message)))`
    #[wasm_bindgen(js_name = "getAuthorization")]
    pub async fn get_authorization(&self, address: &str, message: &str) -> Result<JsValue, JsValue> {
        let signature = self.facade()?.get_authorization(address, message).await.map_err(js_error)?;
        to_js(&signature)
    }
}
