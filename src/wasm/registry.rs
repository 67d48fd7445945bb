//! `window.cardano` as a [`ProviderRegistry`], and the trait adapters over
//! the injected JS objects.

use async_trait::async_trait;
use js_sys::{Array, Function, Object, Promise, Reflect};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use super::bindings;
use super::log;
use crate::provider::{
    Cip30Api, DataSignature, EventCallback, ExperimentalApi, InjectedEntry, Paginate, ProviderError, ProviderRegistry,
    ProviderResult, WalletProvider,
};

// =============================================================================
// JS → Rust conversions
// =============================================================================

fn prop(target: &JsValue, key: &str) -> JsValue { Reflect::get(target, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED) }

/// CIP-30 `APIError` / `DataSignError` / `TxSendError` shapes, or anything thrown.
fn provider_error(value: JsValue) -> ProviderError {
    let code = prop(&value, "code").as_f64().map(|c| c as i64);
    let info = prop(&value, "info")
        .as_string()
        .or_else(|| prop(&value, "message").as_string())
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value));
    ProviderError::new(code, info)
}

async fn settle(call: Result<Promise, JsValue>) -> ProviderResult<JsValue> {
    let promise = call.map_err(provider_error)?;
    JsFuture::from(promise).await.map_err(provider_error)
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> ProviderResult<T> {
    serde_wasm_bindgen::from_value(value).map_err(|e| ProviderError::other(format!("unexpected response: {}", e)))
}

fn to_js_opt(paginate: Option<Paginate>) -> JsValue {
    paginate
        .and_then(|p| serde_wasm_bindgen::to_value(&p).ok())
        .unwrap_or(JsValue::UNDEFINED)
}

fn string(value: JsValue) -> ProviderResult<String> {
    value.as_string().ok_or_else(|| ProviderError::other("expected a string"))
}

fn optional_list(value: JsValue) -> ProviderResult<Option<Vec<String>>> {
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    from_js(value).map(Some)
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Live view of `window.cardano`. Each call reads the current object.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowRegistry;

impl WindowRegistry {
    fn cardano() -> Option<JsValue> {
        let window = web_sys::window()?;
        let cardano = prop(&window, "cardano");
        cardano.is_object().then_some(cardano)
    }

    fn entry(key: &str, value: JsValue) -> InjectedEntry {
        if !value.is_object() {
            return InjectedEntry::Malformed("not an object".into());
        }
        if !prop(&value, "enable").is_function() || !prop(&value, "isEnabled").is_function() {
            return InjectedEntry::Malformed("enable/isEnabled are not callable".into());
        }
        InjectedEntry::Provider(Rc::new(JsWalletProvider::new(key, value.unchecked_into())))
    }
}

impl ProviderRegistry for WindowRegistry {
    fn injected(&self) -> Option<Vec<(String, InjectedEntry)>> {
        let cardano = Self::cardano()?;
        let keys: Array = Object::keys(cardano.unchecked_ref());
        Some(
            keys.iter()
                .filter_map(|k| k.as_string())
                .map(|key| {
                    let entry = Self::entry(&key, prop(&cardano, &key));
                    (key, entry)
                })
                .collect(),
        )
    }
}

// =============================================================================
// PROVIDER
// =============================================================================

pub struct JsWalletProvider {
    key: String,
    inner: bindings::Cip30Wallet,
}

impl JsWalletProvider {
    pub fn new(key: &str, inner: bindings::Cip30Wallet) -> Self { Self { key: key.to_string(), inner } }
}

#[async_trait(?Send)]
impl WalletProvider for JsWalletProvider {
    fn name(&self) -> String { self.inner.name().as_string().unwrap_or_else(|| self.key.clone()) }
    fn icon(&self) -> String { self.inner.icon().as_string().unwrap_or_default() }
    fn api_version(&self) -> String { self.inner.api_version().as_string().unwrap_or_default() }

    async fn enable(&self) -> ProviderResult<Box<dyn Cip30Api>> {
        let api = settle(self.inner.enable()).await?;
        if !api.is_object() {
            return Err(ProviderError::other(format!("{}: enable() resolved to a non-object", self.key)));
        }
        log!("{} enabled", self.key);
        Ok(Box::new(JsCip30Api::new(api.unchecked_into())))
    }

    async fn is_enabled(&self) -> ProviderResult<bool> {
        Ok(settle(self.inner.is_enabled()).await?.as_bool().unwrap_or(false))
    }
}

// =============================================================================
// API
// =============================================================================

pub struct JsCip30Api {
    inner: bindings::Cip30Api,
    experimental: JsExperimental,
}

impl JsCip30Api {
    pub fn new(inner: bindings::Cip30Api) -> Self {
        let experimental = inner.experimental();
        let experimental = experimental.is_object().then(|| experimental.unchecked_into());
        Self { inner, experimental: JsExperimental { inner: experimental, listeners: RefCell::new(Vec::new()) } }
    }
}

#[async_trait(?Send)]
impl Cip30Api for JsCip30Api {
    async fn get_network_id(&self) -> ProviderResult<u32> {
        let id = settle(self.inner.get_network_id()).await?;
        id.as_f64().map(|n| n as u32).ok_or_else(|| ProviderError::other("expected a number"))
    }

    async fn get_utxos(&self, amount: Option<&str>, paginate: Option<Paginate>) -> ProviderResult<Option<Vec<String>>> {
        let amount = amount.map(JsValue::from_str).unwrap_or(JsValue::UNDEFINED);
        optional_list(settle(self.inner.get_utxos(&amount, &to_js_opt(paginate))).await?)
    }

    async fn get_balance(&self) -> ProviderResult<String> { string(settle(self.inner.get_balance()).await?) }

    async fn get_used_addresses(&self, paginate: Option<Paginate>) -> ProviderResult<Vec<String>> {
        from_js(settle(self.inner.get_used_addresses(&to_js_opt(paginate))).await?)
    }

    async fn get_unused_addresses(&self) -> ProviderResult<Vec<String>> { from_js(settle(self.inner.get_unused_addresses()).await?) }
    async fn get_change_address(&self) -> ProviderResult<String> { string(settle(self.inner.get_change_address()).await?) }
    async fn get_reward_addresses(&self) -> ProviderResult<Vec<String>> { from_js(settle(self.inner.get_reward_addresses()).await?) }

    async fn sign_tx(&self, tx: &str, partial_sign: bool) -> ProviderResult<String> {
        string(settle(self.inner.sign_tx(tx, partial_sign)).await?)
    }

    async fn sign_data(&self, address: &str, payload: &str) -> ProviderResult<DataSignature> {
        from_js(settle(self.inner.sign_data(address, payload)).await?)
    }

    async fn submit_tx(&self, tx: &str) -> ProviderResult<String> { string(settle(self.inner.submit_tx(tx)).await?) }

    async fn get_collateral(&self) -> ProviderResult<Option<Vec<String>>> {
        optional_list(settle(self.inner.get_collateral()).await?)
    }

    fn experimental(&self) -> &dyn ExperimentalApi { &self.experimental }
}

struct JsExperimental {
    inner: Option<bindings::Cip30Experimental>,
    /// JS closures stay alive until `off` removes them.
    listeners: RefCell<Vec<(String, EventCallback, Closure<dyn Fn(JsValue)>)>>,
}

impl JsExperimental {
    fn api(&self) -> ProviderResult<&bindings::Cip30Experimental> {
        self.inner.as_ref().ok_or_else(|| ProviderError::other("wallet has no experimental API"))
    }
}

#[async_trait(?Send)]
impl ExperimentalApi for JsExperimental {
    async fn get_collateral(&self) -> ProviderResult<Option<Vec<String>>> {
        optional_list(settle(self.api()?.get_collateral()).await?)
    }

    fn on(&self, event: &str, callback: EventCallback) {
        let Ok(api) = self.api() else {
            log!(warn: "experimental.on({}) ignored: no experimental API", event);
            return;
        };
        let forward = callback.clone();
        let closure = Closure::wrap(Box::new(move |payload: JsValue| {
            forward(serde_wasm_bindgen::from_value::<Value>(payload).unwrap_or(Value::Null))
        }) as Box<dyn Fn(JsValue)>);
        if let Err(e) = api.on(event, closure.as_ref().unchecked_ref::<Function>()) {
            log!(warn: "experimental.on({}) failed: {}", event, provider_error(e));
            return;
        }
        self.listeners.borrow_mut().push((event.to_string(), callback, closure));
    }

    fn off(&self, event: &str, callback: &EventCallback) {
        let removed = {
            let mut listeners = self.listeners.borrow_mut();
            let index = listeners.iter().position(|(name, cb, _)| name == event && Rc::ptr_eq(cb, callback));
            index.map(|i| listeners.remove(i))
        };
        if let (Some((_, _, closure)), Ok(api)) = (removed, self.api()) {
            if let Err(e) = api.off(event, closure.as_ref().unchecked_ref::<Function>()) {
                log!(warn: "experimental.off({}) failed: {}", event, provider_error(e));
            }
        }
    }
}
