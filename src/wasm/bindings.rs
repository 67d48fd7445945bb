//! Extern bindings for the objects a CIP-30 extension injects.
//!
//! Every async method returns a `Promise`; `catch` turns a synchronous throw
//! into `Err` instead of a wasm trap.

use js_sys::{Function, Object, Promise};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// `window.cardano[key]`
    #[wasm_bindgen(extends = Object)]
    #[derive(Clone, Debug)]
    pub type Cip30Wallet;

    #[wasm_bindgen(method, getter)]
    pub fn name(this: &Cip30Wallet) -> JsValue;

    #[wasm_bindgen(method, getter)]
    pub fn icon(this: &Cip30Wallet) -> JsValue;

    #[wasm_bindgen(method, getter, js_name = apiVersion)]
    pub fn api_version(this: &Cip30Wallet) -> JsValue;

    #[wasm_bindgen(method, catch)]
    pub fn enable(this: &Cip30Wallet) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch, js_name = isEnabled)]
    pub fn is_enabled(this: &Cip30Wallet) -> Result<Promise, JsValue>;

    /// Resolved value of `enable()`.
    #[wasm_bindgen(extends = Object)]
    #[derive(Clone, Debug)]
    pub type Cip30Api;

    #[wasm_bindgen(method, catch, js_name = getNetworkId)]
    pub fn get_network_id(this: &Cip30Api) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch, js_name = getUtxos)]
    pub fn get_utxos(this: &Cip30Api, amount: &JsValue, paginate: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch, js_name = getBalance)]
    pub fn get_balance(this: &Cip30Api) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch, js_name = getUsedAddresses)]
    pub fn get_used_addresses(this: &Cip30Api, paginate: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch, js_name = getUnusedAddresses)]
    pub fn get_unused_addresses(this: &Cip30Api) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch, js_name = getChangeAddress)]
    pub fn get_change_address(this: &Cip30Api) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch, js_name = getRewardAddresses)]
    pub fn get_reward_addresses(this: &Cip30Api) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch, js_name = signTx)]
    pub fn sign_tx(this: &Cip30Api, tx: &str, partial_sign: bool) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch, js_name = signData)]
    pub fn sign_data(this: &Cip30Api, address: &str, payload: &str) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch, js_name = submitTx)]
    pub fn submit_tx(this: &Cip30Api, tx: &str) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch, js_name = getCollateral)]
    pub fn get_collateral(this: &Cip30Api) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, getter)]
    pub fn experimental(this: &Cip30Api) -> JsValue;

    /// `api.experimental`, when the wallet provides one.
    #[wasm_bindgen(extends = Object)]
    #[derive(Clone, Debug)]
    pub type Cip30Experimental;

    #[wasm_bindgen(method, catch, js_name = getCollateral)]
    pub fn get_collateral(this: &Cip30Experimental) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch)]
    pub fn on(this: &Cip30Experimental, event: &str, callback: &Function) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch)]
    pub fn off(this: &Cip30Experimental, event: &str, callback: &Function) -> Result<(), JsValue>;
}
