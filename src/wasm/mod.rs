//! WASM module: CIP-30 sessions in the browser
//!
//! Architecture:
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        CardanoWallet (JS API)           │
//! │  refresh, list, connect, disconnect     │
//! │  getAddress, getAssets, onChange        │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │     WalletSession<WindowRegistry>       │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │  JsWalletProvider / JsCip30Api          │
//! │  Promise → Future, JS error → APIError  │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │        window.cardano[key]              │
//! └─────────────────────────────────────────┘
//! ```

mod bindings;
mod registry;
mod session;

pub use bindings::{Cip30Api, Cip30Experimental, Cip30Wallet};
pub use registry::{JsCip30Api, JsWalletProvider, WindowRegistry};
pub use session::CardanoWallet;

use wasm_bindgen::prelude::*;

/// `[cip30]`-prefixed line on `console.debug`, or `console.warn` for failures.
pub fn console_log(message: &str, warn: bool) {
    let line = JsValue::from_str(&format!("[cip30] {}", message));
    if warn {
        web_sys::console::warn_1(&line);
    } else {
        web_sys::console::debug_1(&line);
    }
}

/// `log!(...)` for progress, `log!(warn: ...)` for failures.
macro_rules! log {
    (warn: $($t:tt)*) => {
        crate::wasm::console_log(&format!($($t)*), true)
    };
    ($($t:tt)*) => {
        crate::wasm::console_log(&format!($($t)*), false)
    };
}

pub(crate) use log;

/// Runs once when the module is instantiated.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    log!("cip30-session {} loaded", env!("CARGO_PKG_VERSION"));
}
