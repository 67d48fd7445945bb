//! cip30-session: Cardano wallet sessions over CIP-30 providers.
//!
//! # Architecture
//!
//! ```text
//! ProviderRegistry (window.cardano | MemoryRegistry)
//!   │
//!   ├── discovery::discover ──▶ ProviderList
//!   │
//!   └── WalletSession (single writer of the session fields)
//!         ├── refresh()     → providers
//!         ├── connect(name) → selected, enabler::enable, facade, connected
//!         └── disconnect()  → clears selected/facade/connected
//!
//! WalletFacade (one enabled Cip30Api)
//!   ├── passthrough: getNetworkId, getUtxos, signTx, submitTx, ...
//!   └── decoded:     get_address(format), get_assets(filter), get_authorization
//!                        └── decode (CBOR values, CIP-19 addresses, Bech32)
//! ```
//!
//! # Session fields
//!
//! | Field | Type | Written by |
//! |-------|------|------------|
//! | providers | `ProviderList` | `refresh` |
//! | selected | `Option<ProviderDescriptor>` | `connect`, `disconnect` |
//! | facade | `Option<Rc<WalletFacade>>` | `connect`, `disconnect` |
//! | connected | `bool` | `connect`, `disconnect` |
//!
//! # Features
//!
//! - `native` - stderr logging, tokio runtime, `cip30-inspect` CLI
//! - `wasm` - `window.cardano` adapter and the `CardanoWallet` JS class
//!
//! # Usage
//!
//! ```ignore
//! use cip30_session::{AddressFormat, AssetFilter, MemoryRegistry, WalletSession};
//!
//! let session = WalletSession::new(MemoryRegistry::load("wallets.json".as_ref())?);
//! session.refresh();
//! session.connect("nami").await?;
//!
//! if let Some(facade) = session.facade().get() {
//!     let stake = facade.get_address(AddressFormat::StakeKey).await?;
//!     let ada = facade.get_assets(AssetFilter::Ada, "").await?;
//! }
//! ```

// =============================================================================
// Shared modules (compile everywhere)
// =============================================================================
pub mod config;
pub mod core;
pub mod decode;
pub mod discovery;
pub mod enabler;
pub mod error;
pub mod facade;
pub mod provider;
pub mod session;

// =============================================================================
// Native-only modules
// =============================================================================
#[cfg(feature = "native")]
pub mod logging;

// =============================================================================
// WASM-only modules (browser, wasm-bindgen)
// =============================================================================
#[cfg(feature = "wasm")]
pub mod wasm;

// =============================================================================
// Re-exports
// =============================================================================
pub use config::SessionConfig;
pub use decode::{AddressForm, AddressFormat, AssetEntry, AssetFilter, AssetKind, Balance};
pub use discovery::{discover, ProviderDescriptor, ProviderInfo, ProviderList};
pub use error::{DecodeError, ProviderError, WalletError, WalletResult};
pub use facade::WalletFacade;
pub use provider::memory::{MemoryRegistry, MemoryWallet, WalletFixture};
pub use provider::{Cip30Api, ProviderRegistry, WalletProvider};
pub use session::{Observable, SessionPhase, SessionState, WalletSession};

#[cfg(feature = "wasm")]
pub use wasm::{CardanoWallet, WindowRegistry};
