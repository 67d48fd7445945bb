//! Binary Decoder - hex/CBOR payloads from a CIP-30 API into typed data.
//!
//! Pure, synchronous functions. Every call starts from the raw provider
//! payload; nothing is cached.
//!
//! ```text
//! getChangeAddress() ──hex──▶ decode_address(raw, format) ──▶ AddressForm
//!                                 │
//!                                 └── Address / BaseAddress / RewardAddress
//!
//! getBalance() ──cbor hex──▶ decode_balance(raw, filter, policy) ──▶ Balance
//!                                 │
//!                                 └── CardanoValue { coin, multiasset }
//! ```
//!
//! # Address formats
//!
//! | Format | Result |
//! |--------|--------|
//! | `bech32` (default) | payment address, `addr1...` |
//! | `cbor` | input hex, unchanged |
//! | `bytes` | raw address bytes |
//! | `stakehex` | `e1` ‖ stake key hash, hex |
//! | `stakekey` | reward address, `stake1...` |
//!
//! # Asset filters
//!
//! | Filter | Result |
//! |--------|--------|
//! | `lovelace` | coin as integer string |
//! | `ada` | coin / 1e6 as number, `"0"` when zero |
//! | `ft` / `nft` | entries with quantity > 1 / == 1 |
//! | `asset` | every entry |
//! | `handles` | entries under the ADA Handle policy, or a "no handles" error value |
//! | `policy` | entries under a caller-supplied policy id |

mod address;
mod value;

pub use address::{Address, AddressKind, BaseAddress, Credential, Hash28, RewardAddress};
pub use value::{CardanoValue, MultiAsset};

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::core::consts::assets;
use crate::error::{DecodeError, DecodeStage, WalletError};

// =============================================================================
// Addresses
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressFormat {
    #[default]
    Bech32,
    Cbor,
    Bytes,
    StakeHex,
    StakeKey,
}

impl AddressFormat {
    /// Names match exactly. Anything else falls back to `bech32`.
    pub fn parse(value: &str) -> Self {
        match value {
            "cbor" => AddressFormat::Cbor,
            "bytes" => AddressFormat::Bytes,
            "stakehex" => AddressFormat::StakeHex,
            "stakekey" => AddressFormat::StakeKey,
            _ => AddressFormat::Bech32,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AddressFormat::Bech32 => "bech32",
            AddressFormat::Cbor => "cbor",
            AddressFormat::Bytes => "bytes",
            AddressFormat::StakeHex => "stakehex",
            AddressFormat::StakeKey => "stakekey",
        }
    }
}

/// One rendering of an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AddressForm {
    Text(String),
    Bytes(Vec<u8>),
}

impl AddressForm {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AddressForm::Text(s) => Some(s),
            AddressForm::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AddressForm::Bytes(b) => Some(b),
            AddressForm::Text(_) => None,
        }
    }
}

fn hex_to_bytes(raw: &str) -> Result<Vec<u8>, DecodeError> {
    hex::decode(raw).map_err(|e| DecodeError::malformed(DecodeStage::Hex, raw, e))
}

/// Stake key hash of a base address with a key-hash stake credential.
pub fn stake_key_hash(address: &Address) -> Result<Hash28, DecodeError> {
    let base = BaseAddress::from_address(address)
        .ok_or_else(|| DecodeError::InvalidAddressFormat { input: address.to_hex() })?;
    base.stake_cred()
        .to_keyhash()
        .ok_or_else(|| DecodeError::MissingStakeCredential { input: address.to_hex() })
}

/// 29-byte mainnet reward address payload: `0xe1 ‖ hash`.
pub fn reward_address_from_key_hash(hash: Hash28) -> Vec<u8> {
    RewardAddress::from_stake_key_hash(hash).to_bytes()
}

pub fn decode_address(raw_hex: &str, format: AddressFormat) -> Result<AddressForm, DecodeError> {
    let bytes = hex_to_bytes(raw_hex)?;
    let address = Address::from_bytes(bytes)?;

    Ok(match format {
        AddressFormat::Cbor => AddressForm::Text(raw_hex.to_string()),
        AddressFormat::Bytes => AddressForm::Bytes(address.as_bytes().to_vec()),
        AddressFormat::Bech32 => AddressForm::Text(address.to_bech32()?),
        AddressFormat::StakeHex => {
            AddressForm::Text(hex::encode(reward_address_from_key_hash(stake_key_hash(&address)?)))
        }
        AddressFormat::StakeKey => {
            let reward = RewardAddress::from_stake_key_hash(stake_key_hash(&address)?);
            AddressForm::Text(reward.to_address().to_bech32()?)
        }
    })
}

// =============================================================================
// Balances
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssetFilter {
    #[default]
    Lovelace,
    Ada,
    Ft,
    Nft,
    Asset,
    Handles,
    Policy,
}

impl AssetFilter {
    /// Names match exactly, so `"ADA"` is rejected.
    pub fn parse(value: &str) -> Result<Self, WalletError> {
        match value {
            "lovelace" => Ok(AssetFilter::Lovelace),
            "ada" => Ok(AssetFilter::Ada),
            "ft" => Ok(AssetFilter::Ft),
            "nft" => Ok(AssetFilter::Nft),
            "asset" => Ok(AssetFilter::Asset),
            "handles" => Ok(AssetFilter::Handles),
            "policy" => Ok(AssetFilter::Policy),
            _ => Err(WalletError::InvalidAssetFilter(value.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetFilter::Lovelace => "lovelace",
            AssetFilter::Ada => "ada",
            AssetFilter::Ft => "ft",
            AssetFilter::Nft => "nft",
            AssetFilter::Asset => "asset",
            AssetFilter::Handles => "handles",
            AssetFilter::Policy => "policy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Nft,
    Fungible,
    Empty,
}

/// One native asset held in a balance snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetEntry {
    pub policy_id: String,
    pub hex_name: String,
    pub asset_name: String,
    pub quantity: String,
}

impl AssetEntry {
    fn new(policy: &[u8], name: &[u8], quantity: u64) -> Self {
        Self {
            policy_id: hex::encode(policy),
            hex_name: hex::encode(name),
            asset_name: String::from_utf8_lossy(name).into_owned(),
            quantity: quantity.to_string(),
        }
    }

    /// `None` when `quantity` is not a decimal `u64`.
    pub fn amount(&self) -> Option<u64> { self.quantity.parse().ok() }

    /// An unparsable quantity counts as `Empty`.
    pub fn kind(&self) -> AssetKind {
        match self.amount() {
            Some(0) | None => AssetKind::Empty,
            Some(1) => AssetKind::Nft,
            Some(_) => AssetKind::Fungible,
        }
    }

    pub fn is_nft(&self) -> bool { self.kind() == AssetKind::Nft }
    pub fn is_fungible(&self) -> bool { self.kind() == AssetKind::Fungible }
}

/// Coin plus the flattened multi-asset map, when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInventory {
    pub coin: u64,
    pub assets: Option<Vec<AssetEntry>>,
}

/// Result of a balance query. Shape depends on the filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Balance {
    Amount(String),
    Ada(f64),
    Assets(Vec<AssetEntry>),
    NoTokens,
    NoHandles,
}

impl Balance {
    pub fn assets(&self) -> Option<&[AssetEntry]> {
        match self {
            Balance::Assets(list) => Some(list),
            _ => None,
        }
    }
}

impl Serialize for Balance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Balance::Amount(s) => serializer.serialize_str(s),
            Balance::Ada(v) => serializer.serialize_f64(*v),
            Balance::Assets(list) => list.serialize(serializer),
            Balance::NoTokens => serializer.serialize_str(assets::NO_TOKENS),
            Balance::NoHandles => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", assets::NO_HANDLES)?;
                map.end()
            }
        }
    }
}

pub fn decode_asset_list(raw_cbor_hex: &str) -> Result<AssetInventory, DecodeError> {
    let bytes = hex_to_bytes(raw_cbor_hex)?;
    let value = CardanoValue::from_bytes(&bytes)?;
    let assets = value.multiasset.map(|multiasset| {
        multiasset
            .iter()
            .flat_map(|(policy, names)| names.iter().map(move |(name, qty)| AssetEntry::new(policy, name, *qty)))
            .collect()
    });
    Ok(AssetInventory { coin: value.coin, assets })
}

pub fn decode_balance(raw_cbor_hex: &str, filter: AssetFilter, policy_id: &str) -> Result<Balance, DecodeError> {
    let inventory = decode_asset_list(raw_cbor_hex)?;

    let list = match inventory.assets {
        Some(list) => list,
        None => {
            return Ok(match filter {
                AssetFilter::Lovelace | AssetFilter::Ada => Balance::Amount("0".into()),
                AssetFilter::Handles => Balance::Assets(Vec::new()),
                _ => Balance::NoTokens,
            })
        }
    };

    let keep = |pred: &dyn Fn(&AssetEntry) -> bool| list.iter().filter(|a| pred(a)).cloned().collect::<Vec<_>>();

    Ok(match filter {
        AssetFilter::Lovelace => Balance::Amount(inventory.coin.to_string()),
        AssetFilter::Ada => {
            if inventory.coin == 0 {
                Balance::Amount("0".into())
            } else {
                Balance::Ada(inventory.coin as f64 / assets::LOVELACE_PER_ADA)
            }
        }
        AssetFilter::Ft => Balance::Assets(keep(&|a: &AssetEntry| a.is_fungible())),
        AssetFilter::Nft => Balance::Assets(keep(&|a: &AssetEntry| a.is_nft())),
        AssetFilter::Asset => Balance::Assets(list.clone()),
        AssetFilter::Handles => {
            let handles = keep(&|a: &AssetEntry| a.policy_id == assets::HANDLE_POLICY_ID);
            if handles.is_empty() { Balance::NoHandles } else { Balance::Assets(handles) }
        }
        AssetFilter::Policy => Balance::Assets(keep(&|a: &AssetEntry| a.policy_id == policy_id)),
    })
}

/// String-typed entry point: unknown filters fail before any decoding.
pub fn decode_balance_str(raw_cbor_hex: &str, filter: &str, policy_id: &str) -> Result<Balance, WalletError> {
    let filter = AssetFilter::parse(filter)?;
    Ok(decode_balance(raw_cbor_hex, filter, policy_id)?)
}
