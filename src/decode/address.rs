//! Address layout (CIP-19) and Bech32 rendering.
//!
//! ```text
//! header: [ type:4 | network:4 ]
//!   0..=3   base        header ‖ payment(28) ‖ stake(28)
//!   4..=5   pointer     header ‖ payment(28) ‖ slot ‖ tx_ix ‖ cert_ix (var-nat)
//!   6..=7   enterprise  header ‖ payment(28)
//!   8       byron       CBOR [tagged payload, crc]
//!   14..=15 reward      header ‖ stake(28)
//! ```

use bech32::{Bech32, Hrp};
use ciborium::Value;

use crate::core::consts::address as layout;
use crate::error::{DecodeError, DecodeStage};

pub type Hash28 = [u8; layout::HASH_LEN];

/// Payment or stake credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    KeyHash(Hash28),
    ScriptHash(Hash28),
}

impl Credential {
    fn from_slice(bytes: &[u8], is_script: bool) -> Self {
        let mut hash = [0u8; layout::HASH_LEN];
        hash.copy_from_slice(bytes);
        if is_script { Credential::ScriptHash(hash) } else { Credential::KeyHash(hash) }
    }

    pub fn hash(&self) -> &Hash28 {
        match self {
            Credential::KeyHash(h) | Credential::ScriptHash(h) => h,
        }
    }

    pub fn to_keyhash(&self) -> Option<Hash28> {
        match self {
            Credential::KeyHash(h) => Some(*h),
            Credential::ScriptHash(_) => None,
        }
    }

    fn is_script(&self) -> bool { matches!(self, Credential::ScriptHash(_)) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    Base,
    Pointer,
    Enterprise,
    Byron,
    Reward,
}

impl AddressKind {
    fn from_type(address_type: u8) -> Option<Self> {
        match address_type {
            0..=3 => Some(AddressKind::Base),
            4 | 5 => Some(AddressKind::Pointer),
            6 | 7 => Some(AddressKind::Enterprise),
            8 => Some(AddressKind::Byron),
            14 | 15 => Some(AddressKind::Reward),
            _ => None,
        }
    }
}

/// A structurally validated address. Owns its raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    bytes: Vec<u8>,
    kind: AddressKind,
}

fn malformed(bytes: &[u8], reason: impl ToString) -> DecodeError {
    DecodeError::malformed(DecodeStage::Address, hex::encode(bytes), reason)
}

impl Address {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, DecodeError> {
        let header = *bytes.first().ok_or_else(|| malformed(&bytes, "empty address"))?;
        let kind = AddressKind::from_type(header >> 4)
            .ok_or_else(|| malformed(&bytes, format!("unknown address type {}", header >> 4)))?;

        let expect_len = |len: usize| -> Result<(), DecodeError> {
            if bytes.len() == len {
                Ok(())
            } else {
                Err(malformed(&bytes, format!("expected {} bytes, got {}", len, bytes.len())))
            }
        };

        match kind {
            AddressKind::Base => expect_len(layout::BASE_LEN)?,
            AddressKind::Enterprise => expect_len(layout::ENTERPRISE_LEN)?,
            AddressKind::Reward => expect_len(layout::REWARD_LEN)?,
            AddressKind::Pointer => validate_pointer(&bytes)?,
            AddressKind::Byron => validate_byron(&bytes)?,
        }

        Ok(Self { bytes, kind })
    }

    pub fn from_hex(raw: &str) -> Result<Self, DecodeError> {
        let bytes = hex::decode(raw).map_err(|e| DecodeError::malformed(DecodeStage::Hex, raw, e))?;
        Self::from_bytes(bytes)
    }

    pub fn from_bech32(text: &str) -> Result<Self, DecodeError> {
        let (_, bytes) = bech32::decode(text).map_err(|e| DecodeError::malformed(DecodeStage::Bech32, text, e))?;
        Self::from_bytes(bytes)
    }

    pub fn kind(&self) -> AddressKind { self.kind }
    pub fn header_type(&self) -> u8 { self.bytes[0] >> 4 }
    pub fn network_id(&self) -> u8 { self.bytes[0] & 0x0f }
    pub fn as_bytes(&self) -> &[u8] { &self.bytes }
    pub fn to_hex(&self) -> String { hex::encode(&self.bytes) }

    fn hrp(&self) -> &'static str {
        let mainnet = self.network_id() == layout::MAINNET_ID;
        match (self.kind, mainnet) {
            (AddressKind::Reward, true) => layout::HRP_STAKE,
            (AddressKind::Reward, false) => layout::HRP_STAKE_TEST,
            (_, true) => layout::HRP_ADDR,
            (_, false) => layout::HRP_ADDR_TEST,
        }
    }

    /// Bech32 text form. Byron addresses have none.
    pub fn to_bech32(&self) -> Result<String, DecodeError> {
        if self.kind == AddressKind::Byron {
            return Err(DecodeError::malformed(DecodeStage::Bech32, self.to_hex(), "byron address has no bech32 form"));
        }
        let hrp = Hrp::parse(self.hrp()).map_err(|e| DecodeError::malformed(DecodeStage::Bech32, self.to_hex(), e))?;
        bech32::encode::<Bech32>(hrp, &self.bytes).map_err(|e| DecodeError::malformed(DecodeStage::Bech32, self.to_hex(), e))
    }
}

fn validate_pointer(bytes: &[u8]) -> Result<(), DecodeError> {
    let start = 1 + layout::HASH_LEN;
    if bytes.len() <= start {
        return Err(malformed(bytes, "pointer address too short"));
    }
    let mut rest = &bytes[start..];
    for _ in 0..3 {
        rest = read_varnat(rest).ok_or_else(|| malformed(bytes, "truncated pointer"))?;
    }
    if !rest.is_empty() {
        return Err(malformed(bytes, "trailing bytes after pointer"));
    }
    Ok(())
}

/// Skips one base-128 natural, returning the remainder.
fn read_varnat(bytes: &[u8]) -> Option<&[u8]> {
    let end = bytes.iter().position(|b| b & 0x80 == 0)?;
    Some(&bytes[end + 1..])
}

fn validate_byron(bytes: &[u8]) -> Result<(), DecodeError> {
    let mut cursor = std::io::Cursor::new(bytes);
    let item: Value = ciborium::from_reader(&mut cursor).map_err(|e| malformed(bytes, e))?;
    if cursor.position() as usize != bytes.len() {
        return Err(malformed(bytes, "trailing bytes after byron address"));
    }
    match item {
        Value::Array(items) if items.len() == 2 => Ok(()),
        _ => Err(malformed(bytes, "byron address is not a 2-element array")),
    }
}

/// Base address view: payment and stake credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseAddress {
    pub network_id: u8,
    pub payment: Credential,
    pub stake: Credential,
}

impl BaseAddress {
    pub fn from_address(address: &Address) -> Option<Self> {
        if address.kind() != AddressKind::Base {
            return None;
        }
        let header = address.as_bytes()[0];
        let split = 1 + layout::HASH_LEN;
        Some(Self {
            network_id: address.network_id(),
            payment: Credential::from_slice(&address.as_bytes()[1..split], header & 0x10 != 0),
            stake: Credential::from_slice(&address.as_bytes()[split..], header & 0x20 != 0),
        })
    }

    pub fn stake_cred(&self) -> &Credential { &self.stake }
}

/// Reward (stake) address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardAddress {
    pub network_id: u8,
    pub stake: Credential,
}

impl RewardAddress {
    /// Mainnet reward address for a stake key hash (`0xe1 ‖ hash`).
    pub fn from_stake_key_hash(hash: Hash28) -> Self {
        Self { network_id: layout::MAINNET_ID, stake: Credential::KeyHash(hash) }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let type_bits = if self.stake.is_script() { 0xf0 } else { 0xe0 };
        let mut bytes = Vec::with_capacity(layout::REWARD_LEN);
        bytes.push(type_bits | (self.network_id & 0x0f));
        bytes.extend_from_slice(self.stake.hash());
        bytes
    }

    pub fn to_address(&self) -> Address {
        Address { bytes: self.to_bytes(), kind: AddressKind::Reward }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // CIP-19 test vectors
    const PAYMENT: &str = "9493315cd92eb5d8c4304e67b7e16ae36d61d34502694657811a2c8e";
    const STAKE: &str = "337b62cfff6403a06a3acbc34f8c46003c69fe79a3628cefa9c47251";

    fn base_hex(header: u8) -> String {
        format!("{:02x}{}{}", header, PAYMENT, STAKE)
    }

    #[test]
    fn base_address_bech32_matches_cip19() {
        let address = Address::from_hex(&base_hex(0x01)).unwrap();
        assert_eq!(address.kind(), AddressKind::Base);
        assert_eq!(
            address.to_bech32().unwrap(),
            "addr1qx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzer3n0d3vllmyqwsx5wktcd8cc3sq835lu7drv2xwl2wywfgse35a3x"
        );
    }

    #[test]
    fn testnet_base_address_uses_test_prefix() {
        let address = Address::from_hex(&base_hex(0x00)).unwrap();
        assert!(address.to_bech32().unwrap().starts_with("addr_test1"));
    }

    #[test]
    fn enterprise_address_bech32() {
        let address = Address::from_hex(&format!("61{}", PAYMENT)).unwrap();
        assert_eq!(address.kind(), AddressKind::Enterprise);
        assert_eq!(address.to_bech32().unwrap(), "addr1vx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzers66hrl8");
    }

    #[test]
    fn stake_credential_kinds_follow_header_bits() {
        let key = BaseAddress::from_address(&Address::from_hex(&base_hex(0x01)).unwrap()).unwrap();
        assert!(key.stake_cred().to_keyhash().is_some());

        let script = BaseAddress::from_address(&Address::from_hex(&base_hex(0x21)).unwrap()).unwrap();
        assert!(script.stake_cred().to_keyhash().is_none());
        assert!(matches!(script.payment, Credential::KeyHash(_)));
    }

    #[test]
    fn reward_address_matches_cip19() {
        let mut hash = [0u8; 28];
        hash.copy_from_slice(&hex::decode(STAKE).unwrap());
        let reward = RewardAddress::from_stake_key_hash(hash);
        assert_eq!(reward.to_bytes()[0], 0xe1);
        assert_eq!(reward.to_address().to_bech32().unwrap(), "stake1uyehkck0lajq8gr28t9uxnuvgcqrc6070x3k9r8048z8y5gh6ffgw");
    }

    #[test]
    fn pointer_address_requires_three_naturals() {
        let ok = format!("41{}8198bd431b03", PAYMENT);
        assert_eq!(Address::from_hex(&ok).unwrap().kind(), AddressKind::Pointer);

        let truncated = format!("41{}81", PAYMENT);
        assert!(Address::from_hex(&truncated).is_err());
    }

    #[test]
    fn rejects_bad_lengths_and_types() {
        assert!(Address::from_hex(&format!("01{}", PAYMENT)).is_err());
        assert!(Address::from_hex(&format!("91{}", PAYMENT)).is_err());
        assert!(Address::from_hex("").is_err());
        let err = Address::from_hex("0g").unwrap_err();
        assert_eq!(err.stage(), DecodeStage::Hex);
    }

    #[test]
    fn byron_address_has_no_bech32() {
        // [24(h'a0'), 0]
        let address = Address::from_hex("82d81841a000").unwrap();
        assert_eq!(address.kind(), AddressKind::Byron);
        assert_eq!(address.to_bech32().unwrap_err().stage(), DecodeStage::Bech32);
    }

    #[test]
    fn bech32_text_parses_back() {
        let address = Address::from_hex(&base_hex(0x01)).unwrap();
        let parsed = Address::from_bech32(&address.to_bech32().unwrap()).unwrap();
        assert_eq!(parsed, address);
    }
}
