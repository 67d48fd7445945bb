//! Cardano `Value` CBOR: `coin` or `[coin, { policy_id => { asset_name => quantity } }]`.

use ciborium::value::Integer;
use ciborium::Value;
use std::collections::BTreeMap;

use crate::core::consts::assets;
use crate::error::{DecodeError, DecodeStage};

/// policy id → asset name → quantity, ordered by raw bytes.
pub type MultiAsset = BTreeMap<Vec<u8>, BTreeMap<Vec<u8>, u64>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardanoValue {
    pub coin: u64,
    pub multiasset: Option<MultiAsset>,
}

impl CardanoValue {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let input = hex::encode(bytes);
        let mut cursor = std::io::Cursor::new(bytes);
        let item: Value = ciborium::from_reader(&mut cursor)
            .map_err(|e| DecodeError::malformed(DecodeStage::Value, &input, e))?;
        if cursor.position() as usize != bytes.len() {
            return Err(DecodeError::malformed(DecodeStage::Value, &input, "trailing bytes after value"));
        }

        match item {
            Value::Integer(coin) => Ok(Self { coin: to_u64(coin, DecodeStage::Value, &input)?, multiasset: None }),
            Value::Array(items) if items.len() == 2 => {
                let mut items = items.into_iter();
                let coin = match items.next() {
                    Some(Value::Integer(coin)) => to_u64(coin, DecodeStage::Value, &input)?,
                    _ => return Err(DecodeError::malformed(DecodeStage::Value, &input, "coin is not an unsigned integer")),
                };
                let multiasset = match items.next() {
                    Some(Value::Map(policies)) => parse_multiasset(policies, &input)?,
                    _ => return Err(DecodeError::malformed(DecodeStage::MultiAsset, &input, "multiasset is not a map")),
                };
                Ok(Self { coin, multiasset: Some(multiasset) })
            }
            _ => Err(DecodeError::malformed(DecodeStage::Value, &input, "expected coin or [coin, multiasset]")),
        }
    }
}

fn to_u64(value: Integer, stage: DecodeStage, input: &str) -> Result<u64, DecodeError> {
    u64::try_from(value).map_err(|_| DecodeError::malformed(stage, input, "integer out of u64 range"))
}

fn parse_multiasset(policies: Vec<(Value, Value)>, input: &str) -> Result<MultiAsset, DecodeError> {
    let fail = |reason: &str| DecodeError::malformed(DecodeStage::MultiAsset, input, reason);
    let mut out = MultiAsset::new();

    for (policy, assets_map) in policies {
        let policy = match policy {
            Value::Bytes(b) if b.len() == assets::POLICY_ID_LEN => b,
            _ => return Err(fail("policy id must be 28 bytes")),
        };
        let entries = match assets_map {
            Value::Map(entries) => entries,
            _ => return Err(fail("asset map expected")),
        };

        let slot = out.entry(policy).or_default();
        for (name, quantity) in entries {
            let name = match name {
                Value::Bytes(b) if b.len() <= assets::MAX_ASSET_NAME_LEN => b,
                _ => return Err(fail("asset name must be at most 32 bytes")),
            };
            let quantity = match quantity {
                Value::Integer(q) => to_u64(q, DecodeStage::MultiAsset, input)?,
                _ => return Err(fail("quantity is not an unsigned integer")),
            };
            if slot.insert(name, quantity).is_some() {
                return Err(fail("duplicate asset entry"));
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &Value) -> Vec<u8> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf).unwrap();
        buf
    }

    #[test]
    fn coin_only_value_has_no_multiasset() {
        let value = CardanoValue::from_bytes(&hex::decode("1a000f4240").unwrap()).unwrap();
        assert_eq!(value.coin, 1_000_000);
        assert!(value.multiasset.is_none());
    }

    #[test]
    fn array_value_decodes_assets() {
        let policy = vec![7u8; 28];
        let cbor = encode(&Value::Array(vec![
            Value::Integer(5u64.into()),
            Value::Map(vec![(
                Value::Bytes(policy.clone()),
                Value::Map(vec![(Value::Bytes(b"TOKEN".to_vec()), Value::Integer(42u64.into()))]),
            )]),
        ]));
        let value = CardanoValue::from_bytes(&cbor).unwrap();
        assert_eq!(value.coin, 5);
        assert_eq!(value.multiasset.unwrap()[&policy][&b"TOKEN".to_vec()], 42);
    }

    #[test]
    fn rejects_negative_coin_and_trailing_bytes() {
        assert!(CardanoValue::from_bytes(&encode(&Value::Integer((-1i64).into()))).is_err());
        let err = CardanoValue::from_bytes(&hex::decode("0000").unwrap()).unwrap_err();
        assert_eq!(err.stage(), DecodeStage::Value);
    }

    #[test]
    fn rejects_short_policy_id() {
        let cbor = encode(&Value::Array(vec![
            Value::Integer(0u64.into()),
            Value::Map(vec![(Value::Bytes(vec![1, 2, 3]), Value::Map(vec![]))]),
        ]));
        assert_eq!(CardanoValue::from_bytes(&cbor).unwrap_err().stage(), DecodeStage::MultiAsset);
    }

    #[test]
    fn rejects_duplicate_asset_keys() {
        let policy = Value::Bytes(vec![1u8; 28]);
        let name = Value::Bytes(b"A".to_vec());
        let cbor = encode(&Value::Array(vec![
            Value::Integer(0u64.into()),
            Value::Map(vec![(
                policy,
                Value::Map(vec![
                    (name.clone(), Value::Integer(1u64.into())),
                    (name, Value::Integer(2u64.into())),
                ]),
            )]),
        ]));
        assert!(CardanoValue::from_bytes(&cbor).is_err());
    }
}
