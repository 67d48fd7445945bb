//! Shared constants for the CIP-30 host surface and the Cardano codec.

pub mod consts;
