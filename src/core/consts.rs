//! Protocol and host constants
//!
//! Centralized registry for registry keys, address tags and well-known ids.

/// Host registry keys (`window.cardano`)
pub mod registry {
    /// Event bus injected next to the wallets by some extensions.
    pub const EVENTS_KEY: &str = "_events";
    /// Injects an object that does not follow the enable/isEnabled contract.
    pub const TYPHON: &str = "typhon";

    pub const RESERVED: &[&str] = &[EVENTS_KEY];
    pub const DENIED: &[&str] = &[TYPHON];
}

/// Shelley address layout (CIP-19)
pub mod address {
    pub const HASH_LEN: usize = 28;
    pub const BASE_LEN: usize = 1 + 2 * HASH_LEN;
    pub const ENTERPRISE_LEN: usize = 1 + HASH_LEN;
    pub const REWARD_LEN: usize = 1 + HASH_LEN;

    /// Reward address header: type 14 (stake key hash), mainnet.
    pub const REWARD_MAINNET_HEADER: u8 = 0xe1;
    pub const MAINNET_ID: u8 = 1;

    pub const HRP_ADDR: &str = "addr";
    pub const HRP_ADDR_TEST: &str = "addr_test";
    pub const HRP_STAKE: &str = "stake";
    pub const HRP_STAKE_TEST: &str = "stake_test";
}

/// Multi-asset constants
pub mod assets {
    /// ADA Handle minting policy.
    pub const HANDLE_POLICY_ID: &str = "f0ff48bbb7bbe9d59a40f1ce90e9e9d0ff5002ec48f232b49ca0fb9a";
    pub const LOVELACE_PER_ADA: f64 = 1_000_000.0;
    pub const POLICY_ID_LEN: usize = 28;
    pub const MAX_ASSET_NAME_LEN: usize = 32;

    pub const NO_TOKENS: &str = "This wallet has no tokens";
    pub const NO_HANDLES: &str = "This wallet has no handles";
}

/// Environment variables read by native hosts
pub mod env {
    pub const LOG_JSON: &str = "CIP30_LOG_JSON";
    pub const FIXTURE: &str = "CIP30_FIXTURE";
}
