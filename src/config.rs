//! Session Configuration - passed from the host layer

use crate::core::consts::registry;

/// Which registry keys discovery must skip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Internal keys the host injects next to the wallets (event bus etc).
    pub reserved_keys: Vec<String>,
    /// Provider names known to violate the enable/isEnabled shape.
    pub denied_providers: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reserved_keys: registry::RESERVED.iter().map(|s| (*s).into()).collect(),
            denied_providers: registry::DENIED.iter().map(|s| (*s).into()).collect(),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self { Self::default() }
    pub fn with_reserved_key(mut self, key: impl Into<String>) -> Self { self.reserved_keys.push(key.into()); self }
    pub fn deny_provider(mut self, name: impl Into<String>) -> Self { self.denied_providers.push(name.into()); self }
    pub fn allow_all_providers(mut self) -> Self { self.denied_providers.clear(); self }

    pub fn is_reserved(&self, key: &str) -> bool { self.reserved_keys.iter().any(|k| k == key) }
    pub fn is_denied(&self, key: &str) -> bool { self.denied_providers.iter().any(|k| k == key) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_skip_event_bus_and_typhon() {
        let config = SessionConfig::new();
        assert!(config.is_reserved("_events"));
        assert!(config.is_denied("typhon"));
        assert!(!config.is_denied("nami"));
    }

    #[test]
    fn builder_extends_lists() {
        let config = SessionConfig::new().with_reserved_key("_meta").deny_provider("broken").allow_all_providers();
        assert!(config.is_reserved("_meta"));
        assert!(!config.is_denied("typhon"));
        assert!(!config.is_denied("broken"));
    }
}
