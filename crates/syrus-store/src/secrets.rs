use std::collections::HashMap;

use crate::error::{Result, StoreError};

/// The handful of out-of-band secrets the gateway and vendor clients need:
/// dialect public keys for signature verification, vendor API keys, bot
/// tokens for authenticated follow-up posts. Never persisted in the document
/// store itself, hence its own trait (spec §6 "Secrets").
pub trait SecretStore: Send + Sync {
    fn get(&self, name: &str) -> Result<String>;
    fn get_optional(&self, name: &str) -> Option<String>;
}

/// Reads `SYRUS_SECRET_<NAME>` environment variables, matching the
/// `SYRUS_`-prefixed convention `syrus_core::config::SyrusConfig::load` uses
/// for everything else.
#[derive(Default)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    fn env_key(name: &str) -> String {
        format!("SYRUS_SECRET_{}", name.to_uppercase())
    }
}

impl SecretStore for EnvSecretStore {
    fn get(&self, name: &str) -> Result<String> {
        self.get_optional(name)
            .ok_or_else(|| StoreError::SecretNotFound(name.to_string()))
    }

    fn get_optional(&self, name: &str) -> Option<String> {
        std::env::var(Self::env_key(name)).ok()
    }
}

/// In-memory stand-in for tests and local development.
#[derive(Default)]
pub struct InMemorySecretStore {
    secrets: HashMap<String, String>,
}

impl InMemorySecretStore {
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.secrets.insert(name.to_string(), value.to_string());
        self
    }
}

impl SecretStore for InMemorySecretStore {
    fn get(&self, name: &str) -> Result<String> {
        self.get_optional(name)
            .ok_or_else(|| StoreError::SecretNotFound(name.to_string()))
    }

    fn get_optional(&self, name: &str) -> Option<String> {
        self.secrets.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_store_returns_missing_secret_error() {
        let store = InMemorySecretStore::default();
        assert!(matches!(store.get("discord_public_key"), Err(StoreError::SecretNotFound(_))));
    }

    #[test]
    fn in_memory_store_roundtrips() {
        let store = InMemorySecretStore::default().with("discord_public_key", "abcd1234");
        assert_eq!(store.get("discord_public_key").unwrap(), "abcd1234");
    }
}
