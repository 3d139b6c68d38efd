//! Encrypted storage of per-user brokerage credentials.

use std::sync::Arc;

use tracing::debug;

use crate::domain::{BrokerCredentials, UserId};
use crate::error::Result;
use crate::infrastructure::crypto::CredentialCipher;
use crate::port::outbound::store::CredentialStore;

/// Platform tag under which brokerage credentials are stored.
pub const BROKER_PLATFORM: &str = "broker";

/// Seals credentials before they reach the store and opens them on read.
#[derive(Clone)]
pub struct CredentialVault {
    store: Arc<dyn CredentialStore>,
    cipher: CredentialCipher,
}

impl CredentialVault {
    pub fn new(store: Arc<dyn CredentialStore>, cipher: CredentialCipher) -> Self {
        Self { store, cipher }
    }

    /// Encrypt and store credentials, replacing any earlier ones.
    pub async fn store(&self, user_id: UserId, credentials: &BrokerCredentials) -> Result<()> {
        let plaintext = serde_json::to_string(credentials)?;
        let sealed = self.cipher.encrypt(&plaintext)?;
        self.store
            .save_credentials(user_id, BROKER_PLATFORM, &sealed)
            .await?;
        debug!(user_id = %user_id, "Stored encrypted brokerage credentials");
        Ok(())
    }

    /// Decrypt the stored credentials for a user, if any.
    pub async fn load(&self, user_id: UserId) -> Result<Option<BrokerCredentials>> {
        let Some(sealed) = self.store.get_credentials(user_id, BROKER_PLATFORM).await? else {
            return Ok(None);
        };
        let plaintext = self.cipher.decrypt(&sealed)?;
        Ok(Some(serde_json::from_str(&plaintext)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::MemoryStore;
    use crate::error::{CryptoError, Error};

    fn cipher(byte: u8) -> CredentialCipher {
        CredentialCipher::new(&[byte; 32]).unwrap()
    }

    #[tokio::test]
    async fn stored_credentials_are_sealed_at_rest() {
        let store = Arc::new(MemoryStore::new());
        let vault = CredentialVault::new(store.clone(), cipher(1));
        let id = UserId::new(3);

        vault
            .store(id, &BrokerCredentials::new("ann", "s3cret"))
            .await
            .unwrap();

        let raw = store.get_credentials(id, BROKER_PLATFORM).await.unwrap().unwrap();
        assert!(!raw.contains("s3cret"));
        let loaded = vault.load(id).await.unwrap().unwrap();
        assert_eq!(loaded, BrokerCredentials::new("ann", "s3cret"));
    }

    #[tokio::test]
    async fn missing_credentials_load_as_none() {
        let vault = CredentialVault::new(Arc::new(MemoryStore::new()), cipher(1));
        assert!(vault.load(UserId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rotated_key_cannot_open_old_values() {
        let store = Arc::new(MemoryStore::new());
        let id = UserId::new(1);
        CredentialVault::new(store.clone(), cipher(1))
            .store(id, &BrokerCredentials::new("a", "b"))
            .await
            .unwrap();

        let result = CredentialVault::new(store, cipher(2)).load(id).await;
        assert!(matches!(result, Err(Error::Crypto(CryptoError::Decrypt))));
    }
}
