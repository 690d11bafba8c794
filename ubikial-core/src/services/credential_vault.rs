//! Encrypted vault for linked platform tokens
//!
//! The linked accounts of a user are stored as one AES-256-GCM envelope under
//! `credentials_<userId>`:
//!
//! ```json
//! { "version": 1, "salt": "<base64>", "nonce": "<base64>", "ciphertext": "<base64>" }
//! ```
//!
//! The key is derived from the vault passphrase with PBKDF2-HMAC-SHA256; the
//! iteration count is implied by `version`.

use std::fmt;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::crypto::{self, CURRENT_VAULT_VERSION, VaultKey};
use crate::error::{CoreError, CoreResult};
use crate::services::{SessionContext, StorageScope};
use crate::types::{LinkAccountRequest, LinkedAccount, LinkedAccountSummary, Platform};
use crate::utils::datetime::now_millis;

/// Stored form of the vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VaultEnvelope {
    version: u32,
    salt: String,
    nonce: String,
    ciphertext: String,
}

/// Derived key together with the parameters it was derived for.
struct CachedKey {
    version: u32,
    salt: Vec<u8>,
    key: VaultKey,
}

/// Credential vault
pub struct CredentialVault {
    session: Arc<SessionContext>,
    passphrase: String,
    /// Avoids re-running PBKDF2 on every access.
    key: Mutex<Option<CachedKey>>,
}

impl CredentialVault {
    /// Open the vault of a session with its passphrase.
    ///
    /// A wrong passphrase is only detected on the first read.
    pub fn new(session: Arc<SessionContext>, passphrase: impl Into<String>) -> CoreResult<Self> {
        let passphrase = passphrase.into();
        if passphrase.is_empty() {
            return Err(CoreError::ValidationError(
                "Vault passphrase cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            session,
            passphrase,
            key: Mutex::new(None),
        })
    }

    async fn key_for(&self, version: u32, salt: &[u8]) -> CoreResult<VaultKey> {
        let mut cached = self.key.lock().await;
        if let Some(c) = cached.as_ref().filter(|c| c.version == version && c.salt == salt) {
            return Ok(c.key);
        }

        let iterations = crypto::get_pbkdf2_iterations(version)
            .ok_or_else(|| CoreError::Crypto(format!("Unsupported vault version: {version}")))?;
        let key = crypto::derive_key(&self.passphrase, salt, iterations);
        *cached = Some(CachedKey {
            version,
            salt: salt.to_vec(),
            key,
        });
        Ok(key)
    }

    /// Key and salt for writing: the cached current-version key, or a fresh salt.
    async fn write_key(&self) -> CoreResult<(Vec<u8>, VaultKey)> {
        let reusable = self
            .key
            .lock()
            .await
            .as_ref()
            .filter(|c| c.version == CURRENT_VAULT_VERSION)
            .map(|c| c.salt.clone());
        let salt = reusable.unwrap_or_else(|| crypto::generate_salt().to_vec());
        let key = self.key_for(CURRENT_VAULT_VERSION, &salt).await?;
        Ok((salt, key))
    }

    async fn load(&self) -> CoreResult<Vec<LinkedAccount>> {
        let Some(envelope) = self
            .session
            .read_json::<VaultEnvelope>(StorageScope::Credentials)
            .await?
        else {
            return Ok(Vec::new());
        };

        let salt = crypto::decode_field("salt", &envelope.salt)?;
        let key = self.key_for(envelope.version, &salt).await?;
        let plaintext = crypto::open(&key, &envelope.nonce, &envelope.ciphertext)?;
        serde_json::from_slice(&plaintext)
            .map_err(|e| CoreError::SerializationError(format!("Corrupted vault contents: {e}")))
    }

    async fn persist(&self, accounts: &[LinkedAccount]) -> CoreResult<()> {
        if accounts.is_empty() {
            return self.session.remove(StorageScope::Credentials).await;
        }

        let plaintext = serde_json::to_vec(accounts)?;
        let (salt, key) = self.write_key().await?;
        let (nonce, ciphertext) = crypto::seal(&key, &plaintext)?;
        let envelope = VaultEnvelope {
            version: CURRENT_VAULT_VERSION,
            salt: crypto::encode_field(&salt),
            nonce,
            ciphertext,
        };
        self.session
            .write_json(StorageScope::Credentials, &envelope)
            .await
    }

    /// Link an account, replacing any account already linked for the platform
    pub async fn link(&self, request: LinkAccountRequest) -> CoreResult<LinkedAccountSummary> {
        let handle = request.handle.trim();
        if handle.is_empty() {
            return Err(CoreError::ValidationError(
                "Account handle cannot be empty".to_string(),
            ));
        }
        if request.access_token.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "Access token cannot be empty".to_string(),
            ));
        }
        let expires_at = match request.expires_in {
            Some(secs) if secs <= 0 => {
                return Err(CoreError::ValidationError(
                    "Token lifetime must be positive".to_string(),
                ));
            }
            Some(secs) => Some(now_millis() + Duration::seconds(secs)),
            None => None,
        };

        let account = LinkedAccount {
            platform: request.platform,
            handle: handle.to_string(),
            access_token: request.access_token,
            refresh_token: request.refresh_token.filter(|t| !t.is_empty()),
            expires_at,
            linked_at: now_millis(),
        };

        let mut accounts = self.load().await?;
        accounts.retain(|a| a.platform != account.platform);
        accounts.push(account.clone());
        accounts.sort_by_key(|a| a.platform);
        self.persist(&accounts).await?;

        log::info!("Linked {} account {}", account.platform, account.handle);
        Ok(account.summary(Utc::now()))
    }

    /// Remove the account linked for a platform
    pub async fn unlink(&self, platform: Platform) -> CoreResult<()> {
        let mut accounts = self.load().await?;
        let before = accounts.len();
        accounts.retain(|a| a.platform != platform);
        if accounts.len() == before {
            return Err(CoreError::CredentialNotFound(platform.to_string()));
        }
        self.persist(&accounts).await?;
        log::info!("Unlinked {platform} account");
        Ok(())
    }

    /// Linked account of a platform, tokens included
    pub async fn get(&self, platform: Platform) -> CoreResult<Option<LinkedAccount>> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .find(|a| a.platform == platform))
    }

    /// All linked accounts, without tokens
    pub async fn list(&self) -> CoreResult<Vec<LinkedAccountSummary>> {
        let now = Utc::now();
        Ok(self.load().await?.iter().map(|a| a.summary(now)).collect())
    }

    /// Whether the token linked for a platform has expired
    pub async fn is_expired(&self, platform: Platform) -> CoreResult<bool> {
        self.get(platform)
            .await?
            .map(|a| a.is_expired_at(Utc::now()))
            .ok_or_else(|| CoreError::CredentialNotFound(platform.to_string()))
    }
}

impl fmt::Debug for CredentialVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialVault")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
