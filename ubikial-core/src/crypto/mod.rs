//! Encryption module
//!
//! AES-256-GCM with PBKDF2-HMAC-SHA256 key derivation, used by the credential
//! vault to protect linked platform tokens at rest.

mod versions;

pub use versions::{CURRENT_VAULT_VERSION, get_current_iterations, get_pbkdf2_iterations};

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use pbkdf2::pbkdf2_hmac_array;
use rand::RngCore;
use sha2::Sha256;

use crate::error::{CoreError, CoreResult};

/// Salt length in bytes.
pub const SALT_LENGTH: usize = 16;
const NONCE_LENGTH: usize = 12;
/// AES-256 key length in bytes.
pub const KEY_LENGTH: usize = 32;

/// A derived AES-256 key.
pub type VaultKey = [u8; KEY_LENGTH];

/// Generate a random salt.
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    rand::rng().fill_bytes(&mut salt);
    salt
}

/// Derive an encryption key from a passphrase.
pub fn derive_key(passphrase: &str, salt: &[u8], iterations: u32) -> VaultKey {
    pbkdf2_hmac_array::<Sha256, KEY_LENGTH>(passphrase.as_bytes(), salt, iterations)
}

/// Encrypt `plaintext` under `key` with a fresh random nonce.
///
/// # Returns
/// Returns (`nonce_base64`, `ciphertext_base64`)
pub fn seal(key: &VaultKey, plaintext: &[u8]) -> CoreResult<(String, String)> {
    let mut nonce_bytes = [0u8; NONCE_LENGTH];
    rand::rng().fill_bytes(&mut nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CoreError::Crypto(format!("Failed to create cipher: {e}")))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| CoreError::Crypto(format!("Encryption failed: {e}")))?;

    Ok((BASE64.encode(nonce_bytes), BASE64.encode(ciphertext)))
}

/// Decrypt a sealed payload.
///
/// A wrong key or any modification of nonce or ciphertext fails
/// authentication and returns [`CoreError::Crypto`].
pub fn open(key: &VaultKey, nonce_b64: &str, ciphertext_b64: &str) -> CoreResult<Vec<u8>> {
    let nonce_bytes = decode_field("nonce", nonce_b64)?;
    if nonce_bytes.len() != NONCE_LENGTH {
        return Err(CoreError::Crypto(format!(
            "Invalid nonce length: {} bytes",
            nonce_bytes.len()
        )));
    }
    let ciphertext = decode_field("ciphertext", ciphertext_b64)?;

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CoreError::Crypto(format!("Failed to create cipher: {e}")))?;
    cipher
        .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
        .map_err(|_| {
            CoreError::Crypto("Decryption failed: invalid passphrase or corrupted data".to_string())
        })
}

/// Decode a base64 envelope field.
pub fn decode_field(field: &str, value: &str) -> CoreResult<Vec<u8>> {
    BASE64
        .decode(value)
        .map_err(|e| CoreError::Crypto(format!("Invalid {field}: {e}")))
}

/// Encode bytes as an envelope field.
pub fn encode_field(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}
