//! Encrypted secrets vault using AES-256-GCM
//!
//! Holds the secrets a launch needs outside of plain configuration:
//! - Wallet keypair bytes (64 bytes: secret || public)
//! - Object store auth token
//!
//! File format: Base64 encoded (nonce || ciphertext || tag)

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use std::path::Path;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Environment variable holding the hex vault key
pub const VAULT_KEY_ENV: &str = "LAUNCHPAD_VAULT_KEY";

/// Secrets stored in the encrypted vault
#[derive(Debug, Clone, Default, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct VaultSecrets {
    /// Wallet keypair (as byte array)
    #[serde(default)]
    pub wallet_private_key: Option<Vec<u8>>,
    /// Object store auth token
    #[serde(default)]
    pub storage_auth_token: Option<String>,
}

/// Vault for encrypted secrets
pub struct Vault {
    /// Encryption key (32 bytes for AES-256)
    key: Zeroizing<[u8; 32]>,
}

/// Vault errors
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// Invalid encryption key
    #[error("Invalid vault key: {0}")]
    InvalidKey(String),

    /// Decryption failed
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// OS random source failed
    #[error("Random source failed: {0}")]
    Random(String),

    /// File I/O error
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Base64 decoding error
    #[error("Base64 decode error: {0}")]
    Base64Error(String),
}

impl Vault {
    /// Create a new vault with the given key
    ///
    /// # Arguments
    /// * `key_hex` - 64-character hex string (32 bytes)
    pub fn new(key_hex: &str) -> Result<Self, VaultError> {
        let key_bytes = Zeroizing::new(
            hex::decode(key_hex.trim())
                .map_err(|e| VaultError::InvalidKey(format!("Invalid hex key: {}", e)))?,
        );

        if key_bytes.len() != 32 {
            return Err(VaultError::InvalidKey(format!(
                "Key must be 32 bytes (64 hex chars), got {} bytes",
                key_bytes.len()
            )));
        }

        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&key_bytes);

        Ok(Self { key })
    }

    /// Create a vault from the LAUNCHPAD_VAULT_KEY environment variable
    pub fn from_env() -> Result<Self, VaultError> {
        let key_hex = Zeroizing::new(std::env::var(VAULT_KEY_ENV).map_err(|_| {
            VaultError::InvalidKey(format!("{} environment variable not set", VAULT_KEY_ENV))
        })?);

        Self::new(&key_hex)
    }

    /// Load and decrypt secrets from a file
    pub fn load_secrets(&self, path: impl AsRef<Path>) -> Result<VaultSecrets, VaultError> {
        let encrypted_data = std::fs::read_to_string(path)?;
        self.decrypt_secrets(&encrypted_data)
    }

    /// Decrypt secrets from a base64-encoded string
    pub fn decrypt_secrets(&self, encrypted_base64: &str) -> Result<VaultSecrets, VaultError> {
        let encrypted_bytes = BASE64
            .decode(encrypted_base64.trim())
            .map_err(|e| VaultError::Base64Error(format!("Failed to decode base64: {}", e)))?;

        // nonce (12) || ciphertext || tag (16)
        if encrypted_bytes.len() < 12 + 16 {
            return Err(VaultError::DecryptionFailed(
                "Encrypted data too short".to_string(),
            ));
        }

        let nonce = Nonce::from_slice(&encrypted_bytes[..12]);
        let ciphertext = &encrypted_bytes[12..];

        let cipher = Aes256Gcm::new_from_slice(&self.key[..])
            .map_err(|e| VaultError::InvalidKey(format!("Failed to create cipher: {}", e)))?;

        let plaintext = Zeroizing::new(cipher.decrypt(nonce, ciphertext).map_err(|e| {
            VaultError::DecryptionFailed(format!("AES-GCM decryption failed: {}", e))
        })?);

        let secrets: VaultSecrets = serde_json::from_slice(&plaintext)?;

        Ok(secrets)
    }

    /// Encrypt and save secrets to a file
    pub fn save_secrets(
        &self,
        secrets: &VaultSecrets,
        path: impl AsRef<Path>,
    ) -> Result<(), VaultError> {
        let encrypted = self.encrypt_secrets(secrets)?;
        std::fs::write(path, encrypted)?;
        Ok(())
    }

    /// Encrypt secrets to a base64-encoded string
    pub fn encrypt_secrets(&self, secrets: &VaultSecrets) -> Result<String, VaultError> {
        let plaintext = Zeroizing::new(serde_json::to_vec(secrets)?);

        let nonce_bytes: [u8; 12] = rand_bytes()?;
        let nonce = Nonce::from_slice(&nonce_bytes);

        let cipher = Aes256Gcm::new_from_slice(&self.key[..])
            .map_err(|e| VaultError::InvalidKey(format!("Failed to create cipher: {}", e)))?;

        let ciphertext = cipher.encrypt(nonce, plaintext.as_slice()).map_err(|e| {
            VaultError::EncryptionFailed(format!("AES-GCM encryption failed: {}", e))
        })?;

        let mut combined = Vec::with_capacity(12 + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(&combined))
    }

    /// Generate a new random vault key (for setup)
    pub fn generate_key() -> Result<String, VaultError> {
        let key_bytes = Zeroizing::new(rand_bytes::<32>()?);
        Ok(hex::encode(&key_bytes[..]))
    }
}

/// Random bytes from the OS source
fn rand_bytes<const N: usize>() -> Result<[u8; N], VaultError> {
    let mut bytes = [0u8; N];
    getrandom::getrandom(&mut bytes).map_err(|e| VaultError::Random(e.to_string()))?;
    Ok(bytes)
}

/// Load secrets from the vault file if both the key and the file exist
///
/// Returns `Ok(None)` when no vault is configured, so callers can fall back
/// to plain configuration.
pub fn load_secrets_if_present(
    vault_path: Option<&Path>,
) -> Result<Option<VaultSecrets>, VaultError> {
    let Some(path) = vault_path else {
        return Ok(None);
    };

    if !path.exists() {
        tracing::debug!(path = %path.display(), "Vault file not found, skipping");
        return Ok(None);
    }

    let vault = Vault::from_env()?;
    let secrets = vault.load_secrets(path)?;
    tracing::info!(path = %path.display(), "Loaded secrets from encrypted vault");

    Ok(Some(secrets))
}
