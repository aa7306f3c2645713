//! Configuration management for the token launchpad
//!
//! Loads configuration from files and environment variables.
//! Environment variables override file values.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// RPC endpoint configuration
    #[serde(default)]
    pub rpc: RpcConfig,
    /// Object store configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Wallet key sources
    #[serde(default)]
    pub wallet: WalletConfig,
    /// Launch behaviour
    #[serde(default)]
    pub launch: LaunchConfig,
}

/// RPC endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    /// Cluster RPC endpoint URL
    #[serde(default = "default_rpc_url")]
    pub url: String,
    /// Request timeout in milliseconds
    #[serde(default = "default_rpc_timeout")]
    pub timeout_ms: u64,
    /// Commitment level used for queries and confirmation
    #[serde(default = "default_commitment")]
    pub commitment: String,
}

fn default_rpc_url() -> String {
    "https://api.devnet.solana.com".to_string()
}

fn default_rpc_timeout() -> u64 {
    30_000
}

fn default_commitment() -> String {
    "confirmed".to_string()
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: default_rpc_url(),
            timeout_ms: default_rpc_timeout(),
            commitment: default_commitment(),
        }
    }
}

/// Object store configuration (Firebase Storage REST API)
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// REST API base URL
    #[serde(default = "default_storage_api_base")]
    pub api_base_url: String,
    /// Bucket name (e.g. `my-project.appspot.com`)
    #[serde(default)]
    pub bucket: String,
    /// Bearer token for authenticated buckets
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Path prefix for images
    #[serde(default = "default_image_prefix")]
    pub image_prefix: String,
    /// Path prefix for metadata documents
    #[serde(default = "default_metadata_prefix")]
    pub metadata_prefix: String,
    /// Request timeout in milliseconds
    #[serde(default = "default_storage_timeout")]
    pub timeout_ms: u64,
    /// Largest image accepted for upload
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,
}

fn default_storage_api_base() -> String {
    crate::constants::storage::FIREBASE_API_BASE.to_string()
}

fn default_image_prefix() -> String {
    crate::constants::storage::IMAGE_PREFIX.to_string()
}

fn default_metadata_prefix() -> String {
    crate::constants::storage::METADATA_PREFIX.to_string()
}

fn default_storage_timeout() -> u64 {
    60_000
}

fn default_max_image_bytes() -> usize {
    crate::constants::image::MAX_IMAGE_BYTES
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_storage_api_base(),
            bucket: String::new(),
            auth_token: None,
            image_prefix: default_image_prefix(),
            metadata_prefix: default_metadata_prefix(),
            timeout_ms: default_storage_timeout(),
            max_image_bytes: default_max_image_bytes(),
        }
    }
}

/// Wallet key sources
#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    /// Solana CLI keypair file (JSON array of 64 bytes)
    #[serde(default = "default_keypair_path")]
    pub keypair_path: Option<PathBuf>,
    /// Encrypted vault file; takes precedence over `keypair_path` when present
    #[serde(default = "default_vault_path")]
    pub vault_path: Option<PathBuf>,
}

fn default_keypair_path() -> Option<PathBuf> {
    Some(PathBuf::from("~/.config/solana/id.json"))
}

fn default_vault_path() -> Option<PathBuf> {
    Some(PathBuf::from("config/secrets.enc"))
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            keypair_path: default_keypair_path(),
            vault_path: default_vault_path(),
        }
    }
}

/// Launch behaviour
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LaunchConfig {
    /// Keep uploads in memory and simulate the transaction instead of sending it
    #[serde(default)]
    pub simulate_only: bool,
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (LAUNCHPAD_*)
    /// 2. config/launchpad.{yaml,toml,json} (if exists)
    /// 3. launchpad.{yaml,toml,json} (if exists)
    /// 4. Default values
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("rpc.url", default_rpc_url())?
            .set_default("rpc.timeout_ms", default_rpc_timeout())?
            .set_default("rpc.commitment", default_commitment())?
            .set_default("storage.api_base_url", default_storage_api_base())?
            .set_default("storage.image_prefix", default_image_prefix())?
            .set_default("storage.metadata_prefix", default_metadata_prefix())?
            .set_default("storage.timeout_ms", default_storage_timeout())?
            .set_default("launch.simulate_only", false)?
            .add_source(File::with_name("launchpad").required(false))
            .add_source(File::with_name("config/launchpad").required(false))
            // LAUNCHPAD_RPC__URL=... -> rpc.url
            // LAUNCHPAD_STORAGE__BUCKET=... -> storage.bucket
            .add_source(
                Environment::with_prefix("LAUNCHPAD")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rpc.url.is_empty() {
            return Err(ConfigError::Message("RPC URL must be set".to_string()));
        }

        if self.rpc.commitment_config().is_none() {
            return Err(ConfigError::Message(format!(
                "Unknown commitment level: {}",
                self.rpc.commitment
            )));
        }

        // Dry runs never touch the object store
        if !self.launch.simulate_only && self.storage.bucket.is_empty() {
            return Err(ConfigError::Message(
                "Storage bucket must be set via LAUNCHPAD_STORAGE__BUCKET".to_string(),
            ));
        }

        if self.storage.max_image_bytes == 0 {
            return Err(ConfigError::Message(
                "storage.max_image_bytes must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

impl RpcConfig {
    /// Parsed commitment level, `None` if unknown
    pub fn commitment_config(&self) -> Option<solana_sdk::commitment_config::CommitmentConfig> {
        use solana_sdk::commitment_config::CommitmentConfig;

        match self.commitment.to_lowercase().as_str() {
            "processed" => Some(CommitmentConfig::processed()),
            "confirmed" => Some(CommitmentConfig::confirmed()),
            "finalized" => Some(CommitmentConfig::finalized()),
            _ => None,
        }
    }
}
