//! Error types for the token launchpad

use crate::vault::VaultError;
use thiserror::Error;

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Form or state validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// No wallet identity is available
    #[error("Wallet not connected")]
    WalletNotConnected,

    /// Wallet keypair could not be loaded
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Object store protocol error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Image upload failed
    #[error("Image upload failed: {0}")]
    ImageUpload(String),

    /// Metadata document upload failed
    #[error("Metadata upload failed: {0}")]
    MetadataUpload(String),

    /// RPC/Solana error
    #[error("RPC error: {0}")]
    Rpc(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Instruction could not be built
    #[error("Instruction error: {0}")]
    Instruction(String),

    /// Transaction signing failed
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Transaction was rejected or failed to confirm
    #[error("Submission failed: {0}")]
    Submission(String),

    /// Secrets vault error
    #[error("Vault error: {0}")]
    Vault(#[from] VaultError),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable category name for logs
    pub fn reason(&self) -> &'static str {
        match self {
            AppError::Config(_) => "configuration_error",
            AppError::Validation(_) => "validation_failed",
            AppError::WalletNotConnected => "wallet_not_connected",
            AppError::Wallet(_) => "wallet_error",
            AppError::Storage(_) => "storage_error",
            AppError::ImageUpload(_) => "image_upload_failed",
            AppError::MetadataUpload(_) => "metadata_upload_failed",
            AppError::Rpc(_) => "rpc_error",
            AppError::Http(_) => "http_error",
            AppError::Parse(_) => "parse_error",
            AppError::Instruction(_) => "instruction_error",
            AppError::Signing(_) => "signing_failed",
            AppError::Submission(_) => "submission_failed",
            AppError::Vault(_) => "vault_error",
            AppError::Io(_) => "io_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Message shown to the user when a launch fails with this error
    ///
    /// Validation and upload failures carry their detail; everything that
    /// happens while building or submitting the transaction collapses into
    /// a generic failure.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::WalletNotConnected => "Wallet not connected".to_string(),
            AppError::ImageUpload(msg) => format!("Error uploading image: {}", msg),
            AppError::MetadataUpload(msg) => format!("Error uploading metadata: {}", msg),
            _ => "Error creating token. Please try again.".to_string(),
        }
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
