//! Token Launchpad Library
//!
//! Creates Token-2022 mints with on-chain metadata on Solana after publishing
//! the token image and metadata document to an object store.

pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod models;
pub mod storage;
pub mod token;
pub mod utils;
pub mod vault;

// Re-export commonly used types
pub use config::AppConfig;
pub use engine::{
    ChainRpc, CreatedToken, KeypairWallet, LaunchOutcome, LaunchRequest, MintPlan, MintStep,
    Submission, TokenLauncher, Wallet,
};
pub use error::{AppError, AppResult};
pub use models::{
    LaunchState, LaunchStatus, MetadataDocument, RevokeOptions, RevokeToggle, SocialLinks,
    TokenForm,
};
pub use storage::{FirebaseStorage, MemoryObjectStore, ObjectStore};
pub use token::{ImageFile, ImageUploader, MetadataPublisher};
