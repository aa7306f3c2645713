//! Cluster RPC seam

use crate::config::RpcConfig;
use crate::error::{AppError, AppResult};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

/// Cluster queries needed to assemble a mint transaction
#[async_trait::async_trait]
pub trait ChainRpc: Send + Sync {
    /// Minimum lamports for an account of `data_len` bytes to be rent exempt
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> AppResult<u64>;

    /// Recent blockhash for a new transaction
    async fn latest_blockhash(&self) -> AppResult<Hash>;
}

#[async_trait::async_trait]
impl ChainRpc for RpcClient {
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> AppResult<u64> {
        self.get_minimum_balance_for_rent_exemption(data_len)
            .await
            .map_err(|e| AppError::Rpc(format!("Failed to get rent exemption: {}", e)))
    }

    async fn latest_blockhash(&self) -> AppResult<Hash> {
        self.get_latest_blockhash()
            .await
            .map_err(|e| AppError::Rpc(format!("Failed to get blockhash: {}", e)))
    }
}

/// Create an RPC client from configuration
pub fn connect(config: &RpcConfig) -> AppResult<Arc<RpcClient>> {
    let commitment: CommitmentConfig = config.commitment_config().ok_or_else(|| {
        AppError::Validation(format!("Unknown commitment level: {}", config.commitment))
    })?;

    tracing::debug!(url = %config.url, commitment = %config.commitment, "Connecting to RPC");

    Ok(Arc::new(RpcClient::new_with_timeout_and_commitment(
        config.url.clone(),
        Duration::from_millis(config.timeout_ms),
        commitment,
    )))
}
