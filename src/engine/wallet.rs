//! Wallet seam: identity, final signature and broadcast

use crate::config::WalletConfig;
use crate::error::{AppError, AppResult};
use crate::utils::expand_home;
use crate::vault::VaultSecrets;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair, Signature, Signer},
    transaction::Transaction,
};
use std::path::Path;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Result of handing a transaction to the wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Sent and confirmed on the cluster
    Confirmed(Signature),
    /// Simulated only (dry run)
    Simulated {
        logs: Vec<String>,
        units_consumed: Option<u64>,
    },
}

impl Submission {
    /// Signature when the transaction was actually sent
    pub fn signature(&self) -> Option<&Signature> {
        match self {
            Submission::Confirmed(signature) => Some(signature),
            Submission::Simulated { .. } => None,
        }
    }
}

/// Wallet that owns the payer/authority identity
#[async_trait::async_trait]
pub trait Wallet: Send + Sync {
    /// Connected identity, `None` when no wallet is connected
    fn pubkey(&self) -> Option<Pubkey>;

    /// Add the wallet signature and submit, waiting for confirmation
    async fn send_transaction(&self, transaction: Transaction) -> AppResult<Submission>;
}

/// Wallet backed by a local keypair
pub struct KeypairWallet {
    keypair: Option<Keypair>,
    rpc_client: Arc<RpcClient>,
    simulate: bool,
}

impl KeypairWallet {
    /// Create a wallet; `None` means not connected
    pub fn new(keypair: Option<Keypair>, rpc_client: Arc<RpcClient>) -> Self {
        Self {
            keypair,
            rpc_client,
            simulate: false,
        }
    }

    /// Simulate instead of sending
    pub fn simulate_only(mut self, simulate: bool) -> Self {
        self.simulate = simulate;
        self
    }

    fn sign(&self, transaction: &mut Transaction) -> AppResult<()> {
        let keypair = self.keypair.as_ref().ok_or(AppError::WalletNotConnected)?;

        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[keypair], blockhash)
            .map_err(|e| AppError::Signing(format!("Wallet signing failed: {}", e)))?;

        if !transaction.is_signed() {
            return Err(AppError::Signing(
                "Transaction is missing required signatures".to_string(),
            ));
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl Wallet for KeypairWallet {
    fn pubkey(&self) -> Option<Pubkey> {
        self.keypair.as_ref().map(|keypair| keypair.pubkey())
    }

    async fn send_transaction(&self, mut transaction: Transaction) -> AppResult<Submission> {
        self.sign(&mut transaction)?;

        if self.simulate {
            let response = self
                .rpc_client
                .simulate_transaction(&transaction)
                .await
                .map_err(|e| AppError::Rpc(format!("Simulation failed: {}", e)))?;

            let result = response.value;
            let logs = result.logs.unwrap_or_default();

            if let Some(err) = result.err {
                tracing::warn!(error = ?err, logs = ?logs, "Simulation rejected transaction");
                return Err(AppError::Submission(format!(
                    "Simulation failed: {:?}",
                    err
                )));
            }

            tracing::info!(
                units_consumed = ?result.units_consumed,
                "Transaction simulated"
            );

            return Ok(Submission::Simulated {
                logs,
                units_consumed: result.units_consumed,
            });
        }

        let signature = self
            .rpc_client
            .send_and_confirm_transaction(&transaction)
            .await
            .map_err(|e| AppError::Submission(format!("Transaction failed: {}", e)))?;

        tracing::info!(signature = %signature, "Transaction confirmed");

        Ok(Submission::Confirmed(signature))
    }
}

/// Read a Solana CLI keypair file (JSON array of 64 bytes)
pub fn keypair_from_file(path: &Path) -> AppResult<Keypair> {
    let path = expand_home(path);
    read_keypair_file(&path).map_err(|e| {
        AppError::Wallet(format!(
            "Failed to read keypair {}: {}",
            path.display(),
            e
        ))
    })
}

/// Rebuild the wallet keypair from vault secrets
///
/// The vault stores the full 64-byte keypair (32 secret + 32 public).
pub fn keypair_from_secrets(secrets: &VaultSecrets) -> AppResult<Keypair> {
    let key_bytes = secrets
        .wallet_private_key
        .as_ref()
        .ok_or_else(|| AppError::Wallet("Wallet private key not found in vault".to_string()))?;

    if key_bytes.len() != 64 {
        return Err(AppError::Wallet(format!(
            "Invalid keypair length (expected 64 bytes, got {})",
            key_bytes.len()
        )));
    }

    let buffer = Zeroizing::new(key_bytes.clone());
    Keypair::try_from(buffer.as_slice())
        .map_err(|e| AppError::Wallet(format!("Invalid keypair bytes: {}", e)))
}

/// Resolve the wallet keypair: vault first, then the keypair file
///
/// Returns `Ok(None)` when neither source is available, which the launcher
/// reports as "wallet not connected".
pub fn load_wallet_keypair(
    config: &WalletConfig,
    secrets: Option<&VaultSecrets>,
) -> AppResult<Option<Keypair>> {
    if let Some(secrets) = secrets {
        if secrets.wallet_private_key.is_some() {
            let keypair = keypair_from_secrets(secrets)?;
            tracing::info!(pubkey = %keypair.pubkey(), "Loaded wallet from vault");
            return Ok(Some(keypair));
        }
    }

    let Some(path) = config.keypair_path.as_deref() else {
        return Ok(None);
    };

    if !expand_home(path).exists() {
        tracing::warn!(path = %path.display(), "Keypair file not found");
        return Ok(None);
    }

    let keypair = keypair_from_file(path)?;
    tracing::info!(pubkey = %keypair.pubkey(), "Loaded wallet from keypair file");

    Ok(Some(keypair))
}
