//! Token creation orchestrator
//!
//! Runs one launch end to end:
//! image upload -> metadata publication -> transaction assembly -> submission.
//! Each step is awaited in order and any failure aborts the rest. Nothing is
//! retried or rolled back; objects already uploaded stay in the store.

use super::rpc::ChainRpc;
use super::transaction_builder::{compute_sizing, MintPlan, MintPlanParams};
use super::wallet::{Submission, Wallet};
use crate::config::StorageConfig;
use crate::error::{AppError, AppResult};
use crate::models::{LaunchState, LaunchStatus, RevokeOptions, RevokeToggle, TokenForm};
use crate::storage::{ObjectStore, ProgressCallback, UploadProgress};
use crate::token::{ImageFile, ImageUploader, MetadataPublisher};
use crate::utils::lamports_to_sol;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// One launch request
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    pub form: TokenForm,
    pub image: Option<ImageFile>,
    pub revoke: RevokeOptions,
}

/// Created token details
#[derive(Debug, Clone)]
pub struct CreatedToken {
    /// Mint address
    pub mint: Pubkey,
    /// Owner's associated token account
    pub associated_token: Pubkey,
    /// Published metadata URI
    pub metadata_uri: String,
    /// Uploaded image URL, if an image was supplied
    pub image_url: Option<String>,
    /// Wallet submission result
    pub submission: Submission,
    /// Initial supply in base units
    pub amount: u64,
    /// Lamports deposited to keep the mint rent exempt
    pub rent_lamports: u64,
    /// Revoke toggles that were requested but not applied on-chain
    pub unenforced_revocations: Vec<RevokeToggle>,
}

/// Launch outcome
#[derive(Debug, Clone)]
pub enum LaunchOutcome {
    Created(CreatedToken),
    /// No wallet identity; nothing was uploaded or sent
    WalletNotConnected,
}

/// Clears the in-flight flag when a launch ends
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Token creation orchestrator
pub struct TokenLauncher {
    images: ImageUploader,
    publisher: MetadataPublisher,
    rpc: Arc<dyn ChainRpc>,
    wallet: Arc<dyn Wallet>,
    state: Arc<watch::Sender<LaunchState>>,
    in_flight: AtomicBool,
}

impl TokenLauncher {
    /// Create a launcher using the prefixes and limits from `storage`
    pub fn new(
        store: Arc<dyn ObjectStore>,
        rpc: Arc<dyn ChainRpc>,
        wallet: Arc<dyn Wallet>,
        storage: &StorageConfig,
    ) -> Self {
        let images = ImageUploader::new(store.clone(), storage.image_prefix.clone())
            .with_max_bytes(storage.max_image_bytes);
        let publisher = MetadataPublisher::new(store, storage.metadata_prefix.clone());
        let (state, _) = watch::channel(LaunchState::default());

        Self {
            images,
            publisher,
            rpc,
            wallet,
            state: Arc::new(state),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Watch launch state changes
    pub fn subscribe(&self) -> watch::Receiver<LaunchState> {
        self.state.subscribe()
    }

    /// Current launch state
    pub fn state(&self) -> LaunchState {
        self.state.borrow().clone()
    }

    /// Flip a revoke toggle between launches
    pub fn toggle(&self, toggle: RevokeToggle) -> AppResult<LaunchState> {
        self.update(|current| current.toggle(toggle))
    }

    /// Apply `next` to the current state under the channel's write lock
    ///
    /// Receivers are only notified when `next` succeeds.
    fn update<F>(&self, next: F) -> AppResult<LaunchState>
    where
        F: FnOnce(&LaunchState) -> AppResult<LaunchState>,
    {
        let mut outcome = None;
        self.state.send_if_modified(|current| match next(current) {
            Ok(updated) => {
                *current = updated.clone();
                outcome = Some(Ok(updated));
                true
            }
            Err(e) => {
                outcome = Some(Err(e));
                false
            }
        });
        outcome.unwrap_or_else(|| {
            Err(AppError::Internal(
                "Launch state update skipped".to_string(),
            ))
        })
    }

    fn advance(&self, next: LaunchStatus) -> AppResult<()> {
        let updated = self.update(|current| current.transition(next))?;
        tracing::debug!(status = %updated.status(), "Launch state changed");
        Ok(())
    }

    fn fail(&self, err: &AppError) {
        let failed = LaunchStatus::from(err);
        if let Err(e) = self.update(|current| current.transition(failed)) {
            tracing::warn!(error = %e, "Could not record launch failure");
        }
    }

    /// Return to `Idle` after a finished launch and apply the new toggles
    fn prepare(&self, revoke: RevokeOptions) -> AppResult<()> {
        self.update(|current| {
            let mut next = current.clone();
            // A dropped launch future leaves its last step behind
            if next.status().is_in_progress() {
                next = next.transition(LaunchStatus::Failed("Launch interrupted".to_string()))?;
            }
            if next.status().is_terminal() {
                next = next.transition(LaunchStatus::Idle)?;
            }
            next.with_revoke(revoke)
        })?;
        Ok(())
    }

    /// Run a launch
    ///
    /// Returns `Ok(LaunchOutcome::WalletNotConnected)` without touching the
    /// store or the cluster when the wallet has no identity.
    pub async fn launch(&self, request: LaunchRequest) -> AppResult<LaunchOutcome> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AppError::Validation(
                "A launch is already in progress".to_string(),
            ));
        }
        let _guard = InFlightGuard(&self.in_flight);

        self.prepare(request.revoke)?;

        let Some(wallet) = self.wallet.pubkey() else {
            tracing::warn!("Launch requested without a connected wallet");
            self.fail(&AppError::WalletNotConnected);
            return Ok(LaunchOutcome::WalletNotConnected);
        };

        let form = match request.form.validate() {
            Ok(form) => form,
            Err(e) => {
                self.fail(&e);
                return Err(e);
            }
        };

        match self
            .run(&form, request.image.as_ref(), request.revoke, wallet)
            .await
        {
            Ok(created) => {
                self.advance(LaunchStatus::Succeeded)?;
                Ok(LaunchOutcome::Created(created))
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    reason = e.reason(),
                    symbol = %form.symbol,
                    "Token launch failed"
                );
                self.fail(&e);
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        form: &TokenForm,
        image: Option<&ImageFile>,
        revoke: RevokeOptions,
        wallet: Pubkey,
    ) -> AppResult<CreatedToken> {
        let mint_keypair = Keypair::new();
        let mint = mint_keypair.pubkey();

        tracing::info!(
            mint = %mint,
            symbol = %form.symbol,
            decimals = form.decimals,
            supply = form.supply,
            "Starting token launch"
        );

        let image_url = match image {
            Some(image) => {
                self.advance(LaunchStatus::Uploading)?;
                let url = self.images.upload(image, Some(self.progress_callback())).await?;
                Some(url)
            }
            None => None,
        };

        self.advance(LaunchStatus::Publishing)?;
        let published = self.publisher.publish(form, image_url.as_deref()).await?;

        self.advance(LaunchStatus::Building)?;
        let sizing = compute_sizing(&mint, &wallet, &form.name, &form.symbol, &published.uri)?;
        let rent_lamports = self
            .rpc
            .minimum_balance_for_rent_exemption(sizing.total())
            .await?;
        tracing::debug!(
            bytes = sizing.total(),
            rent_sol = %lamports_to_sol(rent_lamports),
            "Rent exemption computed"
        );

        let plan = MintPlan::build(MintPlanParams {
            wallet,
            mint,
            form,
            metadata_uri: &published.uri,
            revoke,
            sizing,
            rent_lamports,
        })?;
        let associated_token = plan.associated_token;
        let amount = plan.amount;

        let blockhash = self.rpc.latest_blockhash().await?;
        let transaction = plan.into_transaction(&wallet, blockhash, &mint_keypair)?;

        self.advance(LaunchStatus::Submitting)?;
        let submission = self.wallet.send_transaction(transaction).await?;

        let unenforced_revocations = revoke.unenforced();
        for toggle in &unenforced_revocations {
            tracing::warn!(
                mint = %mint,
                authority = %toggle,
                "Revocation requested but not applied on-chain"
            );
        }

        tracing::info!(
            mint = %mint,
            associated_token = %associated_token,
            metadata_uri = %published.uri,
            "Token mint created at {}",
            mint
        );

        Ok(CreatedToken {
            mint,
            associated_token,
            metadata_uri: published.uri,
            image_url,
            submission,
            amount,
            rent_lamports,
            unenforced_revocations,
        })
    }

    fn progress_callback(&self) -> ProgressCallback {
        let state = self.state.clone();
        Arc::new(move |progress: UploadProgress| {
            let percent = progress.percent();
            state.send_modify(|current| *current = current.with_upload_progress(percent));
        })
    }
}
