//! Launch state machine
//!
//! Replaces ad-hoc UI flags with an immutable value that changes only
//! through validated transitions, so each step of a launch and each
//! failure point can be observed and tested without rendering anything.

use super::form::{RevokeOptions, RevokeToggle};
use crate::error::{AppError, AppResult};
use rust_decimal::Decimal;

/// Launch status
///
/// State transitions:
/// ```text
/// IDLE -> UPLOADING -> PUBLISHING -> BUILDING -> SUBMITTING -> SUCCEEDED
///   |         |             |            |           |
///   |         +-------------+------------+-----------+--> FAILED
///   +--> PUBLISHING (no image)
///   +--> FAILED (invalid form, wallet not connected)
///
/// SUCCEEDED | FAILED -> IDLE (resubmit)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchStatus {
    /// Nothing in flight
    Idle,
    /// Image upload in progress
    Uploading,
    /// Metadata document being published
    Publishing,
    /// Sizing, rent query and transaction assembly
    Building,
    /// Transaction handed to the wallet
    Submitting,
    /// Transaction confirmed
    Succeeded,
    /// Launch aborted with a user-visible reason
    Failed(String),
}

impl LaunchStatus {
    /// Check if transition to new status is valid
    pub fn can_transition_to(&self, next: &LaunchStatus) -> bool {
        use LaunchStatus::*;

        matches!(
            (self, next),
            (Idle, Uploading)
                | (Idle, Publishing)
                | (Uploading, Publishing)
                | (Publishing, Building)
                | (Building, Submitting)
                | (Submitting, Succeeded)
                // Resubmission
                | (Succeeded, Idle)
                | (Failed(_), Idle)
        ) || (matches!(next, Failed(_)) && !self.is_terminal())
    }

    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, LaunchStatus::Succeeded | LaunchStatus::Failed(_))
    }

    /// Check if a launch is currently running
    pub fn is_in_progress(&self) -> bool {
        !matches!(self, LaunchStatus::Idle) && !self.is_terminal()
    }
}

impl std::fmt::Display for LaunchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaunchStatus::Idle => write!(f, "IDLE"),
            LaunchStatus::Uploading => write!(f, "UPLOADING"),
            LaunchStatus::Publishing => write!(f, "PUBLISHING"),
            LaunchStatus::Building => write!(f, "BUILDING"),
            LaunchStatus::Submitting => write!(f, "SUBMITTING"),
            LaunchStatus::Succeeded => write!(f, "SUCCEEDED"),
            LaunchStatus::Failed(_) => write!(f, "FAILED"),
        }
    }
}

/// Snapshot of everything the form displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchState {
    status: LaunchStatus,
    upload_progress: u8,
    revoke: RevokeOptions,
}

impl Default for LaunchState {
    fn default() -> Self {
        Self::new(RevokeOptions::default())
    }
}

impl LaunchState {
    /// Idle state with the given toggles
    pub fn new(revoke: RevokeOptions) -> Self {
        Self {
            status: LaunchStatus::Idle,
            upload_progress: 0,
            revoke,
        }
    }

    pub fn status(&self) -> &LaunchStatus {
        &self.status
    }

    /// Upload progress percentage (0-100), only non-zero while uploading
    pub fn upload_progress(&self) -> u8 {
        self.upload_progress
    }

    pub fn revoke(&self) -> RevokeOptions {
        self.revoke
    }

    /// Move to `next`, rejecting transitions the diagram does not allow
    pub fn transition(&self, next: LaunchStatus) -> AppResult<LaunchState> {
        if !self.status.can_transition_to(&next) {
            return Err(AppError::Validation(format!(
                "Invalid launch transition {} -> {}",
                self.status, next
            )));
        }

        Ok(LaunchState {
            status: next,
            // Progress is reset whenever the upload step is left
            upload_progress: 0,
            revoke: self.revoke,
        })
    }

    /// Record upload progress; ignored outside of `Uploading`
    pub fn with_upload_progress(&self, percent: u8) -> LaunchState {
        let mut next = self.clone();
        if next.status == LaunchStatus::Uploading {
            next.upload_progress = percent.min(100);
        }
        next
    }

    /// Flip a revoke toggle; toggles are frozen while a launch runs
    pub fn toggle(&self, toggle: RevokeToggle) -> AppResult<LaunchState> {
        if self.status.is_in_progress() {
            return Err(AppError::Validation(
                "Authority options cannot change while a launch is in progress".to_string(),
            ));
        }

        Ok(LaunchState {
            revoke: self.revoke.toggled(toggle),
            ..self.clone()
        })
    }

    /// Replace all toggles at once; same rule as [`LaunchState::toggle`]
    pub fn with_revoke(&self, revoke: RevokeOptions) -> AppResult<LaunchState> {
        if self.status.is_in_progress() {
            return Err(AppError::Validation(
                "Authority options cannot change while a launch is in progress".to_string(),
            ));
        }

        Ok(LaunchState {
            revoke,
            ..self.clone()
        })
    }

    /// Displayed fee estimate in SOL
    pub fn estimated_fee_sol(&self) -> Decimal {
        self.revoke.estimated_fee_sol()
    }

    /// Human-readable status line
    pub fn status_message(&self) -> String {
        match &self.status {
            LaunchStatus::Idle => String::new(),
            LaunchStatus::Uploading => format!("Uploading image... {}%", self.upload_progress),
            LaunchStatus::Publishing => "Publishing metadata...".to_string(),
            LaunchStatus::Building => "Creating token, please wait...".to_string(),
            LaunchStatus::Submitting => "Waiting for wallet confirmation...".to_string(),
            LaunchStatus::Succeeded => "Token created successfully!".to_string(),
            LaunchStatus::Failed(reason) => reason.clone(),
        }
    }
}

impl From<&AppError> for LaunchStatus {
    fn from(err: &AppError) -> Self {
        LaunchStatus::Failed(err.user_message())
    }
}
