//! Token form input and the authority-revocation toggles

use crate::constants::{fees, token};
use crate::error::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Optional social links shown in the metadata document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord: Option<String>,
}

impl SocialLinks {
    /// Drop links that are blank
    pub fn normalized(self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            website: keep(self.website),
            twitter: keep(self.twitter),
            telegram: keep(self.telegram),
            discord: keep(self.discord),
        }
    }
}

/// Token creation form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenForm {
    /// Token name
    pub name: String,
    /// Ticker symbol
    pub symbol: String,
    /// Number of decimal places (0-9)
    pub decimals: u8,
    /// Initial supply in whole tokens
    pub supply: u64,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Social links
    #[serde(default)]
    pub links: SocialLinks,
}

impl TokenForm {
    /// Create a form with the default decimal count and no description or links
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, supply: u64) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals: token::DEFAULT_DECIMALS,
            supply,
            description: String::new(),
            links: SocialLinks::default(),
        }
    }

    /// Check the form invariants and return a trimmed copy
    pub fn validate(&self) -> AppResult<TokenForm> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Token name is required".to_string()));
        }

        let symbol = self.symbol.trim();
        if symbol.is_empty() {
            return Err(AppError::Validation("Token symbol is required".to_string()));
        }

        if self.decimals > token::MAX_DECIMALS {
            return Err(AppError::Validation(format!(
                "Decimals must be between 0 and {}, got {}",
                token::MAX_DECIMALS,
                self.decimals
            )));
        }

        if self.supply < 1 {
            return Err(AppError::Validation(
                "Supply must be at least 1".to_string(),
            ));
        }

        // Reject supplies whose base-unit amount does not fit in a u64
        self.raw_supply()?;

        Ok(TokenForm {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals: self.decimals,
            supply: self.supply,
            description: self.description.trim().to_string(),
            links: self.links.clone().normalized(),
        })
    }

    /// Initial supply in base units: `supply × 10^decimals`
    pub fn raw_supply(&self) -> AppResult<u64> {
        raw_amount(self.supply, self.decimals)
    }
}

/// Scale a whole-token amount to base units with checked integer arithmetic
pub fn raw_amount(supply: u64, decimals: u8) -> AppResult<u64> {
    10u64
        .checked_pow(u32::from(decimals))
        .and_then(|scale| supply.checked_mul(scale))
        .ok_or_else(|| {
            AppError::Validation(format!(
                "Supply {} with {} decimals exceeds the maximum token amount",
                supply, decimals
            ))
        })
}

/// Authority revocation toggles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokeOptions {
    /// Revoke the metadata update authority
    pub update: bool,
    /// Create the mint without a freeze authority
    pub freeze: bool,
    /// Revoke the mint authority
    pub mint: bool,
}

/// One of the three revoke toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeToggle {
    Update,
    Freeze,
    Mint,
}

impl std::fmt::Display for RevokeToggle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RevokeToggle::Update => write!(f, "update_authority"),
            RevokeToggle::Freeze => write!(f, "freeze_authority"),
            RevokeToggle::Mint => write!(f, "mint_authority"),
        }
    }
}

impl RevokeOptions {
    /// Flip one toggle, returning the new options
    pub fn toggled(self, toggle: RevokeToggle) -> Self {
        match toggle {
            RevokeToggle::Update => Self { update: !self.update, ..self },
            RevokeToggle::Freeze => Self { freeze: !self.freeze, ..self },
            RevokeToggle::Mint => Self { mint: !self.mint, ..self },
        }
    }

    /// Number of enabled toggles
    pub fn enabled_count(&self) -> u32 {
        [self.update, self.freeze, self.mint]
            .iter()
            .filter(|enabled| **enabled)
            .count() as u32
    }

    /// Displayed fee estimate in SOL: base fee plus 0.05 per enabled toggle
    pub fn estimated_fee_sol(&self) -> Decimal {
        fees::BASE_FEE_SOL + fees::REVOKE_FEE_SOL * Decimal::from(self.enabled_count())
    }

    /// Toggles accepted from the user that no instruction enforces yet
    pub fn unenforced(&self) -> Vec<RevokeToggle> {
        let mut pending = Vec::new();
        if self.update {
            pending.push(RevokeToggle::Update);
        }
        if self.mint {
            pending.push(RevokeToggle::Mint);
        }
        pending
    }
}
