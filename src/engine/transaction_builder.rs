//! Mint transaction builder
//!
//! Builds the six-instruction plan that creates a Token-2022 mint with an
//! on-chain metadata record and mints the initial supply to the owner:
//!
//! 1. System `create_account` for the mint (space = mint length, rent covers
//!    mint + metadata so the later realloc by the metadata program is funded)
//! 2. Metadata pointer `initialize` (points at the mint itself)
//! 3. `initialize_mint`
//! 4. Token metadata `initialize`
//! 5. Create the owner's associated token account
//! 6. `mint_to` the initial supply
//!
//! The plan is a plain value; signing and broadcast happen elsewhere.

use crate::constants::tlv::{LENGTH_SIZE, TYPE_SIZE};
use crate::error::{AppError, AppResult};
use crate::models::{RevokeOptions, TokenForm};
use solana_sdk::{
    hash::Hash,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::Keypair,
    transaction::Transaction,
};
use spl_pod::optional_keys::OptionalNonZeroPubkey;
use spl_token_2022::extension::ExtensionType;
use spl_token_2022::state::Mint;
use spl_token_metadata_interface::state::TokenMetadata;
use spl_type_length_value::variable_len_pack::VariableLenPack;

/// Step of the mint plan, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintStep {
    CreateAccount,
    InitializeMetadataPointer,
    InitializeMint,
    InitializeMetadata,
    CreateAssociatedAccount,
    MintTo,
}

impl MintStep {
    /// Fixed execution order
    pub const ORDER: [MintStep; 6] = [
        MintStep::CreateAccount,
        MintStep::InitializeMetadataPointer,
        MintStep::InitializeMint,
        MintStep::InitializeMetadata,
        MintStep::CreateAssociatedAccount,
        MintStep::MintTo,
    ];
}

impl std::fmt::Display for MintStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MintStep::CreateAccount => "create_account",
            MintStep::InitializeMetadataPointer => "initialize_metadata_pointer",
            MintStep::InitializeMint => "initialize_mint",
            MintStep::InitializeMetadata => "initialize_metadata",
            MintStep::CreateAssociatedAccount => "create_associated_token_account",
            MintStep::MintTo => "mint_to",
        };
        write!(f, "{}", name)
    }
}

/// Byte sizes of the mint account and its metadata record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountSizing {
    /// Base mint plus the metadata pointer extension
    pub mint_len: usize,
    /// TLV-wrapped packed `TokenMetadata`
    pub metadata_len: usize,
}

impl AccountSizing {
    /// Size the rent-exempt balance is computed for
    pub fn total(&self) -> usize {
        self.mint_len + self.metadata_len
    }
}

/// Compute account sizes for a mint with the given metadata
pub fn compute_sizing(
    mint: &Pubkey,
    update_authority: &Pubkey,
    name: &str,
    symbol: &str,
    uri: &str,
) -> AppResult<AccountSizing> {
    let mint_len = ExtensionType::try_calculate_account_len::<Mint>(&[
        ExtensionType::MetadataPointer,
    ])
    .map_err(|e| AppError::Instruction(format!("Failed to size mint account: {:?}", e)))?;

    let update_authority = OptionalNonZeroPubkey::try_from(Some(*update_authority))
        .map_err(|e| AppError::Instruction(format!("Invalid update authority: {:?}", e)))?;

    let metadata = TokenMetadata {
        update_authority,
        mint: *mint,
        name: name.to_string(),
        symbol: symbol.to_string(),
        uri: uri.to_string(),
        additional_metadata: Vec::new(),
    };

    let packed_len = metadata
        .get_packed_len()
        .map_err(|e| AppError::Instruction(format!("Failed to size metadata: {:?}", e)))?;

    Ok(AccountSizing {
        mint_len,
        metadata_len: TYPE_SIZE + LENGTH_SIZE + packed_len,
    })
}

/// Inputs for a mint plan
#[derive(Debug, Clone)]
pub struct MintPlanParams<'a> {
    /// Wallet: payer, owner and every authority
    pub wallet: Pubkey,
    /// New mint address
    pub mint: Pubkey,
    /// Validated form
    pub form: &'a TokenForm,
    /// Published metadata URI
    pub metadata_uri: &'a str,
    /// Revoke toggles
    pub revoke: RevokeOptions,
    /// Account sizes
    pub sizing: AccountSizing,
    /// Rent-exempt balance for `sizing.total()`
    pub rent_lamports: u64,
}

/// Instruction tagged with its plan step
#[derive(Debug, Clone)]
pub struct PlannedInstruction {
    pub step: MintStep,
    pub instruction: Instruction,
}

/// Ordered instruction list for one mint creation
#[derive(Debug, Clone)]
pub struct MintPlan {
    steps: Vec<PlannedInstruction>,
    /// Mint address
    pub mint: Pubkey,
    /// Owner's associated token account
    pub associated_token: Pubkey,
    /// Initial supply in base units
    pub amount: u64,
}

impl MintPlan {
    /// Build the plan
    pub fn build(params: MintPlanParams<'_>) -> AppResult<Self> {
        let program_id = spl_token_2022::id();
        let wallet = params.wallet;
        let mint = params.mint;
        let form = params.form;

        let amount = form.raw_supply()?;

        let associated_token =
            spl_associated_token_account::get_associated_token_address_with_program_id(
                &wallet,
                &mint,
                &program_id,
            );

        let create_account = solana_system_interface::instruction::create_account(
            &wallet,
            &mint,
            params.rent_lamports,
            params.sizing.mint_len as u64,
            &program_id,
        );

        let metadata_pointer =
            spl_token_2022::extension::metadata_pointer::instruction::initialize(
                &program_id,
                &mint,
                Some(wallet),
                Some(mint),
            )
            .map_err(|e| {
                AppError::Instruction(format!("Failed to build metadata pointer init: {:?}", e))
            })?;

        let freeze_authority = if params.revoke.freeze {
            None
        } else {
            Some(&wallet)
        };

        let initialize_mint = spl_token_2022::instruction::initialize_mint(
            &program_id,
            &mint,
            &wallet,
            freeze_authority,
            form.decimals,
        )
        .map_err(|e| AppError::Instruction(format!("Failed to build mint init: {:?}", e)))?;

        let initialize_metadata = spl_token_metadata_interface::instruction::initialize(
            &program_id,
            &mint,
            &wallet,
            &mint,
            &wallet,
            form.name.clone(),
            form.symbol.clone(),
            params.metadata_uri.to_string(),
        );

        let create_associated =
            spl_associated_token_account::instruction::create_associated_token_account(
                &wallet,
                &wallet,
                &mint,
                &program_id,
            );

        let mint_to = spl_token_2022::instruction::mint_to(
            &program_id,
            &mint,
            &associated_token,
            &wallet,
            &[],
            amount,
        )
        .map_err(|e| AppError::Instruction(format!("Failed to build mint_to: {:?}", e)))?;

        let steps = vec![
            PlannedInstruction {
                step: MintStep::CreateAccount,
                instruction: create_account,
            },
            PlannedInstruction {
                step: MintStep::InitializeMetadataPointer,
                instruction: metadata_pointer,
            },
            PlannedInstruction {
                step: MintStep::InitializeMint,
                instruction: initialize_mint,
            },
            PlannedInstruction {
                step: MintStep::InitializeMetadata,
                instruction: initialize_metadata,
            },
            PlannedInstruction {
                step: MintStep::CreateAssociatedAccount,
                instruction: create_associated,
            },
            PlannedInstruction {
                step: MintStep::MintTo,
                instruction: mint_to,
            },
        ];

        tracing::debug!(
            mint = %mint,
            associated_token = %associated_token,
            amount = amount,
            mint_len = params.sizing.mint_len,
            metadata_len = params.sizing.metadata_len,
            rent_lamports = params.rent_lamports,
            "Built mint plan"
        );

        Ok(Self {
            steps,
            mint,
            associated_token,
            amount,
        })
    }

    /// Planned instructions in order
    pub fn steps(&self) -> &[PlannedInstruction] {
        &self.steps
    }

    /// Step kinds in order
    pub fn step_kinds(&self) -> Vec<MintStep> {
        self.steps.iter().map(|planned| planned.step).collect()
    }

    /// Raw instructions in order
    pub fn instructions(&self) -> Vec<Instruction> {
        self.steps
            .iter()
            .map(|planned| planned.instruction.clone())
            .collect()
    }

    /// Assemble the transaction and sign it with the mint keypair
    ///
    /// The wallet signature is still missing afterwards.
    pub fn into_transaction(
        self,
        payer: &Pubkey,
        blockhash: Hash,
        mint_keypair: &Keypair,
    ) -> AppResult<Transaction> {
        let mut transaction = Transaction::new_with_payer(&self.instructions(), Some(payer));
        transaction
            .try_partial_sign(&[mint_keypair], blockhash)
            .map_err(|e| AppError::Signing(format!("Mint keypair signing failed: {}", e)))?;

        Ok(transaction)
    }
}
