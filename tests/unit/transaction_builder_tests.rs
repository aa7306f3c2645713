//! Mint plan tests
//!
//! Decodes the built instructions with the program crates' own unpackers and
//! checks order, accounts and amounts before anything is signed.

use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use spl_token_2022::instruction::TokenInstruction;
use spl_token_metadata_interface::instruction::TokenMetadataInstruction;
use token_launchpad::engine::{compute_sizing, MintPlan, MintPlanParams, MintStep};
use token_launchpad::models::{RevokeOptions, TokenForm};

const URI: &str = "https://example.test/token-metadata/FOO-1700000000000.json";
const RENT: u64 = 4_000_000;

struct Fixture {
    wallet: Keypair,
    mint: Keypair,
    form: TokenForm,
}

impl Fixture {
    fn new(form: TokenForm) -> Self {
        Self {
            wallet: Keypair::new(),
            mint: Keypair::new(),
            form,
        }
    }

    fn plan(&self, revoke: RevokeOptions) -> MintPlan {
        let sizing = compute_sizing(
            &self.mint.pubkey(),
            &self.wallet.pubkey(),
            &self.form.name,
            &self.form.symbol,
            URI,
        )
        .unwrap();

        MintPlan::build(MintPlanParams {
            wallet: self.wallet.pubkey(),
            mint: self.mint.pubkey(),
            form: &self.form,
            metadata_uri: URI,
            revoke,
            sizing,
            rent_lamports: RENT,
        })
        .unwrap()
    }
}

fn foo() -> Fixture {
    Fixture::new(TokenForm::new("Foo", "FOO", 1000))
}

#[test]
fn test_instruction_order() {
    let plan = foo().plan(RevokeOptions::default());
    assert_eq!(plan.step_kinds(), MintStep::ORDER.to_vec());
    assert_eq!(plan.instructions().len(), 6);
}

#[test]
fn test_program_ids() {
    let plan = foo().plan(RevokeOptions::default());
    let programs: Vec<Pubkey> = plan
        .instructions()
        .iter()
        .map(|ix| ix.program_id)
        .collect();

    assert_eq!(programs[0], solana_system_interface::program::ID);
    assert_eq!(programs[1], spl_token_2022::id());
    assert_eq!(programs[2], spl_token_2022::id());
    assert_eq!(programs[3], spl_token_2022::id());
    assert_eq!(programs[4], spl_associated_token_account::id());
    assert_eq!(programs[5], spl_token_2022::id());
}

#[test]
fn test_create_account_sizes_mint_but_funds_metadata() {
    let fixture = foo();
    let plan = fixture.plan(RevokeOptions::default());
    let create = &plan.instructions()[0];

    // SystemInstruction::CreateAccount: tag (u32) | lamports (u64) | space (u64) | owner
    let data = &create.data;
    assert_eq!(u32::from_le_bytes(data[0..4].try_into().unwrap()), 0);
    assert_eq!(u64::from_le_bytes(data[4..12].try_into().unwrap()), RENT);
    assert_eq!(u64::from_le_bytes(data[12..20].try_into().unwrap()), 234);
    assert_eq!(&data[20..52], spl_token_2022::id().as_ref());

    assert_eq!(create.accounts[0].pubkey, fixture.wallet.pubkey());
    assert_eq!(create.accounts[1].pubkey, fixture.mint.pubkey());
    assert!(create.accounts[1].is_signer);
}

#[test]
fn test_metadata_sizing() {
    let fixture = foo();
    let sizing = compute_sizing(
        &fixture.mint.pubkey(),
        &fixture.wallet.pubkey(),
        "Foo",
        "FOO",
        URI,
    )
    .unwrap();

    assert_eq!(sizing.mint_len, 234);
    assert_eq!(sizing.metadata_len, 84 + 3 + 3 + URI.len());
    assert_eq!(sizing.total(), sizing.mint_len + sizing.metadata_len);
}

#[test]
fn test_initialize_mint_keeps_freeze_authority_by_default() {
    let fixture = foo();
    let plan = fixture.plan(RevokeOptions::default());

    match TokenInstruction::unpack(&plan.instructions()[2].data).unwrap() {
        TokenInstruction::InitializeMint {
            decimals,
            mint_authority,
            freeze_authority,
        } => {
            assert_eq!(decimals, 9);
            assert_eq!(mint_authority, fixture.wallet.pubkey());
            assert_eq!(Option::<Pubkey>::from(freeze_authority), Some(fixture.wallet.pubkey()));
        }
        other => panic!("unexpected instruction: {:?}", other),
    }
}

#[test]
fn test_revoke_freeze_drops_freeze_authority() {
    let fixture = foo();
    let plan = fixture.plan(RevokeOptions {
        freeze: true,
        ..Default::default()
    });

    match TokenInstruction::unpack(&plan.instructions()[2].data).unwrap() {
        TokenInstruction::InitializeMint {
            freeze_authority, ..
        } => assert_eq!(Option::<Pubkey>::from(freeze_authority), None),
        other => panic!("unexpected instruction: {:?}", other),
    }
}

#[test]
fn test_revoke_update_and_mint_do_not_change_plan() {
    let fixture = foo();
    let plain = fixture.plan(RevokeOptions::default());
    let revoked = fixture.plan(RevokeOptions {
        update: true,
        mint: true,
        freeze: false,
    });

    assert_eq!(plain.instructions(), revoked.instructions());
}

#[test]
fn test_metadata_initialize_fields() {
    let fixture = foo();
    let plan = fixture.plan(RevokeOptions::default());
    let ix = &plan.instructions()[3];

    // metadata account is the mint itself
    assert_eq!(ix.accounts[0].pubkey, fixture.mint.pubkey());
    assert_eq!(ix.accounts[1].pubkey, fixture.wallet.pubkey());
    assert_eq!(ix.accounts[2].pubkey, fixture.mint.pubkey());
    assert_eq!(ix.accounts[3].pubkey, fixture.wallet.pubkey());

    match TokenMetadataInstruction::unpack(&ix.data).unwrap() {
        TokenMetadataInstruction::Initialize(init) => {
            assert_eq!(init.name, "Foo");
            assert_eq!(init.symbol, "FOO");
            assert_eq!(init.uri, URI);
        }
        other => panic!("unexpected instruction: {:?}", other),
    }
}

#[test]
fn test_mint_to_amount_and_destination() {
    let fixture = foo();
    let plan = fixture.plan(RevokeOptions::default());

    let expected_ata = spl_associated_token_account::get_associated_token_address_with_program_id(
        &fixture.wallet.pubkey(),
        &fixture.mint.pubkey(),
        &spl_token_2022::id(),
    );
    assert_eq!(plan.associated_token, expected_ata);
    assert_eq!(plan.amount, 1_000_000_000_000);

    let mint_to = &plan.instructions()[5];
    assert_eq!(mint_to.accounts[0].pubkey, fixture.mint.pubkey());
    assert_eq!(mint_to.accounts[1].pubkey, expected_ata);
    assert_eq!(mint_to.accounts[2].pubkey, fixture.wallet.pubkey());

    match TokenInstruction::unpack(&mint_to.data).unwrap() {
        TokenInstruction::MintTo { amount } => assert_eq!(amount, 1_000_000_000_000),
        other => panic!("unexpected instruction: {:?}", other),
    }
}

#[test]
fn test_zero_decimals_amount() {
    let mut form = TokenForm::new("Bar", "BAR", 42);
    form.decimals = 0;
    let plan = Fixture::new(form).plan(RevokeOptions::default());
    assert_eq!(plan.amount, 42);
}

#[test]
fn test_transaction_signed_by_mint_only() {
    let fixture = foo();
    let plan = fixture.plan(RevokeOptions::default());
    let blockhash = Hash::new_unique();

    let tx = plan
        .into_transaction(&fixture.wallet.pubkey(), blockhash, &fixture.mint)
        .unwrap();

    assert_eq!(tx.message.recent_blockhash, blockhash);
    assert_eq!(tx.message.account_keys[0], fixture.wallet.pubkey());
    assert_eq!(tx.message.instructions.len(), 6);
    assert!(!tx.is_signed());

    let mint_index = tx
        .message
        .account_keys
        .iter()
        .position(|key| *key == fixture.mint.pubkey())
        .unwrap();
    assert_ne!(tx.signatures[mint_index], solana_sdk::signature::Signature::default());
    assert_eq!(tx.signatures[0], solana_sdk::signature::Signature::default());
}
