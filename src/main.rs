//! Token Launchpad CLI
//!
//! Creates a Token-2022 mint with on-chain metadata from the command line.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use token_launchpad::config::AppConfig;
use token_launchpad::engine::{self, KeypairWallet, LaunchOutcome, LaunchRequest, TokenLauncher};
use token_launchpad::models::{LaunchStatus, RevokeOptions, SocialLinks, TokenForm};
use token_launchpad::storage::{FirebaseStorage, MemoryObjectStore, ObjectStore};
use token_launchpad::token::ImageFile;
use token_launchpad::vault::{self, Vault, VaultSecrets};
use token_launchpad::{constants, utils};

#[derive(Parser)]
#[command(name = "launchpad")]
#[command(about = "Create Token-2022 mints with on-chain metadata", long_about = None)]
#[command(version)]
struct Cli {
    /// RPC URL (overrides rpc.url)
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Wallet keypair file (overrides wallet.keypair_path)
    #[arg(long, global = true)]
    keypair: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload assets and create the token
    Create(CreateArgs),
    /// Show the fee estimate for a set of revoke options
    Fee(RevokeArgs),
    /// Encrypt a keypair file into the secrets vault
    SealWallet(SealWalletArgs),
    /// Print a fresh vault key for LAUNCHPAD_VAULT_KEY
    VaultKey,
}

#[derive(Args)]
struct RevokeArgs {
    /// Revoke the metadata update authority
    #[arg(long)]
    revoke_update: bool,
    /// Create the mint without a freeze authority
    #[arg(long)]
    revoke_freeze: bool,
    /// Revoke the mint authority
    #[arg(long)]
    revoke_mint: bool,
}

impl RevokeArgs {
    fn options(&self) -> RevokeOptions {
        RevokeOptions {
            update: self.revoke_update,
            freeze: self.revoke_freeze,
            mint: self.revoke_mint,
        }
    }
}

#[derive(Args)]
struct CreateArgs {
    /// Token name
    #[arg(long)]
    name: String,
    /// Ticker symbol
    #[arg(long)]
    symbol: String,
    /// Decimal places (0-9)
    #[arg(long, default_value_t = constants::token::DEFAULT_DECIMALS)]
    decimals: u8,
    /// Initial supply in whole tokens
    #[arg(long)]
    supply: u64,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    website: Option<String>,
    #[arg(long)]
    twitter: Option<String>,
    #[arg(long)]
    telegram: Option<String>,
    #[arg(long)]
    discord: Option<String>,
    /// Token image (PNG, JPG or GIF)
    #[arg(long)]
    image: Option<PathBuf>,
    #[command(flatten)]
    revoke: RevokeArgs,
    /// Keep uploads in memory and simulate the transaction
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct SealWalletArgs {
    /// Keypair JSON file to seal (defaults to the configured keypair)
    #[arg(long)]
    from: Option<PathBuf>,
    /// Object store auth token to store alongside the keypair
    #[arg(long)]
    storage_token: Option<String>,
    /// Output vault file (defaults to wallet.vault_path)
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = load_config()?;

    if let Some(url) = &cli.rpc_url {
        config.rpc.url = url.clone();
    }
    if let Some(path) = &cli.keypair {
        config.wallet.keypair_path = Some(path.clone());
    }

    match cli.command {
        Commands::Create(args) => {
            if args.dry_run {
                config.launch.simulate_only = true;
            }
            config
                .validate()
                .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;
            create(config, args).await
        }
        Commands::Fee(args) => {
            let options = args.options();
            println!(
                "Estimated fee: {} SOL ({} revoke option(s))",
                options.estimated_fee_sol(),
                options.enabled_count()
            );
            Ok(())
        }
        Commands::SealWallet(args) => seal_wallet(&config, args),
        Commands::VaultKey => {
            println!("{}", Vault::generate_key()?);
            eprintln!("Export it as LAUNCHPAD_VAULT_KEY before running seal-wallet");
            Ok(())
        }
    }
}

async fn create(config: AppConfig, args: CreateArgs) -> anyhow::Result<()> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        rpc = %config.rpc.url,
        simulate_only = config.launch.simulate_only,
        "Starting token launch"
    );

    let secrets = vault::load_secrets_if_present(config.wallet.vault_path.as_deref())
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load vault secrets, using plain configuration");
            None
        });

    let rpc_client = engine::connect(&config.rpc)?;

    let keypair = engine::load_wallet_keypair(&config.wallet, secrets.as_ref())?;
    let wallet = KeypairWallet::new(keypair, rpc_client.clone())
        .simulate_only(config.launch.simulate_only);

    let dry_run_store = config.launch.simulate_only.then(|| Arc::new(MemoryObjectStore::new()));
    let store: Arc<dyn ObjectStore> = match &dry_run_store {
        Some(memory) => {
            tracing::info!("Dry run: uploads stay in memory");
            memory.clone()
        }
        None => {
            let auth_token = secrets.as_ref().and_then(|s| s.storage_auth_token.clone());
            Arc::new(FirebaseStorage::new(&config.storage)?.with_auth_token(auth_token))
        }
    };

    let launcher = TokenLauncher::new(store, rpc_client, Arc::new(wallet), &config.storage);

    let image = match &args.image {
        Some(path) => Some(
            ImageFile::from_path(path)
                .await
                .with_context(|| format!("Failed to read image {}", path.display()))?,
        ),
        None => None,
    };

    let revoke = args.revoke.options();
    let form = TokenForm {
        name: args.name,
        symbol: args.symbol,
        decimals: args.decimals,
        supply: args.supply,
        description: args.description,
        links: SocialLinks {
            website: args.website,
            twitter: args.twitter,
            telegram: args.telegram,
            discord: args.discord,
        },
    };

    println!("Estimated fee: {} SOL", revoke.estimated_fee_sol());

    let mut updates = launcher.subscribe();
    let renderer = tokio::spawn(async move {
        let mut last = String::new();
        while updates.changed().await.is_ok() {
            let message = updates.borrow_and_update().status_message();
            if !message.is_empty() && message != last {
                println!("{}", message);
                last = message;
            }
        }
    });

    let result = launcher
        .launch(LaunchRequest {
            form,
            image,
            revoke,
        })
        .await;

    let final_state = launcher.state();
    drop(launcher);
    let _ = renderer.await;

    if let Some(memory) = dry_run_store.filter(|m| !m.is_empty()) {
        print_dry_run_objects(&memory);
    }

    match result {
        Ok(LaunchOutcome::Created(created)) => {
            println!("Mint: {}", created.mint);
            println!("Token account: {}", created.associated_token);
            println!("Metadata URI: {}", created.metadata_uri);
            println!(
                "Rent deposit: {} SOL",
                utils::lamports_to_sol(created.rent_lamports)
            );
            if let Some(url) = &created.image_url {
                println!("Image URL: {}", url);
            }
            match created.submission.signature() {
                Some(signature) => println!("Signature: {}", signature),
                None => println!("Simulated only, nothing was sent"),
            }
            for toggle in &created.unenforced_revocations {
                println!("Note: {} was not revoked on-chain", toggle);
            }
            Ok(())
        }
        Ok(LaunchOutcome::WalletNotConnected) => {
            anyhow::bail!("{}", final_state.status_message())
        }
        Err(e) => {
            let message = match final_state.status() {
                LaunchStatus::Failed(reason) => reason.clone(),
                _ => e.user_message(),
            };
            Err(anyhow::Error::new(e).context(message))
        }
    }
}

/// List what a dry run would have uploaded
fn print_dry_run_objects(store: &MemoryObjectStore) {
    println!("Dry run kept {} object(s) in memory:", store.len());
    for path in store.paths() {
        if let Some(object) = store.get(&path) {
            println!(
                "  {} ({}, {} bytes)",
                path,
                object.content_type,
                object.body.len()
            );
        }
    }
}

fn seal_wallet(config: &AppConfig, args: SealWalletArgs) -> anyhow::Result<()> {
    let source = args
        .from
        .or_else(|| config.wallet.keypair_path.clone())
        .context("No keypair file given")?;
    let out = args
        .out
        .or_else(|| config.wallet.vault_path.clone())
        .context("No vault path given")?;

    let source = utils::expand_home(&source);
    let raw = std::fs::read_to_string(&source)
        .with_context(|| format!("Failed to read {}", source.display()))?;
    let key_bytes: Vec<u8> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a keypair JSON array", source.display()))?;

    let secrets = VaultSecrets {
        wallet_private_key: Some(key_bytes),
        storage_auth_token: args.storage_token,
    };

    // Fails early on malformed key bytes
    let keypair = engine::keypair_from_secrets(&secrets)?;

    let vault = Vault::from_env()?;
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    vault.save_secrets(&secrets, &out)?;

    tracing::info!(
        pubkey = %solana_sdk::signature::Signer::pubkey(&keypair),
        path = %out.display(),
        "Wallet sealed into vault"
    );
    println!("Sealed wallet into {}", out.display());

    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "token_launchpad=info,launchpad=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .init();
}

/// Load configuration; validation runs after CLI overrides are applied
fn load_config() -> anyhow::Result<AppConfig> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        anyhow::anyhow!("Configuration error: {}", e)
    })
}
