//! Token creation engine
//!
//! Sizes the accounts, builds the mint plan and drives a launch through the
//! RPC and wallet seams.

mod launcher;
pub mod rpc;
mod transaction_builder;
pub mod wallet;

pub use launcher::*;
pub use rpc::{connect, ChainRpc};
pub use transaction_builder::*;
pub use wallet::{
    keypair_from_file, keypair_from_secrets, load_wallet_keypair, KeypairWallet, Submission,
    Wallet,
};
