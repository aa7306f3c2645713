use rust_decimal::prelude::*;
use std::path::{Path, PathBuf};

/// Convert Lamports (u64) to SOL for display, without float rounding
pub fn lamports_to_sol(lamports: u64) -> Decimal {
    let lamports_dec = Decimal::from(lamports);
    let divisor = Decimal::new(1_000_000_000, 0);

    lamports_dec / divisor
}

/// Expand a leading `~/` to the user's home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
