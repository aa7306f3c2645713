//! Off-chain token assets
//!
//! - Image upload (`token_images/<file>`)
//! - Metadata document publishing (`token-metadata/<symbol>-<timestamp>.json`)

mod image;
mod publisher;

pub use image::*;
pub use publisher::*;
