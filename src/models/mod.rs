//! Data models for the token launchpad

mod form;
mod metadata;
mod status;

pub use form::*;
pub use metadata::*;
pub use status::*;
