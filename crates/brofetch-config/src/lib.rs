//! Configuration types for brofetch.
//!
//! This crate provides [`ClientOptions`], the per-client settings used by
//! `brofetch-http`, and the loaders that read them from
//! `.brofetch/config.yaml` files and the environment.

pub mod types;
pub mod loader;
pub mod env;

pub use types::*;
pub use loader::*;
pub use env::*;
