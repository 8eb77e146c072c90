//! CLI command implementations.

pub mod migrate;
pub mod patch_urls;
pub mod seed;
