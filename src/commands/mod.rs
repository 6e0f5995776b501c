//! Operator commands for managing the video library in the blob store.

pub mod clear;
pub mod compress;
pub mod list;
pub mod upload;

use anyhow::Context;
use std::sync::Arc;

use crate::{blob, blob::BlobStore, config::Config};

/// The configured store; fails when no token is set.
pub fn require_store(config: &Config) -> anyhow::Result<Arc<dyn BlobStore>> {
    blob::connect(config)?.context(
        "BLOB_READ_WRITE_TOKEN is not configured. Add it to .env.local or the environment",
    )
}

pub(crate) fn rule() -> String {
    "=".repeat(50)
}
