//! Key/value persistence abstraction

use anyhow::Result;
use async_trait::async_trait;

/// Key holding the serialized session snapshot (holdings and parameters).
pub const SESSION_KEY: &str = "portfolio-data";

/// Key holding the last successful analysis result.
pub const RESULTS_KEY: &str = "portfolio-results";

/// A store of opaque string blobs addressed by well known keys.
///
/// Callers treat every failure as non-fatal: a failed `get` is handled like an
/// absent value and a failed `set` is logged and otherwise ignored.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
