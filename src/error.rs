use std::io;

use polars::error::PolarsError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Crate-wide error taxonomy.
///
/// Per-item misses (a gene absent from a homology table, a region with no
/// features) are never errors; they are aggregated into `failed` /
/// `not_found` lists by the operations that produce them.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid caller-supplied configuration. Fail fast, no recovery.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A gene identifier pattern failed to compile.
    #[error("invalid identifier pattern: {0}")]
    Regex(#[from] regex_lite::Error),

    /// The on-disk feature store cache is unreadable or from another
    /// version. The store rebuilds once before surfacing this.
    #[error("cache integrity error: {0}")]
    CacheIntegrity(String),

    /// The operation observed a cancellation request at a phase boundary.
    /// This is a distinct outcome, not a failure.
    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Polars(#[from] PolarsError),

    /// GFF3 parsing failure (malformed record or stream).
    #[error("GFF parse error: {0}")]
    Gff(String),
}

impl Error {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
