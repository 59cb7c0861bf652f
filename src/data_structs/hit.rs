//! Canonical in-memory form of a pairwise homology table.

use polars::prelude::*;

use crate::data_structs::typedef::GeneId;
use crate::error::{
    Error,
    Result,
};

/// Query-side gene identifier.
pub const COL_QUERY: &str = "query";
/// Match-side gene identifier.
pub const COL_MATCH: &str = "match";
pub const COL_SCORE: &str = "score";
pub const COL_EVALUE: &str = "evalue";
pub const COL_PID: &str = "pid";

/// The five canonical columns, in schema order.
pub const CANONICAL_COLUMNS: [&str; 5] =
    [COL_QUERY, COL_MATCH, COL_SCORE, COL_EVALUE, COL_PID];

/// A homology table with the canonical schema: `query` and `match` hold
/// normalized gene identifiers, `score`/`evalue`/`pid` are f64. Extra
/// columns from the source file are carried through untouched.
///
/// Only the loader and the identity constructor build these, so every
/// consumer can rely on the canonical columns being present.
#[derive(Debug, Clone)]
pub struct HomologyTable(DataFrame);

impl HomologyTable {
    /// Wraps a frame, verifying the canonical columns are all present.
    pub(crate) fn from_frame(df: DataFrame) -> Result<Self> {
        for name in CANONICAL_COLUMNS {
            if df.column(name).is_err() {
                return Err(Error::Configuration(format!(
                    "homology table is missing canonical column '{}'",
                    name
                )));
            }
        }
        Ok(Self(df))
    }

    /// Builds the identity table used by the degenerate bridge topologies:
    /// every gene maps to itself with a sentinel perfect score.
    pub fn identity(gene_ids: &[GeneId]) -> Result<Self> {
        let n = gene_ids.len();
        let df = df!(
            COL_QUERY => gene_ids,
            COL_MATCH => gene_ids,
            COL_SCORE => vec![f64::MAX; n],
            COL_EVALUE => vec![0.0f64; n],
            COL_PID => vec![100.0f64; n],
        )?;
        Ok(Self(df))
    }

    pub fn frame(&self) -> &DataFrame {
        &self.0
    }

    pub fn into_frame(self) -> DataFrame {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.height()
    }

    pub fn is_empty(&self) -> bool {
        self.0.height() == 0
    }
}
