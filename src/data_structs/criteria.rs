use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::hit;
use crate::error::{
    Error,
    Result,
};
use crate::with_field_fn;

/// Sortable columns of a canonical homology table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Score,
    Evalue,
    Pid,
}

impl SortKey {
    pub fn column(&self) -> &'static str {
        match self {
            SortKey::Score => hit::COL_SCORE,
            SortKey::Evalue => hit::COL_EVALUE,
            SortKey::Pid => hit::COL_PID,
        }
    }
}

/// Selection criteria for the best-hit selector.
///
/// Thresholds are optional; `None` disables the corresponding filter.
/// `top_n <= 0` keeps every surviving hit per query gene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionCriteria {
    pub sort_by:   Vec<SortKey>,
    pub ascending: Vec<bool>,
    pub top_n:     i64,
    pub evalue_threshold: Option<f64>,
    pub pid_threshold:    Option<f64>,
    pub score_threshold:  Option<f64>,
    pub strict_subgenome_priority: bool,
}

impl Default for SelectionCriteria {
    fn default() -> Self {
        Self {
            sort_by:   vec![SortKey::Score, SortKey::Evalue],
            ascending: vec![false, true],
            top_n:     1,
            evalue_threshold: Some(1e-10),
            pid_threshold:    Some(30.0),
            score_threshold:  Some(50.0),
            strict_subgenome_priority: false,
        }
    }
}

impl SelectionCriteria {
    with_field_fn!(sort_by, Vec<SortKey>);

    with_field_fn!(ascending, Vec<bool>);

    with_field_fn!(top_n, i64);

    with_field_fn!(evalue_threshold, Option<f64>);

    with_field_fn!(pid_threshold, Option<f64>);

    with_field_fn!(score_threshold, Option<f64>);

    with_field_fn!(strict_subgenome_priority, bool);

    /// Keep every hit that passes the thresholds.
    pub fn unlimited(self) -> Self {
        self.with_top_n(0)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sort_by.is_empty() {
            return Err(Error::Configuration(
                "selection criteria must name at least one sort key".into(),
            ));
        }
        if self.sort_by.len() != self.ascending.len() {
            return Err(Error::Configuration(format!(
                "sort_by has {} keys but ascending has {} flags",
                self.sort_by.len(),
                self.ascending.len()
            )));
        }
        Ok(())
    }
}
