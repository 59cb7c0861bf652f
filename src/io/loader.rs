//! Mapping of raw homology tables onto the canonical schema.

use log::debug;
use polars::prelude::*;
use regex_lite::Regex;

use crate::data_structs::hit::{
    HomologyTable,
    COL_EVALUE,
    COL_MATCH,
    COL_PID,
    COL_QUERY,
    COL_SCORE,
};
use crate::data_structs::ids::normalize_id;
use crate::error::{
    Error,
    Result,
};
use crate::with_field_fn;

/// Names of the five logical columns inside a source table, plus the
/// delimiter used for multi-value match cells.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub query_col:  String,
    pub match_col:  String,
    pub score_col:  String,
    pub evalue_col: String,
    pub pid_col:    String,
    /// Delimiter splitting several match identifiers inside one cell.
    pub match_delimiter: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            query_col:  "Query".into(),
            match_col:  "Match".into(),
            score_col:  "Score".into(),
            evalue_col: "Exp".into(),
            pid_col:    "PID".into(),
            match_delimiter: ",".into(),
        }
    }
}

impl ColumnMap {
    with_field_fn!(query_col, String);

    with_field_fn!(match_col, String);

    with_field_fn!(score_col, String);

    with_field_fn!(evalue_col, String);

    with_field_fn!(pid_col, String);

    with_field_fn!(match_delimiter, String);
}

/// Converts a raw table into a canonical [`HomologyTable`].
///
/// Source columns are renamed to the canonical names, metric columns are
/// cast to f64 (unparsable cells become null, handled downstream), cells
/// holding several match identifiers are exploded into one row each, and
/// both identifier columns are normalized with the respective assembly
/// patterns. Rows lacking a query or match identifier are dropped.
pub fn load(
    df: DataFrame,
    columns: &ColumnMap,
    query_pattern: Option<&Regex>,
    match_pattern: Option<&Regex>,
) -> Result<HomologyTable> {
    let required = [
        ("query", &columns.query_col),
        ("match", &columns.match_col),
        ("score", &columns.score_col),
        ("evalue", &columns.evalue_col),
        ("pid", &columns.pid_col),
    ];
    for (logical, source) in required {
        if df.column(source).is_err() {
            return Err(Error::Configuration(format!(
                "{} column '{}' not found in homology table (available: {:?})",
                logical,
                source,
                df.get_column_names()
            )));
        }
    }

    let existing = [
        columns.query_col.as_str(),
        columns.match_col.as_str(),
        columns.score_col.as_str(),
        columns.evalue_col.as_str(),
        columns.pid_col.as_str(),
    ];
    let canonical = [COL_QUERY, COL_MATCH, COL_SCORE, COL_EVALUE, COL_PID];

    let mut df = df
        .lazy()
        .rename(existing, canonical, true)
        .with_columns([
            col(COL_QUERY).cast(DataType::String),
            col(COL_MATCH).cast(DataType::String),
            col(COL_SCORE).cast(DataType::Float64),
            col(COL_EVALUE).cast(DataType::Float64),
            col(COL_PID).cast(DataType::Float64),
        ])
        .with_column(
            col(COL_MATCH)
                .str()
                .split(lit(columns.match_delimiter.clone())),
        )
        .explode([col(COL_MATCH)])
        .filter(
            col(COL_QUERY)
                .is_not_null()
                .and(col(COL_MATCH).is_not_null()),
        )
        .collect()?;

    for (name, pattern) in
        [(COL_QUERY, query_pattern), (COL_MATCH, match_pattern)]
    {
        let normalized: Vec<Option<String>> = df
            .column(name)?
            .str()?
            .iter()
            .map(|opt| opt.map(|raw| normalize_id(raw, pattern)))
            .collect();
        df.with_column(Series::new(name.into(), normalized))?;
    }

    // Normalization can produce empty ids from all-whitespace cells.
    let keep: BooleanChunked = df
        .column(COL_QUERY)?
        .str()?
        .iter()
        .zip(df.column(COL_MATCH)?.str()?.iter())
        .map(|(q, m)| {
            Some(
                q.map(|s| !s.is_empty()).unwrap_or(false)
                    && m.map(|s| !s.is_empty()).unwrap_or(false),
            )
        })
        .collect();
    let df = df.filter(&keep)?;

    debug!(
        "loaded homology table: {} rows, {} columns",
        df.height(),
        df.width()
    );
    HomologyTable::from_frame(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_frame() -> DataFrame {
        df!(
            "Query" => ["s1.1", "s2.1", " s3.1 "],
            "Match" => ["b1.1", "b2.1,b3.1", "b4.1"],
            "Score" => ["100.5", "90", "bad"],
            "Exp" => [1e-50, 1e-40, 1e-30],
            "PID" => [98.0, 95.0, 80.0],
        )
        .unwrap()
    }

    #[test]
    fn multi_value_cells_explode_into_rows() {
        let pattern = regex_lite::Regex::new(r"^(\w+?)\.\d+$").unwrap();
        let table = load(
            raw_frame(),
            &ColumnMap::default(),
            Some(&pattern),
            Some(&pattern),
        )
        .unwrap();

        assert_eq!(table.len(), 4);
        let df = table.frame();
        let matches: Vec<_> = df
            .column(COL_MATCH)
            .unwrap()
            .str()
            .unwrap()
            .iter()
            .flatten()
            .collect();
        assert_eq!(matches, vec!["b1", "b2", "b3", "b4"]);
        // the exploded rows share the originating row's metrics
        let queries: Vec<_> = df
            .column(COL_QUERY)
            .unwrap()
            .str()
            .unwrap()
            .iter()
            .flatten()
            .collect();
        assert_eq!(queries, vec!["s1", "s2", "s2", "s3"]);
    }

    #[test]
    fn unparsable_metric_becomes_null() {
        let table =
            load(raw_frame(), &ColumnMap::default(), None, None).unwrap();
        let score = table.frame().column(COL_SCORE).unwrap().f64().unwrap();
        assert_eq!(score.get(0), Some(100.5));
        assert_eq!(score.get(3), None);
    }

    #[test]
    fn missing_source_column_names_logical_column() {
        let df = df!("Query" => ["a"], "Match" => ["b"]).unwrap();
        let err =
            load(df, &ColumnMap::default(), None, None).unwrap_err();
        match err {
            Error::Configuration(msg) => {
                assert!(msg.contains("score column 'Score'"))
            },
            other => panic!("unexpected error: {other}"),
        }
    }
}
