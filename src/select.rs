//! Best-hit selection over canonical homology tables.
//!
//! Selection is a three-stage pipeline: threshold filtering, a stable
//! multi-key sort, and an optional per-query cap. Every stage is
//! deterministic, so repeated runs over the same table yield identical
//! frames.

use log::warn;
use polars::prelude::*;

use crate::data_structs::criteria::SelectionCriteria;
use crate::data_structs::hit::{
    HomologyTable,
    COL_EVALUE,
    COL_PID,
    COL_QUERY,
    COL_SCORE,
};
use crate::error::Result;

/// Upper bound comparison (evalue) or lower bound (pid, score).
enum Bound {
    AtMost,
    AtLeast,
}

/// Applies the criteria to a table: rows failing any active threshold are
/// dropped, survivors are sorted by the criteria keys, and `top_n > 0`
/// keeps at most that many rows per query gene.
///
/// Metric cells that failed numeric coercion are treated permissively
/// (evalue 1.0, pid 0.0, score 0.0) and counted in a WARN message, so a
/// sloppy input column degrades loudly rather than silently.
pub fn select_best(
    table: &HomologyTable,
    criteria: &SelectionCriteria,
) -> Result<HomologyTable> {
    criteria.validate()?;

    let mut df = table.frame().clone();
    if df.height() == 0 {
        return HomologyTable::from_frame(df);
    }

    let thresholds = [
        (COL_EVALUE, criteria.evalue_threshold, Bound::AtMost, 1.0),
        (COL_PID, criteria.pid_threshold, Bound::AtLeast, 0.0),
        (COL_SCORE, criteria.score_threshold, Bound::AtLeast, 0.0),
    ];
    for (name, threshold, bound, default) in thresholds {
        let Some(threshold) = threshold
        else {
            continue;
        };
        let series = df.column(name)?.f64()?;
        let substituted = series.null_count();
        if substituted > 0 {
            warn!(
                "{} row(s) had no numeric '{}' value; substituting {} before \
                 threshold comparison",
                substituted, name, default
            );
        }
        let mask: BooleanChunked = series
            .iter()
            .map(|opt| {
                let value = opt.unwrap_or(default);
                Some(match bound {
                    Bound::AtMost => value <= threshold,
                    Bound::AtLeast => value >= threshold,
                })
            })
            .collect();
        df = df.filter(&mask)?;
    }

    let sort_cols: Vec<PlSmallStr> = criteria
        .sort_by
        .iter()
        .map(|key| PlSmallStr::from(key.column()))
        .collect();
    let descending: Vec<bool> =
        criteria.ascending.iter().map(|asc| !asc).collect();
    df = rank_and_cap(df, COL_QUERY, sort_cols, descending, criteria.top_n)?;

    HomologyTable::from_frame(df)
}

/// Sorts by the given keys (stable), then keeps at most `top_n` rows per
/// `group_col` value when `top_n > 0`. The returned frame is sorted by the
/// keys again so group capping never disturbs the global order.
pub(crate) fn rank_and_cap(
    df: DataFrame,
    group_col: &str,
    sort_cols: Vec<PlSmallStr>,
    descending: Vec<bool>,
    top_n: i64,
) -> Result<DataFrame> {
    let options = SortMultipleOptions::default()
        .with_order_descending_multi(descending)
        .with_maintain_order(true);
    let sorted = df.sort(sort_cols.clone(), options.clone())?;

    if top_n <= 0 || sorted.height() == 0 {
        return Ok(sorted);
    }

    let mut capped = sorted.clear();
    for group in sorted.partition_by_stable([group_col], true)? {
        capped.vstack_mut(&group.head(Some(top_n as usize)))?;
    }
    capped.sort(sort_cols, options).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structs::criteria::SortKey;
    use crate::data_structs::hit::COL_MATCH;

    fn table() -> HomologyTable {
        let df = df!(
            COL_QUERY => ["g1", "g1", "g1", "g2", "g2", "g3"],
            COL_MATCH => ["h1", "h2", "h3", "h4", "h5", "h6"],
            COL_SCORE => [Some(200.0), Some(150.0), Some(80.0), Some(120.0), Some(120.0), None],
            COL_EVALUE => [1e-80, 1e-60, 1e-9, 1e-30, 1e-40, 1e-50],
            COL_PID => [99.0, 90.0, 40.0, 85.0, 85.0, 70.0],
        )
        .unwrap();
        HomologyTable::from_frame(df).unwrap()
    }

    #[test]
    fn thresholds_drop_failing_rows() {
        // h3 fails the evalue threshold, h6's missing score becomes 0.0
        let criteria = SelectionCriteria::default().unlimited();
        let selected = select_best(&table(), &criteria).unwrap();
        let matches: Vec<_> = selected
            .frame()
            .column(COL_MATCH)
            .unwrap()
            .str()
            .unwrap()
            .iter()
            .flatten()
            .collect();
        assert!(!matches.contains(&"h3"));
        assert!(!matches.contains(&"h6"));
        assert_eq!(selected.len(), 4);
    }

    #[test]
    fn top_n_caps_each_query_group() {
        let criteria = SelectionCriteria::default();
        let selected = select_best(&table(), &criteria).unwrap();
        assert_eq!(selected.len(), 2);

        let df = selected.frame();
        let queries: Vec<_> = df
            .column(COL_QUERY)
            .unwrap()
            .str()
            .unwrap()
            .iter()
            .flatten()
            .collect();
        let matches: Vec<_> = df
            .column(COL_MATCH)
            .unwrap()
            .str()
            .unwrap()
            .iter()
            .flatten()
            .collect();
        assert_eq!(queries, vec!["g1", "g2"]);
        // g2 ties on score; the lower evalue (h5) wins
        assert_eq!(matches, vec!["h1", "h5"]);
    }

    #[test]
    fn nonpositive_top_n_keeps_all_survivors() {
        let criteria = SelectionCriteria::default()
            .with_top_n(-1)
            .with_evalue_threshold(None)
            .with_pid_threshold(None)
            .with_score_threshold(None);
        let selected = select_best(&table(), &criteria).unwrap();
        assert_eq!(selected.len(), 6);
    }

    #[test]
    fn ties_resolve_by_secondary_key() {
        let criteria = SelectionCriteria::default()
            .with_sort_by(vec![SortKey::Score, SortKey::Evalue])
            .with_ascending(vec![false, true])
            .unlimited()
            .with_evalue_threshold(None)
            .with_pid_threshold(None)
            .with_score_threshold(None);
        let selected = select_best(&table(), &criteria).unwrap();
        let matches: Vec<_> = selected
            .frame()
            .column(COL_MATCH)
            .unwrap()
            .str()
            .unwrap()
            .iter()
            .flatten()
            .collect();
        // h5 (1e-40) sorts before h4 (1e-30) at equal score
        let pos_h5 = matches.iter().position(|m| *m == "h5").unwrap();
        let pos_h4 = matches.iter().position(|m| *m == "h4").unwrap();
        assert!(pos_h5 < pos_h4);
    }

    #[test]
    fn empty_input_yields_empty_same_schema() {
        let empty = HomologyTable::from_frame(
            table().frame().clear(),
        )
        .unwrap();
        let selected =
            select_best(&empty, &SelectionCriteria::default()).unwrap();
        assert!(selected.is_empty());
        assert_eq!(
            selected.frame().get_column_names(),
            table().frame().get_column_names()
        );
    }
}
