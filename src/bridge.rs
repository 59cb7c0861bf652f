//! Two-hop homology resolution through a bridge species.
//!
//! Source genes are mapped to bridge genes (hop A), bridge genes to target
//! genes (hop C), and the hops are joined on the bridge identifier. When
//! the source or target assembly *is* the bridge, the corresponding hop is
//! replaced by a synthetic identity table so the remaining hop still runs
//! through the same pipeline.

use hashbrown::HashSet;
use itertools::Itertools;
use log::{
    debug,
    info,
};
use polars::prelude::*;

use crate::data_structs::criteria::SelectionCriteria;
use crate::data_structs::descriptor::GenomeAssemblyDescriptor;
use crate::data_structs::hit::{
    HomologyTable,
    COL_EVALUE,
    COL_MATCH,
    COL_PID,
    COL_QUERY,
    COL_SCORE,
};
use crate::data_structs::ids::{
    normalize_id,
    parse_subgenome,
};
use crate::data_structs::mapping::{
    BridgeOutcome,
    COL_BRIDGE_GENE,
    COL_BT_EVALUE,
    COL_BT_PID,
    COL_BT_SCORE,
    COL_NUM_BRIDGE,
    COL_NUM_TARGET,
    COL_SB_EVALUE,
    COL_SB_PID,
    COL_SB_SCORE,
    COL_SOURCE_GENE,
    COL_TARGET_GENE,
    OUTPUT_COLUMNS,
};
use crate::data_structs::typedef::GeneId;
use crate::error::{
    Error,
    Result,
};
use crate::select::{
    rank_and_cap,
    select_best,
};
use crate::task::TaskHandle;

/// Everything one bridge mapping run needs. Tables may be omitted for the
/// hop a degenerate topology replaces with an identity table.
pub struct BridgeRequest<'a> {
    pub source: &'a GenomeAssemblyDescriptor,
    pub bridge: &'a GenomeAssemblyDescriptor,
    pub target: &'a GenomeAssemblyDescriptor,
    pub source_to_bridge: Option<&'a HomologyTable>,
    pub bridge_to_target: Option<&'a HomologyTable>,
    pub source_criteria: SelectionCriteria,
    pub target_criteria: SelectionCriteria,
}

impl<'a> BridgeRequest<'a> {
    pub fn source_is_bridge(&self) -> bool {
        self.source.assembly_id == self.bridge.assembly_id
    }

    pub fn target_is_bridge(&self) -> bool {
        self.target.assembly_id == self.bridge.assembly_id
    }

    fn strict_subgenome(&self) -> bool {
        (self.source_criteria.strict_subgenome_priority
            || self.target_criteria.strict_subgenome_priority)
            && self.source.is_cotton
            && self.target.is_cotton
    }
}

/// Resolves `gene_ids` from the source assembly to the target assembly via
/// the bridge. Every requested gene ends up either in the returned records
/// (possibly several rows) or in the failed list, in its original spelling.
pub fn map_via_bridge(
    request: &BridgeRequest,
    gene_ids: &[GeneId],
    task: &TaskHandle,
) -> Result<BridgeOutcome> {
    request.source_criteria.validate()?;
    request.target_criteria.validate()?;
    task.checkpoint(0, "normalizing requested gene identifiers")?;

    // (normalized, raw) pairs in request order, first spelling wins. An
    // identifier that normalizes to empty keeps an empty normalized slot so
    // it still lands in the failed list under its raw spelling.
    let source_pattern = request.source.compiled_pattern()?;
    let mut requested: Vec<GeneId> = Vec::with_capacity(gene_ids.len());
    let mut ordered: Vec<(GeneId, GeneId)> =
        Vec::with_capacity(gene_ids.len());
    let mut seen: HashSet<GeneId> = HashSet::new();
    for raw in gene_ids {
        let normalized = normalize_id(raw, source_pattern.as_ref());
        let key = if normalized.is_empty() {
            raw.clone()
        }
        else {
            normalized.clone()
        };
        if !seen.insert(key) {
            continue;
        }
        if !normalized.is_empty() {
            requested.push(normalized.clone());
        }
        ordered.push((normalized, raw.clone()));
    }
    if requested.is_empty() {
        return BridgeOutcome::all_failed(raw_ids(ordered));
    }
    info!(
        "bridge mapping {} gene(s): {} -> {} via {}",
        requested.len(),
        request.source.assembly_id,
        request.target.assembly_id,
        request.bridge.assembly_id
    );

    // Step A: all admissible bridge candidates per source gene.
    task.checkpoint(10, "selecting source to bridge candidates")?;
    let hop_a_input = if request.source_is_bridge() {
        HomologyTable::identity(&requested)?
    }
    else {
        let table = request.source_to_bridge.ok_or_else(|| {
            Error::Configuration(
                "source to bridge homology table is required in standard \
                 topology"
                    .into(),
            )
        })?;
        subset_by_query(table, &requested)?
    };
    let hop_a = select_best(
        &hop_a_input,
        &request.source_criteria.clone().unlimited(),
    )?;

    // Step B: global rank by hop-A score descending, then per-source-gene
    // cap. The caller's sort keys only order hop outputs; the cap always
    // keeps the highest-scoring bridge candidates. Gene identifiers break
    // score ties so capping is deterministic.
    task.checkpoint(30, "ranking bridge candidates per source gene")?;
    let hop_a = rank_and_cap(
        hop_a.into_frame(),
        COL_QUERY,
        vec![
            PlSmallStr::from(COL_SCORE),
            PlSmallStr::from(COL_QUERY),
            PlSmallStr::from(COL_MATCH),
        ],
        vec![true, false, false],
        request.source_criteria.top_n,
    )?;
    if hop_a.height() == 0 {
        debug!("no bridge candidates survived selection");
        return BridgeOutcome::all_failed(raw_ids(ordered));
    }

    // Step C: targets for the retained bridge genes, uncapped. One bridge
    // gene may legitimately have several true target paralogs.
    task.checkpoint(50, "selecting bridge to target candidates")?;
    let bridge_ids: Vec<GeneId> = hop_a
        .column(COL_MATCH)?
        .str()?
        .iter()
        .flatten()
        .map(str::to_string)
        .unique()
        .collect();
    let hop_c_input = if request.target_is_bridge() {
        HomologyTable::identity(&bridge_ids)?
    }
    else {
        let table = request.bridge_to_target.ok_or_else(|| {
            Error::Configuration(
                "bridge to target homology table is required in standard \
                 topology"
                    .into(),
            )
        })?;
        subset_by_query(table, &bridge_ids)?
    };
    let hop_c = select_best(
        &hop_c_input,
        &request.target_criteria.clone().unlimited(),
    )?;

    // Step D: join hops on the bridge gene and compute fan-out counts
    // before any strict filtering or deduplication.
    task.checkpoint(65, "joining hops on bridge genes")?;
    let hop_a_named = hop_a.lazy().select([
        col(COL_QUERY).alias(COL_SOURCE_GENE),
        col(COL_MATCH).alias(COL_BRIDGE_GENE),
        col(COL_SCORE).alias(COL_SB_SCORE),
        col(COL_EVALUE).alias(COL_SB_EVALUE),
        col(COL_PID).alias(COL_SB_PID),
    ]);
    let hop_c_named = hop_c.into_frame().lazy().select([
        col(COL_QUERY).alias(COL_BRIDGE_GENE),
        col(COL_MATCH).alias(COL_TARGET_GENE),
        col(COL_SCORE).alias(COL_BT_SCORE),
        col(COL_EVALUE).alias(COL_BT_EVALUE),
        col(COL_PID).alias(COL_BT_PID),
    ]);
    let mut joined = hop_a_named
        .join(
            hop_c_named,
            [col(COL_BRIDGE_GENE)],
            [col(COL_BRIDGE_GENE)],
            JoinArgs::new(JoinType::Inner),
        )
        .with_columns([
            col(COL_BRIDGE_GENE)
                .n_unique()
                .over([col(COL_SOURCE_GENE)])
                .cast(DataType::UInt32)
                .alias(COL_NUM_BRIDGE),
            col(COL_TARGET_GENE)
                .n_unique()
                .over([col(COL_BRIDGE_GENE)])
                .cast(DataType::UInt32)
                .alias(COL_NUM_TARGET),
        ])
        .collect()?;

    // Step E: strict subgenome priority.
    if request.strict_subgenome() {
        task.checkpoint(80, "applying strict subgenome filter")?;
        joined = filter_matching_subgenomes(joined)?;
    }

    // Step F: deterministic order, unique triples, failed accounting.
    task.checkpoint(90, "finalizing mapping records")?;
    let records = finalize(joined)?;

    let mapped: HashSet<String> = records
        .column(COL_SOURCE_GENE)?
        .str()?
        .iter()
        .flatten()
        .map(str::to_string)
        .collect();
    let failed: Vec<GeneId> = ordered
        .iter()
        .filter(|(norm, _)| norm.is_empty() || !mapped.contains(norm))
        .map(|(_, raw)| raw.clone())
        .collect();

    task.checkpoint(100, "bridge mapping complete")?;
    info!(
        "bridge mapping produced {} record(s), {} gene(s) failed",
        records.height(),
        failed.len()
    );
    Ok(BridgeOutcome { records, failed })
}

/// Restricts a table to rows whose query gene is in `ids`.
fn subset_by_query(
    table: &HomologyTable,
    ids: &[GeneId],
) -> Result<HomologyTable> {
    let wanted = Series::new("wanted".into(), ids.to_vec());
    let df = table
        .frame()
        .clone()
        .lazy()
        .filter(col(COL_QUERY).is_in(lit(wanted)))
        .collect()?;
    HomologyTable::from_frame(df)
}

fn raw_ids(ordered: Vec<(GeneId, GeneId)>) -> Vec<GeneId> {
    ordered.into_iter().map(|(_, raw)| raw).collect()
}

/// Keeps rows whose source and target identifiers parse to the same
/// (subgenome, chromosome) tuple. Unparsable identifiers drop the row.
fn filter_matching_subgenomes(df: DataFrame) -> Result<DataFrame> {
    let source = df.column(COL_SOURCE_GENE)?.str()?;
    let target = df.column(COL_TARGET_GENE)?.str()?;
    let mask: BooleanChunked = source
        .iter()
        .zip(target.iter())
        .map(|(s, t)| {
            let keep = match (
                s.and_then(parse_subgenome),
                t.and_then(parse_subgenome),
            ) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            };
            Some(keep)
        })
        .collect();
    let kept = df.filter(&mask)?;
    debug!(
        "strict subgenome filter kept {} of {} row(s)",
        kept.height(),
        mask.len()
    );
    Ok(kept)
}

/// Sorts by (hop-A score desc, hop-C score desc, then the three gene
/// identifiers) and keeps the first occurrence of each
/// (source, bridge, target) triple.
fn finalize(df: DataFrame) -> Result<DataFrame> {
    let sorted = df.sort(
        [
            COL_SB_SCORE,
            COL_BT_SCORE,
            COL_SOURCE_GENE,
            COL_BRIDGE_GENE,
            COL_TARGET_GENE,
        ],
        SortMultipleOptions::default()
            .with_order_descending_multi([true, true, false, false, false])
            .with_maintain_order(true),
    )?;

    let source = sorted.column(COL_SOURCE_GENE)?.str()?;
    let bridge = sorted.column(COL_BRIDGE_GENE)?.str()?;
    let target = sorted.column(COL_TARGET_GENE)?.str()?;
    let mut seen: HashSet<(String, String, String)> = HashSet::new();
    let mask: BooleanChunked = (0..sorted.height())
        .map(|i| {
            let triple = (
                source.get(i).unwrap_or_default().to_string(),
                bridge.get(i).unwrap_or_default().to_string(),
                target.get(i).unwrap_or_default().to_string(),
            );
            Some(seen.insert(triple))
        })
        .collect();
    let deduped = sorted.filter(&mask)?;
    deduped.select(OUTPUT_COLUMNS).map_err(Into::into)
}
