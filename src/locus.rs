//! Locus conversion: a genomic region on the source assembly resolved to
//! target-assembly genes through the bridge.

use log::info;

use crate::bridge::{
    map_via_bridge,
    BridgeRequest,
};
use crate::data_structs::feature::Feature;
use crate::data_structs::mapping::BridgeOutcome;
use crate::data_structs::typedef::PosType;
use crate::error::Result;
use crate::store::FeatureStore;
use crate::task::TaskHandle;

/// Genes found in the queried region plus their bridge mapping. Genes
/// without a resolved path surface in `mapping.failed`.
#[derive(Debug)]
pub struct LocusConversion {
    pub source_features: Vec<Feature>,
    pub mapping:         BridgeOutcome,
}

/// Resolves every gene overlapping `[start, end]` on the (fuzzily
/// resolved) sequence to the target assembly.
pub fn convert_locus(
    store: &FeatureStore,
    request: &BridgeRequest,
    seqid_token: &str,
    start: PosType,
    end: PosType,
    task: &TaskHandle,
) -> Result<LocusConversion> {
    task.checkpoint(0, "querying source region")?;
    let source_features: Vec<Feature> = store
        .region_query(seqid_token, start, end)?
        .into_iter()
        .cloned()
        .collect();
    info!(
        "locus {}:{}-{} covers {} gene(s)",
        seqid_token,
        start,
        end,
        source_features.len()
    );
    if source_features.is_empty() {
        return Ok(LocusConversion {
            source_features,
            mapping: BridgeOutcome::all_failed(vec![])?,
        });
    }

    let gene_ids: Vec<String> = source_features
        .iter()
        .map(|feature| feature.feature_id.clone())
        .collect();
    let mapping = map_via_bridge(request, &gene_ids, task)?;
    Ok(LocusConversion {
        source_features,
        mapping,
    })
}
