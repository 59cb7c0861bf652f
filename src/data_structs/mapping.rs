//! Bridge mapping output: the result frame schema and its typed row form.

use polars::prelude::*;

use crate::data_structs::typedef::GeneId;
use crate::error::Result;

pub const COL_SOURCE_GENE: &str = "Source_Gene_ID";
pub const COL_BRIDGE_GENE: &str = "Bridge_Gene_ID";
pub const COL_TARGET_GENE: &str = "Target_Gene_ID";
pub const COL_SB_SCORE: &str = "Source_Bridge_Score";
pub const COL_SB_EVALUE: &str = "Source_Bridge_Evalue";
pub const COL_SB_PID: &str = "Source_Bridge_PID";
pub const COL_BT_SCORE: &str = "Bridge_Target_Score";
pub const COL_BT_EVALUE: &str = "Bridge_Target_Evalue";
pub const COL_BT_PID: &str = "Bridge_Target_PID";
pub const COL_NUM_BRIDGE: &str = "Num_Bridge_Homologs";
pub const COL_NUM_TARGET: &str = "Num_Target_Homologs_From_Bridge";

/// The output schema, in column order.
pub const OUTPUT_COLUMNS: [&str; 11] = [
    COL_SOURCE_GENE,
    COL_BRIDGE_GENE,
    COL_TARGET_GENE,
    COL_SB_SCORE,
    COL_SB_EVALUE,
    COL_SB_PID,
    COL_BT_SCORE,
    COL_BT_EVALUE,
    COL_BT_PID,
    COL_NUM_BRIDGE,
    COL_NUM_TARGET,
];

/// One resolved source -> bridge -> target mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingRecord {
    pub source_gene:   GeneId,
    pub bridge_gene:   GeneId,
    pub target_gene:   GeneId,
    pub source_bridge_score:  f64,
    pub source_bridge_evalue: f64,
    pub source_bridge_pid:    f64,
    pub bridge_target_score:  f64,
    pub bridge_target_evalue: f64,
    pub bridge_target_pid:    f64,
    /// Distinct bridge genes this source gene reached after the join.
    pub num_bridge_homologs: u32,
    /// Distinct target genes this record's bridge gene reached.
    pub num_target_homologs_from_bridge: u32,
}

/// Result of one bridge mapping run. Every requested source gene appears
/// either in `records` (as `Source_Gene_ID`) or in `failed`, never both.
#[derive(Debug, Clone)]
pub struct BridgeOutcome {
    pub records: DataFrame,
    pub failed:  Vec<GeneId>,
}

impl BridgeOutcome {
    /// Extracts the result frame into typed records, preserving row order.
    pub fn to_records(&self) -> Result<Vec<MappingRecord>> {
        let df = &self.records;
        let source = df.column(COL_SOURCE_GENE)?.str()?;
        let bridge = df.column(COL_BRIDGE_GENE)?.str()?;
        let target = df.column(COL_TARGET_GENE)?.str()?;
        let sb_score = df.column(COL_SB_SCORE)?.f64()?;
        let sb_evalue = df.column(COL_SB_EVALUE)?.f64()?;
        let sb_pid = df.column(COL_SB_PID)?.f64()?;
        let bt_score = df.column(COL_BT_SCORE)?.f64()?;
        let bt_evalue = df.column(COL_BT_EVALUE)?.f64()?;
        let bt_pid = df.column(COL_BT_PID)?.f64()?;
        let num_bridge = df.column(COL_NUM_BRIDGE)?.u32()?;
        let num_target = df.column(COL_NUM_TARGET)?.u32()?;

        let mut records = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            records.push(MappingRecord {
                source_gene:   source.get(i).unwrap_or_default().to_string(),
                bridge_gene:   bridge.get(i).unwrap_or_default().to_string(),
                target_gene:   target.get(i).unwrap_or_default().to_string(),
                source_bridge_score:  sb_score.get(i).unwrap_or_default(),
                source_bridge_evalue: sb_evalue.get(i).unwrap_or_default(),
                source_bridge_pid:    sb_pid.get(i).unwrap_or_default(),
                bridge_target_score:  bt_score.get(i).unwrap_or_default(),
                bridge_target_evalue: bt_evalue.get(i).unwrap_or_default(),
                bridge_target_pid:    bt_pid.get(i).unwrap_or_default(),
                num_bridge_homologs: num_bridge.get(i).unwrap_or_default(),
                num_target_homologs_from_bridge: num_target
                    .get(i)
                    .unwrap_or_default(),
            });
        }
        Ok(records)
    }

    /// An outcome with no mappings and every requested gene failed.
    pub fn all_failed(failed: Vec<GeneId>) -> Result<Self> {
        Ok(Self {
            records: empty_output_frame()?,
            failed,
        })
    }
}

/// Builds an empty frame with the full output schema.
pub fn empty_output_frame() -> Result<DataFrame> {
    let columns = vec![
        Series::new_empty(COL_SOURCE_GENE.into(), &DataType::String).into_column(),
        Series::new_empty(COL_BRIDGE_GENE.into(), &DataType::String).into_column(),
        Series::new_empty(COL_TARGET_GENE.into(), &DataType::String).into_column(),
        Series::new_empty(COL_SB_SCORE.into(), &DataType::Float64).into_column(),
        Series::new_empty(COL_SB_EVALUE.into(), &DataType::Float64).into_column(),
        Series::new_empty(COL_SB_PID.into(), &DataType::Float64).into_column(),
        Series::new_empty(COL_BT_SCORE.into(), &DataType::Float64).into_column(),
        Series::new_empty(COL_BT_EVALUE.into(), &DataType::Float64).into_column(),
        Series::new_empty(COL_BT_PID.into(), &DataType::Float64).into_column(),
        Series::new_empty(COL_NUM_BRIDGE.into(), &DataType::UInt32).into_column(),
        Series::new_empty(COL_NUM_TARGET.into(), &DataType::UInt32).into_column(),
    ];
    DataFrame::new(columns).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_frame_has_full_schema() {
        let df = empty_output_frame().unwrap();
        assert_eq!(df.height(), 0);
        let names: Vec<_> =
            df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, OUTPUT_COLUMNS.to_vec());
    }

    #[test]
    fn typed_extraction_preserves_row_order() {
        let df = df!(
            COL_SOURCE_GENE => ["s1", "s2"],
            COL_BRIDGE_GENE => ["b1", "b2"],
            COL_TARGET_GENE => ["t1", "t2"],
            COL_SB_SCORE => [100.0, 90.0],
            COL_SB_EVALUE => [1e-50, 1e-40],
            COL_SB_PID => [98.0, 95.0],
            COL_BT_SCORE => [80.0, 70.0],
            COL_BT_EVALUE => [1e-30, 1e-20],
            COL_BT_PID => [90.0, 85.0],
            COL_NUM_BRIDGE => [1u32, 2],
            COL_NUM_TARGET => [1u32, 1],
        )
        .unwrap();
        let outcome = BridgeOutcome {
            records: df,
            failed:  vec![],
        };
        let records = outcome.to_records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source_gene, "s1");
        assert_eq!(records[1].num_bridge_homologs, 2);
    }
}
