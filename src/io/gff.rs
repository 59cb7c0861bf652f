//! GFF3 gene record reading.
//!
//! Only `gene`-type records are surfaced; everything else (mRNA, exon, CDS)
//! is skipped. Identifiers come from the `ID` attribute, falling back to
//! `Name`; records with neither are skipped with a warning.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{
    BufReader,
    Read,
};
use std::path::Path;

use bio::io::gff::{
    GffType,
    Reader as GffReader,
};
use flate2::read::MultiGzDecoder;
use log::warn;
use regex_lite::Regex;

use crate::data_structs::feature::{
    Feature,
    Strand,
};
use crate::data_structs::ids::normalize_id;
use crate::error::{
    Error,
    Result,
};

const GENE_TYPE: &str = "gene";
const ATTR_ID: &str = "ID";
const ATTR_NAME: &str = "Name";
const ATTR_ALIAS: &str = "Alias";
const ATTR_DESCRIPTION: &str = "description";

/// Reads gene features from a GFF3 stream, normalizing identifiers with
/// the assembly pattern. Returned features keep file order.
pub fn read_gene_features<R: Read>(
    reader: R,
    id_pattern: Option<&Regex>,
) -> Result<Vec<Feature>> {
    let mut gff = GffReader::new(reader, GffType::GFF3);
    let mut features = Vec::new();
    let mut skipped = 0usize;

    for record in gff.records() {
        let record = record.map_err(|e| Error::Gff(e.to_string()))?;
        if record.feature_type() != GENE_TYPE {
            continue;
        }

        let raw_id = record
            .attributes()
            .get(ATTR_ID)
            .or_else(|| record.attributes().get(ATTR_NAME));
        let Some(raw_id) = raw_id
        else {
            skipped += 1;
            continue;
        };

        let strand = match record.strand() {
            Some(bio::bio_types::strand::Strand::Forward) => Strand::Forward,
            Some(bio::bio_types::strand::Strand::Reverse) => Strand::Reverse,
            _ => Strand::None,
        };

        let mut attributes = BTreeMap::new();
        let mut aliases = None;
        let mut description = None;
        for (key, value) in record.attributes().iter() {
            match key.as_str() {
                ATTR_ID | ATTR_NAME => {},
                ATTR_ALIAS => aliases = Some(value.clone()),
                ATTR_DESCRIPTION => description = Some(value.clone()),
                _ => {
                    attributes.insert(key.clone(), value.clone());
                },
            }
        }

        features.push(Feature {
            feature_id: normalize_id(raw_id, id_pattern),
            seqid: record.seqname().to_string(),
            start: *record.start(),
            end: *record.end(),
            strand,
            source: record.source().to_string(),
            feature_type: record.feature_type().to_string(),
            aliases,
            description,
            attributes,
        });
    }

    if skipped > 0 {
        warn!(
            "skipped {} gene record(s) without an ID or Name attribute",
            skipped
        );
    }
    Ok(features)
}

/// As [`read_gene_features`], from a path; `.gz` input is decompressed.
pub fn read_gene_features_from_path<P: AsRef<Path>>(
    path: P,
    id_pattern: Option<&Regex>,
) -> Result<Vec<Feature>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        read_gene_features(BufReader::new(MultiGzDecoder::new(file)), id_pattern)
    }
    else {
        read_gene_features(BufReader::new(file), id_pattern)
    }
}
