//! Annotated genomic features and query regions.
//!
//! Coordinates follow the GFF3 convention throughout: 1-based, inclusive on
//! both ends. A feature overlaps a region iff `feature.start <= region.end`
//! and `feature.end >= region.start`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::typedef::{
    GeneId,
    PosType,
    SeqId,
};
use crate::error::{
    Error,
    Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strand {
    Forward,
    Reverse,
    None,
}

impl fmt::Display for Strand {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
            Strand::None => write!(f, "."),
        }
    }
}

/// One indexed gene feature. `feature_id` is the normalized identifier and
/// is unique within a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub feature_id:   GeneId,
    pub seqid:        SeqId,
    pub start:        PosType,
    pub end:          PosType,
    pub strand:       Strand,
    pub source:       String,
    pub feature_type: String,
    pub aliases:      Option<String>,
    pub description:  Option<String>,
    pub attributes:   BTreeMap<String, String>,
}

impl Feature {
    pub fn length(&self) -> PosType {
        self.end - self.start + 1
    }
}

/// A closed genomic interval on one reference sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub seqid: SeqId,
    pub start: PosType,
    pub end:   PosType,
}

impl Region {
    pub fn new<S: Into<SeqId>>(
        seqid: S,
        start: PosType,
        end: PosType,
    ) -> Result<Self> {
        if start > end {
            return Err(Error::Configuration(format!(
                "region start {} exceeds end {}",
                start, end
            )));
        }
        Ok(Self {
            seqid: seqid.into(),
            start,
            end,
        })
    }

    pub fn overlaps(
        &self,
        start: PosType,
        end: PosType,
    ) -> bool {
        start <= self.end && end >= self.start
    }
}

impl fmt::Display for Region {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}:{}-{}", self.seqid, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_region_rejected() {
        assert!(Region::new("chr1", 100, 50).is_err());
        assert!(Region::new("chr1", 100, 100).is_ok());
    }

    #[test]
    fn overlap_is_inclusive_on_both_ends() {
        let region = Region::new("A01", 1000, 2000).unwrap();
        assert!(region.overlaps(2000, 2500));
        assert!(region.overlaps(500, 1000));
        assert!(!region.overlaps(2001, 2500));
        assert!(!region.overlaps(500, 999));
    }
}
