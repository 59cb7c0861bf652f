//! Core data types: identifiers, selection criteria, assembly descriptors,
//! homology tables, features, and mapping results.

pub mod criteria;
pub mod descriptor;
pub mod feature;
pub mod hit;
pub mod ids;
pub mod mapping;
pub mod typedef;

pub use criteria::{
    SelectionCriteria,
    SortKey,
};
pub use descriptor::GenomeAssemblyDescriptor;
pub use feature::{
    Feature,
    Region,
    Strand,
};
pub use hit::HomologyTable;
pub use mapping::{
    BridgeOutcome,
    MappingRecord,
};
