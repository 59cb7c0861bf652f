pub use crate::bridge::{
    map_via_bridge,
    BridgeRequest,
};
pub use crate::data_structs::{
    BridgeOutcome,
    Feature,
    GenomeAssemblyDescriptor,
    HomologyTable,
    MappingRecord,
    Region,
    SelectionCriteria,
    SortKey,
    Strand,
};
pub use crate::error::{
    Error,
    Result,
};
pub use crate::io::{
    load,
    read_table,
    ColumnMap,
    TableFormat,
};
pub use crate::locus::{
    convert_locus,
    LocusConversion,
};
pub use crate::select::select_best;
pub use crate::store::{
    FeatureStore,
    IdLookup,
};
pub use crate::task::{
    CancelToken,
    TaskHandle,
};
