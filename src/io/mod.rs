//! Input boundary: delimited homology tables and GFF3 gene sets.

pub mod gff;
pub mod loader;
pub mod table;

pub use loader::{
    load,
    ColumnMap,
};
pub use table::{
    read_table,
    read_table_bytes,
    TableFormat,
    DEFAULT_FORMATS,
};
