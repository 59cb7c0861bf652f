use regex_lite::Regex;
use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::ids::compile_pattern;
use crate::error::Result;
use crate::with_field_fn;

/// Identity and parsing rules of one genome assembly.
///
/// The optional `gene_id_regex` defines how raw identifiers from this
/// assembly are normalized; `is_cotton` gates the subgenome-aware behavior
/// of the bridge mapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomeAssemblyDescriptor {
    pub assembly_id:   String,
    pub species_name:  String,
    pub gene_id_regex: Option<String>,
    pub is_cotton:     bool,
}

impl GenomeAssemblyDescriptor {
    pub fn new<S: Into<String>>(
        assembly_id: S,
        species_name: S,
    ) -> Self {
        Self {
            assembly_id:   assembly_id.into(),
            species_name:  species_name.into(),
            gene_id_regex: None,
            is_cotton:     false,
        }
    }

    with_field_fn!(gene_id_regex, Option<String>);

    with_field_fn!(is_cotton, bool);

    /// Compiles the descriptor's identifier pattern, if any.
    pub fn compiled_pattern(&self) -> Result<Option<Regex>> {
        compile_pattern(self.gene_id_regex.as_deref())
    }
}
