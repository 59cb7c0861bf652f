//! # genebridge
//!
//! `genebridge` resolves gene homology across genome assemblies that share
//! no direct homology data by routing source -> bridge -> target through a
//! well-annotated bridge species, and provides a cached, queryable store
//! of gene features built from GFF3 annotation.
//!
//! Homology tables live in Polars `DataFrame`s behind a canonical schema,
//! so selection, ranking, and the two-hop join are plain columnar
//! operations. Typed structs ([`MappingRecord`], [`Feature`]) exist at the
//! API boundary.
//!
//! ## Key Features
//!
//! * **Format-tolerant loading**: TSV/CSV/whitespace homology tables with
//!   gzip support, mapped onto a canonical schema by a [`ColumnMap`], with
//!   multi-value match cells exploded into one row per value.
//! * **Best-hit selection**: threshold filtering, stable multi-key
//!   sorting, and per-query capping via [`SelectionCriteria`].
//! * **Bridge mapping**: the full two-hop algorithm plus the degenerate
//!   topologies where the source or target assembly is the bridge itself,
//!   with per-hop metrics, fan-out counts, and an explicit failed-gene
//!   list ([`map_via_bridge`]).
//! * **Feature store**: a bincode-cached, interval-indexed gene set per
//!   assembly supporting fuzzy seqid resolution, inclusive region queries,
//!   and batch identifier lookup ([`FeatureStore`]).
//! * **Cooperative cancellation**: long operations take a [`TaskHandle`]
//!   and observe a [`CancelToken`] at phase boundaries, reporting progress
//!   through an optional callback.
//!
//! ## Usage
//!
//! ```no_run
//! use genebridge::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let source = GenomeAssemblyDescriptor::new("hirsutum_v2", "G. hirsutum")
//!         .with_gene_id_regex(Some(r"^(\w+?)\.\d+$".to_string()));
//!     let bridge = GenomeAssemblyDescriptor::new("tair10", "A. thaliana");
//!     let target = GenomeAssemblyDescriptor::new("hirsutum_v1", "G. hirsutum");
//!
//!     let s2b = load(
//!         read_table("source_to_bridge.tsv", &genebridge::io::DEFAULT_FORMATS)?,
//!         &ColumnMap::default(),
//!         source.compiled_pattern()?.as_ref(),
//!         bridge.compiled_pattern()?.as_ref(),
//!     )?;
//!     let b2t = load(
//!         read_table("bridge_to_target.tsv", &genebridge::io::DEFAULT_FORMATS)?,
//!         &ColumnMap::default(),
//!         bridge.compiled_pattern()?.as_ref(),
//!         target.compiled_pattern()?.as_ref(),
//!     )?;
//!
//!     let request = BridgeRequest {
//!         source: &source,
//!         bridge: &bridge,
//!         target: &target,
//!         source_to_bridge: Some(&s2b),
//!         bridge_to_target: Some(&b2t),
//!         source_criteria: SelectionCriteria::default(),
//!         target_criteria: SelectionCriteria::default(),
//!     };
//!     let outcome = map_via_bridge(
//!         &request,
//!         &["Ghir_A01G000100.1".to_string()],
//!         &TaskHandle::new(),
//!     )?;
//!     for record in outcome.to_records()? {
//!         println!("{} -> {}", record.source_gene, record.target_gene);
//!     }
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod data_structs;
pub mod error;
pub mod io;
pub mod locus;
pub mod prelude;
pub mod select;
pub mod store;
pub mod task;
pub mod utils;

#[allow(unused_imports)]
use prelude::*;
