//! Cached, queryable store of gene features for one assembly.
//!
//! A store is built once from a GFF3 gene set and persisted as a versioned
//! bincode cache next to a stable path chosen by the caller. Subsequent
//! builds reuse the cache unless it is missing, zero-byte, forced, or from
//! another cache version. Concurrent builders of the same cache path are
//! serialized through a process-wide lock map, and the cache file is
//! staged in a tempfile and renamed into place, so readers never observe a
//! partially written cache.

use std::fs::{
    self,
    File,
};
use std::io::{
    BufReader,
    BufWriter,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};
use std::sync::{
    Arc,
    Mutex,
};

use hashbrown::HashMap;
use indexmap::IndexMap;
use log::{
    debug,
    info,
    warn,
};
use once_cell::sync::Lazy;
use rust_lapper::{
    Interval,
    Lapper,
};
use serde::{
    Deserialize,
    Serialize,
};
use tempfile::NamedTempFile;

use crate::data_structs::descriptor::GenomeAssemblyDescriptor;
use crate::data_structs::feature::{
    Feature,
    Region,
};
use crate::data_structs::ids::{
    compile_pattern,
    normalize_id,
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
use crate::io::gff::read_gene_features_from_path;
use crate::task::TaskHandle;

const CACHE_VERSION: u32 = 1;

static BUILD_LOCKS: Lazy<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn build_lock(cache_path: &Path) -> Arc<Mutex<()>> {
    let mut locks = BUILD_LOCKS.lock().unwrap();
    Arc::clone(
        locks
            .entry(cache_path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(()))),
    )
}

#[derive(Serialize, Deserialize)]
struct CacheEnvelope {
    version: u32,
    store:   FeatureStore,
}

/// Result of a batch identifier lookup. Misses are collected, never raised.
#[derive(Debug)]
pub struct IdLookup<'a> {
    pub found:     Vec<&'a Feature>,
    pub not_found: Vec<GeneId>,
}

/// Indexed gene set of one assembly.
///
/// Features are stored in GFF file order; `seqids` enumerate reference
/// sequences in first-appearance order, which also fixes how ambiguous
/// fuzzy seqid lookups resolve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureStore {
    assembly_id: String,
    features:    Vec<Feature>,
    id_index:    HashMap<GeneId, usize>,
    intervals:   IndexMap<SeqId, Lapper<PosType, usize>>,
    id_pattern:  Option<String>,
}

impl FeatureStore {
    /// Builds or loads the store for `descriptor` from a GFF3 gene set.
    ///
    /// The cache at `cache_path` is reused when present and non-empty
    /// unless `force` is set. An unreadable or version-mismatched cache is
    /// rebuilt from the GFF source exactly once; if that rebuild fails the
    /// error escalates to the caller.
    pub fn build<G, C>(
        gff_path: G,
        cache_path: C,
        descriptor: &GenomeAssemblyDescriptor,
        force: bool,
        task: &TaskHandle,
    ) -> Result<Self>
    where
        G: AsRef<Path>,
        C: AsRef<Path>, {
        let gff_path = gff_path.as_ref();
        let cache_path = cache_path.as_ref();
        task.checkpoint(0, "preparing feature store")?;

        let lock = build_lock(cache_path);
        let _guard = lock.lock().unwrap();

        let cache_usable = !force
            && fs::metadata(cache_path)
                .map(|meta| meta.len() > 0)
                .unwrap_or(false);
        if cache_usable {
            match Self::read_cache(cache_path) {
                Ok(store) => {
                    debug!(
                        "reusing feature store cache {} ({} features)",
                        cache_path.display(),
                        store.len()
                    );
                    task.checkpoint(100, "feature store loaded from cache")?;
                    return Ok(store);
                },
                Err(err) => {
                    warn!(
                        "feature store cache {} is unusable ({}); rebuilding",
                        cache_path.display(),
                        err
                    );
                },
            }
        }

        task.checkpoint(10, "indexing GFF gene records")?;
        let store = Self::from_gff(gff_path, descriptor)?;
        task.checkpoint(80, "writing feature store cache")?;
        store.write_cache(cache_path)?;
        task.checkpoint(100, "feature store built")?;
        info!(
            "built feature store for {}: {} features on {} sequence(s)",
            store.assembly_id,
            store.len(),
            store.intervals.len()
        );
        Ok(store)
    }

    /// Indexes gene features straight from a GFF3 file, without touching
    /// any cache.
    pub fn from_gff<G: AsRef<Path>>(
        gff_path: G,
        descriptor: &GenomeAssemblyDescriptor,
    ) -> Result<Self> {
        let pattern = descriptor.compiled_pattern()?;
        let raw = read_gene_features_from_path(gff_path, pattern.as_ref())?;

        let mut features: Vec<Feature> = Vec::with_capacity(raw.len());
        let mut id_index: HashMap<GeneId, usize> = HashMap::new();
        let mut duplicates = 0usize;
        for feature in raw {
            if id_index.contains_key(&feature.feature_id) {
                duplicates += 1;
                continue;
            }
            id_index.insert(feature.feature_id.clone(), features.len());
            features.push(feature);
        }
        if duplicates > 0 {
            warn!(
                "dropped {} duplicate gene identifier(s); first occurrence \
                 wins",
                duplicates
            );
        }

        // Lapper is half-open; closed GFF spans are stored as [start, end+1).
        let mut spans: IndexMap<SeqId, Vec<Interval<PosType, usize>>> =
            IndexMap::new();
        for (idx, feature) in features.iter().enumerate() {
            spans
                .entry(feature.seqid.clone())
                .or_default()
                .push(Interval {
                    start: feature.start,
                    stop:  feature.end + 1,
                    val:   idx,
                });
        }
        let intervals = spans
            .into_iter()
            .map(|(seqid, entries)| (seqid, Lapper::new(entries)))
            .collect();

        Ok(Self {
            assembly_id: descriptor.assembly_id.clone(),
            features,
            id_index,
            intervals,
            id_pattern: descriptor.gene_id_regex.clone(),
        })
    }

    fn read_cache(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let envelope: CacheEnvelope = bincode::deserialize_from(reader)
            .map_err(|e| {
                Error::CacheIntegrity(format!(
                    "cannot decode cache {}: {}",
                    path.display(),
                    e
                ))
            })?;
        if envelope.version != CACHE_VERSION {
            return Err(Error::CacheIntegrity(format!(
                "cache {} has version {}, expected {}",
                path.display(),
                envelope.version,
                CACHE_VERSION
            )));
        }
        Ok(envelope.store)
    }

    fn write_cache(
        &self,
        path: &Path,
    ) -> Result<()> {
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = dir {
            fs::create_dir_all(dir)?;
        }
        let staging =
            NamedTempFile::new_in(dir.unwrap_or_else(|| Path::new(".")))?;
        let mut writer = BufWriter::new(&staging);
        let envelope = CacheEnvelope {
            version: CACHE_VERSION,
            store:   self.clone(),
        };
        bincode::serialize_into(&mut writer, &envelope).map_err(|e| {
            Error::CacheIntegrity(format!(
                "cannot encode cache {}: {}",
                path.display(),
                e
            ))
        })?;
        writer.flush()?;
        drop(writer);
        staging.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    pub fn assembly_id(&self) -> &str {
        &self.assembly_id
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Reference sequences in first-appearance order.
    pub fn seqids(&self) -> impl Iterator<Item = &SeqId> {
        self.intervals.keys()
    }

    pub fn get(
        &self,
        gene_id: &str,
    ) -> Option<&Feature> {
        self.id_index
            .get(gene_id)
            .map(|idx| &self.features[*idx])
    }

    /// Resolves a user-supplied seqid token against the store.
    ///
    /// Exact case-insensitive matches win; otherwise any stored seqid that
    /// ends with the token behind a non-alphanumeric boundary matches
    /// (`A01` resolves `Ghir_A01`). Several fuzzy matches resolve to the
    /// first in enumeration order with a warning.
    pub fn resolve_seqid(
        &self,
        token: &str,
    ) -> Option<&SeqId> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        for seqid in self.intervals.keys() {
            if seqid.eq_ignore_ascii_case(token) {
                return Some(seqid);
            }
        }

        let candidates: Vec<&SeqId> = self
            .intervals
            .keys()
            .filter(|seqid| suffix_matches(seqid, token))
            .collect();
        match candidates.len() {
            0 => None,
            1 => Some(candidates[0]),
            _ => {
                warn!(
                    "seqid token '{}' is ambiguous ({:?}); using '{}'",
                    token, candidates, candidates[0]
                );
                Some(candidates[0])
            },
        }
    }

    /// Features overlapping `[start, end]` (inclusive) on the sequence the
    /// token resolves to, ordered by (start, end, feature_id). An
    /// unresolvable token yields an empty list, not an error.
    pub fn region_query(
        &self,
        seqid_token: &str,
        start: PosType,
        end: PosType,
    ) -> Result<Vec<&Feature>> {
        let region = Region::new(seqid_token, start, end)?;
        let Some(seqid) = self.resolve_seqid(seqid_token)
        else {
            warn!(
                "seqid token '{}' does not resolve in assembly {}",
                seqid_token, self.assembly_id
            );
            return Ok(vec![]);
        };
        let Some(lapper) = self.intervals.get(seqid)
        else {
            return Ok(vec![]);
        };

        let mut hits: Vec<&Feature> = lapper
            .find(region.start, region.end + 1)
            .map(|entry| &self.features[entry.val])
            .collect();
        hits.sort_by(|a, b| {
            (a.start, a.end, &a.feature_id).cmp(&(b.start, b.end, &b.feature_id))
        });
        Ok(hits)
    }

    /// Looks up many identifiers at once, normalizing each with the
    /// store's pattern. Cancellation is observed between identifiers.
    pub fn batch_id_lookup(
        &self,
        gene_ids: &[GeneId],
        task: &TaskHandle,
    ) -> Result<IdLookup<'_>> {
        let pattern = compile_pattern(self.id_pattern.as_deref())?;
        let mut found = Vec::new();
        let mut not_found = Vec::new();
        for raw in gene_ids {
            task.check_cancelled()?;
            let normalized = normalize_id(raw, pattern.as_ref());
            match self.get(&normalized) {
                Some(feature) => found.push(feature),
                None => not_found.push(raw.clone()),
            }
        }
        Ok(IdLookup { found, not_found })
    }
}

/// True when `candidate` ends with `token` (ASCII case-insensitive) and
/// the character before the suffix, if any, is non-alphanumeric.
fn suffix_matches(
    candidate: &str,
    token: &str,
) -> bool {
    if candidate.len() < token.len() {
        return false;
    }
    let split = candidate.len() - token.len();
    if !candidate.is_char_boundary(split) {
        return false;
    }
    let (head, tail) = candidate.split_at(split);
    if !tail.eq_ignore_ascii_case(token) {
        return false;
    }
    match head.chars().last() {
        None => true,
        Some(c) => !c.is_alphanumeric(),
    }
}
