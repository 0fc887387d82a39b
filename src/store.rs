//! Retrieval API
//!
//! [`ContentStore`] owns the catalog, its indexes and the reference graph,
//! all built once on construction. Every query is a read against those
//! immutable structures, so a store can be shared across threads freely.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::{self, Catalog, RawModule};
use crate::checksum::Checksum;
use crate::config::StoreConfig;
use crate::error::{LoadError, ResolutionError, Result};
use crate::index::Indexes;
use crate::schema::{ContentEntity, Facet, Level, LevelContent, Relationship};
use crate::xref::{self, ReferenceGraph};

/// Read-only content store
#[derive(Debug, Clone)]
pub struct ContentStore {
    catalog: Catalog,
    indexes: Indexes,
    graph: ReferenceGraph,
    integrity: Vec<ResolutionError>,
    catalog_fingerprint: Checksum,
    index_fingerprint: Checksum,
}

/// Summary counts for a loaded store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub modules: usize,
    pub entities: usize,
    pub by_type: BTreeMap<String, usize>,
    pub levels: usize,
    pub facet_buckets: usize,
    pub tags: usize,
    pub cross_references: usize,
    pub dangling_references: usize,
    pub type_mismatches: usize,
    pub catalog_fingerprint: String,
    pub index_fingerprint: String,
}

impl ContentStore {
    /// Build indexes, reference graph, integrity report and fingerprints for a catalog
    pub fn new(catalog: Catalog) -> Result<Self> {
        let indexes = Indexes::build(&catalog);
        let graph = ReferenceGraph::build(&catalog);
        let integrity = xref::check_integrity(&catalog, &indexes);
        if !integrity.is_empty() {
            warn!(problems = integrity.len(), "catalog has unresolved cross-references");
        }
        let catalog_fingerprint = catalog
            .fingerprint()
            .map_err(|source| LoadError::Fingerprint { target: "catalog", source })?;
        let index_fingerprint = indexes
            .fingerprint()
            .map_err(|source| LoadError::Fingerprint { target: "indexes", source })?;
        Ok(Self {
            catalog,
            indexes,
            graph,
            integrity,
            catalog_fingerprint,
            index_fingerprint,
        })
    }

    pub fn from_modules<I>(modules: I) -> Result<Self>
    where
        I: IntoIterator<Item = RawModule>,
    {
        Self::new(Catalog::load(modules)?)
    }

    /// Store over the bundled corpus only
    pub fn bundled() -> Result<Self> {
        Self::from_modules(catalog::load_bundled(&catalog::LoadConfig::default())?)
    }

    /// Load every configured source and build the store.
    ///
    /// With `validation.strict_references`, any dangling reference fails the
    /// open. Type mismatches never do.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let load_config = config.sources.load_config();
        let mut modules = Vec::new();

        if config.sources.include_bundled {
            modules.extend(catalog::load_bundled(&load_config)?);
        }
        for dir in &config.sources.directories {
            modules.extend(catalog::load_from_directory(dir, &load_config)?);
        }

        let store = Self::from_modules(modules)?;

        if config.validation.strict_references {
            let dangling: Vec<ResolutionError> = store
                .integrity
                .iter()
                .filter(|err| !err.is_warning())
                .cloned()
                .collect();
            if !dangling.is_empty() {
                return Err(LoadError::UnresolvedReferences { dangling });
            }
        }

        info!(
            entities = store.catalog.len(),
            fingerprint = %store.index_fingerprint.short(),
            "content store ready"
        );
        Ok(store)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn indexes(&self) -> &Indexes {
        &self.indexes
    }

    pub fn reference_graph(&self) -> &ReferenceGraph {
        &self.graph
    }

    /// Every entity in catalog order
    pub fn all(&self) -> &[Arc<ContentEntity>] {
        self.catalog.all()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Arc<ContentEntity>> {
        self.indexes.get(id)
    }

    pub fn exists(&self, id: &str) -> bool {
        self.indexes.contains(id)
    }

    /// Entities declaring `value` on `facet`. Unknown values give an empty list.
    pub fn get_by_facet(&self, facet: Facet, value: &str) -> Vec<&Arc<ContentEntity>> {
        self.lookup(self.indexes.facet_ids(facet, value))
    }

    pub fn get_by_tag(&self, tag: &str) -> Vec<&Arc<ContentEntity>> {
        self.lookup(self.indexes.tag_ids(tag))
    }

    /// Exact, case-insensitive match on name or alternate name
    pub fn find_by_name(&self, name: &str) -> Vec<&Arc<ContentEntity>> {
        self.lookup(self.indexes.name_ids(name))
    }

    /// Entities carrying an FMA, HPO, ICD-10 or ICD-11 code, ignoring case
    pub fn find_by_code(&self, code: &str) -> Vec<&Arc<ContentEntity>> {
        self.lookup(self.indexes.code_ids(code))
    }

    /// `None` both for an unknown id and for an undeclared level
    pub fn get_level(&self, id: &str, level: Level) -> Option<&LevelContent> {
        self.get_by_id(id)?.level(level)
    }

    /// Declared levels in ascending order; empty for an unknown id
    pub fn available_levels(&self, id: &str) -> Vec<Level> {
        self.get_by_id(id)
            .map(|entity| entity.level_numbers())
            .unwrap_or_default()
    }

    /// One result per declared edge; empty for an unknown id
    pub fn get_cross_references(&self, id: &str) -> Vec<std::result::Result<&Arc<ContentEntity>, ResolutionError>> {
        match self.get_by_id(id) {
            Some(entity) => xref::resolve_all(entity, &self.indexes),
            None => Vec::new(),
        }
    }

    /// Entities linking to `id`, with the relationship they declare
    pub fn referenced_by(&self, id: &str) -> Vec<(&Arc<ContentEntity>, Relationship)> {
        self.graph.referenced_by(id)
    }

    /// Every resolution problem found when the store was built
    pub fn integrity_report(&self) -> &[ResolutionError] {
        &self.integrity
    }

    pub fn facet_values(&self, facet: Facet) -> Vec<(&str, usize)> {
        self.indexes.facet_values(facet)
    }

    pub fn tags(&self) -> Vec<(&str, usize)> {
        self.indexes.tags().collect()
    }

    pub fn stats(&self) -> StoreStats {
        let mut by_type = BTreeMap::new();
        let mut levels = 0;
        let mut cross_references = 0;
        for entity in self.catalog.iter() {
            *by_type.entry(entity.content_type().to_string()).or_insert(0) += 1;
            levels += entity.levels.len();
            cross_references += entity.cross_references.len();
        }
        let type_mismatches = self.integrity.iter().filter(|err| err.is_warning()).count();

        StoreStats {
            modules: self.catalog.modules().len(),
            entities: self.catalog.len(),
            by_type,
            levels,
            facet_buckets: self.indexes.facet_bucket_count(),
            tags: self.indexes.tags().count(),
            cross_references,
            dangling_references: self.integrity.len() - type_mismatches,
            type_mismatches,
            catalog_fingerprint: self.catalog_fingerprint.to_string(),
            index_fingerprint: self.index_fingerprint.to_string(),
        }
    }

    fn lookup(&self, ids: &[String]) -> Vec<&Arc<ContentEntity>> {
        ids.iter().filter_map(|id| self.indexes.get(id)).collect()
    }
}
