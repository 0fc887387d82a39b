//! Index Builder
//!
//! Derives the secondary lookup structures from a loaded [`Catalog`] in one
//! forward scan. Buckets list ids in catalog order; facet, tag, name and
//! code keys are normalized to lower case.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::catalog::Catalog;
use crate::checksum::{Checksum, Fingerprinter};
use crate::schema::{normalize_key, ContentEntity, Facet};

/// Read-only indexes over one catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Indexes {
    by_id: BTreeMap<String, Arc<ContentEntity>>,
    by_facet: BTreeMap<(Facet, String), Vec<String>>,
    by_tag: BTreeMap<String, Vec<String>>,
    by_name: BTreeMap<String, Vec<String>>,
    by_code: BTreeMap<String, Vec<String>>,
}

impl Indexes {
    /// Single pass over the catalog. Assumes the catalog was validated on load.
    pub fn build(catalog: &Catalog) -> Self {
        let mut indexes = Indexes::default();

        for entity in catalog.iter() {
            let id = &entity.id;
            indexes.by_id.insert(id.clone(), Arc::clone(entity));

            indexes
                .by_facet
                .entry((Facet::Type, entity.content_type().as_str().to_string()))
                .or_default()
                .push(id.clone());
            for (facet, value) in entity.classification.facets() {
                indexes
                    .by_facet
                    .entry((facet, normalize_key(value)))
                    .or_default()
                    .push(id.clone());
            }

            // values() is already deduplicated per entity
            for tag in entity.tags.values() {
                indexes.by_tag.entry(tag).or_default().push(id.clone());
            }

            let mut names: Vec<String> = Vec::new();
            for name in entity.names().map(normalize_key) {
                if !name.is_empty() && !names.contains(&name) {
                    names.push(name);
                }
            }
            for name in names {
                indexes.by_name.entry(name).or_default().push(id.clone());
            }

            let mut codes: Vec<String> = Vec::new();
            for code in entity.codes.values().map(normalize_key) {
                if !codes.contains(&code) {
                    codes.push(code);
                }
            }
            for code in codes {
                indexes.by_code.entry(code).or_default().push(id.clone());
            }
        }

        info!(
            entities = indexes.by_id.len(),
            facet_buckets = indexes.by_facet.len(),
            tags = indexes.by_tag.len(),
            names = indexes.by_name.len(),
            codes = indexes.by_code.len(),
            "indexes built"
        );
        indexes
    }

    pub fn get(&self, id: &str) -> Option<&Arc<ContentEntity>> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Ids declaring `value` on `facet`; empty for unknown values
    pub fn facet_ids(&self, facet: Facet, value: &str) -> &[String] {
        self.by_facet
            .get(&(facet, normalize_key(value)))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn tag_ids(&self, tag: &str) -> &[String] {
        self.by_tag
            .get(&normalize_key(tag))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Ids whose name or alternate name equals `name`, ignoring case
    pub fn name_ids(&self, name: &str) -> &[String] {
        self.by_name
            .get(&normalize_key(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Ids carrying an FMA, HPO or ICD code, ignoring case
    pub fn code_ids(&self, code: &str) -> &[String] {
        self.by_code
            .get(&normalize_key(code))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Distinct values on one axis with their bucket sizes, sorted by value
    pub fn facet_values(&self, facet: Facet) -> Vec<(&str, usize)> {
        self.by_facet
            .range((facet, String::new())..)
            .take_while(|((axis, _), _)| *axis == facet)
            .map(|((_, value), ids)| (value.as_str(), ids.len()))
            .collect()
    }

    /// Every tag with its bucket size, sorted by tag
    pub fn tags(&self) -> impl Iterator<Item = (&str, usize)> {
        self.by_tag.iter().map(|(tag, ids)| (tag.as_str(), ids.len()))
    }

    pub fn facet_bucket_count(&self) -> usize {
        self.by_facet.len()
    }

    /// Fingerprint of every index's keys and bucket order
    pub fn fingerprint(&self) -> serde_json::Result<Checksum> {
        let mut fp = Fingerprinter::new();
        for (id, entity) in &self.by_id {
            fp.update_str(id);
            fp.update_serialize(&**entity)?;
        }
        for ((facet, value), ids) in &self.by_facet {
            fp.update_str(facet.as_str());
            fp.update_str(value);
            fp.update_serialize(ids)?;
        }
        for (tag, ids) in &self.by_tag {
            fp.update_str(tag);
            fp.update_serialize(ids)?;
        }
        for (name, ids) in &self.by_name {
            fp.update_str(name);
            fp.update_serialize(ids)?;
        }
        for (code, ids) in &self.by_code {
            fp.update_str(code);
            fp.update_serialize(ids)?;
        }
        Ok(fp.finish())
    }
}
