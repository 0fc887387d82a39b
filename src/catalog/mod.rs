//! Entity Catalog
//!
//! The validated, deduplicated collection of every content entity, assembled
//! from independently authored source modules. Loading is all-or-nothing: one
//! malformed entity or one id collision fails the whole load.

pub mod loader;

pub use loader::{load_bundled, load_from_directory, load_from_embedded, LoadConfig};

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::checksum::{Checksum, Fingerprinter};
use crate::error::{LoadError, Result};
use crate::schema::{validate_entity, ContentEntity};

/// One source module: a name plus its unvalidated entity records
#[derive(Debug, Clone, PartialEq)]
pub struct RawModule {
    pub name: String,
    pub entities: Vec<Value>,
}

impl RawModule {
    pub fn new(name: impl Into<String>, entities: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            entities,
        }
    }

    /// Parse a module document.
    ///
    /// Accepts either a bare array of entities, named after `origin`, or an
    /// object `{ "module": "...", "entities": [...] }` whose `module` key
    /// overrides the name.
    pub fn from_json_str(origin: &str, content: &str) -> Result<Self> {
        let json: Value = serde_json::from_str(content).map_err(|source| LoadError::Json {
            origin: origin.to_string(),
            source,
        })?;
        Self::from_value(origin, json)
    }

    pub fn from_value(origin: &str, json: Value) -> Result<Self> {
        match json {
            Value::Array(entities) => Ok(Self::new(origin, entities)),
            Value::Object(mut obj) => {
                let name = match obj.remove("module") {
                    None | Some(Value::Null) => origin.to_string(),
                    Some(Value::String(name)) => name,
                    Some(_) => {
                        return Err(LoadError::InvalidModule {
                            origin: origin.to_string(),
                            reason: "`module` must be a string".to_string(),
                        })
                    }
                };
                match obj.remove("entities") {
                    Some(Value::Array(entities)) => Ok(Self::new(name, entities)),
                    _ => Err(LoadError::InvalidModule {
                        origin: origin.to_string(),
                        reason: "expected an `entities` array".to_string(),
                    }),
                }
            }
            _ => Err(LoadError::InvalidModule {
                origin: origin.to_string(),
                reason: "expected an array of entities or a module object".to_string(),
            }),
        }
    }
}

/// Immutable collection of validated entities in load order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entities: Vec<Arc<ContentEntity>>,
    /// Module names in load order
    modules: Vec<String>,
    /// Parallel to `entities`: index into `modules`
    owners: Vec<usize>,
    positions: BTreeMap<String, usize>,
}

impl Catalog {
    /// Validate and concatenate every module's entities.
    pub fn load<I>(sources: I) -> Result<Self>
    where
        I: IntoIterator<Item = RawModule>,
    {
        let mut catalog = Catalog::default();

        for module in sources {
            let module_idx = catalog.modules.len();
            catalog.modules.push(module.name.clone());
            debug!(module = %module.name, entities = module.entities.len(), "loading content module");

            for candidate in &module.entities {
                let entity = validate_entity(candidate).map_err(|source| LoadError::Schema {
                    module: module.name.clone(),
                    source,
                })?;

                if let Some(&existing) = catalog.positions.get(&entity.id) {
                    return Err(LoadError::DuplicateId {
                        id: entity.id,
                        first_module: catalog.modules[catalog.owners[existing]].clone(),
                        second_module: module.name.clone(),
                    });
                }

                catalog.positions.insert(entity.id.clone(), catalog.entities.len());
                catalog.entities.push(Arc::new(entity));
                catalog.owners.push(module_idx);
            }
        }

        info!(
            modules = catalog.modules.len(),
            entities = catalog.entities.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Every entity, in module order then declaration order
    pub fn all(&self) -> &[Arc<ContentEntity>] {
        &self.entities
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ContentEntity>> {
        self.entities.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Arc<ContentEntity>> {
        self.positions.get(id).map(|&idx| &self.entities[idx])
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    /// Name of the module that contributed `id`
    pub fn module_of(&self, id: &str) -> Option<&str> {
        self.positions
            .get(id)
            .map(|&idx| self.modules[self.owners[idx]].as_str())
    }

    /// Entities contributed by one module, in declaration order
    pub fn module_entities<'a>(&'a self, module: &'a str) -> impl Iterator<Item = &'a Arc<ContentEntity>> + 'a {
        self.entities
            .iter()
            .zip(&self.owners)
            .filter(move |(_, owner)| self.modules[**owner] == module)
            .map(|(entity, _)| entity)
    }

    /// Fingerprint of the catalog's content and order
    pub fn fingerprint(&self) -> serde_json::Result<Checksum> {
        let mut fp = Fingerprinter::new();
        for (entity, &owner) in self.entities.iter().zip(&self.owners) {
            fp.update_str(&self.modules[owner]);
            fp.update_serialize(&**entity)?;
        }
        Ok(fp.finish())
    }
}
