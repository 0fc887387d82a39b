//! MedAtlas Content Store
//!
//! A typed, in-memory store of leveled medical reference content: anatomical
//! structures, conditions, physiological processes and teaching modules, each
//! explained at up to five reading levels and linked to one another by typed
//! cross-references.
//!
//! ## Features
//!
//! - **Validated Schema**: raw JSON records become typed entities or fail loudly
//! - **Fail-fast Loading**: one bad record or duplicate id rejects the whole catalog
//! - **Secondary Indexes**: by id, classification facet, tag, name and ontology code
//! - **Explicit Cross-References**: every edge resolves to an entity or an error value
//! - **Deterministic Builds**: SHA256 fingerprints of catalog and index contents
//!
//! ## Pipeline
//!
//! ```text
//! RawModule (JSON) ──validate──▶ Catalog ──build──▶ Indexes ──▶ ContentStore
//!                                     │                               ▲
//!                                     └──────▶ ReferenceGraph ────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use medatlas::{ContentStore, Facet, Level};
//!
//! let store = ContentStore::bundled()?;
//! for entity in store.get_by_facet(Facet::Region, "head") {
//!     println!("{} ({:?})", entity.name, store.available_levels(&entity.id));
//! }
//! if let Some(level) = Level::new(2).and_then(|l| store.get_level("nasal-cavity", l)) {
//!     println!("{}", level.summary);
//! }
//! # Ok::<(), medatlas::LoadError>(())
//! ```

pub mod catalog;
pub mod checksum;
pub mod config;
pub mod error;
pub mod index;
pub mod schema;
pub mod store;
pub mod xref;

pub use catalog::{Catalog, LoadConfig, RawModule};
pub use checksum::Checksum;
pub use config::{OutputFormat, StoreConfig};
pub use error::{LoadError, ResolutionError, Result, SchemaError, SchemaErrorKind};
pub use index::Indexes;
pub use schema::{
    validate_entity, Classification, ContentCodes, ContentEntity, ContentType, CrossReference,
    Facet, Level, LevelContent, Relationship,
};
pub use store::{ContentStore, StoreStats};
pub use xref::{resolve, resolve_all, ReferenceGraph};
