//! Error types for the content store

use thiserror::Error;

use crate::schema::ContentType;

/// Result type for load-time operations
pub type Result<T> = std::result::Result<T, LoadError>;

/// Placeholder used when a candidate record has no usable id
pub const UNKNOWN_ENTITY: &str = "<unknown>";

/// Discriminant of a [`SchemaError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaErrorKind {
    MissingField,
    InvalidLevel,
    InvalidRelationship,
    InvalidType,
    Malformed,
}

/// A candidate entity failed schema validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("entity {entity}: missing required field `{field}`")]
    MissingField { entity: String, field: String },

    #[error("entity {entity}: invalid level at `{field}`: {reason}")]
    InvalidLevel {
        entity: String,
        field: String,
        reason: String,
    },

    #[error("entity {entity}: unknown relationship `{value}` at `{field}`")]
    InvalidRelationship {
        entity: String,
        field: String,
        value: String,
    },

    #[error("entity {entity}: unknown content type `{value}` at `{field}`")]
    InvalidType {
        entity: String,
        field: String,
        value: String,
    },

    #[error("entity {entity}: malformed `{field}`: {reason}")]
    Malformed {
        entity: String,
        field: String,
        reason: String,
    },
}

impl SchemaError {
    pub fn kind(&self) -> SchemaErrorKind {
        match self {
            SchemaError::MissingField { .. } => SchemaErrorKind::MissingField,
            SchemaError::InvalidLevel { .. } => SchemaErrorKind::InvalidLevel,
            SchemaError::InvalidRelationship { .. } => SchemaErrorKind::InvalidRelationship,
            SchemaError::InvalidType { .. } => SchemaErrorKind::InvalidType,
            SchemaError::Malformed { .. } => SchemaErrorKind::Malformed,
        }
    }

    /// Id of the entity that failed validation
    pub fn entity(&self) -> &str {
        match self {
            SchemaError::MissingField { entity, .. }
            | SchemaError::InvalidLevel { entity, .. }
            | SchemaError::InvalidRelationship { entity, .. }
            | SchemaError::InvalidType { entity, .. }
            | SchemaError::Malformed { entity, .. } => entity,
        }
    }

    /// Path of the offending field, e.g. `crossReferences[1].relationship`
    pub fn field(&self) -> &str {
        match self {
            SchemaError::MissingField { field, .. }
            | SchemaError::InvalidLevel { field, .. }
            | SchemaError::InvalidRelationship { field, .. }
            | SchemaError::InvalidType { field, .. }
            | SchemaError::Malformed { field, .. } => field,
        }
    }
}

/// Catalog assembly failed; nothing was built
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("module {module}: {source}")]
    Schema {
        module: String,
        #[source]
        source: SchemaError,
    },

    #[error("duplicate id `{id}` declared by modules `{first_module}` and `{second_module}`")]
    DuplicateId {
        id: String,
        first_module: String,
        second_module: String,
    },

    #[error("invalid module {origin}: {reason}")]
    InvalidModule { origin: String, reason: String },

    #[error("failed to parse JSON in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to fingerprint the {target}: {source}")]
    Fingerprint {
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} unresolved cross-reference(s)", .dangling.len())]
    UnresolvedReferences { dangling: Vec<ResolutionError> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A single cross-reference edge could not be resolved cleanly
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("{source_id} -> {target_id}: target does not exist")]
    DanglingReference { source_id: String, target_id: String },

    #[error("{source_id} -> {target_id}: declared as {expected} but target is {actual}")]
    TypeMismatch {
        source_id: String,
        target_id: String,
        expected: ContentType,
        actual: ContentType,
    },
}

impl ResolutionError {
    /// `TypeMismatch` only flags a wrong hint; the edge still resolves.
    pub fn is_warning(&self) -> bool {
        matches!(self, ResolutionError::TypeMismatch { .. })
    }

    pub fn source_id(&self) -> &str {
        match self {
            ResolutionError::DanglingReference { source_id, .. }
            | ResolutionError::TypeMismatch { source_id, .. } => source_id,
        }
    }

    pub fn target_id(&self) -> &str {
        match self {
            ResolutionError::DanglingReference { target_id, .. }
            | ResolutionError::TypeMismatch { target_id, .. } => target_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_accessors() {
        let err = SchemaError::InvalidRelationship {
            entity: "pharynx".to_string(),
            field: "crossReferences[0].relationship".to_string(),
            value: "cousin".to_string(),
        };
        assert_eq!(err.kind(), SchemaErrorKind::InvalidRelationship);
        assert_eq!(err.entity(), "pharynx");
        assert_eq!(err.field(), "crossReferences[0].relationship");
        assert!(err.to_string().contains("cousin"));
    }

    #[test]
    fn test_duplicate_id_message_names_both_modules() {
        let err = LoadError::DuplicateId {
            id: "trachea".to_string(),
            first_module: "anatomy".to_string(),
            second_module: "rotations".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("trachea"));
        assert!(message.contains("anatomy"));
        assert!(message.contains("rotations"));
    }

    #[test]
    fn test_type_mismatch_is_warning() {
        let mismatch = ResolutionError::TypeMismatch {
            source_id: "a".to_string(),
            target_id: "b".to_string(),
            expected: ContentType::Structure,
            actual: ContentType::Condition,
        };
        let dangling = ResolutionError::DanglingReference {
            source_id: "a".to_string(),
            target_id: "b".to_string(),
        };
        assert!(mismatch.is_warning());
        assert!(!dangling.is_warning());
        assert_eq!(dangling.source_id(), "a");
        assert_eq!(dangling.target_id(), "b");
    }
}
