//! Candidate validation
//!
//! Walks a raw JSON candidate, checks required fields and the fixed
//! vocabularies, and produces a typed [`ContentEntity`]. The first defect
//! found is reported; validation never returns a partially built entity.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::{
    Citation, Classification, ConditionFacets, ContentCodes, ContentEntity, ContentStatus,
    ContentTags, ContentType, CrossReference, KeyTerm, Level, LevelContent, MediaAsset,
    ModuleFacets, ProcessFacets, Relationship, StructureFacets, SystemFacets, TopicFacets,
};
use crate::error::{SchemaError, UNKNOWN_ENTITY};

type Result<T> = std::result::Result<T, SchemaError>;

/// Lower-case slug segments joined by `-`, `_` or `.` ("body.head", "condition-sinusitis")
fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9]+(?:[-_.][a-z0-9]+)*$").unwrap())
}

fn fma_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^FMA:\d+$").unwrap())
}

fn hpo_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^HP:\d{7}$").unwrap())
}

/// "J45.20", "J13"
fn icd10_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z]\d{2}(?:\.[0-9A-Z]{1,4})?$").unwrap())
}

/// "J01.9", "J45.2", "A00"
fn icd11_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z]\d{1,2}\.?\d{0,3}$").unwrap())
}

/// Validate a raw candidate and build the typed entity.
pub fn validate_entity(candidate: &Value) -> Result<ContentEntity> {
    let Some(obj) = candidate.as_object() else {
        return Err(SchemaError::Malformed {
            entity: UNKNOWN_ENTITY.to_string(),
            field: "$".to_string(),
            reason: format!("expected an object, found {}", json_kind(candidate)),
        });
    };

    let id = entity_id(obj)?;
    let v = Validator { entity: &id };

    let content_type = v.content_type(obj)?;
    let name = v.required_string(obj, "name", "name")?;
    let alternate_names = v.string_list(obj, "alternateNames", "alternateNames")?;
    let classification = v.classification(obj, content_type)?;
    let codes = v.codes(obj)?;
    let levels = v.levels(obj)?;

    let key_terms = v.key_terms(obj, "keyTerms")?;
    let examples = v.string_list(obj, "examples", "examples")?;
    let analogies = v.string_list(obj, "analogies", "analogies")?;
    let patient_counseling_points =
        v.string_list(obj, "patientCounselingPoints", "patientCounselingPoints")?;
    let clinical_notes = v.optional_string(obj, "clinicalNotes", "clinicalNotes")?;

    let media = v.records::<MediaAsset>(obj, "media", &["id", "type", "filename", "title"])?;
    let citations = v.records::<Citation>(obj, "citations", &["id", "title", "source"])?;
    let cross_references = v.cross_references(obj)?;
    let tags = v.tags(obj)?;

    let created_at = v.timestamp(obj, "createdAt")?;
    let updated_at = v.timestamp(obj, "updatedAt")?;
    if let (Some(created), Some(updated)) = (created_at, updated_at) {
        if updated < created {
            return Err(v.malformed("updatedAt", "precedes createdAt"));
        }
    }
    let version = v.version(obj)?;
    let status = v.status(obj)?;
    let contributors = v.string_list(obj, "contributors", "contributors")?;

    Ok(ContentEntity {
        id: id.clone(),
        name,
        alternate_names,
        classification,
        codes,
        levels,
        key_terms,
        examples,
        analogies,
        patient_counseling_points,
        clinical_notes,
        media,
        citations,
        cross_references,
        tags,
        created_at,
        updated_at,
        version,
        status,
        contributors,
    })
}

fn entity_id(obj: &Map<String, Value>) -> Result<String> {
    let unknown = Validator { entity: UNKNOWN_ENTITY };
    let id = unknown.required_string(obj, "id", "id")?;
    if !id_pattern().is_match(&id) {
        return Err(SchemaError::Malformed {
            entity: id.clone(),
            field: "id".to_string(),
            reason: "id must be lower-case segments of [a-z0-9] joined by '-', '_' or '.'"
                .to_string(),
        });
    }
    Ok(id)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Carries the entity id so every error names it.
struct Validator<'a> {
    entity: &'a str,
}

impl Validator<'_> {
    fn missing(&self, field: impl Into<String>) -> SchemaError {
        SchemaError::MissingField {
            entity: self.entity.to_string(),
            field: field.into(),
        }
    }

    fn malformed(&self, field: impl Into<String>, reason: impl Into<String>) -> SchemaError {
        SchemaError::Malformed {
            entity: self.entity.to_string(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    fn invalid_level(&self, field: impl Into<String>, reason: impl Into<String>) -> SchemaError {
        SchemaError::InvalidLevel {
            entity: self.entity.to_string(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    fn invalid_type(&self, field: impl Into<String>, value: impl Into<String>) -> SchemaError {
        SchemaError::InvalidType {
            entity: self.entity.to_string(),
            field: field.into(),
            value: value.into(),
        }
    }

    // ========== Primitive fields ==========

    /// Present, a string, and not blank
    fn required_string(&self, obj: &Map<String, Value>, key: &str, path: &str) -> Result<String> {
        match obj.get(key) {
            None | Some(Value::Null) => Err(self.missing(path)),
            Some(Value::String(s)) if s.trim().is_empty() => Err(self.missing(path)),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(self.malformed(path, format!("expected a string, found {}", json_kind(other)))),
        }
    }

    fn optional_string(&self, obj: &Map<String, Value>, key: &str, path: &str) -> Result<Option<String>> {
        match obj.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.malformed(path, format!("expected a string, found {}", json_kind(other)))),
        }
    }

    fn array<'v>(&self, obj: &'v Map<String, Value>, key: &str, path: &str) -> Result<&'v [Value]> {
        match obj.get(key) {
            None | Some(Value::Null) => Ok(&[]),
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(self.malformed(path, format!("expected an array, found {}", json_kind(other)))),
        }
    }

    fn string_list(&self, obj: &Map<String, Value>, key: &str, path: &str) -> Result<Vec<String>> {
        self.array(obj, key, path)?
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(self.malformed(
                    format!("{}[{}]", path, i),
                    format!("expected a string, found {}", json_kind(other)),
                )),
            })
            .collect()
    }

    fn object<'v>(&self, value: &'v Value, path: &str) -> Result<&'v Map<String, Value>> {
        value
            .as_object()
            .ok_or_else(|| self.malformed(path, format!("expected an object, found {}", json_kind(value))))
    }

    /// Deserialize a nested record after checking its required keys
    fn record<T: DeserializeOwned>(&self, value: &Value, path: &str, required: &[&str]) -> Result<T> {
        let obj = self.object(value, path)?;
        for key in required {
            match obj.get(*key) {
                None | Some(Value::Null) => return Err(self.missing(format!("{}.{}", path, key))),
                Some(Value::String(s)) if s.trim().is_empty() => {
                    return Err(self.missing(format!("{}.{}", path, key)))
                }
                _ => {}
            }
        }
        serde_json::from_value(value.clone()).map_err(|e| self.malformed(path, e.to_string()))
    }

    fn records<T: DeserializeOwned>(&self, obj: &Map<String, Value>, key: &str, required: &[&str]) -> Result<Vec<T>> {
        self.array(obj, key, key)?
            .iter()
            .enumerate()
            .map(|(i, item)| self.record(item, &format!("{}[{}]", key, i), required))
            .collect()
    }

    fn key_terms(&self, obj: &Map<String, Value>, path: &str) -> Result<Vec<KeyTerm>> {
        self.array(obj, "keyTerms", path)?
            .iter()
            .enumerate()
            .map(|(i, item)| self.record(item, &format!("{}[{}]", path, i), &["term", "definition"]))
            .collect()
    }

    // ========== Identity and classification ==========

    fn content_type(&self, obj: &Map<String, Value>) -> Result<ContentType> {
        let raw = self.required_string(obj, "type", "type")?;
        raw.parse().map_err(|_| self.invalid_type("type", raw))
    }

    fn classification(&self, obj: &Map<String, Value>, content_type: ContentType) -> Result<Classification> {
        let empty = Map::new();
        let facets = match obj.get("classification") {
            None | Some(Value::Null) => match content_type {
                // Only concepts and topics have no required facet
                ContentType::Concept | ContentType::Topic => &empty,
                _ => return Err(self.missing("classification")),
            },
            Some(value) => self.object(value, "classification")?,
        };

        let required = |key: &str| self.required_string(facets, key, &format!("classification.{}", key));
        let optional = |key: &str| self.optional_string(facets, key, &format!("classification.{}", key));

        Ok(match content_type {
            ContentType::Structure => Classification::Structure(StructureFacets {
                region: required("region")?,
                system: required("system")?,
                division: optional("division")?,
            }),
            ContentType::System => Classification::System(SystemFacets {
                system: required("system")?,
            }),
            ContentType::Pathway => Classification::Pathway(SystemFacets {
                system: required("system")?,
            }),
            ContentType::Process => Classification::Process(ProcessFacets {
                system: required("system")?,
                division: optional("division")?,
            }),
            ContentType::Condition => Classification::Condition(ConditionFacets {
                system: required("system")?,
                category: optional("category")?,
                specialty: optional("specialty")?,
            }),
            ContentType::Concept => Classification::Concept(TopicFacets {
                discipline: optional("discipline")?,
            }),
            ContentType::Topic => Classification::Topic(TopicFacets {
                discipline: optional("discipline")?,
            }),
            ContentType::Module => Classification::Module(ModuleFacets {
                specialty: required("specialty")?,
                rotation: optional("rotation")?,
            }),
        })
    }

    /// Ontology codes, each checked against its terminology's syntax
    fn codes(&self, obj: &Map<String, Value>) -> Result<ContentCodes> {
        let coded = |key: &str, pattern: &Regex, what: &str| -> Result<Option<String>> {
            let code = self.optional_string(obj, key, key)?;
            match code {
                Some(code) if !pattern.is_match(&code) => {
                    Err(self.malformed(key, format!("`{}` is not a valid {} code", code, what)))
                }
                code => Ok(code),
            }
        };
        let coded_list = |key: &str, pattern: &Regex, what: &str| -> Result<Vec<String>> {
            let codes = self.string_list(obj, key, key)?;
            for (i, code) in codes.iter().enumerate() {
                if !pattern.is_match(code) {
                    return Err(self.malformed(
                        format!("{}[{}]", key, i),
                        format!("`{}` is not a valid {} code", code, what),
                    ));
                }
            }
            Ok(codes)
        };

        Ok(ContentCodes {
            fma_id: coded("fmaId", fma_pattern(), "FMA")?,
            hpo_id: coded("hpoId", hpo_pattern(), "HPO")?,
            icd10_codes: coded_list("icd10Codes", icd10_pattern(), "ICD-10")?,
            icd11_codes: coded_list("icd11Codes", icd11_pattern(), "ICD-11")?,
        })
    }

    // ========== Levels ==========

    /// Accepts `{"1": {...}, "3": {...}}` or `[{"level": 1, ...}, ...]`.
    fn levels(&self, obj: &Map<String, Value>) -> Result<BTreeMap<Level, LevelContent>> {
        let mut levels = BTreeMap::new();
        match obj.get("levels") {
            None | Some(Value::Null) => {}
            Some(Value::Object(map)) => {
                if map.is_empty() {
                    return Err(self.invalid_level("levels", "declares no levels"));
                }
                for (key, value) in map {
                    let path = format!("levels.{}", key);
                    let level = key
                        .parse::<u8>()
                        .ok()
                        .and_then(Level::new)
                        .ok_or_else(|| self.invalid_level(&path, format!("`{}` is not a level between 1 and 5", key)))?;
                    // "01" and "+1" parse to 1 and would silently replace it
                    if *key != level.get().to_string() {
                        return Err(self.invalid_level(
                            &path,
                            format!("`{}` is not a canonical level key; write it as \"{}\"", key, level),
                        ));
                    }
                    let entry = self.object(value, &path)?;
                    if let Some(inner) = entry.get("level") {
                        if self.level_number(inner, &format!("{}.level", path))? != level {
                            return Err(self.invalid_level(
                                format!("{}.level", path),
                                format!("does not match key {}", key),
                            ));
                        }
                    }
                    levels.insert(level, self.level_content(entry, &path, level)?);
                }
            }
            Some(Value::Array(items)) => {
                if items.is_empty() {
                    return Err(self.invalid_level("levels", "declares no levels"));
                }
                for (i, item) in items.iter().enumerate() {
                    let path = format!("levels[{}]", i);
                    let entry = self.object(item, &path)?;
                    let raw = entry
                        .get("level")
                        .ok_or_else(|| self.missing(format!("{}.level", path)))?;
                    let level = self.level_number(raw, &format!("{}.level", path))?;
                    if levels.contains_key(&level) {
                        return Err(self.invalid_level(
                            format!("{}.level", path),
                            format!("duplicate level {}", level),
                        ));
                    }
                    levels.insert(level, self.level_content(entry, &path, level)?);
                }
            }
            Some(other) => {
                return Err(self.malformed(
                    "levels",
                    format!("expected an object or array, found {}", json_kind(other)),
                ))
            }
        }
        Ok(levels)
    }

    fn level_number(&self, value: &Value, path: &str) -> Result<Level> {
        value
            .as_u64()
            .and_then(|n| u8::try_from(n).ok())
            .and_then(Level::new)
            .ok_or_else(|| self.invalid_level(path, format!("{} is not a level between 1 and 5", value)))
    }

    fn level_content(&self, entry: &Map<String, Value>, path: &str, level: Level) -> Result<LevelContent> {
        Ok(LevelContent {
            level,
            summary: self.required_string(entry, "summary", &format!("{}.summary", path))?,
            explanation: self.required_string(entry, "explanation", &format!("{}.explanation", path))?,
            key_terms: self.key_terms(entry, &format!("{}.keyTerms", path))?,
            analogies: self.string_list(entry, "analogies", &format!("{}.analogies", path))?,
            examples: self.string_list(entry, "examples", &format!("{}.examples", path))?,
            patient_counseling_points: self.string_list(
                entry,
                "patientCounselingPoints",
                &format!("{}.patientCounselingPoints", path),
            )?,
            clinical_notes: self.optional_string(entry, "clinicalNotes", &format!("{}.clinicalNotes", path))?,
        })
    }

    // ========== Links and tags ==========

    fn cross_references(&self, obj: &Map<String, Value>) -> Result<Vec<CrossReference>> {
        let mut refs = Vec::new();
        for (i, item) in self.array(obj, "crossReferences", "crossReferences")?.iter().enumerate() {
            let path = format!("crossReferences[{}]", i);
            let edge = self.object(item, &path)?;

            let target_id = self.required_string(edge, "targetId", &format!("{}.targetId", path))?;

            let type_path = format!("{}.targetType", path);
            let raw_type = self.required_string(edge, "targetType", &type_path)?;
            let target_type = raw_type
                .parse::<ContentType>()
                .map_err(|_| self.invalid_type(&type_path, &raw_type))?;

            let rel_path = format!("{}.relationship", path);
            let raw_rel = self.required_string(edge, "relationship", &rel_path)?;
            let relationship = raw_rel
                .parse::<Relationship>()
                .map_err(|_| SchemaError::InvalidRelationship {
                    entity: self.entity.to_string(),
                    field: rel_path.clone(),
                    value: raw_rel.clone(),
                })?;

            let label = self.optional_string(edge, "label", &format!("{}.label", path))?;

            refs.push(CrossReference {
                target_id,
                target_type,
                relationship,
                label,
            });
        }
        Ok(refs)
    }

    fn tags(&self, obj: &Map<String, Value>) -> Result<ContentTags> {
        match obj.get("tags") {
            None | Some(Value::Null) => Ok(ContentTags::default()),
            Some(value) => {
                self.object(value, "tags")?;
                serde_json::from_value(value.clone()).map_err(|e| self.malformed("tags", e.to_string()))
            }
        }
    }

    // ========== Lifecycle ==========

    fn timestamp(&self, obj: &Map<String, Value>, key: &str) -> Result<Option<DateTime<Utc>>> {
        let Some(raw) = self.optional_string(obj, key, key)? else {
            return Ok(None);
        };
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| self.malformed(key, format!("`{}` is not an RFC 3339 timestamp: {}", raw, e)))
    }

    fn version(&self, obj: &Map<String, Value>) -> Result<u32> {
        match obj.get("version") {
            None | Some(Value::Null) => Ok(1),
            Some(value) => value
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n >= 1)
                .ok_or_else(|| self.malformed("version", format!("{} is not a positive integer", value))),
        }
    }

    fn status(&self, obj: &Map<String, Value>) -> Result<ContentStatus> {
        match obj.get("status") {
            None | Some(Value::Null) => Ok(ContentStatus::default()),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|_| self.malformed("status", format!("{} is not one of draft, review, published", value))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaErrorKind;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "id": "nasal-cavity",
            "type": "structure",
            "name": "Nasal Cavity",
            "classification": { "region": "head", "system": "respiratory" }
        })
    }

    #[test]
    fn test_minimal_entity() {
        let entity = validate_entity(&minimal()).unwrap();
        assert_eq!(entity.id, "nasal-cavity");
        assert_eq!(entity.content_type(), ContentType::Structure);
        assert!(entity.levels.is_empty());
        assert_eq!(entity.version, 1);
        assert_eq!(entity.status, ContentStatus::Draft);
    }

    #[test]
    fn test_missing_name() {
        let mut candidate = minimal();
        candidate.as_object_mut().unwrap().remove("name");
        let err = validate_entity(&candidate).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::MissingField);
        assert_eq!(err.entity(), "nasal-cavity");
        assert_eq!(err.field(), "name");
    }

    #[test]
    fn test_missing_id_reports_unknown_entity() {
        let mut candidate = minimal();
        candidate.as_object_mut().unwrap().remove("id");
        let err = validate_entity(&candidate).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::MissingField);
        assert_eq!(err.entity(), UNKNOWN_ENTITY);
    }

    #[test]
    fn test_invalid_type() {
        let mut candidate = minimal();
        candidate["type"] = json!("organ");
        let err = validate_entity(&candidate).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::InvalidType);
        assert_eq!(err.field(), "type");
    }

    #[test]
    fn test_structure_requires_region() {
        let mut candidate = minimal();
        candidate["classification"] = json!({ "system": "respiratory" });
        let err = validate_entity(&candidate).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::MissingField);
        assert_eq!(err.field(), "classification.region");
    }

    #[test]
    fn test_topic_without_classification() {
        let candidate = json!({ "id": "medical-ethics", "type": "topic", "name": "Medical Ethics" });
        let entity = validate_entity(&candidate).unwrap();
        assert_eq!(entity.classification, Classification::Topic(TopicFacets::default()));
    }

    #[test]
    fn test_levels_object_form() {
        let mut candidate = minimal();
        candidate["levels"] = json!({
            "1": { "level": 1, "summary": "The inside of your nose.", "explanation": "Air comes in here." },
            "4": { "summary": "Conditions inspired air.", "explanation": "Turbinates increase surface area." }
        });
        let entity = validate_entity(&candidate).unwrap();
        assert_eq!(
            entity.level_numbers(),
            vec![Level::new(1).unwrap(), Level::new(4).unwrap()]
        );
    }

    #[test]
    fn test_level_out_of_range() {
        let mut candidate = minimal();
        candidate["levels"] = json!({
            "6": { "summary": "x", "explanation": "y" }
        });
        let err = validate_entity(&candidate).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::InvalidLevel);
        assert_eq!(err.field(), "levels.6");
    }

    #[test]
    fn test_level_key_mismatch() {
        let mut candidate = minimal();
        candidate["levels"] = json!({
            "2": { "level": 3, "summary": "x", "explanation": "y" }
        });
        let err = validate_entity(&candidate).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::InvalidLevel);
    }

    #[test]
    fn test_duplicate_level_in_array_form() {
        let mut candidate = minimal();
        candidate["levels"] = json!([
            { "level": 2, "summary": "a", "explanation": "b" },
            { "level": 2, "summary": "c", "explanation": "d" }
        ]);
        let err = validate_entity(&candidate).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::InvalidLevel);
        assert_eq!(err.field(), "levels[1].level");
    }

    #[test]
    fn test_duplicate_level_in_object_form() {
        let mut candidate = minimal();
        candidate["levels"] = json!({
            "1": { "summary": "FIRST", "explanation": "a" },
            "01": { "summary": "SECOND", "explanation": "b" },
            "+1": { "summary": "THIRD", "explanation": "c" }
        });
        let err = validate_entity(&candidate).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::InvalidLevel);
        assert!(err.field() == "levels.01" || err.field() == "levels.+1");

        candidate["levels"] = json!({ "02": { "summary": "x", "explanation": "y" } });
        let err = validate_entity(&candidate).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::InvalidLevel);
        assert_eq!(err.field(), "levels.02");
    }

    #[test]
    fn test_empty_levels_rejected() {
        let mut candidate = minimal();
        candidate["levels"] = json!({});
        let err = validate_entity(&candidate).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::InvalidLevel);
    }

    #[test]
    fn test_empty_level_summary() {
        let mut candidate = minimal();
        candidate["levels"] = json!({ "1": { "summary": "  ", "explanation": "y" } });
        let err = validate_entity(&candidate).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::MissingField);
        assert_eq!(err.field(), "levels.1.summary");
    }

    #[test]
    fn test_invalid_relationship() {
        let mut candidate = minimal();
        candidate["crossReferences"] = json!([
            { "targetId": "pharynx", "targetType": "structure", "relationship": "related" },
            { "targetId": "larynx", "targetType": "structure", "relationship": "cousin" }
        ]);
        let err = validate_entity(&candidate).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::InvalidRelationship);
        assert_eq!(err.field(), "crossReferences[1].relationship");
    }

    #[test]
    fn test_invalid_target_type() {
        let mut candidate = minimal();
        candidate["crossReferences"] = json!([
            { "targetId": "pharynx", "targetType": "organ", "relationship": "related" }
        ]);
        let err = validate_entity(&candidate).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::InvalidType);
        assert_eq!(err.field(), "crossReferences[0].targetType");
    }

    #[test]
    fn test_citation_requires_source() {
        let mut candidate = minimal();
        candidate["citations"] = json!([{ "id": "gray", "title": "Gray's Anatomy" }]);
        let err = validate_entity(&candidate).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::MissingField);
        assert_eq!(err.field(), "citations[0].source");
    }

    #[test]
    fn test_lifecycle_fields() {
        let mut candidate = minimal();
        let obj = candidate.as_object_mut().unwrap();
        obj.insert("createdAt".into(), json!("2025-01-26T00:00:00.000Z"));
        obj.insert("updatedAt".into(), json!("2025-02-01T00:00:00Z"));
        obj.insert("version".into(), json!(3));
        obj.insert("status".into(), json!("published"));
        let entity = validate_entity(&candidate).unwrap();
        assert_eq!(entity.version, 3);
        assert_eq!(entity.status, ContentStatus::Published);
        assert!(entity.created_at.unwrap() < entity.updated_at.unwrap());
    }

    #[test]
    fn test_bad_status_and_version() {
        let mut candidate = minimal();
        candidate["status"] = json!("archived");
        assert_eq!(validate_entity(&candidate).unwrap_err().field(), "status");

        let mut candidate = minimal();
        candidate["version"] = json!(0);
        assert_eq!(validate_entity(&candidate).unwrap_err().field(), "version");
    }

    #[test]
    fn test_bad_id_syntax() {
        let mut candidate = minimal();
        candidate["id"] = json!("Nasal Cavity");
        let err = validate_entity(&candidate).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::Malformed);
        assert_eq!(err.field(), "id");
    }

    #[test]
    fn test_invalid_clinical_relevance() {
        let mut candidate = minimal();
        candidate["tags"] = json!({ "clinicalRelevance": "extreme" });
        let err = validate_entity(&candidate).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::Malformed);
        assert_eq!(err.field(), "tags");
    }

    #[test]
    fn test_ontology_codes_kept() {
        let mut candidate = minimal();
        let obj = candidate.as_object_mut().unwrap();
        obj.insert("fmaId".into(), json!("FMA:54378"));
        obj.insert("icd10Codes".into(), json!(["J34.89"]));
        let entity = validate_entity(&candidate).unwrap();
        assert_eq!(entity.codes.fma_id.as_deref(), Some("FMA:54378"));
        assert_eq!(entity.codes.values().collect::<Vec<_>>(), vec!["FMA:54378", "J34.89"]);

        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["fmaId"], "FMA:54378");
        assert_eq!(json["icd10Codes"], json!(["J34.89"]));
        assert!(json.get("hpoId").is_none());
    }

    #[test]
    fn test_malformed_ontology_codes() {
        let mut candidate = minimal();
        candidate["hpoId"] = json!("HP:1");
        let err = validate_entity(&candidate).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::Malformed);
        assert_eq!(err.field(), "hpoId");

        let mut candidate = minimal();
        candidate["icd11Codes"] = json!(["J01.9", "sinusitis"]);
        let err = validate_entity(&candidate).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::Malformed);
        assert_eq!(err.field(), "icd11Codes[1]");

        let mut candidate = minimal();
        candidate["fmaId"] = json!(54378);
        assert_eq!(validate_entity(&candidate).unwrap_err().field(), "fmaId");
    }

    #[test]
    fn test_non_object_candidate() {
        let err = validate_entity(&json!(["not", "an", "entity"])).unwrap_err();
        assert_eq!(err.kind(), SchemaErrorKind::Malformed);
        assert_eq!(err.entity(), UNKNOWN_ENTITY);
    }
}
