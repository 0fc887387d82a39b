//! Content schema types
//!
//! Every entity in the catalog is a [`ContentEntity`]. Entities are never
//! deserialized directly; raw JSON candidates go through
//! [`validate::validate_entity`], which checks the fixed vocabularies and
//! builds the typed record.

pub mod level;
pub mod validate;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use level::{Level, LevelContent};
pub use validate::validate_entity;

/// Which sub-schema an entity follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    /// Anatomical structure (organ, bone, cavity)
    Structure,
    /// Body system as a whole
    System,
    /// Physiological or metabolic pathway
    Pathway,
    /// Physiological process
    Process,
    /// Disease, disorder or syndrome
    Condition,
    Concept,
    Topic,
    /// Teaching module or clinical rotation unit
    Module,
}

impl ContentType {
    pub const ALL: [ContentType; 8] = [
        ContentType::Structure,
        ContentType::System,
        ContentType::Pathway,
        ContentType::Process,
        ContentType::Condition,
        ContentType::Concept,
        ContentType::Topic,
        ContentType::Module,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Structure => "structure",
            ContentType::System => "system",
            ContentType::Pathway => "pathway",
            ContentType::Process => "process",
            ContentType::Condition => "condition",
            ContentType::Concept => "concept",
            ContentType::Topic => "topic",
            ContentType::Module => "module",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown content type `{}`", s))
    }
}

/// Kind of a cross-reference edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Relationship {
    Parent,
    Child,
    Sibling,
    Related,
    SeeAlso,
}

impl Relationship {
    pub const ALL: [Relationship; 5] = [
        Relationship::Parent,
        Relationship::Child,
        Relationship::Sibling,
        Relationship::Related,
        Relationship::SeeAlso,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::Parent => "parent",
            Relationship::Child => "child",
            Relationship::Sibling => "sibling",
            Relationship::Related => "related",
            Relationship::SeeAlso => "see-also",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Relationship {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Relationship::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown relationship `{}`", s))
    }
}

/// Classification axis used for secondary indexing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Facet {
    /// The entity's content type; every entity has one
    Type,
    /// Anatomical region (e.g. "head", "thorax")
    Region,
    /// Body system (e.g. "respiratory")
    System,
    Division,
    Category,
    Specialty,
    Rotation,
    Discipline,
}

impl Facet {
    pub const ALL: [Facet; 8] = [
        Facet::Type,
        Facet::Region,
        Facet::System,
        Facet::Division,
        Facet::Category,
        Facet::Specialty,
        Facet::Rotation,
        Facet::Discipline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Facet::Type => "type",
            Facet::Region => "region",
            Facet::System => "system",
            Facet::Division => "division",
            Facet::Category => "category",
            Facet::Specialty => "specialty",
            Facet::Rotation => "rotation",
            Facet::Discipline => "discipline",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Facet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Facet::ALL
            .into_iter()
            .find(|facet| facet.as_str() == s)
            .ok_or_else(|| format!("unknown facet `{}`", s))
    }
}

// --- Per-type classification sub-schemas ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureFacets {
    pub region: String,
    pub system: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
}

/// Facets for `system` and `pathway` entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemFacets {
    pub system: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessFacets {
    pub system: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionFacets {
    pub system: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
}

/// Facets for `concept` and `topic` entities
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopicFacets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discipline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleFacets {
    pub specialty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<String>,
}

/// Closed set of classification shapes, one per content type.
///
/// Serialized adjacently: `"type": "structure", "classification": {...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "classification", rename_all = "kebab-case")]
pub enum Classification {
    Structure(StructureFacets),
    System(SystemFacets),
    Pathway(SystemFacets),
    Process(ProcessFacets),
    Condition(ConditionFacets),
    Concept(TopicFacets),
    Topic(TopicFacets),
    Module(ModuleFacets),
}

impl Classification {
    pub fn content_type(&self) -> ContentType {
        match self {
            Classification::Structure(_) => ContentType::Structure,
            Classification::System(_) => ContentType::System,
            Classification::Pathway(_) => ContentType::Pathway,
            Classification::Process(_) => ContentType::Process,
            Classification::Condition(_) => ContentType::Condition,
            Classification::Concept(_) => ContentType::Concept,
            Classification::Topic(_) => ContentType::Topic,
            Classification::Module(_) => ContentType::Module,
        }
    }

    /// Declared facet values, one per axis, excluding [`Facet::Type`].
    pub fn facets(&self) -> Vec<(Facet, &str)> {
        let mut out = Vec::with_capacity(3);
        match self {
            Classification::Structure(f) => {
                out.push((Facet::Region, f.region.as_str()));
                out.push((Facet::System, f.system.as_str()));
                if let Some(division) = &f.division {
                    out.push((Facet::Division, division.as_str()));
                }
            }
            Classification::System(f) | Classification::Pathway(f) => {
                out.push((Facet::System, f.system.as_str()));
            }
            Classification::Process(f) => {
                out.push((Facet::System, f.system.as_str()));
                if let Some(division) = &f.division {
                    out.push((Facet::Division, division.as_str()));
                }
            }
            Classification::Condition(f) => {
                out.push((Facet::System, f.system.as_str()));
                if let Some(category) = &f.category {
                    out.push((Facet::Category, category.as_str()));
                }
                if let Some(specialty) = &f.specialty {
                    out.push((Facet::Specialty, specialty.as_str()));
                }
            }
            Classification::Concept(f) | Classification::Topic(f) => {
                if let Some(discipline) = &f.discipline {
                    out.push((Facet::Discipline, discipline.as_str()));
                }
            }
            Classification::Module(f) => {
                out.push((Facet::Specialty, f.specialty.as_str()));
                if let Some(rotation) = &f.rotation {
                    out.push((Facet::Rotation, rotation.as_str()));
                }
            }
        }
        out
    }

    /// Value of a single axis, if this classification declares it
    pub fn facet(&self, facet: Facet) -> Option<&str> {
        if facet == Facet::Type {
            return Some(self.content_type().as_str());
        }
        self.facets()
            .into_iter()
            .find(|(axis, _)| *axis == facet)
            .map(|(_, value)| value)
    }
}

/// Glossary entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyTerm {
    pub term: String,
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
}

/// Bibliographic reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub id: String,
    pub title: String,
    pub source: String,
    /// "article", "book", "guideline", ...
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Diagram,
    Video,
    Animation,
    Model,
}

/// Illustration or clip attached to an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub filename: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Typed, directed edge from the owning entity to another entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossReference {
    pub target_id: String,
    /// Expected type of the target; checked on resolution, never trusted
    pub target_type: ContentType,
    pub relationship: Relationship,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl CrossReference {
    pub fn new(target_id: impl Into<String>, target_type: ContentType, relationship: Relationship) -> Self {
        Self {
            target_id: target_id.into(),
            target_type,
            relationship,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Display text, falling back to the target id
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.target_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClinicalRelevance {
    Low,
    Medium,
    High,
    Critical,
}

impl ClinicalRelevance {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClinicalRelevance::Low => "low",
            ClinicalRelevance::Medium => "medium",
            ClinicalRelevance::High => "high",
            ClinicalRelevance::Critical => "critical",
        }
    }
}

/// Board exam relevance flags
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExamRelevance {
    #[serde(default)]
    pub usmle: bool,
    #[serde(default)]
    pub nbme: bool,
    /// Shelf exams (e.g. "family medicine")
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shelf: Vec<String>,
}

/// Free-form classification record flattened into the tag index
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTags {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub systems: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_relevance: Option<ClinicalRelevance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_relevance: Option<ExamRelevance>,
}

impl ContentTags {
    /// Every tag value this record contributes, normalized to lower case,
    /// in declaration order with repeats removed.
    pub fn values(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut push = |value: String| {
            if !value.is_empty() && !out.contains(&value) {
                out.push(value);
            }
        };

        for value in self.systems.iter().chain(&self.topics).chain(&self.keywords) {
            push(normalize_key(value));
        }
        if let Some(relevance) = self.clinical_relevance {
            push(format!("clinical-relevance:{}", relevance.as_str()));
        }
        if let Some(exam) = &self.exam_relevance {
            if exam.usmle {
                push("exam:usmle".to_string());
            }
            if exam.nbme {
                push("exam:nbme".to_string());
            }
            for shelf in &exam.shelf {
                push(normalize_key(shelf));
            }
        }
        out
    }
}

/// Identifiers of the entity in external terminologies
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentCodes {
    /// Foundational Model of Anatomy, e.g. `FMA:54378`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fma_id: Option<String>,
    /// Human Phenotype Ontology, e.g. `HP:0000246`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hpo_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub icd10_codes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub icd11_codes: Vec<String>,
}

impl ContentCodes {
    pub fn is_empty(&self) -> bool {
        self.fma_id.is_none()
            && self.hpo_id.is_none()
            && self.icd10_codes.is_empty()
            && self.icd11_codes.is_empty()
    }

    /// Every code, FMA first, then HPO, ICD-10 and ICD-11
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fma_id
            .iter()
            .chain(&self.hpo_id)
            .chain(&self.icd10_codes)
            .chain(&self.icd11_codes)
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    #[default]
    Draft,
    Review,
    Published,
}

/// One educational content record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEntity {
    /// Globally unique, stable identifier
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternate_names: Vec<String>,
    /// Content type plus its facet values
    #[serde(flatten)]
    pub classification: Classification,
    /// Written inline as `fmaId`, `hpoId`, `icd10Codes` and `icd11Codes`
    #[serde(flatten)]
    pub codes: ContentCodes,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub levels: BTreeMap<Level, LevelContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub key_terms: Vec<KeyTerm>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub analogies: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub patient_counseling_points: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinical_notes: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<MediaAsset>,
    pub citations: Vec<Citation>,
    pub cross_references: Vec<CrossReference>,
    pub tags: ContentTags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub version: u32,
    pub status: ContentStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<String>,
}

impl ContentEntity {
    pub fn content_type(&self) -> ContentType {
        self.classification.content_type()
    }

    /// Declared levels in ascending order
    pub fn level_numbers(&self) -> Vec<Level> {
        self.levels.keys().copied().collect()
    }

    pub fn level(&self, level: Level) -> Option<&LevelContent> {
        self.levels.get(&level)
    }

    /// Name followed by alternate names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.alternate_names.iter().map(String::as_str))
    }
}

/// Normalize a facet, tag or name key for indexing and lookup
pub fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_round_trip() {
        for t in ContentType::ALL {
            assert_eq!(t.as_str().parse::<ContentType>().unwrap(), t);
        }
        for r in Relationship::ALL {
            assert_eq!(r.as_str().parse::<Relationship>().unwrap(), r);
        }
        assert!("organ".parse::<ContentType>().is_err());
        assert!("cousin".parse::<Relationship>().is_err());
        assert_eq!("see-also".parse::<Relationship>().unwrap(), Relationship::SeeAlso);
    }

    #[test]
    fn test_structure_facets() {
        let classification = Classification::Structure(StructureFacets {
            region: "head".to_string(),
            system: "respiratory".to_string(),
            division: Some("upper-airway".to_string()),
        });
        assert_eq!(classification.content_type(), ContentType::Structure);
        assert_eq!(
            classification.facets(),
            vec![
                (Facet::Region, "head"),
                (Facet::System, "respiratory"),
                (Facet::Division, "upper-airway"),
            ]
        );
        assert_eq!(classification.facet(Facet::Type), Some("structure"));
        assert_eq!(classification.facet(Facet::Specialty), None);
    }

    #[test]
    fn test_tag_values_flatten_and_dedupe() {
        let tags = ContentTags {
            systems: vec!["ENT".to_string(), "respiratory".to_string()],
            topics: vec!["Respiratory".to_string()],
            keywords: vec!["ABRS".to_string()],
            clinical_relevance: Some(ClinicalRelevance::High),
            exam_relevance: Some(ExamRelevance {
                usmle: true,
                nbme: false,
                shelf: vec!["Family Medicine".to_string()],
            }),
        };
        assert_eq!(
            tags.values(),
            vec![
                "ent",
                "respiratory",
                "abrs",
                "clinical-relevance:high",
                "exam:usmle",
                "family medicine",
            ]
        );
    }

    #[test]
    fn test_classification_serializes_adjacent() {
        let classification = Classification::Module(ModuleFacets {
            specialty: "pulmonology".to_string(),
            rotation: None,
        });
        let json = serde_json::to_value(&classification).unwrap();
        assert_eq!(json["type"], "module");
        assert_eq!(json["classification"]["specialty"], "pulmonology");
    }
}
