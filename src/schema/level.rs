//! Reading-complexity levels

use std::fmt;

use serde::{Deserialize, Serialize};

use super::KeyTerm;

/// One of the five fixed reading-complexity tiers (1 = lay, 5 = expert)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub const ALL: [Level; 5] = [Level(1), Level(2), Level(3), Level(4), Level(5)];

    /// Returns `None` outside 1..=5
    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Level(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Intended reader for this tier
    pub fn audience(self) -> &'static str {
        match self.0 {
            1 => "Child",
            2 => "Patient",
            3 => "Nursing/Allied Health",
            4 => "Medical Student",
            _ => "Physician",
        }
    }
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Level::new(value).ok_or_else(|| format!("level {} outside 1-5", value))
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One tier of an entity's explanation. Self-contained: it never assumes
/// the reader has seen a lower tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelContent {
    pub level: Level,
    pub summary: String,
    pub explanation: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub key_terms: Vec<KeyTerm>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub analogies: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub patient_counseling_points: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinical_notes: Option<String>,
}

impl LevelContent {
    pub fn new(level: Level, summary: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            level,
            summary: summary.into(),
            explanation: explanation.into(),
            key_terms: Vec::new(),
            analogies: Vec::new(),
            examples: Vec::new(),
            patient_counseling_points: Vec::new(),
            clinical_notes: None,
        }
    }
}
