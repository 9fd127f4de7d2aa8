//! Symptom keyword → department routing table
//!
//! The table is data, not code: the built-in one can be replaced by a JSON
//! file without touching the state machine.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_DEPARTMENT: &str = "General Medicine";

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Failed to read department table: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse department table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid department table: {0}")]
    Invalid(String),
}

/// A group of keywords sharing one weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordGroup {
    pub terms: Vec<String>,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<KeywordGroup>,
}

/// Ordered departments plus the one used when nothing matches.
///
/// Order matters: it breaks ties in keyword scoring and decides which
/// department wins when several are named outright.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentTable {
    pub default: String,
    pub departments: Vec<Department>,
}

fn group(terms: &[&str], weight: f64) -> KeywordGroup {
    KeywordGroup {
        terms: terms.iter().map(|t| (*t).to_string()).collect(),
        weight,
    }
}

fn department(name: &str, keywords: Vec<KeywordGroup>) -> Department {
    Department {
        name: name.to_string(),
        keywords,
    }
}

impl Default for DepartmentTable {
    fn default() -> Self {
        Self {
            default: DEFAULT_DEPARTMENT.to_string(),
            departments: vec![
                department(
                    "Cardiology",
                    vec![
                        group(
                            &["heart", "chest pain", "palpitation", "blood pressure", "cardiac"],
                            0.9,
                        ),
                        group(&["shortness of breath", "dizziness"], 0.7),
                    ],
                ),
                department(
                    "Orthopedics",
                    vec![
                        group(&["bone", "joint", "fracture", "sprain", "back pain"], 0.9),
                        group(&["swelling", "stiffness"], 0.7),
                    ],
                ),
                department(
                    "Pediatrics",
                    vec![
                        group(&["child", "fever", "cough", "rash"], 0.9),
                        group(&["infant", "diarrhea"], 0.7),
                    ],
                ),
                department(
                    "Neurology",
                    vec![
                        group(&["headache", "seizure", "nerve", "migraine", "numbness"], 0.9),
                        group(&["dizziness", "memory loss"], 0.7),
                    ],
                ),
                department(DEFAULT_DEPARTMENT, vec![group(&["fatigue", "nausea", "pain"], 0.6)]),
            ],
        }
    }
}

impl DepartmentTable {
    /// Load a table from a JSON file and validate it
    ///
    /// # Errors
    ///
    /// Returns `TableError::Io` if the file can't be read, otherwise the
    /// errors of [`DepartmentTable::from_json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// # Errors
    ///
    /// Returns `TableError::Parse` for malformed JSON and
    /// `TableError::Invalid` if the table fails validation.
    pub fn from_json(raw: &str) -> Result<Self, TableError> {
        let table: DepartmentTable = serde_json::from_str(raw)?;
        table.validate()?;
        Ok(table)
    }

    /// Check names, keyword groups, weights and the default.
    ///
    /// # Errors
    ///
    /// Returns `TableError::Invalid` describing the first problem found.
    pub fn validate(&self) -> Result<(), TableError> {
        if self.departments.is_empty() {
            return Err(TableError::Invalid("no departments listed".to_string()));
        }
        for dept in &self.departments {
            if dept.name.trim().is_empty() {
                return Err(TableError::Invalid("department with empty name".to_string()));
            }
            for group in &dept.keywords {
                if group.terms.is_empty() || group.terms.iter().any(|t| t.trim().is_empty()) {
                    return Err(TableError::Invalid(format!(
                        "{} has an empty keyword group or term",
                        dept.name
                    )));
                }
                if !group.weight.is_finite() || group.weight <= 0.0 {
                    return Err(TableError::Invalid(format!(
                        "{} has non-positive weight {}",
                        dept.name, group.weight
                    )));
                }
            }
        }
        if !self.departments.iter().any(|d| d.name == self.default) {
            return Err(TableError::Invalid(format!(
                "default department {:?} is not listed",
                self.default
            )));
        }
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.departments.iter().map(|d| d.name.as_str())
    }

    /// Department named outright in the caller's words, if any
    #[must_use]
    pub fn mentioned(&self, utterance: &str) -> Option<&str> {
        let lowered = utterance.to_lowercase();
        self.names()
            .find(|name| lowered.contains(&name.to_lowercase()))
    }

    /// Whether the text names a department or hits any keyword
    #[must_use]
    pub fn recognizes(&self, utterance: &str) -> bool {
        let lowered = utterance.to_lowercase();
        self.mentioned(utterance).is_some()
            || self.departments.iter().any(|d| score(d, &lowered) > 0.0)
    }

    /// Best department for a symptom description.
    ///
    /// Explicit mentions win; otherwise each keyword group that has at
    /// least one term in the text adds its weight once, and the highest
    /// strictly positive score wins. Falls back to the default.
    #[must_use]
    pub fn resolve(&self, symptoms: &str) -> &str {
        if let Some(name) = self.mentioned(symptoms) {
            return name;
        }

        let lowered = symptoms.to_lowercase();
        let mut best: Option<(&str, f64)> = None;
        for dept in &self.departments {
            let total = score(dept, &lowered);
            let beats = match best {
                Some((_, top)) => total > top,
                None => total > 0.0,
            };
            if beats {
                best = Some((dept.name.as_str(), total));
            }
        }

        best.map_or(self.default.as_str(), |(name, _)| name)
    }
}

fn score(dept: &Department, lowered: &str) -> f64 {
    dept.keywords
        .iter()
        .filter(|g| g.terms.iter().any(|t| lowered.contains(&t.to_lowercase())))
        .map(|g| g.weight)
        .sum()
}
