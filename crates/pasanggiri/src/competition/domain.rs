use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier wrapper for a judged competition session.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CompetitionId(pub String);

impl fmt::Display for CompetitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Category, division and class a session is ranked within.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Grouping {
    pub category: String,
    pub division: String,
    pub class: String,
}

impl Grouping {
    pub fn new(
        category: impl Into<String>,
        division: impl Into<String>,
        class: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            division: division.into(),
            class: class.into(),
        }
    }

    pub fn label(&self) -> String {
        format!("{} / {} / {}", self.category, self.division, self.class)
    }
}

/// One performance by one competing entity (usually a village) within a grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competition {
    pub id: CompetitionId,
    pub entity_name: String,
    pub grouping: Grouping,
}

/// One judge's stored submission for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub competition_id: CompetitionId,
    pub judge_name: String,
    #[serde(default, deserialize_with = "deserialize_criteria_scores")]
    pub criteria_scores: BTreeMap<String, f64>,
    pub total_score: f64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Score {
    /// Value recorded for `criterion`; a missing key counts as zero.
    pub fn criterion_value(&self, criterion: &str) -> f64 {
        self.criteria_scores.get(criterion).copied().unwrap_or(0.0)
    }
}

/// Inbound judge submission before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub competition_id: CompetitionId,
    pub judge_name: String,
    #[serde(deserialize_with = "deserialize_criteria_scores")]
    pub criteria_scores: BTreeMap<String, f64>,
}

/// Inbound request to register a session for an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitionRegistration {
    #[serde(default)]
    pub id: Option<CompetitionId>,
    pub entity_name: String,
    pub grouping: Grouping,
}

/// Static definition of a scored aspect of a performance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringCriterion {
    pub name: String,
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub description: String,
}

impl ScoringCriterion {
    pub fn new(name: &str, min: f64, max: f64, description: &str) -> Self {
        Self {
            name: name.to_string(),
            min,
            max,
            description: description.to_string(),
        }
    }

    pub fn accepts(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

/// One entity's outcome within a grouping, ready for ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionResult {
    pub entity_name: String,
    pub scores: Vec<Score>,
    pub final_score: f64,
}

impl CompetitionResult {
    pub fn from_scores(entity_name: impl Into<String>, scores: Vec<Score>) -> Self {
        let final_score = super::scoring::calculate_final_score(&scores);
        Self {
            entity_name: entity_name.into(),
            scores,
            final_score,
        }
    }
}

/// A result annotated with its standard competition rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    #[serde(flatten)]
    pub result: CompetitionResult,
    pub rank: usize,
}

/// Criterion values arrive from judges' devices and CSV sheets; anything that is
/// not a number or a numeric string is stored as zero.
pub fn deserialize_criteria_scores<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(name, value)| {
            let value = lenient_number(&value);
            (name, value)
        })
        .collect())
}

pub(crate) fn lenient_number(value: &serde_json::Value) -> f64 {
    let parsed = match value {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(text) => parse_cell(text),
        _ => None,
    };
    parsed.filter(|value| value.is_finite()).unwrap_or(0.0)
}

pub(crate) fn parse_cell(raw: &str) -> Option<f64> {
    raw.trim().replace(',', ".").parse::<f64>().ok()
}
