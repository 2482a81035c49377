use super::super::domain::Score;
use super::trim::{sum_values, trim_by, trimmed_sum, TrimRule};
use serde::{Deserialize, Serialize};

/// Breakdown of which judges' totals counted towards a final score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringDetails {
    pub used_scores: Vec<f64>,
    pub discarded_scores: Vec<f64>,
    pub final_score: f64,
    pub rule: TrimRule,
    pub method: String,
}

/// A judge's value for one criterion that was retained by trimming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeValue {
    pub judge: String,
    pub value: f64,
}

/// Final score for one session: the trimmed sum of the judges' totals.
pub fn calculate_final_score(scores: &[Score]) -> f64 {
    trimmed_sum(scores.iter().map(|score| score.total_score).collect())
}

pub fn scoring_details(scores: &[Score]) -> ScoringDetails {
    let count = scores.len();
    let trimmed = trim_by(
        scores.iter().map(|score| score.total_score).collect(),
        |value| *value,
    );
    let final_score = sum_values(&trimmed.kept);

    ScoringDetails {
        used_scores: trimmed.kept,
        discarded_scores: trimmed.discarded,
        final_score,
        rule: trimmed.rule,
        method: trimmed.rule.describe(count),
    }
}

/// Trimmed sum of every judge's value for `criterion`, missing values counting as zero.
pub fn criterion_middle_sum(scores: &[Score], criterion: &str) -> f64 {
    trimmed_sum(
        scores
            .iter()
            .map(|score| score.criterion_value(criterion))
            .collect(),
    )
}

/// The judges whose `criterion` values were counted, ascending by value.
pub fn middle_juries_for_criterion(scores: &[Score], criterion: &str) -> Vec<JudgeValue> {
    let values = scores
        .iter()
        .map(|score| JudgeValue {
            judge: score.judge_name.clone(),
            value: score.criterion_value(criterion),
        })
        .collect();

    trim_by(values, |entry: &JudgeValue| entry.value).kept
}
