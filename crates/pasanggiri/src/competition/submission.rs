use std::sync::Arc;

use chrono::Utc;

use super::domain::{Competition, Score, ScoreSubmission};
use super::rulebook::Rulebook;
use super::scoring::sum_values;

/// Validation errors raised before a judge's score is stored.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionViolation {
    #[error("judge name is required")]
    MissingJudge,
    #[error("submission is for competition {found}, expected {expected}")]
    CompetitionMismatch { expected: String, found: String },
    #[error("criterion {criterion} is not scored in category {category}")]
    UnknownCriterion { category: String, criterion: String },
    #[error("criterion {criterion} is missing from the submission")]
    MissingCriterion { criterion: String },
    #[error("criterion {criterion} must be between {min} and {max} (found {value})")]
    OutOfRange {
        criterion: String,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("criterion {criterion} is not a finite number")]
    NotFinite { criterion: String },
}

/// Guard turning inbound judge submissions into stored `Score` records.
#[derive(Debug, Clone)]
pub struct SubmissionGuard {
    rulebook: Arc<Rulebook>,
}

impl SubmissionGuard {
    pub fn new(rulebook: Arc<Rulebook>) -> Self {
        Self { rulebook }
    }

    /// Validate `submission` against the scoring sheet of the competition's category.
    ///
    /// Categories missing from the rulebook accept any finite criterion values.
    pub fn score_from_submission(
        &self,
        competition: &Competition,
        submission: ScoreSubmission,
    ) -> Result<Score, SubmissionViolation> {
        let judge_name = submission.judge_name.trim().to_string();
        if judge_name.is_empty() {
            return Err(SubmissionViolation::MissingJudge);
        }

        if submission.competition_id != competition.id {
            return Err(SubmissionViolation::CompetitionMismatch {
                expected: competition.id.0.clone(),
                found: submission.competition_id.0,
            });
        }

        for (criterion, value) in &submission.criteria_scores {
            if !value.is_finite() {
                return Err(SubmissionViolation::NotFinite {
                    criterion: criterion.clone(),
                });
            }
        }

        let category = &competition.grouping.category;
        if let Some(rules) = self.rulebook.rules_for(category) {
            if let Some(unknown) = submission
                .criteria_scores
                .keys()
                .find(|name| rules.criterion(name).is_none())
            {
                return Err(SubmissionViolation::UnknownCriterion {
                    category: category.clone(),
                    criterion: unknown.clone(),
                });
            }

            for criterion in &rules.criteria {
                let value = submission
                    .criteria_scores
                    .get(&criterion.name)
                    .copied()
                    .ok_or_else(|| SubmissionViolation::MissingCriterion {
                        criterion: criterion.name.clone(),
                    })?;
                if !criterion.accepts(value) {
                    return Err(SubmissionViolation::OutOfRange {
                        criterion: criterion.name.clone(),
                        min: criterion.min,
                        max: criterion.max,
                        value,
                    });
                }
            }
        }

        let total_score = sum_values(submission.criteria_scores.values());

        Ok(Score {
            competition_id: competition.id.clone(),
            judge_name,
            criteria_scores: submission.criteria_scores,
            total_score,
            created_at: Utc::now(),
        })
    }
}
