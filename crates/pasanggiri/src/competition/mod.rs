//! Pasanggiri judging: score submission, trimmed aggregation, tie-break ranking, and standings.

pub mod domain;
pub mod import;
pub mod repository;
pub mod router;
pub mod rulebook;
pub mod scoring;
pub mod service;
pub(crate) mod submission;

#[cfg(test)]
mod tests;

pub use domain::{
    deserialize_criteria_scores, Competition, CompetitionId, CompetitionRegistration,
    CompetitionResult, Grouping, RankedResult, Score, ScoreSubmission, ScoringCriterion,
};
pub use import::{ScoreSheet, ScoreSheetImportError, ScoreSheetImporter};
pub use repository::{CompetitionRepository, RepositoryError};
pub use router::competition_router;
pub use rulebook::{Category, CategoryRules, Rulebook, RulebookError};
pub use scoring::{
    apply_tie_breaker, calculate_final_score, criterion_middle_sum, middle_juries_for_criterion,
    overall_standings, scoring_details, sort_with_tie_breaker, JudgeValue, OverallStandings,
    RankingEngine, ScoringDetails,
};
pub use service::{
    CompetitionDetails, CriterionBreakdown, GroupingResults, PasanggiriService, ServiceError,
};
pub use submission::{SubmissionGuard, SubmissionViolation};
