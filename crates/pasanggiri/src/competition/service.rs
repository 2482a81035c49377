use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::domain::{
    Competition, CompetitionId, CompetitionRegistration, CompetitionResult, Grouping, RankedResult,
    Score, ScoreSubmission,
};
use super::repository::{CompetitionRepository, RepositoryError};
use super::rulebook::Rulebook;
use super::scoring::{
    criterion_middle_sum, middle_juries_for_criterion, overall_standings, scoring_details,
    JudgeValue, OverallStandings, RankingEngine, ScoringDetails,
};
use super::submission::{SubmissionGuard, SubmissionViolation};

/// Per-criterion view of which judges' values counted for a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionBreakdown {
    pub criterion: String,
    pub middle_sum: f64,
    pub counted: Vec<JudgeValue>,
}

/// Scoring breakdown for a single session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitionDetails {
    pub competition: Competition,
    pub judges: usize,
    pub scoring: ScoringDetails,
    pub criteria: Vec<CriterionBreakdown>,
}

/// Ranked results for one grouping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupingResults {
    pub grouping: Grouping,
    pub results: Vec<RankedResult>,
    /// Entities registered in the grouping that no judge has scored yet.
    pub awaiting_scores: Vec<String>,
}

impl GroupingResults {
    /// Rank the scored entities; unscored ones are listed apart and never ranked.
    pub fn rank(
        grouping: Grouping,
        results: Vec<CompetitionResult>,
        engine: &RankingEngine,
    ) -> Self {
        let (scored, unscored): (Vec<_>, Vec<_>) = results
            .into_iter()
            .partition(|result| !result.scores.is_empty());
        Self {
            results: engine.rank(scored, &grouping.category),
            awaiting_scores: unscored
                .into_iter()
                .map(|result| result.entity_name)
                .collect(),
            grouping,
        }
    }
}

/// Service composing the submission guard, repository, and ranking engine.
pub struct PasanggiriService<R> {
    repository: Arc<R>,
    guard: SubmissionGuard,
    engine: RankingEngine,
}

static COMPETITION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_competition_id() -> CompetitionId {
    let id = COMPETITION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CompetitionId(format!("cmp-{id:06}"))
}

impl<R> PasanggiriService<R>
where
    R: CompetitionRepository + 'static,
{
    pub fn new(repository: Arc<R>, rulebook: Arc<Rulebook>) -> Self {
        Self {
            repository,
            guard: SubmissionGuard::new(rulebook.clone()),
            engine: RankingEngine::new(rulebook),
        }
    }

    pub fn rulebook(&self) -> &Rulebook {
        self.engine.rulebook()
    }

    /// Register a session for an entity within a grouping.
    pub fn register_competition(
        &self,
        registration: CompetitionRegistration,
    ) -> Result<Competition, ServiceError> {
        let entity_name = registration.entity_name.trim().to_string();
        if entity_name.is_empty() {
            return Err(ServiceError::InvalidRegistration(
                "entity name is required".to_string(),
            ));
        }

        let competition = Competition {
            id: registration.id.unwrap_or_else(next_competition_id),
            entity_name,
            grouping: registration.grouping,
        };
        let stored = self.repository.insert_competition(competition)?;
        info!(
            competition = %stored.id,
            grouping = %stored.grouping.label(),
            "competition registered"
        );
        Ok(stored)
    }

    /// Validate and store one judge's score.
    pub fn submit_score(&self, submission: ScoreSubmission) -> Result<Score, ServiceError> {
        let competition = self.competition(&submission.competition_id)?;
        let score = self.guard.score_from_submission(&competition, submission)?;
        let judge = score.judge_name.clone();
        let stored = self.repository.insert_score(score).map_err(|err| match err {
            RepositoryError::Conflict => ServiceError::JudgeAlreadyScored {
                judge,
                competition: competition.id.0.clone(),
            },
            other => ServiceError::Repository(other),
        })?;
        debug!(
            competition = %stored.competition_id,
            judge = %stored.judge_name,
            total = stored.total_score,
            "score stored"
        );
        Ok(stored)
    }

    pub fn competition(&self, id: &CompetitionId) -> Result<Competition, ServiceError> {
        let competition = self
            .repository
            .fetch_competition(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(competition)
    }

    /// Scoring breakdown of a session, including each of its category's criteria.
    pub fn competition_details(
        &self,
        id: &CompetitionId,
    ) -> Result<CompetitionDetails, ServiceError> {
        let competition = self.competition(id)?;
        let scores = self.repository.scores_for(id)?;

        let criteria = self
            .rulebook()
            .criteria_for(&competition.grouping.category)
            .iter()
            .map(|criterion| CriterionBreakdown {
                criterion: criterion.name.clone(),
                middle_sum: criterion_middle_sum(&scores, &criterion.name),
                counted: middle_juries_for_criterion(&scores, &criterion.name),
            })
            .collect();

        Ok(CompetitionDetails {
            judges: scores.len(),
            scoring: scoring_details(&scores),
            criteria,
            competition,
        })
    }

    /// Distinct groupings with at least one registered session.
    pub fn groupings(&self) -> Result<Vec<Grouping>, ServiceError> {
        let mut groupings: Vec<Grouping> = self
            .repository
            .competitions()?
            .into_iter()
            .map(|competition| competition.grouping)
            .collect();
        groupings.sort();
        groupings.dedup();
        Ok(groupings)
    }

    /// Ranked results of one grouping; an entity's sessions are pooled together.
    pub fn results(&self, grouping: &Grouping) -> Result<GroupingResults, ServiceError> {
        let mut by_entity: BTreeMap<String, Vec<Score>> = BTreeMap::new();
        for competition in self.repository.competitions()? {
            if &competition.grouping != grouping {
                continue;
            }
            let scores = self.repository.scores_for(&competition.id)?;
            by_entity
                .entry(competition.entity_name)
                .or_default()
                .extend(scores);
        }

        let results = by_entity
            .into_iter()
            .map(|(entity_name, scores)| CompetitionResult::from_scores(entity_name, scores))
            .collect();

        Ok(GroupingResults::rank(grouping.clone(), results, &self.engine))
    }

    /// Medal standings across every grouping.
    pub fn standings(&self) -> Result<OverallStandings, ServiceError> {
        let mut ranked = Vec::new();
        for grouping in self.groupings()? {
            let GroupingResults {
                grouping, results, ..
            } = self.results(&grouping)?;
            ranked.push((grouping, results));
        }
        Ok(overall_standings(&ranked))
    }
}

/// Error raised by the competition service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid registration: {0}")]
    InvalidRegistration(String),
    #[error("judge {judge} has already scored competition {competition}")]
    JudgeAlreadyScored { judge: String, competition: String },
    #[error(transparent)]
    Submission(#[from] SubmissionViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
