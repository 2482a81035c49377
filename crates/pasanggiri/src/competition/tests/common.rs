use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::competition::domain::{
    Competition, CompetitionId, CompetitionRegistration, CompetitionResult, Grouping, Score,
    ScoreSubmission,
};
use crate::competition::repository::{CompetitionRepository, RepositoryError};
use crate::competition::rulebook::Rulebook;
use crate::competition::submission::SubmissionGuard;
use crate::competition::{competition_router, PasanggiriService};

pub(super) const PERORANGAN_CRITERIA: [&str; 4] =
    ["KEBENARAN GERAK", "ORISINALITAS", "KEMANTAPAN", "STAMINA"];

pub(super) fn remaja_putra() -> Grouping {
    Grouping::new("PERORANGAN", "REMAJA", "PUTRA")
}

pub(super) fn competition(id: &str, entity: &str) -> Competition {
    Competition {
        id: CompetitionId(id.to_string()),
        entity_name: entity.to_string(),
        grouping: remaja_putra(),
    }
}

pub(super) fn registration(id: &str, entity: &str) -> CompetitionRegistration {
    CompetitionRegistration {
        id: Some(CompetitionId(id.to_string())),
        entity_name: entity.to_string(),
        grouping: remaja_putra(),
    }
}

/// A stored score whose total is the sum of `criteria`.
pub(super) fn score(competition: &str, judge: &str, criteria: &[(&str, f64)]) -> Score {
    let criteria_scores: BTreeMap<String, f64> = criteria
        .iter()
        .map(|(name, value)| (name.to_string(), *value))
        .collect();
    Score {
        competition_id: CompetitionId(competition.to_string()),
        judge_name: judge.to_string(),
        total_score: criteria_scores.values().sum(),
        criteria_scores,
        created_at: Utc
            .with_ymd_and_hms(2025, 8, 17, 9, 0, 0)
            .single()
            .expect("valid timestamp"),
    }
}

/// Scores carrying only a total, one judge per value.
pub(super) fn totals(values: &[f64]) -> Vec<Score> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let mut score = score("cmp-totals", &format!("Juri {}", index + 1), &[]);
            score.total_score = *value;
            score
        })
        .collect()
}

pub(super) fn result_with_totals(entity: &str, values: &[f64]) -> CompetitionResult {
    CompetitionResult::from_scores(entity, totals(values))
}

/// A full PERORANGAN sheet: correctness, originality, steadiness, stamina.
pub(super) fn perorangan_submission(
    competition: &str,
    judge: &str,
    values: [f64; 4],
) -> ScoreSubmission {
    ScoreSubmission {
        competition_id: CompetitionId(competition.to_string()),
        judge_name: judge.to_string(),
        criteria_scores: PERORANGAN_CRITERIA
            .iter()
            .zip(values)
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
    }
}

pub(super) fn guard() -> SubmissionGuard {
    SubmissionGuard::new(Arc::new(Rulebook::standard()))
}

pub(super) fn build_service() -> (
    PasanggiriService<MemoryRepository>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = PasanggiriService::new(repository.clone(), Arc::new(Rulebook::standard()));
    (service, repository)
}

pub(super) fn competition_router_with_service(
    service: PasanggiriService<MemoryRepository>,
) -> axum::Router {
    competition_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    competitions: Arc<Mutex<Vec<Competition>>>,
    scores: Arc<Mutex<Vec<Score>>>,
}

impl MemoryRepository {
    pub(super) fn score_count(&self) -> usize {
        self.scores.lock().expect("score mutex poisoned").len()
    }
}

impl CompetitionRepository for MemoryRepository {
    fn insert_competition(&self, competition: Competition) -> Result<Competition, RepositoryError> {
        let mut guard = self.competitions.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == competition.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(competition.clone());
        Ok(competition)
    }

    fn fetch_competition(&self, id: &CompetitionId) -> Result<Option<Competition>, RepositoryError> {
        let guard = self.competitions.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|competition| &competition.id == id).cloned())
    }

    fn competitions(&self) -> Result<Vec<Competition>, RepositoryError> {
        Ok(self
            .competitions
            .lock()
            .expect("repository mutex poisoned")
            .clone())
    }

    fn insert_score(&self, score: Score) -> Result<Score, RepositoryError> {
        let mut guard = self.scores.lock().expect("score mutex poisoned");
        if guard.iter().any(|existing| {
            existing.competition_id == score.competition_id
                && existing.judge_name == score.judge_name
        }) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(score.clone());
        Ok(score)
    }

    fn scores_for(&self, id: &CompetitionId) -> Result<Vec<Score>, RepositoryError> {
        let guard = self.scores.lock().expect("score mutex poisoned");
        Ok(guard
            .iter()
            .filter(|score| &score.competition_id == id)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableRepository;

impl CompetitionRepository for UnavailableRepository {
    fn insert_competition(&self, _competition: Competition) -> Result<Competition, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_competition(&self, _id: &CompetitionId) -> Result<Option<Competition>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn competitions(&self) -> Result<Vec<Competition>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_score(&self, _score: Score) -> Result<Score, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn scores_for(&self, _id: &CompetitionId) -> Result<Vec<Score>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
