use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use pasanggiri::competition::{
    Competition, CompetitionId, CompetitionRepository, RepositoryError, Rulebook, Score,
};
use pasanggiri::error::AppError;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) rulebook: Arc<Rulebook>,
}

#[derive(Default)]
struct Tournament {
    competitions: BTreeMap<CompetitionId, Competition>,
    scores: BTreeMap<CompetitionId, Vec<Score>>,
}

/// Process-local storage; one judge may score a session once.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCompetitionRepository {
    tournament: Arc<Mutex<Tournament>>,
}

impl InMemoryCompetitionRepository {
    fn lock(&self) -> Result<MutexGuard<'_, Tournament>, RepositoryError> {
        self.tournament
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl CompetitionRepository for InMemoryCompetitionRepository {
    fn insert_competition(&self, competition: Competition) -> Result<Competition, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.competitions.contains_key(&competition.id) {
            return Err(RepositoryError::Conflict);
        }
        guard
            .competitions
            .insert(competition.id.clone(), competition.clone());
        Ok(competition)
    }

    fn fetch_competition(&self, id: &CompetitionId) -> Result<Option<Competition>, RepositoryError> {
        Ok(self.lock()?.competitions.get(id).cloned())
    }

    fn competitions(&self) -> Result<Vec<Competition>, RepositoryError> {
        Ok(self.lock()?.competitions.values().cloned().collect())
    }

    fn insert_score(&self, score: Score) -> Result<Score, RepositoryError> {
        let mut guard = self.lock()?;
        if !guard.competitions.contains_key(&score.competition_id) {
            return Err(RepositoryError::NotFound);
        }
        let scores = guard
            .scores
            .entry(score.competition_id.clone())
            .or_default();
        if scores
            .iter()
            .any(|existing| existing.judge_name == score.judge_name)
        {
            return Err(RepositoryError::Conflict);
        }
        scores.push(score.clone());
        Ok(score)
    }

    fn scores_for(&self, id: &CompetitionId) -> Result<Vec<Score>, RepositoryError> {
        Ok(self.lock()?.scores.get(id).cloned().unwrap_or_default())
    }
}

/// The rulebook at `path`, or the standard one when no override is configured.
pub(crate) fn load_rulebook(path: Option<&Path>) -> Result<Rulebook, AppError> {
    match path {
        Some(path) => {
            let rulebook = Rulebook::from_path(path)?;
            info!(path = %path.display(), "rulebook override loaded");
            Ok(rulebook)
        }
        None => Ok(Rulebook::standard()),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pasanggiri::competition::Grouping;

    fn competition(id: &str) -> Competition {
        Competition {
            id: CompetitionId(id.to_string()),
            entity_name: "Cibiru".to_string(),
            grouping: Grouping::new("MASAL", "DEWASA", "PUTRA"),
        }
    }

    fn score(id: &str, judge: &str) -> Score {
        Score {
            competition_id: CompetitionId(id.to_string()),
            judge_name: judge.to_string(),
            criteria_scores: BTreeMap::new(),
            total_score: 50.0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn rejects_duplicate_sessions_and_judges() {
        let repository = InMemoryCompetitionRepository::default();
        repository
            .insert_competition(competition("cmp-1"))
            .expect("first insert");

        assert!(matches!(
            repository.insert_competition(competition("cmp-1")),
            Err(RepositoryError::Conflict)
        ));

        repository
            .insert_score(score("cmp-1", "Juri 1"))
            .expect("first score");
        assert!(matches!(
            repository.insert_score(score("cmp-1", "Juri 1")),
            Err(RepositoryError::Conflict)
        ));
        repository
            .insert_score(score("cmp-1", "Juri 2"))
            .expect("second judge");

        let stored = repository
            .scores_for(&CompetitionId("cmp-1".to_string()))
            .expect("scores");
        assert_eq!(stored.len(), 2);
    }

    #[test]
    fn scores_for_unregistered_sessions_are_not_found() {
        let repository = InMemoryCompetitionRepository::default();

        assert!(matches!(
            repository.insert_score(score("cmp-9", "Juri 1")),
            Err(RepositoryError::NotFound)
        ));
        assert!(repository
            .scores_for(&CompetitionId("cmp-9".to_string()))
            .expect("empty scores")
            .is_empty());
    }

    #[test]
    fn missing_rulebook_override_is_an_error() {
        assert!(load_rulebook(None).expect("standard rulebook").knows("MASAL"));
        assert!(matches!(
            load_rulebook(Some(Path::new("./missing-rulebook.json"))),
            Err(AppError::Rulebook(_))
        ));
    }

    #[test]
    fn parse_date_reports_bad_input() {
        assert_eq!(
            parse_date("2025-08-17"),
            Ok(NaiveDate::from_ymd_opt(2025, 8, 17).expect("valid date"))
        );
        assert!(parse_date("17/08/2025").is_err());
    }
}
