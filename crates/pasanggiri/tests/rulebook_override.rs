use pasanggiri::competition::{
    Competition, CompetitionId, CompetitionRegistration, CompetitionRepository, Grouping,
    PasanggiriService, RepositoryError, Rulebook, RulebookError, Score, ScoreSubmission,
    ServiceError, SubmissionViolation,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct VecRepository {
    competitions: Mutex<Vec<Competition>>,
    scores: Mutex<Vec<Score>>,
}

impl CompetitionRepository for VecRepository {
    fn insert_competition(&self, competition: Competition) -> Result<Competition, RepositoryError> {
        self.competitions
            .lock()
            .expect("competition mutex poisoned")
            .push(competition.clone());
        Ok(competition)
    }

    fn fetch_competition(&self, id: &CompetitionId) -> Result<Option<Competition>, RepositoryError> {
        let competitions = self.competitions.lock().expect("competition mutex poisoned");
        Ok(competitions.iter().find(|c| &c.id == id).cloned())
    }

    fn competitions(&self) -> Result<Vec<Competition>, RepositoryError> {
        Ok(self
            .competitions
            .lock()
            .expect("competition mutex poisoned")
            .clone())
    }

    fn insert_score(&self, score: Score) -> Result<Score, RepositoryError> {
        self.scores
            .lock()
            .expect("score mutex poisoned")
            .push(score.clone());
        Ok(score)
    }

    fn scores_for(&self, id: &CompetitionId) -> Result<Vec<Score>, RepositoryError> {
        let scores = self.scores.lock().expect("score mutex poisoned");
        Ok(scores
            .iter()
            .filter(|score| &score.competition_id == id)
            .cloned()
            .collect())
    }
}

const TANDING_RULES: &str = r#"{
    "tanding": {
        "criteria": [
            {"name": "SERANGAN", "min": 0, "max": 5},
            {"name": "PERTAHANAN", "min": 0, "max": 5}
        ],
        "tie_break": ["PERTAHANAN", "SERANGAN"]
    }
}"#;

fn submission(id: &str, judge: &str, serangan: f64, pertahanan: f64) -> ScoreSubmission {
    let mut criteria_scores = BTreeMap::new();
    criteria_scores.insert("SERANGAN".to_string(), serangan);
    criteria_scores.insert("PERTAHANAN".to_string(), pertahanan);
    ScoreSubmission {
        competition_id: CompetitionId(id.to_string()),
        judge_name: judge.to_string(),
        criteria_scores,
    }
}

#[test]
fn custom_rulebook_drives_validation_and_tie_breaks() {
    let rulebook = Rulebook::from_reader(TANDING_RULES.as_bytes()).expect("rulebook parses");
    assert!(rulebook.knows("Tanding"));
    assert!(!rulebook.knows("PERORANGAN"));

    let service = PasanggiriService::new(Arc::new(VecRepository::default()), Arc::new(rulebook));
    let grouping = Grouping::new("TANDING", "DEWASA", "PUTRI");
    for (id, entity) in [("t-1", "Cibiru"), ("t-2", "Cileunyi")] {
        service
            .register_competition(CompetitionRegistration {
                id: Some(CompetitionId(id.to_string())),
                entity_name: entity.to_string(),
                grouping: grouping.clone(),
            })
            .expect("registered");
    }

    for judge in ["Juri 1", "Juri 2", "Juri 3"] {
        service
            .submit_score(submission("t-1", judge, 5.0, 3.0))
            .expect("score accepted");
        service
            .submit_score(submission("t-2", judge, 4.0, 4.0))
            .expect("score accepted");
    }

    match service.submit_score(submission("t-1", "Juri 4", 6.0, 3.0)) {
        Err(ServiceError::Submission(SubmissionViolation::OutOfRange { criterion, .. })) => {
            assert_eq!(criterion, "SERANGAN")
        }
        other => panic!("expected range violation, got {other:?}"),
    }

    let results = service.results(&grouping).expect("results");
    assert_eq!(results.results[0].result.entity_name, "Cileunyi");
    assert_eq!(results.results[0].rank, 1);
    assert_eq!(results.results[1].rank, 2);
}

#[test]
fn inverted_ranges_are_rejected_on_load() {
    let json = r#"{"MASAL": {"criteria": [{"name": "KEKOMPAKAN", "min": 10, "max": 1}]}}"#;

    match Rulebook::from_reader(json.as_bytes()) {
        Err(RulebookError::InvalidRange { category, criterion, .. }) => {
            assert_eq!(category, "MASAL");
            assert_eq!(criterion, "KEKOMPAKAN");
        }
        other => panic!("expected invalid range, got {other:?}"),
    }
}
