use super::domain::{Competition, CompetitionId, Score};

/// Storage abstraction so the service module can be exercised in isolation.
///
/// Implementations must reject a second score from the same judge for the same
/// competition with `RepositoryError::Conflict`.
pub trait CompetitionRepository: Send + Sync {
    fn insert_competition(&self, competition: Competition) -> Result<Competition, RepositoryError>;
    fn fetch_competition(&self, id: &CompetitionId) -> Result<Option<Competition>, RepositoryError>;
    fn competitions(&self) -> Result<Vec<Competition>, RepositoryError>;
    fn insert_score(&self, score: Score) -> Result<Score, RepositoryError>;
    fn scores_for(&self, id: &CompetitionId) -> Result<Vec<Score>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
