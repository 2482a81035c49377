use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{CompetitionId, CompetitionRegistration, Grouping, ScoreSubmission};
use super::repository::{CompetitionRepository, RepositoryError};
use super::service::{PasanggiriService, ServiceError};

/// Query string selecting one grouping's results.
#[derive(Debug, Deserialize)]
pub struct ResultsQuery {
    pub category: String,
    pub division: String,
    pub class: String,
}

/// Judge submission body; the competition comes from the path.
#[derive(Debug, Deserialize)]
pub struct ScoreBody {
    pub judge_name: String,
    #[serde(deserialize_with = "super::domain::deserialize_criteria_scores")]
    pub criteria_scores: std::collections::BTreeMap<String, f64>,
}

/// Router builder exposing HTTP endpoints for registration, judging, and results.
pub fn competition_router<R>(service: Arc<PasanggiriService<R>>) -> Router
where
    R: CompetitionRepository + 'static,
{
    Router::new()
        .route("/api/v1/competitions", post(register_handler::<R>))
        .route(
            "/api/v1/competitions/:competition_id",
            get(details_handler::<R>),
        )
        .route(
            "/api/v1/competitions/:competition_id/scores",
            post(submit_score_handler::<R>),
        )
        .route("/api/v1/results", get(results_handler::<R>))
        .route("/api/v1/ranking", get(ranking_handler::<R>))
        .with_state(service)
}

pub(crate) async fn register_handler<R>(
    State(service): State<Arc<PasanggiriService<R>>>,
    axum::Json(registration): axum::Json<CompetitionRegistration>,
) -> Response
where
    R: CompetitionRepository + 'static,
{
    match service.register_competition(registration) {
        Ok(competition) => (StatusCode::CREATED, axum::Json(competition)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn details_handler<R>(
    State(service): State<Arc<PasanggiriService<R>>>,
    Path(competition_id): Path<String>,
) -> Response
where
    R: CompetitionRepository + 'static,
{
    match service.competition_details(&CompetitionId(competition_id)) {
        Ok(details) => (StatusCode::OK, axum::Json(details)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_score_handler<R>(
    State(service): State<Arc<PasanggiriService<R>>>,
    Path(competition_id): Path<String>,
    axum::Json(body): axum::Json<ScoreBody>,
) -> Response
where
    R: CompetitionRepository + 'static,
{
    let submission = ScoreSubmission {
        competition_id: CompetitionId(competition_id),
        judge_name: body.judge_name,
        criteria_scores: body.criteria_scores,
    };
    match service.submit_score(submission) {
        Ok(score) => (StatusCode::CREATED, axum::Json(score)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn results_handler<R>(
    State(service): State<Arc<PasanggiriService<R>>>,
    Query(query): Query<ResultsQuery>,
) -> Response
where
    R: CompetitionRepository + 'static,
{
    let grouping = Grouping::new(query.category, query.division, query.class);
    match service.results(&grouping) {
        Ok(results) => (StatusCode::OK, axum::Json(results)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn ranking_handler<R>(
    State(service): State<Arc<PasanggiriService<R>>>,
) -> Response
where
    R: CompetitionRepository + 'static,
{
    match service.standings() {
        Ok(standings) => (StatusCode::OK, axum::Json(standings)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: ServiceError) -> Response {
    let status = match &err {
        ServiceError::InvalidRegistration(_) | ServiceError::Submission(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ServiceError::JudgeAlreadyScored { .. }
        | ServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": err.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
