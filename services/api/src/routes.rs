use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::Utc;
use pasanggiri::competition::{
    competition_router, deserialize_criteria_scores, CompetitionId, CompetitionRepository,
    CompetitionResult, Grouping, GroupingResults, PasanggiriService, RankingEngine, Score,
    ScoreSheetImporter,
};
use pasanggiri::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;
use tracing::debug;

/// One judge's sheet in a preview request.
#[derive(Debug, Deserialize)]
pub(crate) struct PreviewSheet {
    pub(crate) judge_name: String,
    #[serde(default, deserialize_with = "deserialize_criteria_scores")]
    pub(crate) criteria_scores: BTreeMap<String, f64>,
    /// Defaults to the sum of `criteria_scores`.
    #[serde(default)]
    pub(crate) total_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PreviewEntry {
    pub(crate) entity_name: String,
    #[serde(default)]
    pub(crate) scores: Vec<PreviewSheet>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScoringPreviewRequest {
    pub(crate) grouping: Grouping,
    #[serde(default)]
    pub(crate) results: Vec<PreviewEntry>,
    /// Score sheet CSV; rows outside `grouping` are ignored.
    #[serde(default)]
    pub(crate) score_sheet_csv: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoringPreviewResponse {
    pub(crate) data_source: PreviewDataSource,
    pub(crate) tie_break: Vec<String>,
    pub(crate) ranking: GroupingResults,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum PreviewDataSource {
    Json,
    ScoreSheet,
}

pub(crate) fn with_competition_routes<R>(service: Arc<PasanggiriService<R>>) -> axum::Router
where
    R: CompetitionRepository + 'static,
{
    competition_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/scoring/preview",
            axum::routing::post(scoring_preview_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Rank caller-supplied scores for one grouping without storing anything.
pub(crate) async fn scoring_preview_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ScoringPreviewRequest>,
) -> Result<Json<ScoringPreviewResponse>, AppError> {
    let ScoringPreviewRequest {
        grouping,
        results,
        score_sheet_csv,
    } = payload;

    // Scores are pooled per entity, as the stored results are.
    let mut by_entity: BTreeMap<String, Vec<Score>> = BTreeMap::new();
    for entry in results {
        let scores = preview_scores(&entry.entity_name, entry.scores, &grouping);
        by_entity
            .entry(entry.entity_name)
            .or_default()
            .extend(scores);
    }

    let data_source = if let Some(csv) = score_sheet_csv {
        let sheet = ScoreSheetImporter::from_reader(Cursor::new(csv.into_bytes()))?;
        for result in sheet
            .results_by_grouping()
            .into_iter()
            .filter(|(sheet_grouping, _)| sheet_grouping == &grouping)
            .flat_map(|(_, results)| results)
        {
            by_entity
                .entry(result.entity_name)
                .or_default()
                .extend(result.scores);
        }
        PreviewDataSource::ScoreSheet
    } else {
        PreviewDataSource::Json
    };

    let entries: Vec<CompetitionResult> = by_entity
        .into_iter()
        .map(|(entity_name, scores)| CompetitionResult::from_scores(entity_name, scores))
        .collect();

    let engine = RankingEngine::new(state.rulebook.clone());
    let tie_break = state
        .rulebook
        .tie_break_priority(&grouping.category)
        .to_vec();

    Ok(Json(ScoringPreviewResponse {
        data_source,
        tie_break,
        ranking: GroupingResults::rank(grouping, entries, &engine),
    }))
}

fn preview_scores(entity_name: &str, sheets: Vec<PreviewSheet>, grouping: &Grouping) -> Vec<Score> {
    let competition_id = CompetitionId(format!("preview-{entity_name}"));
    let created_at = Utc::now();
    debug!(
        entity = entity_name,
        grouping = %grouping.label(),
        sheets = sheets.len(),
        "preview entry scored"
    );
    sheets
        .into_iter()
        .map(|sheet| Score {
            competition_id: competition_id.clone(),
            judge_name: sheet.judge_name,
            total_score: sheet.total_score.unwrap_or_else(|| {
                sheet
                    .criteria_scores
                    .values()
                    .fold(0.0, |acc, value| acc + value)
            }),
            criteria_scores: sheet.criteria_scores,
            created_at,
        })
        .collect()
}
