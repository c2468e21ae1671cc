use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use super::aggregator::ScoreAggregator;
use super::models::ScoreRow;
use crate::scoring::{TeamScoringResult, TournamentSnapshot};
use crate::shared::{AppError, AppState};

#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub rank: i32,
    pub user_id: Uuid,
    pub total_points: i32,
    pub group_points: i32,
    pub playoff_points: i32,
    pub bonus_total: i32,
    pub exact_total: i32,
    pub correct_total: i32,
    /// Places gained since the last daily roll; negative means dropped.
    pub rank_delta: i32,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub tournament_id: Uuid,
    pub entries: Vec<LeaderboardEntry>,
}

/// HTTP handler for the tournament leaderboard
///
/// GET /tournaments/:tournament_id/leaderboard
/// Ranks the materialized rows by total points; the delta compares against
/// the rank each user held at the yesterday snapshot.
#[instrument(name = "get_leaderboard", skip(state))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Path(tournament_id): Path<Uuid>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    info!(%tournament_id, "Building leaderboard");

    state
        .tournament_repository
        .get_tournament(tournament_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tournament not found".to_string()))?;

    let rows = state
        .score_repository
        .rows_for_tournament(tournament_id)
        .await?;

    let mut yesterday: Vec<(Uuid, i32)> =
        rows.iter().map(|r| (r.user_id, r.yesterday_points)).collect();
    yesterday.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let yesterday_ranks: HashMap<Uuid, i32> = yesterday
        .iter()
        .enumerate()
        .map(|(i, (user_id, _))| (*user_id, i as i32 + 1))
        .collect();

    let entries = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let rank = i as i32 + 1;
            LeaderboardEntry {
                rank,
                user_id: row.user_id,
                total_points: row.total_points,
                group_points: row.group_points,
                playoff_points: row.playoff_points,
                bonus_total: row.bonus_total,
                exact_total: row.exact_total,
                correct_total: row.correct_total,
                rank_delta: yesterday_ranks.get(&row.user_id).map_or(0, |y| y - rank),
            }
        })
        .collect();

    info!(%tournament_id, users = rows.len(), "Leaderboard built");

    Ok(Json(LeaderboardResponse {
        tournament_id,
        entries,
    }))
}

#[derive(Debug, Serialize)]
pub struct QualificationDetailResponse {
    pub tournament_id: Uuid,
    pub user_id: Uuid,
    pub all_groups_complete: bool,
    /// Sum over the scored rows; pending rows contribute nothing yet.
    pub points: i32,
    pub results: Vec<TeamScoringResult>,
}

/// HTTP handler for one user's qualification scoring detail
///
/// GET /tournaments/:tournament_id/users/:user_id/qualification
/// Shows every graded prediction with its state, pending ones included, so
/// clients can render "waiting on group X" rows.
#[instrument(name = "get_user_qualification", skip(state))]
pub async fn get_user_qualification(
    State(state): State<AppState>,
    Path((tournament_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<QualificationDetailResponse>, AppError> {
    info!(%tournament_id, %user_id, "Grading qualification predictions");

    let snapshot = TournamentSnapshot::load(
        tournament_id,
        state.tournament_repository.as_ref(),
        state.match_repository.as_ref(),
    )
    .await?;
    let predictions = state
        .prediction_repository
        .list_qualification_predictions(user_id, tournament_id)
        .await?;

    let results = snapshot.score_qualification(&predictions);
    let points = results.iter().map(|r| r.points()).sum();

    Ok(Json(QualificationDetailResponse {
        tournament_id,
        user_id,
        all_groups_complete: snapshot.all_groups_complete,
        points,
        results,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RecalculateRequest {
    /// Users to rebuild; omitted means everyone who guessed in the
    /// tournament.
    pub user_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Serialize)]
pub struct RecalculateResponse {
    pub tournament_id: Uuid,
    pub rows: Vec<ScoreRow>,
}

/// HTTP handler for triggering score materialization
///
/// POST /tournaments/:tournament_id/recalculate
/// Invoked after result entry or on a schedule by external callers.
#[instrument(name = "trigger_recalculation", skip(state, request))]
pub async fn trigger_recalculation(
    State(state): State<AppState>,
    Path(tournament_id): Path<Uuid>,
    Json(request): Json<RecalculateRequest>,
) -> Result<Json<RecalculateResponse>, AppError> {
    info!(%tournament_id, "Recalculation requested");

    let user_ids = match request.user_ids {
        Some(ids) => ids,
        None => state.guess_repository.list_users(tournament_id).await?,
    };

    let aggregator = ScoreAggregator::new(
        Arc::clone(&state.guess_repository),
        Arc::clone(&state.prediction_repository),
        Arc::clone(&state.score_repository),
        Arc::clone(&state.tournament_repository),
        Arc::clone(&state.match_repository),
    );
    let rows = aggregator.recalculate(&user_ids, tournament_id).await?;

    info!(%tournament_id, materialized = rows.len(), "Recalculation finished");

    Ok(Json(RecalculateResponse {
        tournament_id,
        rows,
    }))
}

#[derive(Debug, Serialize)]
pub struct RollYesterdayResponse {
    pub tournament_id: Uuid,
    pub updated: u64,
}

/// HTTP handler for the daily snapshot roll
///
/// POST /tournaments/:tournament_id/leaderboard/roll
/// Copies current totals into the yesterday fields; the external scheduler
/// calls this once per day.
#[instrument(name = "roll_yesterday_snapshots", skip(state))]
pub async fn roll_yesterday_snapshots(
    State(state): State<AppState>,
    Path(tournament_id): Path<Uuid>,
) -> Result<Json<RollYesterdayResponse>, AppError> {
    info!(%tournament_id, "Rolling yesterday snapshots");

    let updated = state.score_repository.roll_yesterday(tournament_id).await?;

    Ok(Json(RollYesterdayResponse {
        tournament_id,
        updated,
    }))
}
