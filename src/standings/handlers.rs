use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use super::calculator::{all_scored, compute_standings};
use super::models::{GroupStandingsRow, ScoreSource};
use crate::fixtures::Match;
use crate::shared::{AppError, AppState};
use crate::tournament::Stage;

#[derive(Debug, Serialize)]
pub struct GroupStandingsResponse {
    pub group_id: Uuid,
    pub code: String,
    /// True once every match of the group has an authoritative result.
    pub complete: bool,
    pub standings: Vec<GroupStandingsRow>,
}

/// HTTP handler for the live table of one group
///
/// GET /tournaments/:tournament_id/groups/:group_id/standings
/// Draft results are included in the displayed table; the completeness flag
/// only counts authoritative ones.
#[instrument(name = "get_group_standings", skip(state))]
pub async fn get_group_standings(
    State(state): State<AppState>,
    Path((tournament_id, group_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<GroupStandingsResponse>, AppError> {
    info!(%tournament_id, %group_id, "Computing group standings");

    let groups = state.tournament_repository.list_groups(tournament_id).await?;
    let group = groups
        .into_iter()
        .find(|g| g.id == group_id)
        .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;

    let rules = state
        .tournament_repository
        .get_scoring_rules(tournament_id)
        .await?;
    let teams: Vec<Uuid> = state
        .tournament_repository
        .list_teams(tournament_id)
        .await?
        .into_iter()
        .filter(|t| t.group_id == group_id)
        .map(|t| t.id)
        .collect();

    let matches: Vec<Match> = state
        .match_repository
        .list_matches(tournament_id)
        .await?
        .into_iter()
        .filter(|m| m.stage == Stage::Group && m.group_id == Some(group_id))
        .collect();
    let results = state.match_repository.list_results(tournament_id).await?;

    let display_source = ScoreSource::from_results_with_drafts(&results);
    let authoritative = ScoreSource::from_results(&results);

    let standings = compute_standings(&teams, &matches, &display_source, rules.tie_break);
    let complete = all_scored(&matches, &authoritative);

    info!(%group_id, complete, rows = standings.len(), "Group standings computed");

    Ok(Json(GroupStandingsResponse {
        group_id,
        code: group.code,
        complete,
        standings,
    }))
}
