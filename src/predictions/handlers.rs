use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::boost::{BoostLedger, BoostUsage};
use super::models::MatchGuess;
use super::service::{GuessService, SaveGuessRequest};
use crate::shared::{AppError, AppState};

/// HTTP handler for saving a guess
///
/// POST /guesses
/// Upserts the caller's guess for one match; boost caps are enforced here.
#[instrument(name = "save_guess", skip(state, request))]
pub async fn save_guess(
    State(state): State<AppState>,
    Json(request): Json<SaveGuessRequest>,
) -> Result<Json<MatchGuess>, AppError> {
    info!(user_id = %request.user_id, match_id = %request.match_id, "Saving guess");

    let service = GuessService::new(
        Arc::clone(&state.guess_repository),
        Arc::clone(&state.match_repository),
        Arc::clone(&state.tournament_repository),
    );
    let guess = service.save_guess(request).await?;

    info!(user_id = %guess.user_id, match_id = %guess.match_id, "Guess saved");

    Ok(Json(guess))
}

/// HTTP handler for a user's boost budget
///
/// GET /tournaments/:tournament_id/users/:user_id/boosts
/// Returns used and remaining games per boost type.
#[instrument(name = "get_boost_usage", skip(state))]
pub async fn get_boost_usage(
    State(state): State<AppState>,
    Path((tournament_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<BoostUsage>, AppError> {
    info!(%tournament_id, %user_id, "Fetching boost usage");

    let ledger = BoostLedger::new(
        Arc::clone(&state.guess_repository),
        Arc::clone(&state.tournament_repository),
    );
    let usage = ledger.usage(user_id, tournament_id).await?;

    Ok(Json(usage))
}
