use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::boost::BoostLedger;
use super::guess_repository::GuessRepository;
use super::models::{BoostType, MatchGuess};
use crate::fixtures::repository::MatchRepository;
use crate::shared::AppError;
use crate::tournament::repository::TournamentRepository;

/// Incoming guess payload. Goal counts may arrive one at a time; such a
/// guess is stored but cannot score until both are present.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveGuessRequest {
    pub user_id: Uuid,
    pub match_id: Uuid,
    pub home_goals: Option<i32>,
    pub away_goals: Option<i32>,
    pub penalty_winner: Option<Uuid>,
    pub boost: Option<BoostType>,
}

/// Service for handling guess business logic
pub struct GuessService {
    guess_repository: Arc<dyn GuessRepository + Send + Sync>,
    match_repository: Arc<dyn MatchRepository + Send + Sync>,
    boost_ledger: BoostLedger,
}

impl GuessService {
    pub fn new(
        guess_repository: Arc<dyn GuessRepository + Send + Sync>,
        match_repository: Arc<dyn MatchRepository + Send + Sync>,
        tournament_repository: Arc<dyn TournamentRepository + Send + Sync>,
    ) -> Self {
        let boost_ledger = BoostLedger::new(guess_repository.clone(), tournament_repository);
        Self {
            guess_repository,
            match_repository,
            boost_ledger,
        }
    }

    pub fn boost_ledger(&self) -> &BoostLedger {
        &self.boost_ledger
    }

    /// Saves or updates one guess. Deadline enforcement is the caller's
    /// concern, but boost bookkeeping is not: a new or changed boost must
    /// pass the ledger, and once a result is visible for the match the
    /// stored boost is frozen.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, match_id = %request.match_id))]
    pub async fn save_guess(&self, request: SaveGuessRequest) -> Result<MatchGuess, AppError> {
        info!("Saving match guess");

        if request.user_id.is_nil() {
            return Err(AppError::BadRequest("user_id is required".to_string()));
        }

        let m = self
            .match_repository
            .get_match(request.match_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Match not found".to_string()))?;
        let existing = self
            .guess_repository
            .get_guess(request.user_id, request.match_id)
            .await?;
        let result = self.match_repository.get_result(request.match_id).await?;

        let stored_boost = existing.as_ref().and_then(|e| e.boost);
        let mut guess = existing.unwrap_or_else(|| {
            MatchGuess::new(request.user_id, request.match_id, m.tournament_id, m.stage)
        });
        guess.home_goals = request.home_goals;
        guess.away_goals = request.away_goals;
        guess.penalty_winner = request.penalty_winner;

        if result.is_some() {
            if request.boost != stored_boost {
                debug!(
                    stored = ?stored_boost,
                    requested = ?request.boost,
                    "Ignoring boost change after result entry"
                );
            }
            guess.boost = stored_boost;
        } else if request.boost != stored_boost {
            if let Some(boost) = request.boost {
                let allowed = self
                    .boost_ledger
                    .try_assign(request.user_id, m.tournament_id, boost)
                    .await?;
                if !allowed {
                    warn!(%boost, "Rejecting guess: boost cap reached");
                    return Err(AppError::Conflict(format!(
                        "No {} games left for this tournament",
                        boost
                    )));
                }
            }
            guess.boost = request.boost;
        }

        guess.updated_at = Utc::now();
        self.guess_repository.upsert_guess(&guess).await?;

        info!(boost = ?guess.boost, "Guess saved successfully");
        Ok(guess)
    }
}
