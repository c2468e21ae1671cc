use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::match_points::score_match;
use crate::fixtures::repository::MatchRepository;
use crate::predictions::guess_repository::GuessRepository;
use crate::shared::AppError;
use crate::tournament::repository::TournamentRepository;

/// Service for handling match scoring business logic
pub struct ScoringService {
    guess_repository: Arc<dyn GuessRepository + Send + Sync>,
    match_repository: Arc<dyn MatchRepository + Send + Sync>,
    tournament_repository: Arc<dyn TournamentRepository + Send + Sync>,
}

impl ScoringService {
    pub fn new(
        guess_repository: Arc<dyn GuessRepository + Send + Sync>,
        match_repository: Arc<dyn MatchRepository + Send + Sync>,
        tournament_repository: Arc<dyn TournamentRepository + Send + Sync>,
    ) -> Self {
        Self {
            guess_repository,
            match_repository,
            tournament_repository,
        }
    }

    /// Re-grades every guess on one match against its current result and
    /// persists the derived fields. Returns how many rows actually changed.
    ///
    /// Safe to run any number of times: guesses whose stored points already
    /// match the freshly computed score are left alone. Works for result
    /// corrections too, including a result being withdrawn into a draft, in
    /// which case earlier points are zeroed back out.
    #[instrument(skip(self))]
    pub async fn score_match_guesses(&self, match_id: Uuid) -> Result<u64, AppError> {
        info!("Scoring guesses for match");

        let m = self
            .match_repository
            .get_match(match_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Match not found".to_string()))?;
        let result = self.match_repository.get_result(match_id).await?;
        let rules = self
            .tournament_repository
            .get_scoring_rules(m.tournament_id)
            .await?;
        let guesses = self.guess_repository.list_guesses_for_match(match_id).await?;

        let mut updated = 0u64;
        for guess in &guesses {
            let score = score_match(guess, result.as_ref(), &rules);
            if guess.points == score.total()
                && guess.bonus_points == score.bonus
                && guess.outcome == score.outcome
            {
                continue;
            }

            // One bad row must not block the rest of the match.
            if let Err(e) = self
                .guess_repository
                .record_score(
                    guess.user_id,
                    guess.match_id,
                    score.total(),
                    score.bonus,
                    score.outcome,
                )
                .await
            {
                warn!(
                    user_id = %guess.user_id,
                    error = %e,
                    "Failed to persist score for guess, continuing"
                );
                continue;
            }
            updated += 1;
        }

        debug!(
            guesses = guesses.len(),
            updated, "Finished scoring match guesses"
        );
        Ok(updated)
    }
}
