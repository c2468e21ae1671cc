use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::models::ScoreRow;
use super::repository::ScoreRowRepository;
use crate::fixtures::repository::MatchRepository;
use crate::predictions::guess_repository::GuessRepository;
use crate::predictions::prediction_repository::PredictionRepository;
use crate::scoring::{score_outcome, TournamentSnapshot};
use crate::shared::AppError;
use crate::tournament::repository::TournamentRepository;

/// Service for handling score materialization business logic
pub struct ScoreAggregator {
    guess_repository: Arc<dyn GuessRepository + Send + Sync>,
    prediction_repository: Arc<dyn PredictionRepository + Send + Sync>,
    score_repository: Arc<dyn ScoreRowRepository + Send + Sync>,
    tournament_repository: Arc<dyn TournamentRepository + Send + Sync>,
    match_repository: Arc<dyn MatchRepository + Send + Sync>,
}

impl ScoreAggregator {
    pub fn new(
        guess_repository: Arc<dyn GuessRepository + Send + Sync>,
        prediction_repository: Arc<dyn PredictionRepository + Send + Sync>,
        score_repository: Arc<dyn ScoreRowRepository + Send + Sync>,
        tournament_repository: Arc<dyn TournamentRepository + Send + Sync>,
        match_repository: Arc<dyn MatchRepository + Send + Sync>,
    ) -> Self {
        Self {
            guess_repository,
            prediction_repository,
            score_repository,
            tournament_repository,
            match_repository,
        }
    }

    /// Rebuilds the materialized score row of every given user from the
    /// current raw data and upserts it. Returns the rows in input order;
    /// users whose persistence failed are logged and left out, the rest of
    /// the batch continues.
    ///
    /// This is a full re-projection, not a delta: running it again with
    /// unchanged inputs stores byte-identical rows and writes nothing.
    #[instrument(skip(self, user_ids), fields(users = user_ids.len()))]
    pub async fn recalculate(
        &self,
        user_ids: &[Uuid],
        tournament_id: Uuid,
    ) -> Result<Vec<ScoreRow>, AppError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        info!("Recalculating materialized scores");

        // One snapshot for the whole batch, so every user is graded against
        // the same tournament state.
        let snapshot = TournamentSnapshot::load(
            tournament_id,
            self.tournament_repository.as_ref(),
            self.match_repository.as_ref(),
        )
        .await?;

        let mut rows = Vec::with_capacity(user_ids.len());
        for &user_id in user_ids {
            match self.recalculate_user(user_id, &snapshot).await {
                Ok(row) => rows.push(row),
                Err(e) => {
                    warn!(%user_id, error = %e, "Skipping user after materialization failure");
                }
            }
        }

        debug!(materialized = rows.len(), "Finished recalculation");
        Ok(rows)
    }

    async fn recalculate_user(
        &self,
        user_id: Uuid,
        snapshot: &TournamentSnapshot,
    ) -> Result<ScoreRow, AppError> {
        let tournament_id = snapshot.tournament_id;

        let stats = self
            .guess_repository
            .match_stat_sums(user_id, tournament_id)
            .await?
            .coalesce();

        let qualification_predictions = self
            .prediction_repository
            .list_qualification_predictions(user_id, tournament_id)
            .await?;
        let qualification_points: i32 = snapshot
            .score_qualification(&qualification_predictions)
            .iter()
            .map(|r| r.points())
            .sum();

        let outcome_points = match self
            .prediction_repository
            .get_outcome_prediction(user_id, tournament_id)
            .await?
        {
            Some(prediction) => {
                score_outcome(&prediction, snapshot.outcomes.as_ref(), &snapshot.rules).total()
            }
            None => 0,
        };

        let existing = self.score_repository.find(user_id, tournament_id).await?;

        let mut row = ScoreRow::new(user_id, tournament_id);
        // Match points already include the boost bonus; qualification lands
        // in the group bucket, outcome points in the playoff bucket.
        row.group_points = stats.group_points + qualification_points;
        row.playoff_points = stats.playoff_points + outcome_points;
        row.total_points = row.group_points + row.playoff_points;
        row.group_bonus = stats.group_bonus;
        row.playoff_bonus = stats.playoff_bonus;
        row.bonus_total = stats.group_bonus + stats.playoff_bonus;
        row.group_exact = stats.group_exact;
        row.playoff_exact = stats.playoff_exact;
        row.exact_total = stats.group_exact + stats.playoff_exact;
        row.group_correct = stats.group_correct;
        row.playoff_correct = stats.playoff_correct;
        row.correct_total = stats.group_correct + stats.playoff_correct;
        if let Some(previous) = &existing {
            row.yesterday_points = previous.yesterday_points;
            row.yesterday_bonus = previous.yesterday_bonus;
        }

        match existing {
            Some(previous) => {
                if previous.scores_equal(&row) {
                    // Nothing moved; keep the stored row, timestamp included.
                    return Ok(previous);
                }
                row.updated_at = Utc::now();
                self.score_repository.update(&row).await?;
            }
            None => {
                row.updated_at = Utc::now();
                if !self.score_repository.insert_if_absent(&row).await? {
                    // Lost an insert race; the row exists now, write over it.
                    debug!(%user_id, "Insert race detected, falling back to update");
                    self.score_repository.update(&row).await?;
                }
            }
        }

        Ok(row)
    }
}
