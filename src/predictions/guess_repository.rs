use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::models::{BoostType, GuessOutcome, MatchGuess, RawMatchStats};
use crate::shared::AppError;
use crate::tournament::Stage;

/// Trait for match guess repository operations
#[async_trait]
pub trait GuessRepository {
    async fn get_guess(&self, user_id: Uuid, match_id: Uuid)
        -> Result<Option<MatchGuess>, AppError>;
    async fn list_guesses_for_user(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
    ) -> Result<Vec<MatchGuess>, AppError>;
    async fn list_guesses_for_match(&self, match_id: Uuid) -> Result<Vec<MatchGuess>, AppError>;
    async fn upsert_guess(&self, guess: &MatchGuess) -> Result<(), AppError>;
    /// Writes the derived scoring fields of one guess, leaving the user's
    /// input untouched.
    async fn record_score(
        &self,
        user_id: Uuid,
        match_id: Uuid,
        points: i32,
        bonus_points: i32,
        outcome: GuessOutcome,
    ) -> Result<(), AppError>;
    async fn count_boost_usage(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
        boost: BoostType,
    ) -> Result<i64, AppError>;
    /// Per-stage sums and counters over the user's guesses. Fields are
    /// `None` where the underlying SQL aggregate would be NULL.
    async fn match_stat_sums(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
    ) -> Result<RawMatchStats, AppError>;
    /// Every user who has at least one guess in the tournament.
    async fn list_users(&self, tournament_id: Uuid) -> Result<Vec<Uuid>, AppError>;
}

/// In-memory implementation of GuessRepository for development and testing
///
/// This provides a realistic implementation that can be used in development
/// without requiring a real database connection. Data is stored in memory
/// and will be lost when the application restarts.
pub struct InMemoryGuessRepository {
    guesses: Mutex<HashMap<(Uuid, Uuid), MatchGuess>>,
}

impl Default for InMemoryGuessRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGuessRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            guesses: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an in-memory repository with pre-populated guesses
    pub fn with_guesses(guesses: Vec<MatchGuess>) -> Self {
        let mut map = HashMap::new();
        for guess in guesses {
            map.insert((guess.user_id, guess.match_id), guess);
        }

        Self {
            guesses: Mutex::new(map),
        }
    }

    /// Returns the current number of guesses in the repository
    pub fn guess_count(&self) -> usize {
        self.guesses.lock().unwrap().len()
    }
}

#[async_trait]
impl GuessRepository for InMemoryGuessRepository {
    #[instrument(skip(self))]
    async fn get_guess(
        &self,
        user_id: Uuid,
        match_id: Uuid,
    ) -> Result<Option<MatchGuess>, AppError> {
        debug!(%user_id, %match_id, "Fetching guess from memory");

        let guesses = self.guesses.lock().unwrap();
        Ok(guesses.get(&(user_id, match_id)).cloned())
    }

    #[instrument(skip(self))]
    async fn list_guesses_for_user(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
    ) -> Result<Vec<MatchGuess>, AppError> {
        debug!(%user_id, %tournament_id, "Listing user guesses from memory");

        let guesses = self.guesses.lock().unwrap();
        let mut result: Vec<MatchGuess> = guesses
            .values()
            .filter(|g| g.user_id == user_id && g.tournament_id == tournament_id)
            .cloned()
            .collect();
        result.sort_by_key(|g| g.match_id);
        Ok(result)
    }

    #[instrument(skip(self))]
    async fn list_guesses_for_match(&self, match_id: Uuid) -> Result<Vec<MatchGuess>, AppError> {
        debug!(%match_id, "Listing match guesses from memory");

        let guesses = self.guesses.lock().unwrap();
        let mut result: Vec<MatchGuess> = guesses
            .values()
            .filter(|g| g.match_id == match_id)
            .cloned()
            .collect();
        result.sort_by_key(|g| g.user_id);
        Ok(result)
    }

    #[instrument(skip(self, guess))]
    async fn upsert_guess(&self, guess: &MatchGuess) -> Result<(), AppError> {
        debug!(user_id = %guess.user_id, match_id = %guess.match_id, "Upserting guess in memory");

        let mut guesses = self.guesses.lock().unwrap();
        guesses.insert((guess.user_id, guess.match_id), guess.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn record_score(
        &self,
        user_id: Uuid,
        match_id: Uuid,
        points: i32,
        bonus_points: i32,
        outcome: GuessOutcome,
    ) -> Result<(), AppError> {
        debug!(%user_id, %match_id, points, "Recording guess score in memory");

        let mut guesses = self.guesses.lock().unwrap();
        match guesses.get_mut(&(user_id, match_id)) {
            Some(guess) => {
                guess.points = points;
                guess.bonus_points = bonus_points;
                guess.outcome = outcome;
                Ok(())
            }
            None => {
                warn!(%user_id, %match_id, "Guess not found for score recording in memory");
                Err(AppError::NotFound("Guess not found".to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn count_boost_usage(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
        boost: BoostType,
    ) -> Result<i64, AppError> {
        debug!(%user_id, %tournament_id, %boost, "Counting boost usage in memory");

        let guesses = self.guesses.lock().unwrap();
        let count = guesses
            .values()
            .filter(|g| {
                g.user_id == user_id && g.tournament_id == tournament_id && g.boost == Some(boost)
            })
            .count();
        Ok(count as i64)
    }

    #[instrument(skip(self))]
    async fn match_stat_sums(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
    ) -> Result<RawMatchStats, AppError> {
        debug!(%user_id, %tournament_id, "Summing guess stats in memory");

        let guesses = self.guesses.lock().unwrap();
        // Sums stay None until the first row of their stage, counters start
        // at zero, matching what the SQL aggregates produce.
        let mut stats = RawMatchStats {
            group_exact: Some(0),
            playoff_exact: Some(0),
            group_correct: Some(0),
            playoff_correct: Some(0),
            ..RawMatchStats::default()
        };

        for guess in guesses
            .values()
            .filter(|g| g.user_id == user_id && g.tournament_id == tournament_id)
        {
            let (points, bonus, exact, correct) = match guess.stage {
                Stage::Group => (
                    &mut stats.group_points,
                    &mut stats.group_bonus,
                    &mut stats.group_exact,
                    &mut stats.group_correct,
                ),
                Stage::Playoff => (
                    &mut stats.playoff_points,
                    &mut stats.playoff_bonus,
                    &mut stats.playoff_exact,
                    &mut stats.playoff_correct,
                ),
            };

            *points = Some(points.unwrap_or(0) + i64::from(guess.points));
            *bonus = Some(bonus.unwrap_or(0) + i64::from(guess.bonus_points));
            if guess.outcome == GuessOutcome::Exact {
                *exact = Some(exact.unwrap_or(0) + 1);
            }
            if guess.outcome == GuessOutcome::Correct {
                *correct = Some(correct.unwrap_or(0) + 1);
            }
        }

        Ok(stats)
    }

    #[instrument(skip(self))]
    async fn list_users(&self, tournament_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        debug!(%tournament_id, "Listing participating users from memory");

        let guesses = self.guesses.lock().unwrap();
        let mut users: Vec<Uuid> = guesses
            .values()
            .filter(|g| g.tournament_id == tournament_id)
            .map(|g| g.user_id)
            .collect();
        users.sort_unstable();
        users.dedup();
        Ok(users)
    }
}

/// PostgreSQL implementation of guess repository
pub struct PostgresGuessRepository {
    pool: PgPool,
}

impl PostgresGuessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn guess_from_row(row: &PgRow) -> Result<MatchGuess, AppError> {
        let stage: String = row.get("stage");
        let stage = Stage::try_from(stage.as_str())
            .map_err(|v| AppError::DatabaseError(format!("unknown stage: {}", v)))?;

        let boost = match row.get::<Option<String>, _>("boost") {
            Some(value) => Some(
                BoostType::try_from(value.as_str())
                    .map_err(|v| AppError::DatabaseError(format!("unknown boost: {}", v)))?,
            ),
            None => None,
        };

        let outcome: String = row.get("outcome");
        let outcome = GuessOutcome::try_from(outcome.as_str())
            .map_err(|v| AppError::DatabaseError(format!("unknown outcome: {}", v)))?;

        Ok(MatchGuess {
            user_id: row.get("user_id"),
            match_id: row.get("match_id"),
            tournament_id: row.get("tournament_id"),
            stage,
            home_goals: row.get("home_goals"),
            away_goals: row.get("away_goals"),
            penalty_winner: row.get("penalty_winner"),
            boost,
            points: row.get("points"),
            bonus_points: row.get("bonus_points"),
            outcome,
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl GuessRepository for PostgresGuessRepository {
    #[instrument(skip(self))]
    async fn get_guess(
        &self,
        user_id: Uuid,
        match_id: Uuid,
    ) -> Result<Option<MatchGuess>, AppError> {
        debug!(%user_id, %match_id, "Fetching guess from database");

        let row = sqlx::query(
            "SELECT user_id, match_id, tournament_id, stage, home_goals, away_goals, \
             penalty_winner, boost, points, bonus_points, outcome, updated_at \
             FROM match_guesses WHERE user_id = $1 AND match_id = $2",
        )
        .bind(user_id)
        .bind(match_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, %user_id, %match_id, "Failed to fetch guess from database");
            AppError::DatabaseError(e.to_string())
        })?;

        row.map(|row| Self::guess_from_row(&row)).transpose()
    }

    #[instrument(skip(self))]
    async fn list_guesses_for_user(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
    ) -> Result<Vec<MatchGuess>, AppError> {
        debug!(%user_id, %tournament_id, "Listing user guesses from database");

        let rows = sqlx::query(
            "SELECT user_id, match_id, tournament_id, stage, home_goals, away_goals, \
             penalty_winner, boost, points, bonus_points, outcome, updated_at \
             FROM match_guesses WHERE user_id = $1 AND tournament_id = $2 \
             ORDER BY match_id",
        )
        .bind(user_id)
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, %user_id, %tournament_id, "Failed to list user guesses from database");
            AppError::DatabaseError(e.to_string())
        })?;

        rows.iter().map(Self::guess_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn list_guesses_for_match(&self, match_id: Uuid) -> Result<Vec<MatchGuess>, AppError> {
        debug!(%match_id, "Listing match guesses from database");

        let rows = sqlx::query(
            "SELECT user_id, match_id, tournament_id, stage, home_goals, away_goals, \
             penalty_winner, boost, points, bonus_points, outcome, updated_at \
             FROM match_guesses WHERE match_id = $1 ORDER BY user_id",
        )
        .bind(match_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, %match_id, "Failed to list match guesses from database");
            AppError::DatabaseError(e.to_string())
        })?;

        rows.iter().map(Self::guess_from_row).collect()
    }

    #[instrument(skip(self, guess))]
    async fn upsert_guess(&self, guess: &MatchGuess) -> Result<(), AppError> {
        debug!(user_id = %guess.user_id, match_id = %guess.match_id, "Upserting guess in database");

        sqlx::query(
            "INSERT INTO match_guesses (user_id, match_id, tournament_id, stage, home_goals, \
             away_goals, penalty_winner, boost, points, bonus_points, outcome, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (user_id, match_id) DO UPDATE SET \
             home_goals = EXCLUDED.home_goals, away_goals = EXCLUDED.away_goals, \
             penalty_winner = EXCLUDED.penalty_winner, boost = EXCLUDED.boost, \
             points = EXCLUDED.points, bonus_points = EXCLUDED.bonus_points, \
             outcome = EXCLUDED.outcome, updated_at = EXCLUDED.updated_at",
        )
        .bind(guess.user_id)
        .bind(guess.match_id)
        .bind(guess.tournament_id)
        .bind(guess.stage.as_str())
        .bind(guess.home_goals)
        .bind(guess.away_goals)
        .bind(guess.penalty_winner)
        .bind(guess.boost.map(|b| b.as_str()))
        .bind(guess.points)
        .bind(guess.bonus_points)
        .bind(guess.outcome.as_str())
        .bind(guess.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %guess.user_id, match_id = %guess.match_id, "Failed to upsert guess in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn record_score(
        &self,
        user_id: Uuid,
        match_id: Uuid,
        points: i32,
        bonus_points: i32,
        outcome: GuessOutcome,
    ) -> Result<(), AppError> {
        debug!(%user_id, %match_id, points, "Recording guess score in database");

        let result = sqlx::query(
            "UPDATE match_guesses SET points = $3, bonus_points = $4, outcome = $5 \
             WHERE user_id = $1 AND match_id = $2",
        )
        .bind(user_id)
        .bind(match_id)
        .bind(points)
        .bind(bonus_points)
        .bind(outcome.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, %user_id, %match_id, "Failed to record guess score in database");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            warn!(%user_id, %match_id, "Guess not found for score recording");
            return Err(AppError::NotFound("Guess not found".to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn count_boost_usage(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
        boost: BoostType,
    ) -> Result<i64, AppError> {
        debug!(%user_id, %tournament_id, %boost, "Counting boost usage in database");

        let row = sqlx::query(
            "SELECT COUNT(*) AS used FROM match_guesses \
             WHERE user_id = $1 AND tournament_id = $2 AND boost = $3",
        )
        .bind(user_id)
        .bind(tournament_id)
        .bind(boost.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, %user_id, %tournament_id, "Failed to count boost usage in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.get("used"))
    }

    #[instrument(skip(self))]
    async fn match_stat_sums(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
    ) -> Result<RawMatchStats, AppError> {
        debug!(%user_id, %tournament_id, "Summing guess stats in database");

        let row = sqlx::query(
            "SELECT \
             SUM(points) FILTER (WHERE stage = 'group') AS group_points, \
             SUM(points) FILTER (WHERE stage = 'playoff') AS playoff_points, \
             SUM(bonus_points) FILTER (WHERE stage = 'group') AS group_bonus, \
             SUM(bonus_points) FILTER (WHERE stage = 'playoff') AS playoff_bonus, \
             COUNT(*) FILTER (WHERE stage = 'group' AND outcome = 'exact') AS group_exact, \
             COUNT(*) FILTER (WHERE stage = 'playoff' AND outcome = 'exact') AS playoff_exact, \
             COUNT(*) FILTER (WHERE stage = 'group' AND outcome = 'correct') AS group_correct, \
             COUNT(*) FILTER (WHERE stage = 'playoff' AND outcome = 'correct') AS playoff_correct \
             FROM match_guesses WHERE user_id = $1 AND tournament_id = $2",
        )
        .bind(user_id)
        .bind(tournament_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, %user_id, %tournament_id, "Failed to sum guess stats in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(RawMatchStats {
            group_points: row.get("group_points"),
            playoff_points: row.get("playoff_points"),
            group_bonus: row.get("group_bonus"),
            playoff_bonus: row.get("playoff_bonus"),
            group_exact: row.get("group_exact"),
            playoff_exact: row.get("playoff_exact"),
            group_correct: row.get("group_correct"),
            playoff_correct: row.get("playoff_correct"),
        })
    }

    #[instrument(skip(self))]
    async fn list_users(&self, tournament_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        debug!(%tournament_id, "Listing participating users from database");

        let rows = sqlx::query(
            "SELECT DISTINCT user_id FROM match_guesses WHERE tournament_id = $1 \
             ORDER BY user_id",
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, %tournament_id, "Failed to list participating users from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().map(|row| row.get("user_id")).collect())
    }
}
