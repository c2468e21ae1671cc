use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::models::ScoreRow;
use crate::shared::AppError;

/// Trait for materialized score row repository operations
#[async_trait]
pub trait ScoreRowRepository {
    async fn find(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
    ) -> Result<Option<ScoreRow>, AppError>;
    /// Inserts the row unless one already exists for (user, tournament).
    /// Returns false when another writer got there first; that is not an
    /// error, the caller falls back to updating.
    async fn insert_if_absent(&self, row: &ScoreRow) -> Result<bool, AppError>;
    async fn update(&self, row: &ScoreRow) -> Result<(), AppError>;
    /// Every row of a tournament, best total first.
    async fn rows_for_tournament(&self, tournament_id: Uuid) -> Result<Vec<ScoreRow>, AppError>;
    /// Copies each row's current total and bonus into the yesterday fields.
    /// Returns how many rows were touched.
    async fn roll_yesterday(&self, tournament_id: Uuid) -> Result<u64, AppError>;
}

/// In-memory implementation of ScoreRowRepository for development and testing
///
/// This provides a realistic implementation that can be used in development
/// without requiring a real database connection. Data is stored in memory
/// and will be lost when the application restarts.
pub struct InMemoryScoreRepository {
    rows: Mutex<HashMap<(Uuid, Uuid), ScoreRow>>,
}

impl Default for InMemoryScoreRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryScoreRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the number of stored rows (useful for testing)
    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl ScoreRowRepository for InMemoryScoreRepository {
    async fn find(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
    ) -> Result<Option<ScoreRow>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.get(&(user_id, tournament_id)).cloned())
    }

    async fn insert_if_absent(&self, row: &ScoreRow) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let key = (row.user_id, row.tournament_id);
        if rows.contains_key(&key) {
            debug!(user_id = %row.user_id, "Score row already exists, insert skipped");
            return Ok(false);
        }
        rows.insert(key, row.clone());
        Ok(true)
    }

    async fn update(&self, row: &ScoreRow) -> Result<(), AppError> {
        let mut rows = self.rows.lock().unwrap();
        let key = (row.user_id, row.tournament_id);
        match rows.get_mut(&key) {
            Some(stored) => {
                *stored = row.clone();
                Ok(())
            }
            None => Err(AppError::NotFound("Score row not found".to_string())),
        }
    }

    async fn rows_for_tournament(&self, tournament_id: Uuid) -> Result<Vec<ScoreRow>, AppError> {
        let rows = self.rows.lock().unwrap();
        let mut result: Vec<ScoreRow> = rows
            .values()
            .filter(|r| r.tournament_id == tournament_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| {
            b.total_points
                .cmp(&a.total_points)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        Ok(result)
    }

    async fn roll_yesterday(&self, tournament_id: Uuid) -> Result<u64, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let mut touched = 0u64;
        for row in rows
            .values_mut()
            .filter(|r| r.tournament_id == tournament_id)
        {
            row.yesterday_points = row.total_points;
            row.yesterday_bonus = row.bonus_total;
            touched += 1;
        }
        Ok(touched)
    }
}

/// PostgreSQL implementation of score row repository
pub struct PostgresScoreRepository {
    pool: PgPool,
}

impl PostgresScoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn score_row_from_row(row: &PgRow) -> ScoreRow {
        ScoreRow {
            user_id: row.get("user_id"),
            tournament_id: row.get("tournament_id"),
            total_points: row.get("total_points"),
            group_points: row.get("group_points"),
            playoff_points: row.get("playoff_points"),
            bonus_total: row.get("bonus_total"),
            group_bonus: row.get("group_bonus"),
            playoff_bonus: row.get("playoff_bonus"),
            exact_total: row.get("exact_total"),
            group_exact: row.get("group_exact"),
            playoff_exact: row.get("playoff_exact"),
            correct_total: row.get("correct_total"),
            group_correct: row.get("group_correct"),
            playoff_correct: row.get("playoff_correct"),
            yesterday_points: row.get("yesterday_points"),
            yesterday_bonus: row.get("yesterday_bonus"),
            updated_at: row.get("updated_at"),
        }
    }
}

#[async_trait]
impl ScoreRowRepository for PostgresScoreRepository {
    #[instrument(skip(self))]
    async fn find(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
    ) -> Result<Option<ScoreRow>, AppError> {
        debug!(%user_id, %tournament_id, "Fetching score row from database");

        let row = sqlx::query(
            "SELECT user_id, tournament_id, total_points, group_points, playoff_points, \
             bonus_total, group_bonus, playoff_bonus, exact_total, group_exact, playoff_exact, \
             correct_total, group_correct, playoff_correct, yesterday_points, yesterday_bonus, \
             updated_at FROM tournament_scores WHERE user_id = $1 AND tournament_id = $2",
        )
        .bind(user_id)
        .bind(tournament_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, %user_id, %tournament_id, "Failed to fetch score row from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|row| Self::score_row_from_row(&row)))
    }

    #[instrument(skip(self, row), fields(user_id = %row.user_id, tournament_id = %row.tournament_id))]
    async fn insert_if_absent(&self, row: &ScoreRow) -> Result<bool, AppError> {
        debug!("Inserting score row into database");

        let result = sqlx::query(
            "INSERT INTO tournament_scores \
             (user_id, tournament_id, total_points, group_points, playoff_points, bonus_total, \
              group_bonus, playoff_bonus, exact_total, group_exact, playoff_exact, correct_total, \
              group_correct, playoff_correct, yesterday_points, yesterday_bonus, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
             ON CONFLICT (user_id, tournament_id) DO NOTHING",
        )
        .bind(row.user_id)
        .bind(row.tournament_id)
        .bind(row.total_points)
        .bind(row.group_points)
        .bind(row.playoff_points)
        .bind(row.bonus_total)
        .bind(row.group_bonus)
        .bind(row.playoff_bonus)
        .bind(row.exact_total)
        .bind(row.group_exact)
        .bind(row.playoff_exact)
        .bind(row.correct_total)
        .bind(row.group_correct)
        .bind(row.playoff_correct)
        .bind(row.yesterday_points)
        .bind(row.yesterday_bonus)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to insert score row into database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self, row), fields(user_id = %row.user_id, tournament_id = %row.tournament_id))]
    async fn update(&self, row: &ScoreRow) -> Result<(), AppError> {
        debug!("Updating score row in database");

        let result = sqlx::query(
            "UPDATE tournament_scores SET total_points = $3, group_points = $4, \
             playoff_points = $5, bonus_total = $6, group_bonus = $7, playoff_bonus = $8, \
             exact_total = $9, group_exact = $10, playoff_exact = $11, correct_total = $12, \
             group_correct = $13, playoff_correct = $14, yesterday_points = $15, \
             yesterday_bonus = $16, updated_at = $17 \
             WHERE user_id = $1 AND tournament_id = $2",
        )
        .bind(row.user_id)
        .bind(row.tournament_id)
        .bind(row.total_points)
        .bind(row.group_points)
        .bind(row.playoff_points)
        .bind(row.bonus_total)
        .bind(row.group_bonus)
        .bind(row.playoff_bonus)
        .bind(row.exact_total)
        .bind(row.group_exact)
        .bind(row.playoff_exact)
        .bind(row.correct_total)
        .bind(row.group_correct)
        .bind(row.playoff_correct)
        .bind(row.yesterday_points)
        .bind(row.yesterday_bonus)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to update score row in database");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Score row not found".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn rows_for_tournament(&self, tournament_id: Uuid) -> Result<Vec<ScoreRow>, AppError> {
        debug!(%tournament_id, "Listing score rows from database");

        let rows = sqlx::query(
            "SELECT user_id, tournament_id, total_points, group_points, playoff_points, \
             bonus_total, group_bonus, playoff_bonus, exact_total, group_exact, playoff_exact, \
             correct_total, group_correct, playoff_correct, yesterday_points, yesterday_bonus, \
             updated_at FROM tournament_scores WHERE tournament_id = $1 \
             ORDER BY total_points DESC, user_id",
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, %tournament_id, "Failed to list score rows from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(rows.iter().map(Self::score_row_from_row).collect())
    }

    #[instrument(skip(self))]
    async fn roll_yesterday(&self, tournament_id: Uuid) -> Result<u64, AppError> {
        debug!(%tournament_id, "Rolling yesterday snapshots in database");

        let result = sqlx::query(
            "UPDATE tournament_scores SET yesterday_points = total_points, \
             yesterday_bonus = bonus_total WHERE tournament_id = $1",
        )
        .bind(tournament_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, %tournament_id, "Failed to roll yesterday snapshots in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(result.rows_affected())
    }
}
