use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::models::{OutcomePrediction, QualificationPrediction};
use crate::shared::AppError;
use crate::tournament::AwardCategory;

/// Trait for qualification and outcome prediction repository operations
#[async_trait]
pub trait PredictionRepository {
    async fn list_qualification_predictions(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
    ) -> Result<Vec<QualificationPrediction>, AppError>;
    async fn upsert_qualification_prediction(
        &self,
        prediction: &QualificationPrediction,
    ) -> Result<(), AppError>;
    async fn get_outcome_prediction(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
    ) -> Result<Option<OutcomePrediction>, AppError>;
    async fn upsert_outcome_prediction(
        &self,
        prediction: &OutcomePrediction,
    ) -> Result<(), AppError>;
}

/// In-memory implementation of PredictionRepository for development and testing
///
/// This provides a realistic implementation that can be used in development
/// without requiring a real database connection. Data is stored in memory
/// and will be lost when the application restarts.
pub struct InMemoryPredictionRepository {
    qualification: Mutex<HashMap<(Uuid, Uuid, Uuid), QualificationPrediction>>,
    outcomes: Mutex<HashMap<(Uuid, Uuid), OutcomePrediction>>,
}

impl Default for InMemoryPredictionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPredictionRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            qualification: Mutex::new(HashMap::new()),
            outcomes: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the current number of qualification predictions
    pub fn qualification_count(&self) -> usize {
        self.qualification.lock().unwrap().len()
    }
}

#[async_trait]
impl PredictionRepository for InMemoryPredictionRepository {
    #[instrument(skip(self))]
    async fn list_qualification_predictions(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
    ) -> Result<Vec<QualificationPrediction>, AppError> {
        debug!(%user_id, %tournament_id, "Listing qualification predictions from memory");

        let qualification = self.qualification.lock().unwrap();
        let mut result: Vec<QualificationPrediction> = qualification
            .values()
            .filter(|p| p.user_id == user_id && p.tournament_id == tournament_id)
            .cloned()
            .collect();
        result.sort_by_key(|p| (p.group_id, p.predicted_position, p.team_id));
        Ok(result)
    }

    #[instrument(skip(self, prediction))]
    async fn upsert_qualification_prediction(
        &self,
        prediction: &QualificationPrediction,
    ) -> Result<(), AppError> {
        debug!(
            user_id = %prediction.user_id,
            team_id = %prediction.team_id,
            position = prediction.predicted_position,
            "Upserting qualification prediction in memory"
        );

        let mut qualification = self.qualification.lock().unwrap();
        qualification.insert(
            (prediction.user_id, prediction.group_id, prediction.team_id),
            prediction.clone(),
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_outcome_prediction(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
    ) -> Result<Option<OutcomePrediction>, AppError> {
        debug!(%user_id, %tournament_id, "Fetching outcome prediction from memory");

        let outcomes = self.outcomes.lock().unwrap();
        Ok(outcomes.get(&(user_id, tournament_id)).cloned())
    }

    #[instrument(skip(self, prediction))]
    async fn upsert_outcome_prediction(
        &self,
        prediction: &OutcomePrediction,
    ) -> Result<(), AppError> {
        debug!(user_id = %prediction.user_id, "Upserting outcome prediction in memory");

        let mut outcomes = self.outcomes.lock().unwrap();
        outcomes.insert(
            (prediction.user_id, prediction.tournament_id),
            prediction.clone(),
        );
        Ok(())
    }
}

/// PostgreSQL implementation of prediction repository
pub struct PostgresPredictionRepository {
    pool: PgPool,
}

impl PostgresPredictionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn outcome_from_row(row: &PgRow) -> Result<OutcomePrediction, AppError> {
        let award_picks: HashMap<AwardCategory, String> =
            serde_json::from_str(row.get::<&str, _>("award_picks")).map_err(|e| {
                warn!(error = %e, "Malformed award picks in database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(OutcomePrediction {
            user_id: row.get("user_id"),
            tournament_id: row.get("tournament_id"),
            champion: row.get("champion_id"),
            runner_up: row.get("runner_up_id"),
            third_place: row.get("third_place_id"),
            award_picks,
        })
    }
}

#[async_trait]
impl PredictionRepository for PostgresPredictionRepository {
    #[instrument(skip(self))]
    async fn list_qualification_predictions(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
    ) -> Result<Vec<QualificationPrediction>, AppError> {
        debug!(%user_id, %tournament_id, "Listing qualification predictions from database");

        let rows = sqlx::query(
            "SELECT user_id, tournament_id, group_id, team_id, predicted_position, \
             predicted_to_qualify \
             FROM qualification_predictions \
             WHERE user_id = $1 AND tournament_id = $2 \
             ORDER BY group_id, predicted_position, team_id",
        )
        .bind(user_id)
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, %user_id, %tournament_id, "Failed to list qualification predictions from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(rows
            .into_iter()
            .map(|row| QualificationPrediction {
                user_id: row.get("user_id"),
                tournament_id: row.get("tournament_id"),
                group_id: row.get("group_id"),
                team_id: row.get("team_id"),
                predicted_position: row.get("predicted_position"),
                predicted_to_qualify: row.get("predicted_to_qualify"),
            })
            .collect())
    }

    #[instrument(skip(self, prediction))]
    async fn upsert_qualification_prediction(
        &self,
        prediction: &QualificationPrediction,
    ) -> Result<(), AppError> {
        debug!(
            user_id = %prediction.user_id,
            team_id = %prediction.team_id,
            "Upserting qualification prediction in database"
        );

        sqlx::query(
            "INSERT INTO qualification_predictions (user_id, tournament_id, group_id, team_id, \
             predicted_position, predicted_to_qualify) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (user_id, group_id, team_id) DO UPDATE SET \
             predicted_position = EXCLUDED.predicted_position, \
             predicted_to_qualify = EXCLUDED.predicted_to_qualify",
        )
        .bind(prediction.user_id)
        .bind(prediction.tournament_id)
        .bind(prediction.group_id)
        .bind(prediction.team_id)
        .bind(prediction.predicted_position)
        .bind(prediction.predicted_to_qualify)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %prediction.user_id, "Failed to upsert qualification prediction in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_outcome_prediction(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
    ) -> Result<Option<OutcomePrediction>, AppError> {
        debug!(%user_id, %tournament_id, "Fetching outcome prediction from database");

        let row = sqlx::query(
            "SELECT user_id, tournament_id, champion_id, runner_up_id, third_place_id, \
             award_picks \
             FROM outcome_predictions WHERE user_id = $1 AND tournament_id = $2",
        )
        .bind(user_id)
        .bind(tournament_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, %user_id, %tournament_id, "Failed to fetch outcome prediction from database");
            AppError::DatabaseError(e.to_string())
        })?;

        row.map(|row| Self::outcome_from_row(&row)).transpose()
    }

    #[instrument(skip(self, prediction))]
    async fn upsert_outcome_prediction(
        &self,
        prediction: &OutcomePrediction,
    ) -> Result<(), AppError> {
        debug!(user_id = %prediction.user_id, "Upserting outcome prediction in database");

        let award_picks = serde_json::to_string(&prediction.award_picks).map_err(|e| {
            warn!(error = %e, "Failed to serialize award picks");
            AppError::DatabaseError(e.to_string())
        })?;

        sqlx::query(
            "INSERT INTO outcome_predictions (user_id, tournament_id, champion_id, runner_up_id, \
             third_place_id, award_picks) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (user_id, tournament_id) DO UPDATE SET \
             champion_id = EXCLUDED.champion_id, runner_up_id = EXCLUDED.runner_up_id, \
             third_place_id = EXCLUDED.third_place_id, award_picks = EXCLUDED.award_picks",
        )
        .bind(prediction.user_id)
        .bind(prediction.tournament_id)
        .bind(prediction.champion)
        .bind(prediction.runner_up)
        .bind(prediction.third_place)
        .bind(award_picks)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %prediction.user_id, "Failed to upsert outcome prediction in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }
}
