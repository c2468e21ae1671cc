use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;

use crate::fixtures::repository::MatchRepository;
use crate::leaderboard::repository::ScoreRowRepository;
use crate::predictions::guess_repository::GuessRepository;
use crate::predictions::prediction_repository::PredictionRepository;
use crate::tournament::repository::TournamentRepository;

/// Shared application state containing all storage dependencies
#[derive(Clone)]
pub struct AppState {
    pub tournament_repository: Arc<dyn TournamentRepository + Send + Sync>,
    pub match_repository: Arc<dyn MatchRepository + Send + Sync>,
    pub guess_repository: Arc<dyn GuessRepository + Send + Sync>,
    pub prediction_repository: Arc<dyn PredictionRepository + Send + Sync>,
    pub score_repository: Arc<dyn ScoreRowRepository + Send + Sync>,
}

impl AppState {
    pub fn new(
        tournament_repository: Arc<dyn TournamentRepository + Send + Sync>,
        match_repository: Arc<dyn MatchRepository + Send + Sync>,
        guess_repository: Arc<dyn GuessRepository + Send + Sync>,
        prediction_repository: Arc<dyn PredictionRepository + Send + Sync>,
        score_repository: Arc<dyn ScoreRowRepository + Send + Sync>,
    ) -> Self {
        Self {
            tournament_repository,
            match_repository,
            guess_repository,
            prediction_repository,
            score_repository,
        }
    }

    /// Wires every repository to an in-process map. Used for local runs
    /// without a database and by the test suites.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(crate::tournament::repository::InMemoryTournamentRepository::new()),
            Arc::new(crate::fixtures::repository::InMemoryMatchRepository::new()),
            Arc::new(crate::predictions::guess_repository::InMemoryGuessRepository::new()),
            Arc::new(crate::predictions::prediction_repository::InMemoryPredictionRepository::new()),
            Arc::new(crate::leaderboard::repository::InMemoryScoreRepository::new()),
        )
    }

    /// Wires every repository to the given Postgres pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self::new(
            Arc::new(crate::tournament::repository::PostgresTournamentRepository::new(
                pool.clone(),
            )),
            Arc::new(crate::fixtures::repository::PostgresMatchRepository::new(
                pool.clone(),
            )),
            Arc::new(crate::predictions::guess_repository::PostgresGuessRepository::new(
                pool.clone(),
            )),
            Arc::new(
                crate::predictions::prediction_repository::PostgresPredictionRepository::new(
                    pool.clone(),
                ),
            ),
            Arc::new(crate::leaderboard::repository::PostgresScoreRepository::new(pool)),
        )
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
