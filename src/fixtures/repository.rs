use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::models::{Match, MatchResult, TeamSlot};
use crate::shared::AppError;
use crate::tournament::Stage;

/// Trait for match repository operations
///
/// Results are written by the results-entry side of the system; the scoring
/// engine only ever reads them.
#[async_trait]
pub trait MatchRepository {
    async fn get_match(&self, match_id: Uuid) -> Result<Option<Match>, AppError>;
    async fn list_matches(&self, tournament_id: Uuid) -> Result<Vec<Match>, AppError>;
    async fn get_result(&self, match_id: Uuid) -> Result<Option<MatchResult>, AppError>;
    async fn list_results(&self, tournament_id: Uuid) -> Result<Vec<MatchResult>, AppError>;
}

/// In-memory implementation of MatchRepository for development and testing
///
/// This provides a realistic implementation that can be used in development
/// without requiring a real database connection. Data is stored in memory
/// and will be lost when the application restarts.
pub struct InMemoryMatchRepository {
    matches: Mutex<HashMap<Uuid, Match>>,
    results: Mutex<HashMap<Uuid, MatchResult>>,
}

impl Default for InMemoryMatchRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMatchRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            matches: Mutex::new(HashMap::new()),
            results: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert_match(&self, m: Match) {
        self.matches.lock().unwrap().insert(m.id, m);
    }

    /// Records or corrects a result. Entering the same match twice replaces
    /// the previous result, which is how score corrections arrive.
    pub fn record_result(&self, result: MatchResult) {
        self.results.lock().unwrap().insert(result.match_id, result);
    }

    /// Returns the current number of matches in the repository
    pub fn match_count(&self) -> usize {
        self.matches.lock().unwrap().len()
    }
}

#[async_trait]
impl MatchRepository for InMemoryMatchRepository {
    #[instrument(skip(self))]
    async fn get_match(&self, match_id: Uuid) -> Result<Option<Match>, AppError> {
        debug!(%match_id, "Fetching match from memory");

        let matches = self.matches.lock().unwrap();
        Ok(matches.get(&match_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_matches(&self, tournament_id: Uuid) -> Result<Vec<Match>, AppError> {
        debug!(%tournament_id, "Listing matches from memory");

        let matches = self.matches.lock().unwrap();
        let mut result: Vec<Match> = matches
            .values()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.kickoff_at.cmp(&b.kickoff_at).then(a.id.cmp(&b.id)));
        Ok(result)
    }

    #[instrument(skip(self))]
    async fn get_result(&self, match_id: Uuid) -> Result<Option<MatchResult>, AppError> {
        debug!(%match_id, "Fetching result from memory");

        let results = self.results.lock().unwrap();
        Ok(results.get(&match_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_results(&self, tournament_id: Uuid) -> Result<Vec<MatchResult>, AppError> {
        debug!(%tournament_id, "Listing results from memory");

        let matches = self.matches.lock().unwrap();
        let results = self.results.lock().unwrap();
        Ok(results
            .values()
            .filter(|r| {
                matches
                    .get(&r.match_id)
                    .map(|m| m.tournament_id == tournament_id)
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }
}

/// PostgreSQL implementation of match repository
pub struct PostgresMatchRepository {
    pool: PgPool,
}

impl PostgresMatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn slot_from_row(row: &PgRow, team_col: &str, placeholder_col: &str) -> Result<TeamSlot, AppError> {
        if let Some(team_id) = row.get::<Option<Uuid>, _>(team_col) {
            return Ok(TeamSlot::Team(team_id));
        }
        match row.get::<Option<String>, _>(placeholder_col) {
            Some(placeholder) => Ok(TeamSlot::Placeholder(placeholder)),
            None => Err(AppError::DatabaseError(format!(
                "match side has neither {} nor {}",
                team_col, placeholder_col
            ))),
        }
    }

    fn match_from_row(row: &PgRow) -> Result<Match, AppError> {
        let stage: String = row.get("stage");
        let stage = Stage::try_from(stage.as_str())
            .map_err(|v| AppError::DatabaseError(format!("unknown stage: {}", v)))?;

        Ok(Match {
            id: row.get("id"),
            tournament_id: row.get("tournament_id"),
            stage,
            group_id: row.get("group_id"),
            home: Self::slot_from_row(row, "home_team_id", "home_placeholder")?,
            away: Self::slot_from_row(row, "away_team_id", "away_placeholder")?,
            kickoff_at: row.get("kickoff_at"),
            venue: row.get("venue"),
        })
    }

    fn result_from_row(row: &PgRow) -> MatchResult {
        MatchResult {
            match_id: row.get("match_id"),
            home_goals: row.get("home_goals"),
            away_goals: row.get("away_goals"),
            penalty_winner: row.get("penalty_winner"),
            is_draft: row.get("is_draft"),
        }
    }
}

#[async_trait]
impl MatchRepository for PostgresMatchRepository {
    #[instrument(skip(self))]
    async fn get_match(&self, match_id: Uuid) -> Result<Option<Match>, AppError> {
        debug!(%match_id, "Fetching match from database");

        let row = sqlx::query(
            "SELECT id, tournament_id, stage, group_id, home_team_id, home_placeholder, \
             away_team_id, away_placeholder, kickoff_at, venue \
             FROM matches WHERE id = $1",
        )
        .bind(match_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, %match_id, "Failed to fetch match from database");
            AppError::DatabaseError(e.to_string())
        })?;

        row.map(|row| Self::match_from_row(&row)).transpose()
    }

    #[instrument(skip(self))]
    async fn list_matches(&self, tournament_id: Uuid) -> Result<Vec<Match>, AppError> {
        debug!(%tournament_id, "Listing matches from database");

        let rows = sqlx::query(
            "SELECT id, tournament_id, stage, group_id, home_team_id, home_placeholder, \
             away_team_id, away_placeholder, kickoff_at, venue \
             FROM matches WHERE tournament_id = $1 ORDER BY kickoff_at, id",
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, %tournament_id, "Failed to list matches from database");
            AppError::DatabaseError(e.to_string())
        })?;

        rows.iter().map(Self::match_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn get_result(&self, match_id: Uuid) -> Result<Option<MatchResult>, AppError> {
        debug!(%match_id, "Fetching result from database");

        let row = sqlx::query(
            "SELECT match_id, home_goals, away_goals, penalty_winner, is_draft \
             FROM match_results WHERE match_id = $1",
        )
        .bind(match_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, %match_id, "Failed to fetch result from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|row| Self::result_from_row(&row)))
    }

    #[instrument(skip(self))]
    async fn list_results(&self, tournament_id: Uuid) -> Result<Vec<MatchResult>, AppError> {
        debug!(%tournament_id, "Listing results from database");

        let rows = sqlx::query(
            "SELECT r.match_id, r.home_goals, r.away_goals, r.penalty_winner, r.is_draft \
             FROM match_results r \
             JOIN matches m ON m.id = r.match_id \
             WHERE m.tournament_id = $1",
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, %tournament_id, "Failed to list results from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(rows.iter().map(Self::result_from_row).collect())
    }
}
