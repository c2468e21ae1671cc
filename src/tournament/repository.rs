use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::models::{
    Group, ScoringRules, Team, ThirdPlaceCombination, ThirdPlaceRule, TieBreak, Tournament,
    TournamentOutcomes,
};
use crate::shared::AppError;
use crate::tournament::models::AwardCategory;

/// Trait for tournament repository operations
#[async_trait]
pub trait TournamentRepository {
    async fn get_tournament(&self, tournament_id: Uuid) -> Result<Option<Tournament>, AppError>;
    async fn get_scoring_rules(&self, tournament_id: Uuid) -> Result<ScoringRules, AppError>;
    async fn list_groups(&self, tournament_id: Uuid) -> Result<Vec<Group>, AppError>;
    async fn list_teams(&self, tournament_id: Uuid) -> Result<Vec<Team>, AppError>;
    async fn get_third_place_rule(
        &self,
        tournament_id: Uuid,
    ) -> Result<Option<ThirdPlaceRule>, AppError>;
    async fn get_outcomes(&self, tournament_id: Uuid)
        -> Result<Option<TournamentOutcomes>, AppError>;
}

/// In-memory implementation of TournamentRepository for development and testing
///
/// This provides a realistic implementation that can be used in development
/// without requiring a real database connection. Data is stored in memory
/// and will be lost when the application restarts.
pub struct InMemoryTournamentRepository {
    tournaments: Mutex<HashMap<Uuid, (Tournament, ScoringRules)>>,
    groups: Mutex<HashMap<Uuid, Vec<Group>>>,
    teams: Mutex<HashMap<Uuid, Vec<Team>>>,
    third_place_rules: Mutex<HashMap<Uuid, ThirdPlaceRule>>,
    outcomes: Mutex<HashMap<Uuid, TournamentOutcomes>>,
}

impl Default for InMemoryTournamentRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTournamentRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            tournaments: Mutex::new(HashMap::new()),
            groups: Mutex::new(HashMap::new()),
            teams: Mutex::new(HashMap::new()),
            third_place_rules: Mutex::new(HashMap::new()),
            outcomes: Mutex::new(HashMap::new()),
        }
    }

    /// Seeds a tournament together with its scoring rules
    pub fn insert_tournament(&self, tournament: Tournament, rules: ScoringRules) {
        self.tournaments
            .lock()
            .unwrap()
            .insert(tournament.id, (tournament, rules));
    }

    pub fn insert_group(&self, group: Group) {
        self.groups
            .lock()
            .unwrap()
            .entry(group.tournament_id)
            .or_default()
            .push(group);
    }

    pub fn insert_team(&self, team: Team) {
        self.teams
            .lock()
            .unwrap()
            .entry(team.tournament_id)
            .or_default()
            .push(team);
    }

    pub fn set_third_place_rule(&self, rule: ThirdPlaceRule) {
        self.third_place_rules
            .lock()
            .unwrap()
            .insert(rule.tournament_id, rule);
    }

    pub fn set_outcomes(&self, outcomes: TournamentOutcomes) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(outcomes.tournament_id, outcomes);
    }

    /// Returns the current number of tournaments in the repository
    pub fn tournament_count(&self) -> usize {
        self.tournaments.lock().unwrap().len()
    }
}

#[async_trait]
impl TournamentRepository for InMemoryTournamentRepository {
    #[instrument(skip(self))]
    async fn get_tournament(&self, tournament_id: Uuid) -> Result<Option<Tournament>, AppError> {
        debug!(%tournament_id, "Fetching tournament from memory");

        let tournaments = self.tournaments.lock().unwrap();
        Ok(tournaments.get(&tournament_id).map(|(t, _)| t.clone()))
    }

    #[instrument(skip(self))]
    async fn get_scoring_rules(&self, tournament_id: Uuid) -> Result<ScoringRules, AppError> {
        debug!(%tournament_id, "Fetching scoring rules from memory");

        let tournaments = self.tournaments.lock().unwrap();
        match tournaments.get(&tournament_id) {
            Some((_, rules)) => Ok(rules.clone()),
            None => {
                warn!(%tournament_id, "Tournament not found for scoring rules in memory");
                Err(AppError::NotFound("Tournament not found".to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn list_groups(&self, tournament_id: Uuid) -> Result<Vec<Group>, AppError> {
        debug!(%tournament_id, "Listing groups from memory");

        let groups = self.groups.lock().unwrap();
        let mut result = groups.get(&tournament_id).cloned().unwrap_or_default();
        result.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(result)
    }

    #[instrument(skip(self))]
    async fn list_teams(&self, tournament_id: Uuid) -> Result<Vec<Team>, AppError> {
        debug!(%tournament_id, "Listing teams from memory");

        let teams = self.teams.lock().unwrap();
        let mut result = teams.get(&tournament_id).cloned().unwrap_or_default();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    #[instrument(skip(self))]
    async fn get_third_place_rule(
        &self,
        tournament_id: Uuid,
    ) -> Result<Option<ThirdPlaceRule>, AppError> {
        debug!(%tournament_id, "Fetching third-place rule from memory");

        let rules = self.third_place_rules.lock().unwrap();
        Ok(rules.get(&tournament_id).cloned())
    }

    #[instrument(skip(self))]
    async fn get_outcomes(
        &self,
        tournament_id: Uuid,
    ) -> Result<Option<TournamentOutcomes>, AppError> {
        debug!(%tournament_id, "Fetching tournament outcomes from memory");

        let outcomes = self.outcomes.lock().unwrap();
        Ok(outcomes.get(&tournament_id).cloned())
    }
}

/// PostgreSQL implementation of tournament repository
pub struct PostgresTournamentRepository {
    pool: PgPool,
}

impl PostgresTournamentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TournamentRepository for PostgresTournamentRepository {
    #[instrument(skip(self))]
    async fn get_tournament(&self, tournament_id: Uuid) -> Result<Option<Tournament>, AppError> {
        debug!(%tournament_id, "Fetching tournament from database");

        let row = sqlx::query("SELECT id, name, starts_at FROM tournaments WHERE id = $1")
            .bind(tournament_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, %tournament_id, "Failed to fetch tournament from database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(row.map(|row| Tournament {
            id: row.get("id"),
            name: row.get("name"),
            starts_at: row.get("starts_at"),
        }))
    }

    #[instrument(skip(self))]
    async fn get_scoring_rules(&self, tournament_id: Uuid) -> Result<ScoringRules, AppError> {
        debug!(%tournament_id, "Fetching scoring rules from database");

        let row = sqlx::query(
            "SELECT exact_score_points, correct_outcome_points, qualified_team_points, \
             exact_position_points, champion_points, runner_up_points, third_place_points, \
             individual_award_points, max_silver_games, max_golden_games, tie_break \
             FROM tournaments WHERE id = $1",
        )
        .bind(tournament_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, %tournament_id, "Failed to fetch scoring rules from database");
            AppError::DatabaseError(e.to_string())
        })?;

        let row = match row {
            Some(row) => row,
            None => {
                warn!(%tournament_id, "Tournament not found for scoring rules");
                return Err(AppError::NotFound("Tournament not found".to_string()));
            }
        };

        let tie_break = match row.get::<Option<String>, _>("tie_break") {
            Some(value) => Some(TieBreak::try_from(value.as_str()).map_err(|v| {
                warn!(%tournament_id, value = %v, "Unknown tie-break policy in database");
                AppError::DatabaseError(format!("unknown tie-break policy: {}", v))
            })?),
            None => None,
        };

        Ok(ScoringRules {
            exact_score_points: row.get("exact_score_points"),
            correct_outcome_points: row.get("correct_outcome_points"),
            qualified_team_points: row.get("qualified_team_points"),
            exact_position_points: row.get("exact_position_points"),
            champion_points: row.get("champion_points"),
            runner_up_points: row.get("runner_up_points"),
            third_place_points: row.get("third_place_points"),
            individual_award_points: row.get("individual_award_points"),
            max_silver_games: row.get("max_silver_games"),
            max_golden_games: row.get("max_golden_games"),
            tie_break,
        })
    }

    #[instrument(skip(self))]
    async fn list_groups(&self, tournament_id: Uuid) -> Result<Vec<Group>, AppError> {
        debug!(%tournament_id, "Listing groups from database");

        let rows = sqlx::query(
            "SELECT id, tournament_id, code FROM tournament_groups \
             WHERE tournament_id = $1 ORDER BY code",
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, %tournament_id, "Failed to list groups from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(rows
            .into_iter()
            .map(|row| Group {
                id: row.get("id"),
                tournament_id: row.get("tournament_id"),
                code: row.get("code"),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn list_teams(&self, tournament_id: Uuid) -> Result<Vec<Team>, AppError> {
        debug!(%tournament_id, "Listing teams from database");

        let rows = sqlx::query(
            "SELECT id, tournament_id, group_id, name FROM teams \
             WHERE tournament_id = $1 ORDER BY name",
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, %tournament_id, "Failed to list teams from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(rows
            .into_iter()
            .map(|row| Team {
                id: row.get("id"),
                tournament_id: row.get("tournament_id"),
                group_id: row.get("group_id"),
                name: row.get("name"),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn get_third_place_rule(
        &self,
        tournament_id: Uuid,
    ) -> Result<Option<ThirdPlaceRule>, AppError> {
        debug!(%tournament_id, "Fetching third-place rule from database");

        let row = sqlx::query(
            "SELECT tournament_id, advancing, combinations FROM third_place_rules \
             WHERE tournament_id = $1",
        )
        .bind(tournament_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, %tournament_id, "Failed to fetch third-place rule from database");
            AppError::DatabaseError(e.to_string())
        })?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let advancing: i32 = row.get("advancing");
        let combinations: Vec<ThirdPlaceCombination> =
            serde_json::from_str(row.get::<&str, _>("combinations")).map_err(|e| {
                warn!(error = %e, %tournament_id, "Malformed third-place combinations in database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(Some(ThirdPlaceRule {
            tournament_id: row.get("tournament_id"),
            advancing: advancing as usize,
            combinations,
        }))
    }

    #[instrument(skip(self))]
    async fn get_outcomes(
        &self,
        tournament_id: Uuid,
    ) -> Result<Option<TournamentOutcomes>, AppError> {
        debug!(%tournament_id, "Fetching tournament outcomes from database");

        let row = sqlx::query(
            "SELECT tournament_id, champion_id, runner_up_id, third_place_id, award_winners \
             FROM tournament_outcomes WHERE tournament_id = $1",
        )
        .bind(tournament_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, %tournament_id, "Failed to fetch tournament outcomes from database");
            AppError::DatabaseError(e.to_string())
        })?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let award_winners: HashMap<AwardCategory, String> =
            serde_json::from_str(row.get::<&str, _>("award_winners")).map_err(|e| {
                warn!(error = %e, %tournament_id, "Malformed award winners in database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(Some(TournamentOutcomes {
            tournament_id: row.get("tournament_id"),
            champion: row.get("champion_id"),
            runner_up: row.get("runner_up_id"),
            third_place: row.get("third_place_id"),
            award_winners,
        }))
    }
}
