use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The materialized score of one user in one tournament. The only derived
/// entity that is persisted; everything else is recomputed on demand.
///
/// `total_points` and the per-stage splits already include the boost bonus;
/// the `*_bonus` fields break out how much of the points came from boosts.
/// The `yesterday_*` fields hold the previous day's totals and are advanced
/// only by the daily roll, never by recalculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub user_id: Uuid,
    pub tournament_id: Uuid,
    pub total_points: i32,
    pub group_points: i32,
    pub playoff_points: i32,
    pub bonus_total: i32,
    pub group_bonus: i32,
    pub playoff_bonus: i32,
    pub exact_total: i32,
    pub group_exact: i32,
    pub playoff_exact: i32,
    pub correct_total: i32,
    pub group_correct: i32,
    pub playoff_correct: i32,
    pub yesterday_points: i32,
    pub yesterday_bonus: i32,
    pub updated_at: DateTime<Utc>,
}

impl ScoreRow {
    pub fn new(user_id: Uuid, tournament_id: Uuid) -> Self {
        Self {
            user_id,
            tournament_id,
            total_points: 0,
            group_points: 0,
            playoff_points: 0,
            bonus_total: 0,
            group_bonus: 0,
            playoff_bonus: 0,
            exact_total: 0,
            group_exact: 0,
            playoff_exact: 0,
            correct_total: 0,
            group_correct: 0,
            playoff_correct: 0,
            yesterday_points: 0,
            yesterday_bonus: 0,
            updated_at: Utc::now(),
        }
    }

    /// Equality over every scoring field, ignoring `updated_at`. The
    /// aggregator uses this to leave untouched rows alone, which is what
    /// makes recalculation idempotent.
    pub fn scores_equal(&self, other: &ScoreRow) -> bool {
        self.user_id == other.user_id
            && self.tournament_id == other.tournament_id
            && self.total_points == other.total_points
            && self.group_points == other.group_points
            && self.playoff_points == other.playoff_points
            && self.bonus_total == other.bonus_total
            && self.group_bonus == other.group_bonus
            && self.playoff_bonus == other.playoff_bonus
            && self.exact_total == other.exact_total
            && self.group_exact == other.group_exact
            && self.playoff_exact == other.playoff_exact
            && self.correct_total == other.correct_total
            && self.group_correct == other.group_correct
            && self.playoff_correct == other.playoff_correct
            && self.yesterday_points == other.yesterday_points
            && self.yesterday_bonus == other.yesterday_bonus
    }
}
