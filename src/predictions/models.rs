use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;
use uuid::Uuid;

use crate::tournament::{AwardCategory, Stage};

/// Score multipliers a user can attach to a limited number of guesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum BoostType {
    Silver,
    Golden,
}

impl BoostType {
    pub fn multiplier(&self) -> i32 {
        match self {
            BoostType::Silver => 2,
            BoostType::Golden => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BoostType::Silver => "silver",
            BoostType::Golden => "golden",
        }
    }
}

impl fmt::Display for BoostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for BoostType {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "silver" => Ok(BoostType::Silver),
            "golden" => Ok(BoostType::Golden),
            _ => Err(s.to_string()),
        }
    }
}

/// How a guess fared against its match result. Stored alongside the derived
/// points so leaderboard counters are a plain aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuessOutcome {
    /// No authoritative result yet, or the guess was incomplete.
    Unscored,
    /// Both goal counts exactly right.
    Exact,
    /// Right winner or a correctly called draw, wrong goals.
    Correct,
    Wrong,
}

impl GuessOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuessOutcome::Unscored => "unscored",
            GuessOutcome::Exact => "exact",
            GuessOutcome::Correct => "correct",
            GuessOutcome::Wrong => "wrong",
        }
    }
}

impl TryFrom<&str> for GuessOutcome {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "unscored" => Ok(GuessOutcome::Unscored),
            "exact" => Ok(GuessOutcome::Exact),
            "correct" => Ok(GuessOutcome::Correct),
            "wrong" => Ok(GuessOutcome::Wrong),
            _ => Err(s.to_string()),
        }
    }
}

/// One user's guess for one match, plus the points derived from it once a
/// result exists. Tournament and stage are denormalized onto the row by the
/// guess service so score aggregation never needs a join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchGuess {
    pub user_id: Uuid,
    pub match_id: Uuid,
    pub tournament_id: Uuid,
    pub stage: Stage,
    /// A user can save one goal count and come back later; such a guess is
    /// simply not scoreable yet.
    pub home_goals: Option<i32>,
    pub away_goals: Option<i32>,
    /// Shootout pick for knockout matches.
    pub penalty_winner: Option<Uuid>,
    pub boost: Option<BoostType>,
    /// Total points for this guess, boost included. Zero until scored.
    pub points: i32,
    /// The boost's share of `points`.
    pub bonus_points: i32,
    pub outcome: GuessOutcome,
    pub updated_at: DateTime<Utc>,
}

impl MatchGuess {
    pub fn new(user_id: Uuid, match_id: Uuid, tournament_id: Uuid, stage: Stage) -> Self {
        Self {
            user_id,
            match_id,
            tournament_id,
            stage,
            home_goals: None,
            away_goals: None,
            penalty_winner: None,
            boost: None,
            points: 0,
            bonus_points: 0,
            outcome: GuessOutcome::Unscored,
            updated_at: Utc::now(),
        }
    }

    /// The guessed score, if both sides were filled in.
    pub fn predicted_score(&self) -> Option<(i32, i32)> {
        match (self.home_goals, self.away_goals) {
            (Some(home), Some(away)) => Some((home, away)),
            _ => None,
        }
    }
}

/// A user's predicted finishing slot for one team of one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationPrediction {
    pub user_id: Uuid,
    pub tournament_id: Uuid,
    pub group_id: Uuid,
    pub team_id: Uuid,
    /// 1-based position within the group.
    pub predicted_position: i32,
    /// For third place this marks "and goes through"; positions 1 and 2
    /// imply it.
    pub predicted_to_qualify: bool,
}

/// A user's honor-roll and award picks for the whole tournament.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomePrediction {
    pub user_id: Uuid,
    pub tournament_id: Uuid,
    pub champion: Option<Uuid>,
    pub runner_up: Option<Uuid>,
    pub third_place: Option<Uuid>,
    pub award_picks: HashMap<AwardCategory, String>,
}

impl OutcomePrediction {
    pub fn new(user_id: Uuid, tournament_id: Uuid) -> Self {
        Self {
            user_id,
            tournament_id,
            champion: None,
            runner_up: None,
            third_place: None,
            award_picks: HashMap::new(),
        }
    }
}

/// Per-stage sums over one user's scored guesses, straight out of storage.
/// SQL aggregates return NULL over an empty set, hence every field is an
/// `Option` that the aggregator coalesces to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMatchStats {
    pub group_points: Option<i64>,
    pub playoff_points: Option<i64>,
    pub group_bonus: Option<i64>,
    pub playoff_bonus: Option<i64>,
    pub group_exact: Option<i64>,
    pub playoff_exact: Option<i64>,
    pub group_correct: Option<i64>,
    pub playoff_correct: Option<i64>,
}

impl RawMatchStats {
    /// Missing aggregates mean "no guesses in that stage", which for scoring
    /// purposes is exactly zero.
    pub fn coalesce(&self) -> MatchStatTotals {
        MatchStatTotals {
            group_points: self.group_points.unwrap_or(0) as i32,
            playoff_points: self.playoff_points.unwrap_or(0) as i32,
            group_bonus: self.group_bonus.unwrap_or(0) as i32,
            playoff_bonus: self.playoff_bonus.unwrap_or(0) as i32,
            group_exact: self.group_exact.unwrap_or(0) as i32,
            playoff_exact: self.playoff_exact.unwrap_or(0) as i32,
            group_correct: self.group_correct.unwrap_or(0) as i32,
            playoff_correct: self.playoff_correct.unwrap_or(0) as i32,
        }
    }
}

/// The coalesced form of [`RawMatchStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStatTotals {
    pub group_points: i32,
    pub playoff_points: i32,
    pub group_bonus: i32,
    pub playoff_bonus: i32,
    pub group_exact: i32,
    pub playoff_exact: i32,
    pub group_correct: i32,
    pub playoff_correct: i32,
}
