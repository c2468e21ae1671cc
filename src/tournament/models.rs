use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;
use uuid::Uuid;

/// A single prediction-pool tournament (one World Cup, one Euro, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub id: Uuid,
    pub name: String,
    pub starts_at: DateTime<Utc>,
}

/// Tournament stage a match belongs to. Group-stage matches feed the group
/// tables; playoff matches only feed per-match scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Group,
    Playoff,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Group => "group",
            Stage::Playoff => "playoff",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for Stage {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "group" => Ok(Stage::Group),
            "playoff" => Ok(Stage::Playoff),
            _ => Err(s.to_string()),
        }
    }
}

/// A group within the group stage. The single-letter `code` ("A", "B", ...)
/// is what third-place combination keys are built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub group_id: Uuid,
    pub name: String,
}

/// Individual award categories graded by the outcome scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum AwardCategory {
    BestPlayer,
    TopScorer,
    BestGoalkeeper,
    BestYoungPlayer,
}

impl AwardCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AwardCategory::BestPlayer => "best_player",
            AwardCategory::TopScorer => "top_scorer",
            AwardCategory::BestGoalkeeper => "best_goalkeeper",
            AwardCategory::BestYoungPlayer => "best_young_player",
        }
    }
}

impl fmt::Display for AwardCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tie-break policy for group tables. `Standard` keeps the stable input order
/// beyond (points, goal difference, goals for); `HeadToHead` reorders teams
/// that are tied on all three keys by their mutual results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    Standard,
    HeadToHead,
}

impl TryFrom<&str> for TieBreak {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "standard" => Ok(TieBreak::Standard),
            "head_to_head" => Ok(TieBreak::HeadToHead),
            _ => Err(s.to_string()),
        }
    }
}

impl TieBreak {
    pub fn as_str(&self) -> &'static str {
        match self {
            TieBreak::Standard => "standard",
            TieBreak::HeadToHead => "head_to_head",
        }
    }
}

/// Per-tournament point weights and boost caps. Read-only input to every
/// scorer; loaded once per tournament and passed by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRules {
    /// Both goal counts guessed exactly right.
    pub exact_score_points: i32,
    /// Right winner (or a draw) but not the exact goals.
    pub correct_outcome_points: i32,
    /// Team advanced from its group, but from the other slot than predicted.
    pub qualified_team_points: i32,
    /// Team advanced from exactly the predicted slot.
    pub exact_position_points: i32,
    pub champion_points: i32,
    pub runner_up_points: i32,
    pub third_place_points: i32,
    pub individual_award_points: i32,
    pub max_silver_games: i32,
    pub max_golden_games: i32,
    /// Absent means `Standard`; the sort must not depend on it being set.
    pub tie_break: Option<TieBreak>,
}

impl ScoringRules {
    /// How many guesses of the given boost type a user may hold at once.
    pub fn boost_cap(&self, boost: crate::predictions::BoostType) -> i32 {
        match boost {
            crate::predictions::BoostType::Silver => self.max_silver_games,
            crate::predictions::BoostType::Golden => self.max_golden_games,
        }
    }
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            exact_score_points: 4,
            correct_outcome_points: 2,
            qualified_team_points: 2,
            exact_position_points: 3,
            champion_points: 10,
            runner_up_points: 6,
            third_place_points: 4,
            individual_award_points: 5,
            max_silver_games: 5,
            max_golden_games: 2,
            tie_break: None,
        }
    }
}

/// Final ground truth for the honor roll and individual awards. Exists only
/// once the tournament has concluded; its absence is what makes the outcome
/// scorer report everything as pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentOutcomes {
    pub tournament_id: Uuid,
    pub champion: Uuid,
    pub runner_up: Uuid,
    pub third_place: Uuid,
    /// Award winner references as entered by the results collaborator.
    pub award_winners: HashMap<AwardCategory, String>,
}

/// One bracket slot fed by a third-placed team from a specific group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotAssignment {
    pub slot: String,
    pub group_code: String,
}

/// One row of the precomputed third-place table: if exactly the groups in
/// `key` send their third-placed teams through, `assignments` says which
/// bracket slot each of them fills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThirdPlaceCombination {
    /// Sorted concatenation of the qualifying groups' codes, e.g. "ABCD".
    pub key: String,
    pub assignments: Vec<SlotAssignment>,
}

/// Data-driven third-place qualification rule. Which combination applies is
/// decided by ranking the third-placed teams cross-group; the table itself is
/// an input, never hard-coded branching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThirdPlaceRule {
    pub tournament_id: Uuid,
    /// How many third-placed teams advance.
    pub advancing: usize,
    pub combinations: Vec<ThirdPlaceCombination>,
}

impl ThirdPlaceRule {
    /// Builds the lookup key for a set of qualifying group codes.
    pub fn combination_key<'a>(codes: impl IntoIterator<Item = &'a str>) -> String {
        let mut codes: Vec<&str> = codes.into_iter().collect();
        codes.sort_unstable();
        codes.concat()
    }

    pub fn combination(&self, key: &str) -> Option<&ThirdPlaceCombination> {
        self.combinations.iter().find(|c| c.key == key)
    }
}
