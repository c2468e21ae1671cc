use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tournament::Stage;

/// One side of a fixture. Playoff matches are created before their
/// participants are known, so a side is either a concrete team or a symbolic
/// slot such as "W49" or "3A" that the bracket resolves later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamSlot {
    Team(Uuid),
    Placeholder(String),
}

impl TeamSlot {
    /// The concrete team, if the slot has been resolved.
    pub fn team_id(&self) -> Option<Uuid> {
        match self {
            TeamSlot::Team(id) => Some(*id),
            TeamSlot::Placeholder(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub stage: Stage,
    /// Set for group-stage matches only.
    pub group_id: Option<Uuid>,
    pub home: TeamSlot,
    pub away: TeamSlot,
    pub kickoff_at: DateTime<Utc>,
    pub venue: String,
}

impl Match {
    /// True if this match was played between exactly the two given teams.
    /// Matches with unresolved slots never qualify.
    pub fn involves(&self, a: Uuid, b: Uuid) -> bool {
        match (self.home.team_id(), self.away.team_id()) {
            (Some(h), Some(w)) => (h == a && w == b) || (h == b && w == a),
            _ => false,
        }
    }
}

/// An entered result for a match. Draft results are visible to users but are
/// not authoritative: they never feed scoring or completeness checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_id: Uuid,
    pub home_goals: i32,
    pub away_goals: i32,
    /// Winner of the shootout for drawn knockout matches.
    pub penalty_winner: Option<Uuid>,
    pub is_draft: bool,
}
