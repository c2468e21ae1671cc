use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::standings::GroupStandingsRow;
use crate::tournament::{SlotAssignment, ThirdPlaceRule};

/// A third-placed team, tagged with the code of the group it came from.
#[derive(Debug, Clone)]
pub struct ThirdPlaceCandidate {
    pub group_code: String,
    pub row: GroupStandingsRow,
}

/// Outcome of the cross-group third-place comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThirdPlaceSelection {
    /// Teams advancing as best thirds, best first.
    pub qualifiers: Vec<Uuid>,
    /// Sorted group codes of the qualifiers, e.g. "ABDF".
    pub combination_key: String,
    /// Bracket slots per qualifying group, from the rule table. Empty when
    /// the key has no row in the table.
    pub slot_assignments: Vec<SlotAssignment>,
}

impl ThirdPlaceSelection {
    pub fn contains(&self, team_id: Uuid) -> bool {
        self.qualifiers.contains(&team_id)
    }
}

/// Ranks the third-placed teams of all groups against each other and picks
/// the best `rule.advancing` of them.
///
/// Candidates compare on the same key as a group table (points, goal
/// difference, goals for); a full tie falls back to group code order so the
/// selection is deterministic.
pub fn select_best_thirds(
    mut candidates: Vec<ThirdPlaceCandidate>,
    rule: &ThirdPlaceRule,
) -> ThirdPlaceSelection {
    candidates.sort_by(|a, b| {
        b.row
            .ranking_key()
            .cmp(&a.row.ranking_key())
            .then_with(|| a.group_code.cmp(&b.group_code))
    });

    let advancing: Vec<&ThirdPlaceCandidate> = candidates.iter().take(rule.advancing).collect();
    let qualifiers = advancing.iter().map(|c| c.row.team_id).collect();
    let combination_key =
        ThirdPlaceRule::combination_key(advancing.iter().map(|c| c.group_code.as_str()));

    let slot_assignments = match rule.combination(&combination_key) {
        Some(combination) => combination.assignments.clone(),
        None => {
            warn!(
                key = %combination_key,
                "No third-place combination on file for this qualifier set"
            );
            Vec::new()
        }
    };

    ThirdPlaceSelection {
        qualifiers,
        combination_key,
        slot_assignments,
    }
}
