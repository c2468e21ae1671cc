use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::predictions::QualificationPrediction;
use crate::standings::{position_of, GroupStandingsRow};
use crate::tournament::ScoringRules;

/// Why a scored qualification prediction got the points it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoredReason {
    /// The team advanced from exactly the predicted slot.
    ExactMatch,
    /// The team advanced, but from a different slot.
    QualifiedWrongPosition,
    NotQualified,
}

impl ScoredReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoredReason::ExactMatch => "exact_match",
            ScoredReason::QualifiedWrongPosition => "qualified_wrong_position",
            ScoredReason::NotQualified => "not_qualified",
        }
    }
}

/// Lifecycle of one qualification prediction. A prediction stays pending
/// until enough of the tournament has been played to grade it, and pending
/// never means zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QualificationStatus {
    Pending,
    Scored {
        actual_position: i32,
        qualified: bool,
        points: i32,
        reason: ScoredReason,
    },
}

/// One graded (or still pending) team prediction within a group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamScoringResult {
    pub team_id: Uuid,
    pub group_id: Uuid,
    pub predicted_position: i32,
    pub predicted_to_qualify: bool,
    pub status: QualificationStatus,
}

impl TeamScoringResult {
    pub fn is_pending(&self) -> bool {
        matches!(self.status, QualificationStatus::Pending)
    }

    /// Points contributed to the leaderboard; pending contributes nothing.
    pub fn points(&self) -> i32 {
        match &self.status {
            QualificationStatus::Pending => 0,
            QualificationStatus::Scored { points, .. } => *points,
        }
    }

    pub fn actual_position(&self) -> Option<i32> {
        match &self.status {
            QualificationStatus::Pending => None,
            QualificationStatus::Scored {
                actual_position, ..
            } => Some(*actual_position),
        }
    }

    pub fn reason_code(&self) -> &'static str {
        match &self.status {
            QualificationStatus::Pending => "pending",
            QualificationStatus::Scored { reason, .. } => reason.as_str(),
        }
    }
}

/// Everything the qualification scorer needs to know about one group.
pub struct GroupQualificationInput<'a> {
    pub group_id: Uuid,
    /// Authoritative table of the group, in final order so far.
    pub standings: &'a [GroupStandingsRow],
    /// All of this group's matches have authoritative results.
    pub group_complete: bool,
    /// Every group of the tournament is complete.
    pub all_groups_complete: bool,
    /// The cross-group third-place qualifiers; only known once all groups
    /// are complete.
    pub third_place_qualifiers: Option<&'a HashSet<Uuid>>,
    pub rules: &'a ScoringRules,
}

/// Grades one user's qualification predictions for one group.
///
/// Predictions for positions 1 and 2 become scoreable when the group
/// completes; a third-place-and-through prediction only once every group is
/// complete, because the qualifying thirds are a cross-group comparison.
/// Predictions for deeper positions, or for a third place not marked as
/// qualifying, carry no points and are omitted. Teams the user skipped are
/// omitted as well, never defaulted.
pub fn score_group_qualification(
    input: &GroupQualificationInput<'_>,
    predictions: &[QualificationPrediction],
) -> Vec<TeamScoringResult> {
    let mut results = Vec::new();

    for prediction in predictions.iter().filter(|p| p.group_id == input.group_id) {
        let scoreable = match prediction.predicted_position {
            1 | 2 => true,
            3 => prediction.predicted_to_qualify,
            _ => false,
        };
        if !scoreable {
            continue;
        }

        let ready = match prediction.predicted_position {
            3 => input.all_groups_complete,
            _ => input.group_complete,
        };
        if !ready {
            results.push(TeamScoringResult {
                team_id: prediction.team_id,
                group_id: prediction.group_id,
                predicted_position: prediction.predicted_position,
                predicted_to_qualify: prediction.predicted_to_qualify,
                status: QualificationStatus::Pending,
            });
            continue;
        }

        let Some(actual_position) = position_of(input.standings, prediction.team_id) else {
            debug!(
                team_id = %prediction.team_id,
                group_id = %input.group_id,
                "Predicted team is not in the group table, skipping"
            );
            continue;
        };

        let qualified = actual_position <= 2
            || (actual_position == 3
                && input
                    .third_place_qualifiers
                    .map_or(false, |set| set.contains(&prediction.team_id)));

        let (points, reason) = if qualified && actual_position == prediction.predicted_position {
            (input.rules.exact_position_points, ScoredReason::ExactMatch)
        } else if qualified {
            (
                input.rules.qualified_team_points,
                ScoredReason::QualifiedWrongPosition,
            )
        } else {
            (0, ScoredReason::NotQualified)
        };

        results.push(TeamScoringResult {
            team_id: prediction.team_id,
            group_id: prediction.group_id,
            predicted_position: prediction.predicted_position,
            predicted_to_qualify: prediction.predicted_to_qualify,
            status: QualificationStatus::Scored {
                actual_position,
                qualified,
                points,
                reason,
            },
        });
    }

    results
}
