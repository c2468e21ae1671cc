use std::collections::HashSet;

use tracing::{debug, instrument};
use uuid::Uuid;

use super::qualification::{
    score_group_qualification, GroupQualificationInput, TeamScoringResult,
};
use super::third_place::{select_best_thirds, ThirdPlaceCandidate, ThirdPlaceSelection};
use crate::fixtures::{Match, MatchRepository};
use crate::predictions::QualificationPrediction;
use crate::shared::AppError;
use crate::standings::{all_scored, compute_standings, GroupStandingsRow, ScoreSource};
use crate::tournament::{Group, ScoringRules, TournamentOutcomes, TournamentRepository};

/// One group's authoritative state within a snapshot.
#[derive(Debug, Clone)]
pub struct GroupSnapshot {
    pub group: Group,
    pub team_ids: Vec<Uuid>,
    pub standings: Vec<GroupStandingsRow>,
    pub complete: bool,
}

/// A consistent read of everything scoring needs about one tournament:
/// rules, authoritative group tables, the cross-group third-place selection
/// and the recorded final outcomes.
///
/// A snapshot is loaded once per scoring run and then consulted for every
/// user, so all users in the run are graded against the same state.
#[derive(Debug, Clone)]
pub struct TournamentSnapshot {
    pub tournament_id: Uuid,
    pub rules: ScoringRules,
    pub groups: Vec<GroupSnapshot>,
    pub all_groups_complete: bool,
    /// Present only once every group is complete and the tournament has a
    /// third-place rule.
    pub third_place: Option<ThirdPlaceSelection>,
    pub outcomes: Option<TournamentOutcomes>,
}

impl TournamentSnapshot {
    #[instrument(skip(tournament_repository, match_repository))]
    pub async fn load(
        tournament_id: Uuid,
        tournament_repository: &(dyn TournamentRepository + Send + Sync),
        match_repository: &(dyn MatchRepository + Send + Sync),
    ) -> Result<Self, AppError> {
        let rules = tournament_repository
            .get_scoring_rules(tournament_id)
            .await?;
        let groups = tournament_repository.list_groups(tournament_id).await?;
        let teams = tournament_repository.list_teams(tournament_id).await?;
        let matches = match_repository.list_matches(tournament_id).await?;
        let results = match_repository.list_results(tournament_id).await?;

        // Draft results are provisional and never count here.
        let source = ScoreSource::from_results(&results);

        let mut group_snapshots = Vec::with_capacity(groups.len());
        for group in groups {
            let team_ids: Vec<Uuid> = teams
                .iter()
                .filter(|t| t.group_id == group.id)
                .map(|t| t.id)
                .collect();
            let group_matches: Vec<Match> = matches
                .iter()
                .filter(|m| m.group_id == Some(group.id))
                .cloned()
                .collect();

            let standings = compute_standings(&team_ids, &group_matches, &source, rules.tie_break);
            let complete = all_scored(&group_matches, &source);
            group_snapshots.push(GroupSnapshot {
                group,
                team_ids,
                standings,
                complete,
            });
        }

        let all_groups_complete =
            !group_snapshots.is_empty() && group_snapshots.iter().all(|g| g.complete);

        let third_place = if all_groups_complete {
            match tournament_repository
                .get_third_place_rule(tournament_id)
                .await?
            {
                Some(rule) => {
                    let candidates: Vec<ThirdPlaceCandidate> = group_snapshots
                        .iter()
                        .filter_map(|g| {
                            g.standings.get(2).map(|row| ThirdPlaceCandidate {
                                group_code: g.group.code.clone(),
                                row: row.clone(),
                            })
                        })
                        .collect();
                    Some(select_best_thirds(candidates, &rule))
                }
                None => None,
            }
        } else {
            None
        };

        let outcomes = tournament_repository.get_outcomes(tournament_id).await?;

        debug!(
            groups = group_snapshots.len(),
            all_groups_complete,
            has_third_place = third_place.is_some(),
            has_outcomes = outcomes.is_some(),
            "Loaded tournament snapshot"
        );

        Ok(Self {
            tournament_id,
            rules,
            groups: group_snapshots,
            all_groups_complete,
            third_place,
            outcomes,
        })
    }

    pub fn third_place_qualifier_set(&self) -> Option<HashSet<Uuid>> {
        self.third_place
            .as_ref()
            .map(|s| s.qualifiers.iter().copied().collect())
    }

    /// Grades a user's qualification predictions across every group of the
    /// snapshot.
    pub fn score_qualification(
        &self,
        predictions: &[QualificationPrediction],
    ) -> Vec<TeamScoringResult> {
        let thirds = self.third_place_qualifier_set();
        let mut results = Vec::new();
        for group in &self.groups {
            let input = GroupQualificationInput {
                group_id: group.group.id,
                standings: &group.standings,
                group_complete: group.complete,
                all_groups_complete: self.all_groups_complete,
                third_place_qualifiers: thirds.as_ref(),
                rules: &self.rules,
            };
            results.extend(score_group_qualification(&input, predictions));
        }
        results
    }
}
