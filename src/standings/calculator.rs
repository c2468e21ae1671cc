use std::collections::HashMap;

use uuid::Uuid;

use super::models::{GroupStandingsRow, ScoreSource};
use crate::fixtures::Match;
use crate::tournament::TieBreak;

/// Computes a group table from played matches.
///
/// Every team in `team_ids` gets a row, so a group with no results yet still
/// produces a full (all-zero) table. Matches absent from `source` are simply
/// not played yet; a 0:0 in the source counts like any other score. The sort
/// is stable: teams tied on points, goal difference and goals scored keep
/// their input order unless the tournament opted into head-to-head breaking.
pub fn compute_standings(
    team_ids: &[Uuid],
    matches: &[Match],
    source: &ScoreSource,
    tie_break: Option<TieBreak>,
) -> Vec<GroupStandingsRow> {
    let mut rows: Vec<GroupStandingsRow> =
        team_ids.iter().map(|&id| GroupStandingsRow::new(id)).collect();
    let index: HashMap<Uuid, usize> = team_ids
        .iter()
        .enumerate()
        .map(|(i, &id)| (id, i))
        .collect();

    for m in matches {
        let Some((home_goals, away_goals)) = source.score(m.id) else {
            continue;
        };
        // Matches with unresolved sides or outside this team set contribute
        // nothing.
        let (Some(home), Some(away)) = (m.home.team_id(), m.away.team_id()) else {
            continue;
        };
        let (Some(&home_idx), Some(&away_idx)) = (index.get(&home), index.get(&away)) else {
            continue;
        };

        rows[home_idx].record_match(home_goals, away_goals);
        rows[away_idx].record_match(away_goals, home_goals);
    }

    rows.sort_by(|a, b| b.ranking_key().cmp(&a.ranking_key()));

    if tie_break == Some(TieBreak::HeadToHead) {
        apply_head_to_head(&mut rows, matches, source);
    }

    rows
}

/// 1-based table position of a team, if it appears in the table.
pub fn position_of(rows: &[GroupStandingsRow], team_id: Uuid) -> Option<i32> {
    rows.iter()
        .position(|r| r.team_id == team_id)
        .map(|i| i as i32 + 1)
}

/// True once every given match has a score in the source. An empty match
/// list is not complete; a group that never scheduled anything must not be
/// treated as finished.
pub fn all_scored(matches: &[Match], source: &ScoreSource) -> bool {
    !matches.is_empty() && matches.iter().all(|m| source.score(m.id).is_some())
}

/// Reorders runs of fully tied teams by their mutual results. Within a run
/// the mutual mini-table uses the same (points, goal difference, goals
/// scored) ranking; teams still tied after that keep their current order.
fn apply_head_to_head(rows: &mut [GroupStandingsRow], matches: &[Match], source: &ScoreSource) {
    let mut start = 0;
    while start < rows.len() {
        let mut end = start + 1;
        while end < rows.len() && rows[end].ranking_key() == rows[start].ranking_key() {
            end += 1;
        }

        if end - start >= 2 {
            let tied: Vec<Uuid> = rows[start..end].iter().map(|r| r.team_id).collect();
            let mutual: Vec<Match> = matches
                .iter()
                .filter(|m| is_between_any(m, &tied))
                .cloned()
                .collect();
            let mini = compute_standings(&tied, &mutual, source, None);
            let order: HashMap<Uuid, usize> = mini
                .iter()
                .enumerate()
                .map(|(i, r)| (r.team_id, i))
                .collect();
            rows[start..end]
                .sort_by_key(|r| order.get(&r.team_id).copied().unwrap_or(usize::MAX));
        }

        start = end;
    }
}

fn is_between_any(m: &Match, team_ids: &[Uuid]) -> bool {
    match (m.home.team_id(), m.away.team_id()) {
        (Some(h), Some(a)) => team_ids.contains(&h) && team_ids.contains(&a),
        _ => false,
    }
}
