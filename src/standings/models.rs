use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fixtures::MatchResult;
use crate::predictions::MatchGuess;

/// One line of a group table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStandingsRow {
    pub team_id: Uuid,
    pub played: i32,
    pub wins: i32,
    pub draws: i32,
    pub losses: i32,
    pub goals_for: i32,
    pub goals_against: i32,
    pub goal_difference: i32,
    pub points: i32,
}

impl GroupStandingsRow {
    pub fn new(team_id: Uuid) -> Self {
        Self {
            team_id,
            played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
        }
    }

    /// Folds one played match into the row. A win is worth 3 points, a draw
    /// 1, a loss 0.
    pub fn record_match(&mut self, scored: i32, conceded: i32) {
        self.played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        self.goal_difference = self.goals_for - self.goals_against;

        if scored > conceded {
            self.wins += 1;
            self.points += 3;
        } else if scored == conceded {
            self.draws += 1;
            self.points += 1;
        } else {
            self.losses += 1;
        }
    }

    /// Sort key, descending: points, then goal difference, then goals
    /// scored.
    pub fn ranking_key(&self) -> (i32, i32, i32) {
        (self.points, self.goal_difference, self.goals_for)
    }
}

/// Uniform view over "what was the score of match X" that lets the same
/// standings calculator run on authoritative results, on drafts, or on a
/// single user's guesses (the what-if table).
#[derive(Debug, Clone, Default)]
pub struct ScoreSource {
    scores: HashMap<Uuid, (i32, i32)>,
}

impl ScoreSource {
    /// Builds a source from authoritative results only; drafts are skipped.
    pub fn from_results<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'a MatchResult>,
    {
        let scores = results
            .into_iter()
            .filter(|r| !r.is_draft)
            .map(|r| (r.match_id, (r.home_goals, r.away_goals)))
            .collect();
        Self { scores }
    }

    /// Builds a source that also counts draft results. Display-only tables
    /// use this; scoring never does.
    pub fn from_results_with_drafts<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'a MatchResult>,
    {
        let scores = results
            .into_iter()
            .map(|r| (r.match_id, (r.home_goals, r.away_goals)))
            .collect();
        Self { scores }
    }

    /// Builds a source from one user's guesses. A guess missing either goal
    /// count leaves its match unplayed rather than failing.
    pub fn from_guesses<'a, I>(guesses: I) -> Self
    where
        I: IntoIterator<Item = &'a MatchGuess>,
    {
        let scores = guesses
            .into_iter()
            .filter_map(|g| g.predicted_score().map(|score| (g.match_id, score)))
            .collect();
        Self { scores }
    }

    pub fn score(&self, match_id: Uuid) -> Option<(i32, i32)> {
        self.scores.get(&match_id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }
}
