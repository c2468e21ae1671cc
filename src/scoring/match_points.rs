use crate::fixtures::MatchResult;
use crate::predictions::{GuessOutcome, MatchGuess};
use crate::tournament::ScoringRules;

/// Points derived for one guess against one result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchScore {
    /// Points before the boost.
    pub base: i32,
    /// The boost's extra points on top of `base`.
    pub bonus: i32,
    pub outcome: GuessOutcome,
}

impl MatchScore {
    pub fn unscored() -> Self {
        Self {
            base: 0,
            bonus: 0,
            outcome: GuessOutcome::Unscored,
        }
    }

    /// What the guess is worth on the leaderboard.
    pub fn total(&self) -> i32 {
        self.base + self.bonus
    }
}

/// Scores one guess. Without an authoritative result, or with an incomplete
/// guess, everything stays at zero; a boost multiplies the earned points and
/// never turns a miss into something.
pub fn score_match(
    guess: &MatchGuess,
    result: Option<&MatchResult>,
    rules: &ScoringRules,
) -> MatchScore {
    let result = match result {
        Some(r) if !r.is_draft => r,
        _ => return MatchScore::unscored(),
    };
    let Some((home, away)) = guess.predicted_score() else {
        return MatchScore::unscored();
    };

    let (base, outcome) = if home == result.home_goals && away == result.away_goals {
        (rules.exact_score_points, GuessOutcome::Exact)
    } else if (home - away).signum() == (result.home_goals - result.away_goals).signum() {
        (rules.correct_outcome_points, GuessOutcome::Correct)
    } else {
        (0, GuessOutcome::Wrong)
    };

    let bonus = match guess.boost {
        Some(boost) => base * (boost.multiplier() - 1),
        None => 0,
    };

    MatchScore {
        base,
        bonus,
        outcome,
    }
}
