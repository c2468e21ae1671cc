use std::collections::HashMap;

use serde::Serialize;
use strum::IntoEnumIterator;

use crate::predictions::OutcomePrediction;
use crate::tournament::{AwardCategory, ScoringRules, TournamentOutcomes};

/// Per-slot breakdown of an outcome prediction's points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomePoints {
    pub champion: i32,
    pub runner_up: i32,
    pub third_place: i32,
    pub awards: HashMap<AwardCategory, i32>,
}

impl OutcomePoints {
    pub fn total(&self) -> i32 {
        self.champion + self.runner_up + self.third_place + self.awards.values().sum::<i32>()
    }
}

/// Outcome predictions stay pending as one block until the final outcomes
/// are on file, then the whole block scores at once.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OutcomeScore {
    Pending,
    Scored(OutcomePoints),
}

impl OutcomeScore {
    pub fn total(&self) -> i32 {
        match self {
            OutcomeScore::Pending => 0,
            OutcomeScore::Scored(points) => points.total(),
        }
    }
}

/// Grades the podium picks and award picks against the recorded outcomes.
///
/// Each slot pays out only for the right team in the right slot; picking the
/// eventual champion as runner-up is worth nothing. Award picks match on the
/// stored winner reference, missing picks score zero.
pub fn score_outcome(
    prediction: &OutcomePrediction,
    outcomes: Option<&TournamentOutcomes>,
    rules: &ScoringRules,
) -> OutcomeScore {
    let Some(outcomes) = outcomes else {
        return OutcomeScore::Pending;
    };

    let slot = |pick: Option<uuid::Uuid>, winner: uuid::Uuid, points: i32| {
        if pick == Some(winner) {
            points
        } else {
            0
        }
    };

    let mut awards = HashMap::new();
    for category in AwardCategory::iter() {
        let hit = match (prediction.award_picks.get(&category), outcomes.award_winners.get(&category)) {
            (Some(pick), Some(winner)) => pick == winner,
            _ => false,
        };
        awards.insert(category, if hit { rules.individual_award_points } else { 0 });
    }

    OutcomeScore::Scored(OutcomePoints {
        champion: slot(prediction.champion, outcomes.champion, rules.champion_points),
        runner_up: slot(prediction.runner_up, outcomes.runner_up, rules.runner_up_points),
        third_place: slot(
            prediction.third_place,
            outcomes.third_place,
            rules.third_place_points,
        ),
        awards,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    struct Podium {
        champion: Uuid,
        runner_up: Uuid,
        third_place: Uuid,
    }

    impl Podium {
        fn new() -> Self {
            Self {
                champion: Uuid::new_v4(),
                runner_up: Uuid::new_v4(),
                third_place: Uuid::new_v4(),
            }
        }

        fn outcomes(&self) -> TournamentOutcomes {
            TournamentOutcomes {
                tournament_id: Uuid::new_v4(),
                champion: self.champion,
                runner_up: self.runner_up,
                third_place: self.third_place,
                award_winners: HashMap::from([(
                    AwardCategory::TopScorer,
                    "kane".to_string(),
                )]),
            }
        }

        fn prediction(&self) -> OutcomePrediction {
            let mut p = OutcomePrediction::new(Uuid::new_v4(), Uuid::new_v4());
            p.champion = Some(self.champion);
            p.runner_up = Some(self.runner_up);
            p.third_place = Some(self.third_place);
            p.award_picks
                .insert(AwardCategory::TopScorer, "kane".to_string());
            p
        }
    }

    #[test]
    fn pending_until_outcomes_exist() {
        let podium = Podium::new();
        let score = score_outcome(&podium.prediction(), None, &ScoringRules::default());
        assert_eq!(score, OutcomeScore::Pending);
        assert_eq!(score.total(), 0);
    }

    #[test]
    fn perfect_prediction_collects_every_slot() {
        let podium = Podium::new();
        let rules = ScoringRules::default();
        let score = score_outcome(&podium.prediction(), Some(&podium.outcomes()), &rules);

        let expected = rules.champion_points
            + rules.runner_up_points
            + rules.third_place_points
            + rules.individual_award_points;
        assert_eq!(score.total(), expected);
    }

    #[test]
    fn champion_in_the_wrong_slot_is_worth_nothing() {
        let podium = Podium::new();
        let rules = ScoringRules::default();
        let mut prediction = podium.prediction();
        // Swap champion and runner-up.
        prediction.champion = Some(podium.runner_up);
        prediction.runner_up = Some(podium.champion);

        let score = score_outcome(&prediction, Some(&podium.outcomes()), &rules);
        let OutcomeScore::Scored(points) = score else {
            panic!("expected scored outcome");
        };
        assert_eq!(points.champion, 0);
        assert_eq!(points.runner_up, 0);
        assert_eq!(points.third_place, rules.third_place_points);
    }

    #[test]
    fn missing_picks_score_zero_but_still_grade() {
        let podium = Podium::new();
        let rules = ScoringRules::default();
        let prediction = OutcomePrediction::new(Uuid::new_v4(), Uuid::new_v4());

        let score = score_outcome(&prediction, Some(&podium.outcomes()), &rules);
        assert_eq!(score.total(), 0);
        assert!(matches!(score, OutcomeScore::Scored(_)));
    }

    #[test]
    fn award_pick_must_match_the_stored_reference() {
        let podium = Podium::new();
        let rules = ScoringRules::default();
        let mut prediction = podium.prediction();
        prediction
            .award_picks
            .insert(AwardCategory::TopScorer, "mbappe".to_string());

        let score = score_outcome(&prediction, Some(&podium.outcomes()), &rules);
        let OutcomeScore::Scored(points) = score else {
            panic!("expected scored outcome");
        };
        assert_eq!(points.awards[&AwardCategory::TopScorer], 0);
        // Categories with no recorded winner grade as misses, not errors.
        assert_eq!(points.awards[&AwardCategory::BestPlayer], 0);
    }
}
