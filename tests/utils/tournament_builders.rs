use chrono::{Duration, Utc};
use uuid::Uuid;

use scorepool::{
    fixtures::{Match, TeamSlot},
    tournament::{
        Group, ScoringRules, SlotAssignment, Stage, Team, ThirdPlaceCombination, ThirdPlaceRule,
        Tournament,
    },
};

use super::setup::TestSetup;

// ============================================================================
// Tournament Setup Utilities
// ============================================================================

/// Handle onto a seeded tournament. Indexes follow creation order: group 0
/// is the first group added, team (0, 1) the second team of that group.
pub struct TournamentContext {
    pub tournament_id: Uuid,
    pub group_ids: Vec<Uuid>,
    pub teams: Vec<Vec<Uuid>>,
    pub group_matches: Vec<Vec<Uuid>>,
    pub playoff_matches: Vec<Uuid>,
}

impl TournamentContext {
    pub fn group(&self, group: usize) -> Uuid {
        self.group_ids[group]
    }

    pub fn team(&self, group: usize, slot: usize) -> Uuid {
        self.teams[group][slot]
    }

    /// Group fixtures are scheduled pair by pair: (0,1), (0,2), (1,2), ...
    pub fn group_match(&self, group: usize, index: usize) -> Uuid {
        self.group_matches[group][index]
    }

    pub fn playoff(&self, index: usize) -> Uuid {
        self.playoff_matches[index]
    }
}

pub struct TournamentBuilder {
    name: String,
    rules: ScoringRules,
    groups: Vec<(String, usize)>,
    playoff_matches: usize,
    third_place: Option<ThirdPlaceSpec>,
}

enum ThirdPlaceSpec {
    /// One combination per group, each advancing that group's third alone.
    SingleAdvancing,
    Explicit {
        advancing: usize,
        combinations: Vec<(String, Vec<(String, String)>)>,
    },
}

impl TournamentBuilder {
    pub fn new() -> Self {
        Self {
            name: "Test Cup".to_string(),
            rules: ScoringRules::default(),
            groups: vec![],
            playoff_matches: 0,
            third_place: None,
        }
    }

    pub fn with_rules(mut self, rules: ScoringRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_group(mut self, code: &str, team_count: usize) -> Self {
        self.groups.push((code.to_string(), team_count));
        self
    }

    /// Two groups of three teams each, the smallest shape that exercises
    /// cross-group logic.
    pub fn with_two_groups_of_three(self) -> Self {
        self.with_group("A", 3).with_group("B", 3)
    }

    pub fn with_playoff_matches(mut self, count: usize) -> Self {
        self.playoff_matches = count;
        self
    }

    /// Third-place rule where exactly one third advances, with a bracket
    /// combination prepared for every group it could come from.
    pub fn with_single_advancing_third(mut self) -> Self {
        self.third_place = Some(ThirdPlaceSpec::SingleAdvancing);
        self
    }

    /// Third-place rule with hand-written combinations. Each entry is a
    /// combination key plus its (slot, group code) assignments.
    pub fn with_third_place_rule(
        mut self,
        advancing: usize,
        combinations: Vec<(&str, Vec<(&str, &str)>)>,
    ) -> Self {
        self.third_place = Some(ThirdPlaceSpec::Explicit {
            advancing,
            combinations: combinations
                .into_iter()
                .map(|(key, assignments)| {
                    (
                        key.to_string(),
                        assignments
                            .into_iter()
                            .map(|(slot, code)| (slot.to_string(), code.to_string()))
                            .collect(),
                    )
                })
                .collect(),
        });
        self
    }

    /// Seed the tournament into the setup's repositories and hand back ids.
    pub fn build_with_setup(self, setup: &TestSetup) -> TournamentContext {
        let tournament_id = Uuid::new_v4();
        setup.tournaments.insert_tournament(
            Tournament {
                id: tournament_id,
                name: self.name.clone(),
                starts_at: Utc::now(),
            },
            self.rules.clone(),
        );

        let mut group_ids = vec![];
        let mut teams = vec![];
        let mut group_matches = vec![];
        let mut kickoff = Utc::now();

        for (code, team_count) in &self.groups {
            let group_id = Uuid::new_v4();
            setup.tournaments.insert_group(Group {
                id: group_id,
                tournament_id,
                code: code.clone(),
            });

            let group_teams: Vec<Uuid> = (0..*team_count)
                .map(|i| {
                    let team_id = Uuid::new_v4();
                    setup.tournaments.insert_team(Team {
                        id: team_id,
                        tournament_id,
                        group_id,
                        name: format!("{}{}", code, i + 1),
                    });
                    team_id
                })
                .collect();

            let mut fixture_ids = vec![];
            for i in 0..group_teams.len() {
                for j in (i + 1)..group_teams.len() {
                    let match_id = Uuid::new_v4();
                    kickoff += Duration::hours(3);
                    setup.matches.insert_match(Match {
                        id: match_id,
                        tournament_id,
                        stage: Stage::Group,
                        group_id: Some(group_id),
                        home: TeamSlot::Team(group_teams[i]),
                        away: TeamSlot::Team(group_teams[j]),
                        kickoff_at: kickoff,
                        venue: format!("Stadium {}", fixture_ids.len() + 1),
                    });
                    fixture_ids.push(match_id);
                }
            }

            group_ids.push(group_id);
            teams.push(group_teams);
            group_matches.push(fixture_ids);
        }

        // Playoff fixtures pair the first team of the first group against the
        // last team of the last group; only the stage matters to scoring.
        let playoff_matches: Vec<Uuid> = (0..self.playoff_matches)
            .map(|i| {
                let match_id = Uuid::new_v4();
                kickoff += Duration::hours(3);
                setup.matches.insert_match(Match {
                    id: match_id,
                    tournament_id,
                    stage: Stage::Playoff,
                    group_id: None,
                    home: TeamSlot::Team(teams[0][0]),
                    away: TeamSlot::Team(*teams.last().unwrap().last().unwrap()),
                    kickoff_at: kickoff,
                    venue: format!("Final Arena {}", i + 1),
                });
                match_id
            })
            .collect();

        if let Some(spec) = &self.third_place {
            setup
                .tournaments
                .set_third_place_rule(self.third_place_rule(tournament_id, spec));
        }

        TournamentContext {
            tournament_id,
            group_ids,
            teams,
            group_matches,
            playoff_matches,
        }
    }

    fn third_place_rule(&self, tournament_id: Uuid, spec: &ThirdPlaceSpec) -> ThirdPlaceRule {
        match spec {
            ThirdPlaceSpec::SingleAdvancing => ThirdPlaceRule {
                tournament_id,
                advancing: 1,
                combinations: self
                    .groups
                    .iter()
                    .map(|(code, _)| ThirdPlaceCombination {
                        key: code.clone(),
                        assignments: vec![SlotAssignment {
                            slot: "T1".to_string(),
                            group_code: code.clone(),
                        }],
                    })
                    .collect(),
            },
            ThirdPlaceSpec::Explicit {
                advancing,
                combinations,
            } => ThirdPlaceRule {
                tournament_id,
                advancing: *advancing,
                combinations: combinations
                    .iter()
                    .map(|(key, assignments)| ThirdPlaceCombination {
                        key: key.clone(),
                        assignments: assignments
                            .iter()
                            .map(|(slot, code)| SlotAssignment {
                                slot: slot.clone(),
                                group_code: code.clone(),
                            })
                            .collect(),
                    })
                    .collect(),
            },
        }
    }
}
