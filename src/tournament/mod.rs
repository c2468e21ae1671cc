// Public API - what other modules can use
pub use models::{
    AwardCategory, Group, ScoringRules, SlotAssignment, Stage, Team, ThirdPlaceCombination,
    ThirdPlaceRule, TieBreak, Tournament, TournamentOutcomes,
};
pub use repository::{
    InMemoryTournamentRepository, PostgresTournamentRepository, TournamentRepository,
};

// Internal modules
pub mod models;
pub mod repository;
