// Public API - what other modules can use
pub use match_points::{score_match, MatchScore};
pub use outcome::{score_outcome, OutcomePoints, OutcomeScore};
pub use qualification::{
    score_group_qualification, GroupQualificationInput, QualificationStatus, ScoredReason,
    TeamScoringResult,
};
pub use service::ScoringService;
pub use snapshot::{GroupSnapshot, TournamentSnapshot};
pub use third_place::{select_best_thirds, ThirdPlaceCandidate, ThirdPlaceSelection};

// Internal modules
pub mod match_points;
pub mod outcome;
pub mod qualification;
pub mod service;
pub mod snapshot;
pub mod third_place;
