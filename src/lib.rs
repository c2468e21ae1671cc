// Library crate for the tournament prediction scoring engine
// This file exposes the public API for integration tests

pub mod fixtures;
pub mod leaderboard;
pub mod predictions;
pub mod scoring;
pub mod shared;
pub mod standings;
pub mod tournament;

// Re-export commonly used types for easier access in tests
pub use leaderboard::{ScoreAggregator, ScoreRow, ScoreRowRepository};
pub use predictions::{BoostLedger, BoostType, GuessService, MatchGuess};
pub use scoring::{score_match, ScoringService, TournamentSnapshot};
pub use shared::{AppError, AppState};
pub use standings::{compute_standings, GroupStandingsRow, ScoreSource};
pub use tournament::ScoringRules;
