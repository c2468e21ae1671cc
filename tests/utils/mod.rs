pub mod actions;
pub mod assertions;
pub mod mocks;
pub mod setup;
pub mod tournament_builders;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use assertions::ScoreAssertion;
pub use tournament_builders::TournamentBuilder;
#[allow(unused_imports)]
pub use mocks::{FailingScoreRepository, SpyScoreRepository, SpyTournamentRepository};
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
