// Public API - what other modules can use
pub use boost::{BoostLedger, BoostUsage, BoostUsageEntry};
pub use guess_repository::{GuessRepository, InMemoryGuessRepository, PostgresGuessRepository};
pub use handlers::{get_boost_usage, save_guess};
pub use models::{
    BoostType, GuessOutcome, MatchGuess, MatchStatTotals, OutcomePrediction,
    QualificationPrediction, RawMatchStats,
};
pub use prediction_repository::{
    InMemoryPredictionRepository, PostgresPredictionRepository, PredictionRepository,
};
pub use service::{GuessService, SaveGuessRequest};

// Internal modules
pub mod boost;
pub mod guess_repository;
mod handlers;
pub mod models;
pub mod prediction_repository;
pub mod service;
