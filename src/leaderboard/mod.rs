// Public API - what other modules can use
pub use aggregator::ScoreAggregator;
pub use handlers::{
    get_leaderboard, get_user_qualification, roll_yesterday_snapshots, trigger_recalculation,
};
pub use models::ScoreRow;
pub use repository::{InMemoryScoreRepository, PostgresScoreRepository, ScoreRowRepository};

// Internal modules
pub mod aggregator;
mod handlers;
pub mod models;
pub mod repository;
