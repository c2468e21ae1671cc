// Public API - what other modules can use
pub use calculator::{all_scored, compute_standings, position_of};
pub use handlers::get_group_standings;
pub use models::{GroupStandingsRow, ScoreSource};

// Internal modules
pub mod calculator;
mod handlers;
pub mod models;
