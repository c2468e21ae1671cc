use std::sync::Arc;

use uuid::Uuid;

use scorepool::{
    fixtures::InMemoryMatchRepository,
    leaderboard::InMemoryScoreRepository,
    predictions::{InMemoryGuessRepository, InMemoryPredictionRepository},
    tournament::InMemoryTournamentRepository,
    GuessService, ScoreAggregator, ScoringService,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub tournaments: Arc<InMemoryTournamentRepository>,
    pub matches: Arc<InMemoryMatchRepository>,
    pub guesses: Arc<InMemoryGuessRepository>,
    pub predictions: Arc<InMemoryPredictionRepository>,
    pub scores: Arc<InMemoryScoreRepository>,
    pub guess_service: GuessService,
    pub scoring_service: ScoringService,
    pub aggregator: ScoreAggregator,
    pub users: Vec<Uuid>,
}

impl TestSetup {
    /// Shorthand for the nth pre-created user.
    pub fn user(&self, index: usize) -> Uuid {
        self.users[index]
    }
}

pub struct TestSetupBuilder {
    users: usize,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self { users: 0 }
    }

    pub fn with_users(mut self, count: usize) -> Self {
        self.users = count;
        self
    }

    pub fn with_two_users(self) -> Self {
        self.with_users(2)
    }

    pub fn with_four_users(self) -> Self {
        self.with_users(4)
    }

    pub fn build(self) -> TestSetup {
        let tournaments = Arc::new(InMemoryTournamentRepository::new());
        let matches = Arc::new(InMemoryMatchRepository::new());
        let guesses = Arc::new(InMemoryGuessRepository::new());
        let predictions = Arc::new(InMemoryPredictionRepository::new());
        let scores = Arc::new(InMemoryScoreRepository::new());

        let guess_service =
            GuessService::new(guesses.clone(), matches.clone(), tournaments.clone());
        let scoring_service =
            ScoringService::new(guesses.clone(), matches.clone(), tournaments.clone());
        let aggregator = ScoreAggregator::new(
            guesses.clone(),
            predictions.clone(),
            scores.clone(),
            tournaments.clone(),
            matches.clone(),
        );

        TestSetup {
            tournaments,
            matches,
            guesses,
            predictions,
            scores,
            guess_service,
            scoring_service,
            aggregator,
            users: (0..self.users).map(|_| Uuid::new_v4()).collect(),
        }
    }
}
