use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use scorepool::{
    leaderboard::InMemoryScoreRepository,
    tournament::{
        Group, InMemoryTournamentRepository, Team, ThirdPlaceRule, Tournament,
        TournamentOutcomes, TournamentRepository,
    },
    AppError, ScoreRow, ScoreRowRepository, ScoringRules,
};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Behaves like the real in-memory repository but counts every call made
/// through the trait.
#[derive(Clone)]
pub struct SpyTournamentRepository {
    inner: Arc<InMemoryTournamentRepository>,
    calls: Arc<AtomicUsize>,
}

impl SpyTournamentRepository {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(InMemoryTournamentRepository::new()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TournamentRepository for SpyTournamentRepository {
    async fn get_tournament(&self, tournament_id: Uuid) -> Result<Option<Tournament>, AppError> {
        self.record_call();
        self.inner.get_tournament(tournament_id).await
    }

    async fn get_scoring_rules(&self, tournament_id: Uuid) -> Result<ScoringRules, AppError> {
        self.record_call();
        self.inner.get_scoring_rules(tournament_id).await
    }

    async fn list_groups(&self, tournament_id: Uuid) -> Result<Vec<Group>, AppError> {
        self.record_call();
        self.inner.list_groups(tournament_id).await
    }

    async fn list_teams(&self, tournament_id: Uuid) -> Result<Vec<Team>, AppError> {
        self.record_call();
        self.inner.list_teams(tournament_id).await
    }

    async fn get_third_place_rule(
        &self,
        tournament_id: Uuid,
    ) -> Result<Option<ThirdPlaceRule>, AppError> {
        self.record_call();
        self.inner.get_third_place_rule(tournament_id).await
    }

    async fn get_outcomes(
        &self,
        tournament_id: Uuid,
    ) -> Result<Option<TournamentOutcomes>, AppError> {
        self.record_call();
        self.inner.get_outcomes(tournament_id).await
    }
}

/// Score repository spy: counts reads and writes alike.
#[derive(Clone)]
pub struct SpyScoreRepository {
    inner: Arc<InMemoryScoreRepository>,
    calls: Arc<AtomicUsize>,
}

impl SpyScoreRepository {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(InMemoryScoreRepository::new()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn row_count(&self) -> usize {
        self.inner.row_count()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ScoreRowRepository for SpyScoreRepository {
    async fn find(&self, user_id: Uuid, tournament_id: Uuid) -> Result<Option<ScoreRow>, AppError> {
        self.record_call();
        self.inner.find(user_id, tournament_id).await
    }

    async fn insert_if_absent(&self, row: &ScoreRow) -> Result<bool, AppError> {
        self.record_call();
        self.inner.insert_if_absent(row).await
    }

    async fn update(&self, row: &ScoreRow) -> Result<(), AppError> {
        self.record_call();
        self.inner.update(row).await
    }

    async fn rows_for_tournament(&self, tournament_id: Uuid) -> Result<Vec<ScoreRow>, AppError> {
        self.record_call();
        self.inner.rows_for_tournament(tournament_id).await
    }

    async fn roll_yesterday(&self, tournament_id: Uuid) -> Result<u64, AppError> {
        self.record_call();
        self.inner.roll_yesterday(tournament_id).await
    }
}

/// Score repository whose writes fail for one chosen user. Reads and every
/// other user's writes go through to a real in-memory store.
pub struct FailingScoreRepository {
    inner: Arc<InMemoryScoreRepository>,
    fail_for: Uuid,
}

impl FailingScoreRepository {
    pub fn failing_for(user_id: Uuid) -> Self {
        Self {
            inner: Arc::new(InMemoryScoreRepository::new()),
            fail_for: user_id,
        }
    }

    pub fn row_count(&self) -> usize {
        self.inner.row_count()
    }
}

#[async_trait]
impl ScoreRowRepository for FailingScoreRepository {
    async fn find(&self, user_id: Uuid, tournament_id: Uuid) -> Result<Option<ScoreRow>, AppError> {
        self.inner.find(user_id, tournament_id).await
    }

    async fn insert_if_absent(&self, row: &ScoreRow) -> Result<bool, AppError> {
        if row.user_id == self.fail_for {
            return Err(AppError::DatabaseError(
                "simulated write failure".to_string(),
            ));
        }
        self.inner.insert_if_absent(row).await
    }

    async fn update(&self, row: &ScoreRow) -> Result<(), AppError> {
        if row.user_id == self.fail_for {
            return Err(AppError::DatabaseError(
                "simulated write failure".to_string(),
            ));
        }
        self.inner.update(row).await
    }

    async fn rows_for_tournament(&self, tournament_id: Uuid) -> Result<Vec<ScoreRow>, AppError> {
        self.inner.rows_for_tournament(tournament_id).await
    }

    async fn roll_yesterday(&self, tournament_id: Uuid) -> Result<u64, AppError> {
        self.inner.roll_yesterday(tournament_id).await
    }
}
