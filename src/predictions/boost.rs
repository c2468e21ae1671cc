use std::sync::Arc;

use serde::Serialize;
use strum::IntoEnumIterator;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::guess_repository::GuessRepository;
use super::models::BoostType;
use crate::shared::AppError;
use crate::tournament::repository::TournamentRepository;

/// Usage of one boost type against its per-tournament cap.
#[derive(Debug, Clone, Serialize)]
pub struct BoostUsageEntry {
    pub boost: BoostType,
    pub used: i64,
    pub cap: i32,
    pub remaining: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoostUsage {
    pub entries: Vec<BoostUsageEntry>,
}

/// Answers "may this user attach another boost of this type" against the
/// persisted guesses. The ledger itself never writes; the caller only
/// persists the boost when the answer was yes.
pub struct BoostLedger {
    guess_repository: Arc<dyn GuessRepository + Send + Sync>,
    tournament_repository: Arc<dyn TournamentRepository + Send + Sync>,
}

impl BoostLedger {
    pub fn new(
        guess_repository: Arc<dyn GuessRepository + Send + Sync>,
        tournament_repository: Arc<dyn TournamentRepository + Send + Sync>,
    ) -> Self {
        Self {
            guess_repository,
            tournament_repository,
        }
    }

    /// True if the user still has room for another guess with this boost.
    #[instrument(skip(self))]
    pub async fn try_assign(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
        boost: BoostType,
    ) -> Result<bool, AppError> {
        let rules = self
            .tournament_repository
            .get_scoring_rules(tournament_id)
            .await?;
        let cap = rules.boost_cap(boost);
        let used = self
            .guess_repository
            .count_boost_usage(user_id, tournament_id, boost)
            .await?;

        let allowed = used < i64::from(cap);
        if !allowed {
            debug!(%user_id, %boost, used, cap, "Boost cap reached");
        }
        Ok(allowed)
    }

    /// Per-type usage summary for display next to the boost picker.
    #[instrument(skip(self))]
    pub async fn usage(&self, user_id: Uuid, tournament_id: Uuid) -> Result<BoostUsage, AppError> {
        let rules = self
            .tournament_repository
            .get_scoring_rules(tournament_id)
            .await?;

        let mut entries = Vec::new();
        for boost in BoostType::iter() {
            let cap = rules.boost_cap(boost);
            let used = self
                .guess_repository
                .count_boost_usage(user_id, tournament_id, boost)
                .await?;
            entries.push(BoostUsageEntry {
                boost,
                used,
                cap,
                remaining: (i64::from(cap) - used).max(0),
            });
        }

        Ok(BoostUsage { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictions::guess_repository::InMemoryGuessRepository;
    use crate::predictions::models::MatchGuess;
    use crate::tournament::repository::InMemoryTournamentRepository;
    use crate::tournament::{ScoringRules, Stage, Tournament};
    use chrono::Utc;

    fn setup(max_silver: i32, max_golden: i32) -> (BoostLedger, Arc<InMemoryGuessRepository>, Uuid)
    {
        let guesses = Arc::new(InMemoryGuessRepository::new());
        let tournaments = Arc::new(InMemoryTournamentRepository::new());
        let tournament_id = Uuid::new_v4();
        tournaments.insert_tournament(
            Tournament {
                id: tournament_id,
                name: "Euro".to_string(),
                starts_at: Utc::now(),
            },
            ScoringRules {
                max_silver_games: max_silver,
                max_golden_games: max_golden,
                ..ScoringRules::default()
            },
        );

        let ledger = BoostLedger::new(guesses.clone(), tournaments);
        (ledger, guesses, tournament_id)
    }

    async fn persist_boosted_guess(
        guesses: &InMemoryGuessRepository,
        user_id: Uuid,
        tournament_id: Uuid,
        boost: BoostType,
    ) {
        let mut guess = MatchGuess::new(user_id, Uuid::new_v4(), tournament_id, Stage::Group);
        guess.boost = Some(boost);
        guesses.upsert_guess(&guess).await.unwrap();
    }

    #[tokio::test]
    async fn test_assignments_stop_at_the_cap() {
        let (ledger, guesses, tournament_id) = setup(2, 1);
        let user_id = Uuid::new_v4();

        // The persisted count can never exceed the cap when every write is
        // gated by try_assign.
        let mut granted = 0;
        for _ in 0..5 {
            if ledger
                .try_assign(user_id, tournament_id, BoostType::Silver)
                .await
                .unwrap()
            {
                persist_boosted_guess(&guesses, user_id, tournament_id, BoostType::Silver).await;
                granted += 1;
            }
        }

        assert_eq!(granted, 2);
        assert_eq!(
            guesses
                .count_boost_usage(user_id, tournament_id, BoostType::Silver)
                .await
                .unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_caps_are_tracked_per_boost_type() {
        let (ledger, guesses, tournament_id) = setup(1, 1);
        let user_id = Uuid::new_v4();

        persist_boosted_guess(&guesses, user_id, tournament_id, BoostType::Silver).await;

        assert!(!ledger
            .try_assign(user_id, tournament_id, BoostType::Silver)
            .await
            .unwrap());
        // Spending silver leaves golden untouched.
        assert!(ledger
            .try_assign(user_id, tournament_id, BoostType::Golden)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_caps_are_tracked_per_user() {
        let (ledger, guesses, tournament_id) = setup(1, 1);
        let user_a = Uuid::new_v4();
        let user_b = Uuid::new_v4();

        persist_boosted_guess(&guesses, user_a, tournament_id, BoostType::Golden).await;

        assert!(!ledger
            .try_assign(user_a, tournament_id, BoostType::Golden)
            .await
            .unwrap());
        assert!(ledger
            .try_assign(user_b, tournament_id, BoostType::Golden)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_usage_summary_reports_remaining() {
        let (ledger, guesses, tournament_id) = setup(5, 2);
        let user_id = Uuid::new_v4();

        persist_boosted_guess(&guesses, user_id, tournament_id, BoostType::Silver).await;
        persist_boosted_guess(&guesses, user_id, tournament_id, BoostType::Silver).await;
        persist_boosted_guess(&guesses, user_id, tournament_id, BoostType::Golden).await;

        let usage = ledger.usage(user_id, tournament_id).await.unwrap();
        let silver = usage
            .entries
            .iter()
            .find(|e| e.boost == BoostType::Silver)
            .unwrap();
        let golden = usage
            .entries
            .iter()
            .find(|e| e.boost == BoostType::Golden)
            .unwrap();

        assert_eq!((silver.used, silver.cap, silver.remaining), (2, 5, 3));
        assert_eq!((golden.used, golden.cap, golden.remaining), (1, 2, 1));
    }

    #[tokio::test]
    async fn test_unknown_tournament_propagates_not_found() {
        let guesses = Arc::new(InMemoryGuessRepository::new());
        let tournaments = Arc::new(InMemoryTournamentRepository::new());
        let ledger = BoostLedger::new(guesses, tournaments);

        let result = ledger
            .try_assign(Uuid::new_v4(), Uuid::new_v4(), BoostType::Silver)
            .await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound(_)));
    }
}
