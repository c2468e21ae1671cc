use std::collections::HashMap;

use uuid::Uuid;

use scorepool::{
    fixtures::MatchResult,
    predictions::{
        BoostType, MatchGuess, OutcomePrediction, PredictionRepository, QualificationPrediction,
        SaveGuessRequest,
    },
    scoring::TeamScoringResult,
    tournament::{AwardCategory, TournamentOutcomes},
    AppError, ScoreRow, TournamentSnapshot,
};

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Save a plain guess through the service, panicking on rejection.
    pub async fn save_guess(&self, user_id: Uuid, match_id: Uuid, home: i32, away: i32) {
        self.try_save_guess(user_id, match_id, home, away, None)
            .await
            .unwrap();
    }

    /// Save a guess carrying a boost; the caller inspects the outcome.
    pub async fn try_save_guess(
        &self,
        user_id: Uuid,
        match_id: Uuid,
        home: i32,
        away: i32,
        boost: Option<BoostType>,
    ) -> Result<MatchGuess, AppError> {
        self.guess_service
            .save_guess(SaveGuessRequest {
                user_id,
                match_id,
                home_goals: Some(home),
                away_goals: Some(away),
                penalty_winner: None,
                boost,
            })
            .await
    }

    /// Record an authoritative result and re-grade every guess on the match,
    /// the way the production result-entry path does.
    pub async fn enter_result(&self, match_id: Uuid, home: i32, away: i32) {
        self.matches.record_result(MatchResult {
            match_id,
            home_goals: home,
            away_goals: away,
            penalty_winner: None,
            is_draft: false,
        });
        self.scoring_service
            .score_match_guesses(match_id)
            .await
            .unwrap();
    }

    /// Record a provisional result. Drafts are visible but never score.
    pub async fn enter_draft_result(&self, match_id: Uuid, home: i32, away: i32) {
        self.matches.record_result(MatchResult {
            match_id,
            home_goals: home,
            away_goals: away,
            penalty_winner: None,
            is_draft: true,
        });
        self.scoring_service
            .score_match_guesses(match_id)
            .await
            .unwrap();
    }

    /// Predict one team's final group position.
    pub async fn predict_position(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
        group_id: Uuid,
        team_id: Uuid,
        position: i32,
    ) {
        self.predictions
            .upsert_qualification_prediction(&QualificationPrediction {
                user_id,
                tournament_id,
                group_id,
                team_id,
                predicted_position: position,
                predicted_to_qualify: true,
            })
            .await
            .unwrap();
    }

    /// Predict the podium. Missing slots stay unpicked.
    pub async fn predict_podium(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
        champion: Option<Uuid>,
        runner_up: Option<Uuid>,
        third_place: Option<Uuid>,
    ) {
        self.predictions
            .upsert_outcome_prediction(&OutcomePrediction {
                user_id,
                tournament_id,
                champion,
                runner_up,
                third_place,
                award_picks: HashMap::new(),
            })
            .await
            .unwrap();
    }

    /// Declare the tournament concluded with the given podium and no awards.
    pub fn conclude(&self, tournament_id: Uuid, champion: Uuid, runner_up: Uuid, third: Uuid) {
        self.tournaments.set_outcomes(TournamentOutcomes {
            tournament_id,
            champion,
            runner_up,
            third_place: third,
            award_winners: HashMap::<AwardCategory, String>::new(),
        });
    }

    /// Rebuild the given users' score rows, panicking on batch-level failure.
    pub async fn recalculate(&self, user_ids: &[Uuid], tournament_id: Uuid) -> Vec<ScoreRow> {
        self.aggregator
            .recalculate(user_ids, tournament_id)
            .await
            .unwrap()
    }

    /// Load a fresh snapshot and grade the user's qualification predictions
    /// against it.
    pub async fn qualification_results(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
    ) -> Vec<TeamScoringResult> {
        let snapshot = TournamentSnapshot::load(
            tournament_id,
            self.tournaments.as_ref(),
            self.matches.as_ref(),
        )
        .await
        .unwrap();
        let predictions = self
            .predictions
            .list_qualification_predictions(user_id, tournament_id)
            .await
            .unwrap();
        snapshot.score_qualification(&predictions)
    }
}
