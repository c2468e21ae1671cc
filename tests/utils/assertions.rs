//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use uuid::Uuid;

use scorepool::{ScoreRow, ScoreRowRepository};

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct ScoreAssertion {
    row: ScoreRow,
}

impl ScoreAssertion {
    /// Pick one user's row out of an aggregation batch.
    pub fn for_user(rows: &[ScoreRow], user_id: Uuid) -> Self {
        let row = rows
            .iter()
            .find(|r| r.user_id == user_id)
            .unwrap_or_else(|| panic!("no score row for user {} in batch", user_id));
        Self { row: row.clone() }
    }

    /// Load the stored row straight from the repository.
    pub async fn stored(setup: &TestSetup, user_id: Uuid, tournament_id: Uuid) -> Self {
        let row = setup
            .scores
            .find(user_id, tournament_id)
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("no stored score row for user {}", user_id));
        Self { row }
    }

    pub fn has_total(self, expected: i32) -> Self {
        assert_eq!(
            self.row.total_points, expected,
            "total points for user {}",
            self.row.user_id
        );
        self
    }

    pub fn has_group_points(self, expected: i32) -> Self {
        assert_eq!(
            self.row.group_points, expected,
            "group points for user {}",
            self.row.user_id
        );
        self
    }

    pub fn has_playoff_points(self, expected: i32) -> Self {
        assert_eq!(
            self.row.playoff_points, expected,
            "playoff points for user {}",
            self.row.user_id
        );
        self
    }

    pub fn has_bonus_total(self, expected: i32) -> Self {
        assert_eq!(
            self.row.bonus_total, expected,
            "bonus total for user {}",
            self.row.user_id
        );
        self
    }

    pub fn has_exact_total(self, expected: i32) -> Self {
        assert_eq!(
            self.row.exact_total, expected,
            "exact count for user {}",
            self.row.user_id
        );
        self
    }

    pub fn has_correct_total(self, expected: i32) -> Self {
        assert_eq!(
            self.row.correct_total, expected,
            "correct count for user {}",
            self.row.user_id
        );
        self
    }

    pub fn has_yesterday(self, points: i32, bonus: i32) -> Self {
        assert_eq!(
            self.row.yesterday_points, points,
            "yesterday points for user {}",
            self.row.user_id
        );
        assert_eq!(
            self.row.yesterday_bonus, bonus,
            "yesterday bonus for user {}",
            self.row.user_id
        );
        self
    }

    /// Hand the row back for assertions this helper does not cover.
    pub fn into_row(self) -> ScoreRow {
        self.row
    }
}
