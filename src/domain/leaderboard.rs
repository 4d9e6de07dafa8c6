//! Leaderboard entries and score submission validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Maximum player name length, in characters.
pub const MAX_PLAYER_NAME_CHARS: usize = 50;

/// A persisted leaderboard row. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: Uuid,
    pub player_name: String,
    pub score: i64,
    pub hodl: bool,
    pub created_at: DateTime<Utc>,
}

/// A validated score submission, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScore {
    pub player_name: String,
    pub score: i64,
    pub hodl: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid request body")]
    InvalidBody,
    #[error("Invalid player name")]
    InvalidPlayerName,
    #[error("Invalid score")]
    InvalidScore,
    #[error("Invalid hodl value")]
    InvalidHodl,
}

impl NewScore {
    /// Validate a raw JSON submission.
    ///
    /// `player_name` must be a non-empty string of at most 50 characters,
    /// `score` a non-negative JSON integer, and `hodl` (optional, default
    /// `false`) a boolean.
    pub fn from_json(body: &serde_json::Value) -> Result<Self, ValidationError> {
        let obj = body.as_object().ok_or(ValidationError::InvalidBody)?;

        let player_name = obj
            .get("player_name")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty() && s.chars().count() <= MAX_PLAYER_NAME_CHARS)
            .ok_or(ValidationError::InvalidPlayerName)?
            .to_string();

        // Floats such as 42.0 are rejected; only JSON integers count.
        let score = obj
            .get("score")
            .and_then(|v| v.as_i64())
            .filter(|s| *s >= 0)
            .ok_or(ValidationError::InvalidScore)?;

        let hodl = match obj.get("hodl") {
            None => false,
            Some(v) => v.as_bool().ok_or(ValidationError::InvalidHodl)?,
        };

        Ok(NewScore {
            player_name,
            score,
            hodl,
        })
    }
}

/// Column the leaderboard is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Score,
    Date,
}

impl SortField {
    /// Unknown values fall back to score.
    pub fn parse_lenient(s: Option<&str>) -> Self {
        match s {
            Some("date") => SortField::Date,
            _ => SortField::Score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Anything other than `asc` sorts descending.
    pub fn parse_lenient(s: Option<&str>) -> Self {
        match s {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_submission() {
        let score =
            NewScore::from_json(&json!({"player_name": "Ann", "score": 42, "hodl": true})).unwrap();
        assert_eq!(
            score,
            NewScore {
                player_name: "Ann".to_string(),
                score: 42,
                hodl: true
            }
        );
    }

    #[test]
    fn test_hodl_defaults_to_false() {
        let score = NewScore::from_json(&json!({"player_name": "Ann", "score": 0})).unwrap();
        assert!(!score.hodl);
    }

    #[test]
    fn test_player_name_rules() {
        let cases = [
            json!({"player_name": "", "score": 1}),
            json!({"player_name": 7, "score": 1}),
            json!({"score": 1}),
            json!({"player_name": "x".repeat(51), "score": 1}),
        ];
        for body in cases {
            assert_eq!(
                NewScore::from_json(&body),
                Err(ValidationError::InvalidPlayerName),
                "body: {}",
                body
            );
        }

        // Length is counted in characters, not bytes.
        let name = "é".repeat(50);
        assert!(NewScore::from_json(&json!({"player_name": name, "score": 1})).is_ok());
    }

    #[test]
    fn test_score_rules() {
        let cases = [
            json!({"player_name": "Ann", "score": -5}),
            json!({"player_name": "Ann", "score": 4.5}),
            json!({"player_name": "Ann", "score": 42.0}),
            json!({"player_name": "Ann", "score": "42"}),
            json!({"player_name": "Ann", "score": true}),
            json!({"player_name": "Ann"}),
        ];
        for body in cases {
            assert_eq!(
                NewScore::from_json(&body),
                Err(ValidationError::InvalidScore),
                "body: {}",
                body
            );
        }
    }

    #[test]
    fn test_hodl_must_be_bool() {
        let err = NewScore::from_json(&json!({"player_name": "Ann", "score": 1, "hodl": "yes"}))
            .unwrap_err();
        assert_eq!(err, ValidationError::InvalidHodl);

        let err = NewScore::from_json(&json!({"player_name": "Ann", "score": 1, "hodl": null}))
            .unwrap_err();
        assert_eq!(err, ValidationError::InvalidHodl);
    }

    #[test]
    fn test_non_object_body() {
        assert_eq!(
            NewScore::from_json(&json!([1, 2, 3])),
            Err(ValidationError::InvalidBody)
        );
    }

    #[test]
    fn test_sort_parsing_is_lenient() {
        assert_eq!(SortField::parse_lenient(Some("date")), SortField::Date);
        assert_eq!(SortField::parse_lenient(Some("nope")), SortField::Score);
        assert_eq!(SortField::parse_lenient(None), SortField::Score);
        assert_eq!(SortOrder::parse_lenient(Some("asc")), SortOrder::Asc);
        assert_eq!(SortOrder::parse_lenient(Some("ASC")), SortOrder::Desc);
        assert_eq!(SortOrder::parse_lenient(None), SortOrder::Desc);
    }
}
