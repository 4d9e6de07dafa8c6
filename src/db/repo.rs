//! Repository layer for leaderboard persistence.

use crate::domain::{LeaderboardEntry, NewScore, SortField, SortOrder};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::warn;
use uuid::Uuid;

/// One page of leaderboard results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardPage {
    pub entries: Vec<LeaderboardEntry>,
    pub total_pages: i64,
    pub current_page: i64,
}

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Persist a validated score as a new, immutable entry.
    ///
    /// # Errors
    /// Returns an error if the insert fails. Nothing is written in that case.
    pub async fn insert_entry(
        &self,
        score: &NewScore,
        created_at: DateTime<Utc>,
    ) -> Result<LeaderboardEntry, sqlx::Error> {
        let entry = LeaderboardEntry {
            id: Uuid::new_v4(),
            player_name: score.player_name.clone(),
            score: score.score,
            hodl: score.hodl,
            created_at,
        };

        sqlx::query(
            r#"
            INSERT INTO leaderboard_entries (id, player_name, score, hodl, created_at_ms)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.player_name.as_str())
        .bind(entry.score)
        .bind(entry.hodl)
        .bind(entry.created_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Total number of entries.
    pub async fn count_entries(&self) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM leaderboard_entries")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("n"))
    }

    /// Query one page of entries.
    ///
    /// Pages are 1-based; a page past the end yields no entries. Ties are
    /// broken by creation time and then id, in the same direction, so paging
    /// is stable.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn query_page(
        &self,
        sort: SortField,
        order: SortOrder,
        page: i64,
        per_page: i64,
    ) -> Result<LeaderboardPage, sqlx::Error> {
        let page = page.max(1);
        let per_page = per_page.max(1);

        let dir = match order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let order_by = match sort {
            SortField::Score => format!("score {dir}, created_at_ms {dir}, id {dir}"),
            SortField::Date => format!("created_at_ms {dir}, id {dir}"),
        };
        let sql = format!(
            "SELECT id, player_name, score, hodl, created_at_ms \
             FROM leaderboard_entries ORDER BY {order_by} LIMIT ? OFFSET ?"
        );

        let rows = sqlx::query(&sql)
            .bind(per_page)
            .bind((page - 1).saturating_mul(per_page))
            .fetch_all(&self.pool)
            .await?;

        let total = self.count_entries().await?;
        let total_pages = (total + per_page - 1) / per_page;

        Ok(LeaderboardPage {
            entries: rows.iter().map(entry_from_row).collect(),
            total_pages,
            current_page: page,
        })
    }
}

fn entry_from_row(row: &SqliteRow) -> LeaderboardEntry {
    let id_str: String = row.get("id");
    let created_at_ms: i64 = row.get("created_at_ms");

    let id = Uuid::parse_str(&id_str).unwrap_or_else(|e| {
        warn!(id = %id_str, error = %e, "Failed to parse leaderboard entry id, using nil");
        Uuid::nil()
    });
    let created_at = DateTime::<Utc>::from_timestamp_millis(created_at_ms).unwrap_or_else(|| {
        warn!(id = %id_str, created_at_ms, "Invalid leaderboard timestamp, using epoch");
        DateTime::<Utc>::default()
    });

    LeaderboardEntry {
        id,
        player_name: row.get("player_name"),
        score: row.get("score"),
        hodl: row.get("hodl"),
        created_at,
    }
}
