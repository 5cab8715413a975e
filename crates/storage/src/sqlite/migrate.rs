use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates the full schema: progress snapshots keyed by
/// (category, subcategory, selector), plus per-scope bookmark and
/// wrong-answer history tables whose rowid preserves insertion order.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS progress_snapshots (
                    category TEXT NOT NULL,
                    subcategory TEXT NOT NULL,
                    selector TEXT NOT NULL,
                    working_set TEXT NOT NULL,
                    cursor INTEGER NOT NULL CHECK (cursor >= 0),
                    answers TEXT NOT NULL,
                    started_at TEXT NOT NULL,
                    last_updated_at TEXT NOT NULL,
                    PRIMARY KEY (category, subcategory, selector)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS saved_questions (
                    category TEXT NOT NULL,
                    subcategory TEXT NOT NULL,
                    question_id INTEGER NOT NULL,
                    question TEXT NOT NULL,
                    PRIMARY KEY (category, subcategory, question_id)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS wrong_answers (
                    category TEXT NOT NULL,
                    subcategory TEXT NOT NULL,
                    question_id INTEGER NOT NULL,
                    question TEXT NOT NULL,
                    PRIMARY KEY (category, subcategory, question_id)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_snapshots_scope
                    ON progress_snapshots (category, subcategory);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
