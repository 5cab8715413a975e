use async_trait::async_trait;

use quiz_core::model::{ExamKey, Scope, Snapshot};

use crate::repository::{SnapshotRepository, StorageError};

use super::SqliteRepository;
use super::mapping::{conn, map_key_row, map_snapshot_row, snapshot_columns};

#[async_trait]
impl SnapshotRepository for SqliteRepository {
    async fn load(&self, key: &ExamKey) -> Result<Option<Snapshot>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT working_set, cursor, answers, started_at, last_updated_at
            FROM progress_snapshots
            WHERE category = ?1 AND subcategory = ?2 AND selector = ?3
            ",
        )
        .bind(key.category.as_str())
        .bind(key.subcategory.as_str())
        .bind(key.selector.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_snapshot_row).transpose()
    }

    async fn save(&self, key: &ExamKey, snapshot: &Snapshot) -> Result<(), StorageError> {
        let (working_set, cursor, answers) = snapshot_columns(snapshot)?;

        sqlx::query(
            r"
            INSERT INTO progress_snapshots (
                category, subcategory, selector,
                working_set, cursor, answers, started_at, last_updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(category, subcategory, selector) DO UPDATE SET
                working_set = excluded.working_set,
                cursor = excluded.cursor,
                answers = excluded.answers,
                started_at = excluded.started_at,
                last_updated_at = excluded.last_updated_at
            ",
        )
        .bind(key.category.as_str())
        .bind(key.subcategory.as_str())
        .bind(key.selector.to_string())
        .bind(working_set)
        .bind(cursor)
        .bind(answers)
        .bind(snapshot.started_at)
        .bind(snapshot.last_updated_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn clear(&self, key: &ExamKey) -> Result<(), StorageError> {
        sqlx::query(
            r"
            DELETE FROM progress_snapshots
            WHERE category = ?1 AND subcategory = ?2 AND selector = ?3
            ",
        )
        .bind(key.category.as_str())
        .bind(key.subcategory.as_str())
        .bind(key.selector.to_string())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn list_for_scope(
        &self,
        scope: &Scope,
    ) -> Result<Vec<(ExamKey, Snapshot)>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT category, subcategory, selector,
                   working_set, cursor, answers, started_at, last_updated_at
            FROM progress_snapshots
            WHERE category = ?1 AND subcategory = ?2
            ORDER BY selector
            ",
        )
        .bind(scope.category.as_str())
        .bind(scope.subcategory.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            entries.push((map_key_row(row)?, map_snapshot_row(row)?));
        }
        Ok(entries)
    }
}
