use async_trait::async_trait;

use quiz_core::model::{Question, QuestionId, Scope};

use crate::repository::{HistoryRepository, StorageError};

use super::SqliteRepository;
use super::mapping::{conn, map_question_row, question_id_to_i64, ser};

impl SqliteRepository {
    async fn questions_in(
        &self,
        table: &'static str,
        scope: &Scope,
    ) -> Result<Vec<Question>, StorageError> {
        // rowid preserves insertion order, the contract for history lists.
        let rows = sqlx::query(&format!(
            r"
            SELECT question FROM {table}
            WHERE category = ?1 AND subcategory = ?2
            ORDER BY rowid
            "
        ))
        .bind(scope.category.as_str())
        .bind(scope.subcategory.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_question_row).collect()
    }

    async fn insert_question(
        &self,
        table: &'static str,
        scope: &Scope,
        question: &Question,
    ) -> Result<(), StorageError> {
        let json = serde_json::to_string(question).map_err(ser)?;
        sqlx::query(&format!(
            r"
            INSERT INTO {table} (category, subcategory, question_id, question)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(category, subcategory, question_id) DO NOTHING
            "
        ))
        .bind(scope.category.as_str())
        .bind(scope.subcategory.as_str())
        .bind(question_id_to_i64(question.id())?)
        .bind(json)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}

#[async_trait]
impl HistoryRepository for SqliteRepository {
    async fn saved_questions(&self, scope: &Scope) -> Result<Vec<Question>, StorageError> {
        self.questions_in("saved_questions", scope).await
    }

    async fn add_saved(&self, scope: &Scope, question: &Question) -> Result<(), StorageError> {
        self.insert_question("saved_questions", scope, question).await
    }

    async fn remove_saved(&self, scope: &Scope, id: QuestionId) -> Result<(), StorageError> {
        sqlx::query(
            r"
            DELETE FROM saved_questions
            WHERE category = ?1 AND subcategory = ?2 AND question_id = ?3
            ",
        )
        .bind(scope.category.as_str())
        .bind(scope.subcategory.as_str())
        .bind(question_id_to_i64(id)?)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn wrong_questions(&self, scope: &Scope) -> Result<Vec<Question>, StorageError> {
        self.questions_in("wrong_answers", scope).await
    }

    async fn record_wrong(&self, scope: &Scope, question: &Question) -> Result<(), StorageError> {
        self.insert_question("wrong_answers", scope, question).await
    }

    async fn clear_wrong(&self, scope: &Scope) -> Result<(), StorageError> {
        sqlx::query(
            r"
            DELETE FROM wrong_answers
            WHERE category = ?1 AND subcategory = ?2
            ",
        )
        .bind(scope.category.as_str())
        .bind(scope.subcategory.as_str())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
