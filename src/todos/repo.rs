use sqlx::PgPool;

use crate::todos::repo_types::Todo;

impl Todo {
    pub async fn create(
        db: &PgPool,
        user_id: i64,
        title: &str,
        description: &str,
    ) -> anyhow::Result<Todo> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (title, description, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, user_id, created_at
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(user_id)
        .fetch_one(db)
        .await?;
        Ok(todo)
    }

    pub async fn list_by_user(db: &PgPool, user_id: i64) -> anyhow::Result<Vec<Todo>> {
        let rows = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, title, description, user_id, created_at
            FROM todos
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(
        db: &PgPool,
        user_id: i64,
        todo_id: i64,
    ) -> anyhow::Result<Option<Todo>> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, title, description, user_id, created_at
            FROM todos
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(todo_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(todo)
    }

    /// Returns the number of rows touched; an update of someone else's todo
    /// (or a missing id) touches zero rows.
    pub async fn update(
        db: &PgPool,
        user_id: i64,
        todo_id: i64,
        title: &str,
        description: &str,
    ) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE todos
            SET title = $1, description = $2
            WHERE id = $3 AND user_id = $4
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(todo_id)
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(db: &PgPool, user_id: i64, todo_id: i64) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM todos
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(todo_id)
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }
}
