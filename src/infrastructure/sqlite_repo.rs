use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, QueryBuilder, Row, Sqlite,
};

use crate::domain::{
    error::{Result, StoreError},
    repository::TodoItemRepository,
    todo_item::{OrderBy, SortKey, TodoItem, TodoItemFilter, TodoItemId},
};

const TABLE: &str = "todo_items";
const COLUMNS: &str = "id, name, description, due_date, status";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::fault(err)
    }
}

#[derive(Clone)]
pub struct SqliteTodoItemRepository {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteTodoItemRepository {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every connection to an in-memory database gets its own empty
        // database, so the pool must hold on to exactly one.
        let pool = if is_memory_url(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };
        tracing::debug!(%database_url, "connected to sqlite");
        Ok(Self { pool: Arc::new(pool) })
    }
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

#[async_trait]
impl TodoItemRepository for SqliteTodoItemRepository {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todo_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                due_date TEXT NOT NULL,
                status TEXT NOT NULL
            )",
        )
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    async fn is_available(&self) -> bool {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        )
        .bind(TABLE)
        .fetch_one(&*self.pool)
        .await;
        match found {
            Ok(count) => count > 0,
            Err(err) => {
                tracing::warn!(error = %err, "todo item store unreachable");
                false
            }
        }
    }

    async fn insert(&self, item: &TodoItem) -> Result<TodoItemId> {
        let result = sqlx::query(
            "INSERT INTO todo_items (name, description, due_date, status)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.due_date)
        .bind(&item.status)
        .execute(&*self.pool)
        .await?;
        Ok(TodoItemId(result.last_insert_rowid()))
    }

    async fn get(&self, id: TodoItemId) -> Result<Option<TodoItem>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = ?1"))
            .bind(id.0)
            .fetch_optional(&*self.pool)
            .await?;
        Ok(row.map(row_to_item).transpose()?)
    }

    async fn contains(&self, id: TodoItemId) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM todo_items WHERE id = ?1")
            .bind(id.0)
            .fetch_one(&*self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn update(&self, item: &TodoItem) -> Result<()> {
        let result = sqlx::query(
            "UPDATE todo_items
             SET name = ?2, description = ?3, due_date = ?4, status = ?5
             WHERE id = ?1",
        )
        .bind(item.id.0)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.due_date)
        .bind(&item.status)
        .execute(&*self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(item.id));
        }
        Ok(())
    }

    async fn delete(&self, id: TodoItemId) -> Result<()> {
        let result = sqlx::query("DELETE FROM todo_items WHERE id = ?1")
            .bind(id.0)
            .execute(&*self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(id));
        }
        Ok(())
    }

    async fn enumerate(&self, filter: &TodoItemFilter, order: OrderBy) -> Result<Vec<TodoItem>> {
        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM {TABLE} WHERE 1 = 1"));

        // Text filters fold case in Rust below; SQLite's lower() is ASCII only.
        if let Some(day) = filter.due_day() {
            query
                .push(" AND CAST(strftime('%d', due_date) AS INTEGER) = ")
                .push_bind(i64::from(day));
        }

        let direction = if order.descending { "DESC" } else { "ASC" };
        match order.key {
            SortKey::Id => query.push(format!(" ORDER BY id {direction}")),
            key => query.push(format!(" ORDER BY {} {direction}, id {direction}", key.column())),
        };

        let rows = query.build().fetch_all(&*self.pool).await?;
        let mut items = rows
            .into_iter()
            .map(row_to_item)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        items.retain(|item| filter.matches(item));
        Ok(items)
    }
}

fn row_to_item(row: SqliteRow) -> std::result::Result<TodoItem, sqlx::Error> {
    Ok(TodoItem {
        id: TodoItemId(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        due_date: row.try_get("due_date")?,
        status: row.try_get("status")?,
    })
}
