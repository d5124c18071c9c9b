use async_trait::async_trait;

use super::error::Result;
use super::todo_item::{OrderBy, TodoItem, TodoItemFilter, TodoItemId};

/// Durable keyed collection of todo items.
///
/// Implementations assign ids on insert and never hand the same id out twice
/// during the store's lifetime.
#[async_trait]
pub trait TodoItemRepository: Send + Sync + 'static {
    /// Provision the backing table. Idempotent.
    async fn init(&self) -> Result<()>;

    /// Whether the store is reachable and provisioned. Never fails; an
    /// unreachable store is simply unavailable.
    async fn is_available(&self) -> bool;

    /// Persist `item` under a freshly assigned id and return that id. The
    /// `id` carried by `item` is ignored.
    async fn insert(&self, item: &TodoItem) -> Result<TodoItemId>;

    async fn get(&self, id: TodoItemId) -> Result<Option<TodoItem>>;

    async fn contains(&self, id: TodoItemId) -> Result<bool>;

    /// Replace the stored item sharing `item.id`. Callers check `contains`
    /// first; a row missing at write time is reported as a conflict.
    async fn update(&self, item: &TodoItem) -> Result<()>;

    /// Remove the item. A row missing at write time is reported as a
    /// conflict.
    async fn delete(&self, id: TodoItemId) -> Result<()>;

    /// Items matching `filter`, materialised in `order`.
    async fn enumerate(&self, filter: &TodoItemFilter, order: OrderBy) -> Result<Vec<TodoItem>>;
}
