use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    error::{Result, StoreError},
    repository::TodoItemRepository,
    todo_item::{OrderBy, TodoItem, TodoItemFilter, TodoItemId},
};

#[derive(Debug, Error)]
#[error("todo_items table is not provisioned")]
struct NotProvisioned;

#[derive(Default)]
struct Table {
    provisioned: bool,
    last_id: i64,
    items: BTreeMap<TodoItemId, TodoItem>,
}

impl Table {
    fn ensure_provisioned(&mut self) -> Result<&mut Self> {
        if self.provisioned { Ok(self) } else { Err(StoreError::fault(NotProvisioned)) }
    }
}

/// Process-local store, ordered by id. Starts unprovisioned until `init`.
#[derive(Clone, Default)]
pub struct InMemoryTodoItemRepository {
    table: Arc<Mutex<Table>>,
}

impl InMemoryTodoItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TodoItemRepository for InMemoryTodoItemRepository {
    async fn init(&self) -> Result<()> {
        self.table().provisioned = true;
        Ok(())
    }

    async fn is_available(&self) -> bool {
        self.table().provisioned
    }

    async fn insert(&self, item: &TodoItem) -> Result<TodoItemId> {
        let mut guard = self.table();
        let table = guard.ensure_provisioned()?;
        table.last_id += 1;
        let id = TodoItemId(table.last_id);
        table.items.insert(id, TodoItem { id, ..item.clone() });
        Ok(id)
    }

    async fn get(&self, id: TodoItemId) -> Result<Option<TodoItem>> {
        let mut guard = self.table();
        Ok(guard.ensure_provisioned()?.items.get(&id).cloned())
    }

    async fn contains(&self, id: TodoItemId) -> Result<bool> {
        let mut guard = self.table();
        Ok(guard.ensure_provisioned()?.items.contains_key(&id))
    }

    async fn update(&self, item: &TodoItem) -> Result<()> {
        let mut guard = self.table();
        match guard.ensure_provisioned()?.items.get_mut(&item.id) {
            Some(stored) => {
                *stored = item.clone();
                Ok(())
            }
            None => Err(StoreError::Conflict(item.id)),
        }
    }

    async fn delete(&self, id: TodoItemId) -> Result<()> {
        let mut guard = self.table();
        match guard.ensure_provisioned()?.items.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::Conflict(id)),
        }
    }

    async fn enumerate(&self, filter: &TodoItemFilter, order: OrderBy) -> Result<Vec<TodoItem>> {
        let mut guard = self.table();
        let mut items: Vec<TodoItem> = guard
            .ensure_provisioned()?
            .items
            .values()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect();
        items.sort_by(|a, b| order.compare(a, b));
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::todo_item::{parse_due_date, SortKey};

    fn item(name: &str) -> TodoItem {
        TodoItem {
            id: TodoItemId::default(),
            name: name.into(),
            description: String::new(),
            due_date: parse_due_date("2023-02-06").unwrap(),
            status: "todo".into(),
        }
    }

    #[tokio::test]
    async fn unprovisioned_store_is_unavailable_and_faults() {
        let repo = InMemoryTodoItemRepository::new();
        assert!(!repo.is_available().await);
        assert!(matches!(repo.insert(&item("a")).await, Err(StoreError::Fault(_))));
    }

    #[tokio::test]
    async fn ids_are_never_reused() {
        let repo = InMemoryTodoItemRepository::new();
        repo.init().await.unwrap();
        let first = repo.insert(&item("a")).await.unwrap();
        let second = repo.insert(&item("b")).await.unwrap();
        repo.delete(second).await.unwrap();
        let third = repo.insert(&item("c")).await.unwrap();
        assert_eq!(first, TodoItemId(1));
        assert_eq!(third, TodoItemId(3));
    }

    #[tokio::test]
    async fn write_to_missing_row_is_a_conflict() {
        let repo = InMemoryTodoItemRepository::new();
        repo.init().await.unwrap();
        let ghost = TodoItem { id: TodoItemId(9), ..item("ghost") };
        assert!(repo.update(&ghost).await.unwrap_err().is_conflict());
        assert!(repo.delete(TodoItemId(9)).await.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn enumerate_sorts_descending_by_id() {
        let repo = InMemoryTodoItemRepository::new();
        repo.init().await.unwrap();
        for name in ["a", "b", "c"] {
            repo.insert(&item(name)).await.unwrap();
        }
        let order = OrderBy { key: SortKey::Id, descending: true };
        let items = repo.enumerate(&TodoItemFilter::default(), order).await.unwrap();
        let ids: Vec<i64> = items.iter().map(|i| i.id.0).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }
}
