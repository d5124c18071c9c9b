use async_trait::async_trait;

use crate::domain::error::{Availability, Result};
use crate::domain::repository::TodoItemRepository;
use crate::domain::todo_item::{
    INITIAL_STATUS, ListQuery, OrderBy, SortPolicy, TodoItem, TodoItemId,
};

/// Number of records a write changed: 0 when there was nothing to change,
/// 1 on success.
pub type AffectedCount = u64;

/// Queries and commands over todo items.
///
/// Routine misses are encoded in the return values. Only conflicts and store
/// faults come back as errors, and none of them are retried here.
#[async_trait]
pub trait TodoItemService: Send + Sync + 'static {
    async fn list(&self, query: ListQuery) -> Result<Availability<Vec<TodoItem>>>;
    async fn get_by_id(&self, id: TodoItemId) -> Result<Availability<Option<TodoItem>>>;
    /// The caller has already checked that `id == item.id`.
    async fn update(&self, id: TodoItemId, item: TodoItem) -> Result<AffectedCount>;
    /// On success `item` carries the assigned id and the initial status.
    async fn add(&self, item: &mut TodoItem) -> Result<AffectedCount>;
    async fn delete(&self, id: TodoItemId) -> Result<AffectedCount>;
}

#[derive(Clone)]
pub struct TodoItemServiceImpl<R: TodoItemRepository> {
    repo: R,
    sort_policy: SortPolicy,
}

impl<R: TodoItemRepository> TodoItemServiceImpl<R> {
    pub fn new(repo: R) -> Self {
        Self::with_sort_policy(repo, SortPolicy::default())
    }

    pub fn with_sort_policy(repo: R, sort_policy: SortPolicy) -> Self {
        Self { repo, sort_policy }
    }
}

#[async_trait]
impl<R: TodoItemRepository> TodoItemService for TodoItemServiceImpl<R> {
    async fn list(&self, query: ListQuery) -> Result<Availability<Vec<TodoItem>>> {
        if !self.repo.is_available().await {
            tracing::debug!("list against unavailable store");
            return Ok(Availability::Unavailable);
        }
        let order =
            OrderBy::resolve(query.sort_by.as_deref(), query.is_descending, self.sort_policy);
        let items = self.repo.enumerate(&query.filter, order).await?;
        tracing::debug!(count = items.len(), ?order, "listed todo items");
        Ok(Availability::Available(items))
    }

    async fn get_by_id(&self, id: TodoItemId) -> Result<Availability<Option<TodoItem>>> {
        if !self.repo.is_available().await {
            return Ok(Availability::Unavailable);
        }
        Ok(Availability::Available(self.repo.get(id).await?))
    }

    async fn update(&self, id: TodoItemId, item: TodoItem) -> Result<AffectedCount> {
        if !self.repo.is_available().await || !self.repo.contains(id).await? {
            tracing::debug!(%id, "update skipped, no such todo item");
            return Ok(0);
        }
        if let Err(err) = self.repo.update(&item).await {
            if err.is_conflict() {
                tracing::warn!(%id, "todo item changed during update");
            }
            return Err(err);
        }
        Ok(1)
    }

    async fn add(&self, item: &mut TodoItem) -> Result<AffectedCount> {
        if !self.repo.is_available().await {
            return Ok(0);
        }
        // New items always start out as "todo"; a caller supplied status is
        // overwritten, not rejected.
        item.status = INITIAL_STATUS.to_string();
        item.id = self.repo.insert(item).await?;
        tracing::debug!(id = %item.id, "added todo item");
        Ok(1)
    }

    async fn delete(&self, id: TodoItemId) -> Result<AffectedCount> {
        if !self.repo.is_available().await || !self.repo.contains(id).await? {
            return Ok(0);
        }
        // Another deleter may have won the race since the existence check.
        if self.repo.get(id).await?.is_none() {
            tracing::debug!(%id, "todo item vanished before delete");
            return Ok(0);
        }
        if let Err(err) = self.repo.delete(id).await {
            if err.is_conflict() {
                tracing::warn!(%id, "todo item changed during delete");
            }
            return Err(err);
        }
        Ok(1)
    }
}
