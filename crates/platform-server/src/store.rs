//! Storage abstraction
//!
//! This module provides the datastore trait the services run against
//! and an in-memory implementation for single-process use and testing.
//! Role updates go through a compare-and-set so concurrent moderation
//! cannot double-apply a promotion.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use platform_moderation::{ContentItem, ContentKind};
use platform_roles::{UserAccount, UserRole};

/// Storage error types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The record does not exist
    #[error("record not found")]
    NotFound,

    /// The backend failed
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Datastore trait for user accounts and content items.
///
/// There is deliberately no delete operation: content is retained for
/// audit and removal is expressed as a withdrawn update.
#[async_trait]
pub trait PlatformStore: Send + Sync {
    /// Fetch a user account by ID.
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<UserAccount>>;

    /// Insert or replace a user account.
    async fn put_user(&self, account: UserAccount) -> StoreResult<()>;

    /// Update a user's role, compare-and-set on the current role.
    ///
    /// # Arguments
    ///
    /// * `id` - The user to update
    /// * `expected` - The role the caller last observed
    /// * `next` - The role to store
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the swap applied, `Ok(false)` if the stored role no
    /// longer matched `expected`
    async fn update_user_role(
        &self,
        id: Uuid,
        expected: UserRole,
        next: UserRole,
    ) -> StoreResult<bool>;

    /// Fetch a content item by ID.
    async fn get_content(&self, id: Uuid) -> StoreResult<Option<ContentItem>>;

    /// Insert a new content item.
    async fn put_content(&self, item: ContentItem) -> StoreResult<()>;

    /// Replace a content item, compare-and-set on its update stamp.
    ///
    /// Mutating handlers read an item, apply a transition, and commit
    /// through this so an interleaved write cannot be silently
    /// overwritten with the stale copy.
    ///
    /// # Arguments
    ///
    /// * `id` - The item to replace
    /// * `expected` - The `updated_at` the caller last observed
    /// * `next` - The item to store
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the swap applied, `Ok(false)` if the stored item
    /// changed since the caller read it
    async fn update_content(
        &self,
        id: Uuid,
        expected: DateTime<Utc>,
        next: ContentItem,
    ) -> StoreResult<bool>;

    /// List all items of a kind, oldest first.
    async fn list_content(&self, kind: ContentKind) -> StoreResult<Vec<ContentItem>>;
}

/// In-memory datastore implementation.
///
/// This is suitable for single-process deployments and testing. All
/// collections live behind async read-write locks.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<Uuid, UserAccount>>>,
    content: Arc<RwLock<HashMap<Uuid, ContentItem>>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlatformStore for MemoryStore {
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<UserAccount>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn put_user(&self, account: UserAccount) -> StoreResult<()> {
        self.users.write().await.insert(account.id, account);
        Ok(())
    }

    async fn update_user_role(
        &self,
        id: Uuid,
        expected: UserRole,
        next: UserRole,
    ) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        let account = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        if account.role != expected {
            return Ok(false);
        }
        account.role = next;
        account.updated_at = Utc::now();
        Ok(true)
    }

    async fn get_content(&self, id: Uuid) -> StoreResult<Option<ContentItem>> {
        Ok(self.content.read().await.get(&id).cloned())
    }

    async fn put_content(&self, item: ContentItem) -> StoreResult<()> {
        self.content.write().await.insert(item.id, item);
        Ok(())
    }

    async fn update_content(
        &self,
        id: Uuid,
        expected: DateTime<Utc>,
        next: ContentItem,
    ) -> StoreResult<bool> {
        let mut content = self.content.write().await;
        let item = content.get_mut(&id).ok_or(StoreError::NotFound)?;
        if item.updated_at != expected {
            return Ok(false);
        }
        *item = next;
        Ok(true)
    }

    async fn list_content(&self, kind: ContentKind) -> StoreResult<Vec<ContentItem>> {
        let content = self.content.read().await;
        let mut items: Vec<ContentItem> =
            content.values().filter(|i| i.kind == kind).cloned().collect();
        items.sort_by_key(|i| i.created_at);
        Ok(items)
    }
}
