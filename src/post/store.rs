//! Post persistence — store trait and the in-memory backend.
//!
//! The trait is the seam a SQL backend would implement; the core only
//! needs `save` / `find_by_id`, the HTTP surface adds paginated listing,
//! and startup recovery needs the unprocessed scan.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;

use super::model::Post;

/// One page of post summaries plus paging metadata.
#[derive(Debug, Clone)]
pub struct PostPage {
    pub items: Vec<Post>,
    pub page: usize,
    pub size: usize,
    pub total: usize,
}

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert or replace a post by id.
    async fn save(&self, post: Post) -> Result<(), StoreError>;

    /// Look up a post. Absence is a regular outcome, not an error.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError>;

    /// List posts in creation order, zero-based page of `size` items.
    async fn list(&self, page: usize, size: usize) -> Result<PostPage, StoreError>;

    /// Posts still missing their processing result.
    async fn unprocessed(&self) -> Result<Vec<Post>, StoreError>;

    /// Remove a post. Returns whether it existed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// In-memory store. Keeps insertion order for stable listing.
#[derive(Default)]
pub struct MemoryPostStore {
    inner: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    posts: HashMap<Uuid, Post>,
    order: Vec<Uuid>,
}

impl MemoryPostStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn save(&self, post: Post) -> Result<(), StoreError> {
        let mut state = self.inner.write().await;
        if state.posts.insert(post.id, post.clone()).is_none() {
            state.order.push(post.id);
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        Ok(self.inner.read().await.posts.get(&id).cloned())
    }

    async fn list(&self, page: usize, size: usize) -> Result<PostPage, StoreError> {
        let state = self.inner.read().await;
        let total = state.order.len();
        let items = state
            .order
            .iter()
            .skip(page.saturating_mul(size))
            .take(size)
            .filter_map(|id| state.posts.get(id).cloned())
            .collect();
        Ok(PostPage {
            items,
            page,
            size,
            total,
        })
    }

    async fn unprocessed(&self) -> Result<Vec<Post>, StoreError> {
        let state = self.inner.read().await;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.posts.get(id))
            .filter(|post| !post.is_processed())
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.inner.write().await;
        let existed = state.posts.remove(&id).is_some();
        if existed {
            state.order.retain(|other| *other != id);
        }
        Ok(existed)
    }
}
