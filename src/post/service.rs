//! Post service — create, lookup, listing, result application and
//! startup recovery.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::messages::ProcessingResult;

use super::model::{Post, PostDraft};
use super::publisher::EventPublisher;
use super::store::{PostPage, PostStore};

pub struct PostService {
    store: Arc<dyn PostStore>,
    publisher: Arc<dyn EventPublisher>,
}

impl PostService {
    pub fn new(store: Arc<dyn PostStore>, publisher: Arc<dyn EventPublisher>) -> Arc<Self> {
        Arc::new(Self { store, publisher })
    }

    /// Create a post: save it, then publish the processing request.
    ///
    /// Publish failure is a hard error of the create flow, but the saved
    /// post is kept — it stays unprocessed and is picked up by
    /// [`recover_unprocessed`](Self::recover_unprocessed) on the next
    /// boot. There is no rollback of the save.
    pub async fn create(&self, draft: PostDraft) -> Result<Post> {
        let post = Post::from_draft(draft);
        info!(post_id = %post.id, author = %post.author, "Creating post");

        self.store.save(post.clone()).await?;
        self.publisher.publish_post_created(&post).await?;

        Ok(post)
    }

    /// Apply a processing result to the stored post.
    ///
    /// A missing post is a no-op: the record may have been deleted while
    /// the result was in flight, and the result is then simply stale.
    /// Re-applying the same result (duplicate delivery) is idempotent.
    pub async fn apply_result(&self, result: &ProcessingResult) -> std::result::Result<(), StoreError> {
        match self.store.find_by_id(result.post_id).await? {
            Some(mut post) => {
                post.apply_result(result);
                self.store.save(post).await?;
                info!(
                    post_id = %result.post_id,
                    word_count = result.word_count,
                    price = %result.price,
                    "Post enriched with processing result"
                );
            }
            None => {
                debug!(
                    post_id = %result.post_id,
                    "Result for unknown post, discarding"
                );
            }
        }
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.store.find_by_id(id).await?)
    }

    pub async fn list(&self, page: usize, size: usize) -> Result<PostPage> {
        Ok(self.store.list(page, size).await?)
    }

    /// Republish processing requests for every post still unprocessed.
    ///
    /// Run once at startup: closes the window where a post was saved but
    /// its request was lost to a publish failure. Safe because the
    /// processor is pure and result application is idempotent.
    pub async fn recover_unprocessed(&self) -> Result<usize> {
        let pending = self.store.unprocessed().await?;
        let mut recovered = 0;
        for post in &pending {
            match self.publisher.publish_post_created(post).await {
                Ok(()) => recovered += 1,
                Err(e) => {
                    warn!(post_id = %post.id, error = %e, "Recovery publish failed");
                }
            }
        }
        if recovered > 0 {
            info!(recovered, "Republished requests for unprocessed posts");
        }
        Ok(recovered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BrokerError, Error};
    use crate::post::store::MemoryPostStore;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    /// Records published post ids; fails on demand.
    #[derive(Default)]
    struct RecordingPublisher {
        published: Mutex<Vec<Uuid>>,
        fail: bool,
    }

    #[async_trait]
    impl EventPublisher for RecordingPublisher {
        async fn publish_post_created(&self, post: &Post) -> std::result::Result<(), BrokerError> {
            if self.fail {
                return Err(BrokerError::ExchangeNotFound("down".into()));
            }
            self.published.lock().unwrap().push(post.id);
            Ok(())
        }
    }

    fn draft() -> PostDraft {
        PostDraft {
            title: "t".into(),
            body: "Hello world".into(),
            author: "Alice".into(),
        }
    }

    #[tokio::test]
    async fn create_saves_and_publishes() {
        let store = MemoryPostStore::new();
        let publisher = Arc::new(RecordingPublisher::default());
        let service = PostService::new(store.clone(), publisher.clone());

        let post = service.create(draft()).await.unwrap();

        assert!(store.find_by_id(post.id).await.unwrap().is_some());
        assert_eq!(*publisher.published.lock().unwrap(), vec![post.id]);
    }

    #[tokio::test]
    async fn publish_failure_keeps_the_saved_post() {
        let store = MemoryPostStore::new();
        let publisher = Arc::new(RecordingPublisher {
            fail: true,
            ..Default::default()
        });
        let service = PostService::new(store.clone(), publisher);

        let err = service.create(draft()).await.unwrap_err();
        assert!(matches!(err, Error::Broker(_)));

        // The post survived the failed publish, still unprocessed.
        let pending = store.unprocessed().await.unwrap();
        assert_eq!(pending.len(), 1);
    }

    #[tokio::test]
    async fn apply_result_enriches_the_post() {
        let store = MemoryPostStore::new();
        let service = PostService::new(store.clone(), Arc::new(RecordingPublisher::default()));
        let post = service.create(draft()).await.unwrap();

        let result = ProcessingResult {
            post_id: post.id,
            word_count: 2,
            price: dec!(0.20),
        };
        service.apply_result(&result).await.unwrap();

        let enriched = store.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(enriched.word_count, Some(2));
        assert_eq!(enriched.price, Some(dec!(0.20)));
    }

    #[tokio::test]
    async fn duplicate_result_application_is_idempotent() {
        let store = MemoryPostStore::new();
        let service = PostService::new(store.clone(), Arc::new(RecordingPublisher::default()));
        let post = service.create(draft()).await.unwrap();

        let result = ProcessingResult {
            post_id: post.id,
            word_count: 2,
            price: dec!(0.20),
        };
        service.apply_result(&result).await.unwrap();
        let once = store.find_by_id(post.id).await.unwrap().unwrap();
        service.apply_result(&result).await.unwrap();
        let twice = store.find_by_id(post.id).await.unwrap().unwrap();

        assert_eq!(once.word_count, twice.word_count);
        assert_eq!(once.price, twice.price);
    }

    #[tokio::test]
    async fn stale_result_is_a_silent_no_op() {
        let store = MemoryPostStore::new();
        let service = PostService::new(store.clone(), Arc::new(RecordingPublisher::default()));

        let result = ProcessingResult {
            post_id: Uuid::new_v4(),
            word_count: 9,
            price: dec!(0.90),
        };
        // No error, and no record is created.
        service.apply_result(&result).await.unwrap();
        assert_eq!(store.list(0, 10).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn recovery_republishes_only_unprocessed_posts() {
        let store = MemoryPostStore::new();
        let publisher = Arc::new(RecordingPublisher::default());
        let service = PostService::new(store.clone(), publisher.clone());

        let stuck = service.create(draft()).await.unwrap();
        let done = service.create(draft()).await.unwrap();
        service
            .apply_result(&ProcessingResult {
                post_id: done.id,
                word_count: 2,
                price: dec!(0.20),
            })
            .await
            .unwrap();
        publisher.published.lock().unwrap().clear();

        let recovered = service.recover_unprocessed().await.unwrap();

        assert_eq!(recovered, 1);
        assert_eq!(*publisher.published.lock().unwrap(), vec![stuck.id]);
    }
}
