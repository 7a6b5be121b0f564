//! Post domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::messages::ProcessingResult;

/// How many leading lines of the body make up the list-view summary.
const SUMMARY_LINES: usize = 3;

/// A user-submitted post.
///
/// `word_count` and `price` are either both absent (not yet processed) or
/// both present; they are set exactly once by the result-handling path.
/// The body is immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub author: String,
    pub word_count: Option<u32>,
    pub price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating a post.
#[derive(Debug, Clone, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
    pub author: String,
}

impl Post {
    /// Build a new unprocessed post with a fresh id.
    pub fn from_draft(draft: PostDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            body: draft.body,
            author: draft.author,
            word_count: None,
            price: None,
            created_at: Utc::now(),
        }
    }

    /// Whether the processing result has been applied.
    pub fn is_processed(&self) -> bool {
        self.word_count.is_some() && self.price.is_some()
    }

    /// Apply a processing result. Idempotent: re-applying the same result
    /// leaves the post unchanged.
    pub fn apply_result(&mut self, result: &ProcessingResult) {
        self.word_count = Some(result.word_count);
        self.price = Some(result.price);
    }

    /// First three lines of the body, for list views.
    pub fn summary(&self) -> String {
        self.body
            .lines()
            .take(SUMMARY_LINES)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
