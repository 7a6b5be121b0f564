//! HTTP request/response shapes for the post API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::post::model::{Post, PostDraft};
use crate::post::store::PostPage;

/// Create-post request body.
#[derive(Debug, Deserialize)]
pub struct PostInput {
    pub title: String,
    pub body: String,
    pub author: String,
}

impl PostInput {
    /// Reject blank fields before anything reaches the store or broker.
    pub fn validate(self) -> Result<PostDraft, Vec<String>> {
        let mut violations = Vec::new();
        if self.title.trim().is_empty() {
            violations.push("title must not be blank".to_string());
        }
        if self.body.trim().is_empty() {
            violations.push("body must not be blank".to_string());
        }
        if self.author.trim().is_empty() {
            violations.push("author must not be blank".to_string());
        }
        if !violations.is_empty() {
            return Err(violations);
        }
        Ok(PostDraft {
            title: self.title,
            body: self.body,
            author: self.author,
        })
    }
}

/// Full post view.
#[derive(Debug, Serialize)]
pub struct PostOutput {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
}

impl From<Post> for PostOutput {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            body: post.body,
            author: post.author,
            word_count: post.word_count,
            price: post.price,
        }
    }
}

/// List view: body collapsed to its first three lines.
#[derive(Debug, Serialize)]
pub struct PostSummaryOutput {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub author: String,
}

impl From<&Post> for PostSummaryOutput {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            summary: post.summary(),
            author: post.author.clone(),
        }
    }
}

/// One page of summaries.
#[derive(Debug, Serialize)]
pub struct PostPageOutput {
    pub items: Vec<PostSummaryOutput>,
    pub page: usize,
    pub size: usize,
    pub total: usize,
}

impl From<PostPage> for PostPageOutput {
    fn from(page: PostPage) -> Self {
        Self {
            items: page.items.iter().map(PostSummaryOutput::from).collect(),
            page: page.page,
            size: page.size,
            total: page.total,
        }
    }
}
