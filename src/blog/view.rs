//! Read models, records joined with the records they reference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::blog::{Comment, Post};

/// Public part of a user, joined on posts and comments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthorSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub picture: Option<String>,
}

/// Minimal post reference joined on dashboard comments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
}

/// Post joined with its author and comment count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    /// `None` when the author record is missing.
    pub author: Option<AuthorSummary>,
    pub likes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub comment_count: usize,
}

impl PostView {
    pub fn new(
        post: &Post,
        author: Option<AuthorSummary>,
        comment_count: usize,
    ) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            content: post.content.clone(),
            author,
            likes: post.likes.clone(),
            created_at: post.created_at,
            updated_at: post.updated_at,
            comment_count,
        }
    }
}

/// Single post page: the post and its comments, oldest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

/// Comment joined with its author.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    pub author: Option<AuthorSummary>,
    pub post: String,
    pub created_at: DateTime<Utc>,
}

impl CommentView {
    pub fn new(comment: &Comment, author: Option<AuthorSummary>) -> Self {
        Self {
            id: comment.id.clone(),
            text: comment.text.clone(),
            author,
            post: comment.post.clone(),
            created_at: comment.created_at,
        }
    }
}

/// Comment written by the dashboard owner, joined with its parent post.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserComment {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    pub author: String,
    /// `None` when the parent post is missing.
    pub post: Option<PostSummary>,
    pub created_at: DateTime<Utc>,
}

/// Everything a user wrote or liked, most recent first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub user_posts: Vec<Post>,
    pub liked_posts: Vec<PostView>,
    pub user_comments: Vec<UserComment>,
}
