//! Records as saved on the document store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::blog::{AuthorSummary, PostSummary};

/// User as saved on the document store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    /// Identifier given by the external provider.
    pub google_id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub picture: Option<String>,
}

impl User {
    /// Public fields joined on posts and comments.
    pub fn summary(&self) -> AuthorSummary {
        AuthorSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            picture: self.picture.clone(),
        }
    }
}

/// A story.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    /// Owner [`User`] ID.
    pub author: String,
    /// IDs of users liking the post, each at most once.
    #[serde(default)]
    pub likes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|id| id == user_id)
    }

    /// Add or remove `user_id` from likes.
    ///
    /// Returns `true` when the post is now liked by the user.
    pub fn toggle_like(&mut self, user_id: &str) -> bool {
        match self.likes.iter().position(|id| id == user_id) {
            Some(index) => {
                self.likes.remove(index);
                false
            },
            None => {
                self.likes.push(user_id.to_owned());
                true
            },
        }
    }

    pub fn summary(&self) -> PostSummary {
        PostSummary {
            id: self.id.clone(),
            title: self.title.clone(),
        }
    }
}

/// A reply on a [`Post`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    /// Owner [`User`] ID.
    pub author: String,
    /// Parent [`Post`] ID.
    pub post: String,
    pub created_at: DateTime<Utc>,
}

/// Reject values made only of whitespace.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }

    Ok(())
}

/// Title and content of a post, on creation or edition.
#[derive(Clone, Debug, Default, Validate, Serialize, Deserialize)]
pub struct PostInput {
    #[serde(default)]
    #[validate(custom(
        function = "not_blank",
        message = "Please provide title and content"
    ))]
    pub title: String,
    #[serde(default)]
    #[validate(custom(
        function = "not_blank",
        message = "Please provide title and content"
    ))]
    pub content: String,
}

impl PostInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Text of a new comment.
#[derive(Clone, Debug, Default, Validate, Serialize, Deserialize)]
pub struct CommentInput {
    #[serde(default)]
    #[validate(custom(
        function = "not_blank",
        message = "Comment text cannot be empty"
    ))]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> Post {
        Post {
            id: "p".into(),
            title: "t".into(),
            content: "c".into(),
            author: "a".into(),
            likes: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_toggle_like_twice_restores_likes() {
        let mut post = post();
        post.likes.push("other".into());
        let before = post.likes.clone();

        assert!(post.toggle_like("me"));
        assert!(post.is_liked_by("me"));
        assert_eq!(post.likes.len(), 2);

        assert!(!post.toggle_like("me"));
        assert_eq!(post.likes, before);
    }

    #[test]
    fn test_blank_inputs_are_rejected() {
        assert!(PostInput::new("title", "content").validate().is_ok());
        assert!(PostInput::new("   ", "content").validate().is_err());
        assert!(PostInput::new("title", "").validate().is_err());
        assert!(CommentInput { text: "\n\t".into() }.validate().is_err());
    }

    #[test]
    fn test_user_is_read_from_document_names() {
        let user: User = serde_json::from_str(
            r#"{"_id":"1","googleId":"g","name":"Ada","email":"ada@example.com","picture":"p.png"}"#,
        )
        .unwrap();

        assert_eq!(user.google_id, "g");
        assert_eq!(user.summary().picture.as_deref(), Some("p.png"));
    }
}
