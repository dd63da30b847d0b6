//! Document store holding every user, post and comment.
//!
//! Handlers never touch the [`Document`] directly: [`Store::read`] and
//! [`Store::write`] reload it from the [`Backend`] inside a single-writer
//! region, and `write` persists it before releasing the region.
mod backend;

pub use backend::*;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::blog::{Comment, Post, User};
use crate::error::Result;

/// Generate a new opaque record ID.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Failure of the medium backing the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot access document: {0}")]
    Io(#[from] std::io::Error),
    #[error("document is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// The three collections, in storage order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Document {
    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn user_by_external_id_mut(
        &mut self,
        external_id: &str,
    ) -> Option<&mut User> {
        self.users
            .iter_mut()
            .find(|user| user.google_id == external_id)
    }

    pub fn post(&self, id: &str) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == id)
    }

    pub fn post_mut(&mut self, id: &str) -> Option<&mut Post> {
        self.posts.iter_mut().find(|post| post.id == id)
    }

    pub fn comment(&self, id: &str) -> Option<&Comment> {
        self.comments.iter().find(|comment| comment.id == id)
    }

    /// Comments replying to `post_id`, in storage order.
    pub fn comments_of<'a>(
        &'a self,
        post_id: &'a str,
    ) -> impl Iterator<Item = &'a Comment> + 'a {
        self.comments
            .iter()
            .filter(move |comment| comment.post == post_id)
    }

    pub fn comment_count(&self, post_id: &str) -> usize {
        self.comments_of(post_id).count()
    }

    /// Remove a post and every comment replying to it.
    ///
    /// Returns the post and how many comments went with it.
    pub fn remove_post(&mut self, id: &str) -> Option<(Post, usize)> {
        let index = self.posts.iter().position(|post| post.id == id)?;
        let post = self.posts.remove(index);

        let before = self.comments.len();
        self.comments.retain(|comment| comment.post != id);

        Some((post, before - self.comments.len()))
    }

    pub fn remove_comment(&mut self, id: &str) -> Option<Comment> {
        let index = self.comments.iter().position(|comment| comment.id == id)?;
        Some(self.comments.remove(index))
    }
}

/// Shared handle on the document store.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn Backend>,
    document: Arc<Mutex<Document>>,
}

impl Store {
    /// Open the store, materializing an empty document if none exists.
    pub async fn open(backend: impl Backend + 'static) -> Result<Self> {
        let document = backend.load().await?;

        Ok(Self {
            backend: Arc::new(backend),
            document: Arc::new(Mutex::new(document)),
        })
    }

    /// Store kept in memory only, seeded with `document`.
    pub fn in_memory(document: Document) -> Self {
        Self {
            backend: Arc::new(MemoryBackend::new(document.clone())),
            document: Arc::new(Mutex::new(document)),
        }
    }

    /// Run `f` on the freshly loaded document.
    pub async fn read<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Document) -> T + Send,
        T: Send,
    {
        let mut document = self.document.lock().await;
        *document = self.backend.load().await?;

        Ok(f(&document))
    }

    /// Run `f` on the freshly loaded document then persist it.
    ///
    /// Nothing is persisted if `f` fails.
    pub async fn write<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Document) -> Result<T> + Send,
        T: Send,
    {
        let mut document = self.document.lock().await;
        *document = self.backend.load().await?;

        let output = f(&mut document)?;
        self.backend.persist(&document).await?;

        Ok(output)
    }
}
