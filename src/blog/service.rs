//! Posts, comments and likes over the document store.

use std::sync::Arc;

use validator::Validate;

use crate::blog::{
    Comment, CommentInput, CommentView, Dashboard, Post, PostDetail, PostInput,
    PostView, UserComment,
};
use crate::clock::Clock;
use crate::error::{Result, ServerError};
use crate::store::{Document, Store, new_id};

const POST: &str = "Post";
const COMMENT: &str = "Comment";

/// Blog manager.
#[derive(Clone)]
pub struct BlogService {
    store: Store,
    clock: Arc<dyn Clock>,
}

impl BlogService {
    /// Create a new [`BlogService`].
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Every post with its author and comment count, most recent first.
    pub async fn list(&self) -> Result<Vec<PostView>> {
        self.store
            .read(|document| {
                let mut posts = document
                    .posts
                    .iter()
                    .map(|post| join_post(document, post))
                    .collect::<Vec<_>>();
                posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                posts
            })
            .await
    }

    /// One post with its comments, oldest comment first.
    pub async fn get(&self, post_id: &str) -> Result<PostDetail> {
        self.store
            .read(|document| -> Result<PostDetail> {
                let post = document
                    .post(post_id)
                    .ok_or(ServerError::NotFound(POST))?;

                let mut comments = document
                    .comments_of(post_id)
                    .map(|comment| join_comment(document, comment))
                    .collect::<Vec<_>>();
                comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));

                Ok(PostDetail {
                    post: join_post(document, post),
                    comments,
                })
            })
            .await?
    }

    pub async fn create(&self, input: PostInput, author_id: &str) -> Result<Post> {
        input.validate()?;

        let now = self.clock.now();
        let post = Post {
            id: new_id(),
            title: input.title,
            content: input.content,
            author: author_id.to_owned(),
            likes: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.store
            .write(|document| {
                document.posts.push(post.clone());
                Ok(post)
            })
            .await
    }

    /// Replace title and content. Owner only.
    pub async fn update(
        &self,
        post_id: &str,
        input: PostInput,
        requester_id: &str,
    ) -> Result<Post> {
        input.validate()?;
        let now = self.clock.now();

        self.store
            .write(|document| {
                let post = document
                    .post_mut(post_id)
                    .ok_or(ServerError::NotFound(POST))?;
                if post.author != requester_id {
                    return Err(ServerError::Forbidden);
                }

                post.title = input.title;
                post.content = input.content;
                post.updated_at = now;
                Ok(post.clone())
            })
            .await
    }

    /// Remove a post and its comments. Owner only.
    pub async fn delete(&self, post_id: &str, requester_id: &str) -> Result<()> {
        self.store
            .write(|document| {
                let post = document
                    .post(post_id)
                    .ok_or(ServerError::NotFound(POST))?;
                if post.author != requester_id {
                    return Err(ServerError::Forbidden);
                }

                if let Some((_, comments)) = document.remove_post(post_id) {
                    tracing::debug!(post_id, comments, "post removed");
                }
                Ok(())
            })
            .await
    }

    /// Like the post, or unlike it if already liked.
    pub async fn toggle_like(&self, post_id: &str, user_id: &str) -> Result<Post> {
        self.store
            .write(|document| {
                let post = document
                    .post_mut(post_id)
                    .ok_or(ServerError::NotFound(POST))?;
                post.toggle_like(user_id);
                Ok(post.clone())
            })
            .await
    }

    pub async fn add_comment(
        &self,
        post_id: &str,
        input: CommentInput,
        author_id: &str,
    ) -> Result<CommentView> {
        input.validate()?;
        let now = self.clock.now();

        self.store
            .write(|document| {
                if document.post(post_id).is_none() {
                    return Err(ServerError::NotFound(POST));
                }

                let comment = Comment {
                    id: new_id(),
                    text: input.text,
                    author: author_id.to_owned(),
                    post: post_id.to_owned(),
                    created_at: now,
                };
                let view = join_comment(document, &comment);

                document.comments.push(comment);
                Ok(view)
            })
            .await
    }

    /// Remove a comment. Owner only.
    pub async fn delete_comment(
        &self,
        comment_id: &str,
        requester_id: &str,
    ) -> Result<()> {
        self.store
            .write(|document| {
                let comment = document
                    .comment(comment_id)
                    .ok_or(ServerError::NotFound(COMMENT))?;
                if comment.author != requester_id {
                    return Err(ServerError::Forbidden);
                }

                document.remove_comment(comment_id);
                Ok(())
            })
            .await
    }

    /// Posts written and liked by `user_id`, and their comments.
    pub async fn dashboard(&self, user_id: &str) -> Result<Dashboard> {
        self.store
            .read(|document| {
                let mut user_posts = document
                    .posts
                    .iter()
                    .filter(|post| post.author == user_id)
                    .cloned()
                    .collect::<Vec<_>>();
                user_posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

                let mut liked_posts = document
                    .posts
                    .iter()
                    .filter(|post| post.is_liked_by(user_id))
                    .map(|post| join_post(document, post))
                    .collect::<Vec<_>>();
                liked_posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

                let mut user_comments = document
                    .comments
                    .iter()
                    .filter(|comment| comment.author == user_id)
                    .map(|comment| UserComment {
                        id: comment.id.clone(),
                        text: comment.text.clone(),
                        author: comment.author.clone(),
                        post: document.post(&comment.post).map(Post::summary),
                        created_at: comment.created_at,
                    })
                    .collect::<Vec<_>>();
                user_comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));

                Dashboard {
                    user_posts,
                    liked_posts,
                    user_comments,
                }
            })
            .await
    }
}

fn join_post(document: &Document, post: &Post) -> PostView {
    PostView::new(
        post,
        document.user(&post.author).map(|user| user.summary()),
        document.comment_count(&post.id),
    )
}

fn join_comment(document: &Document, comment: &Comment) -> CommentView {
    CommentView::new(
        comment,
        document.user(&comment.author).map(|user| user.summary()),
    )
}
