//! Optimistic like button state.

use crate::client::{ApiClient, RequestFailed};

/// What the like button shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeState {
    pub liked: bool,
    pub count: usize,
}

/// Like state flipped before the server answers, restored if it fails.
#[derive(Debug, Clone)]
pub struct LikeToggle {
    state: LikeState,
    previous: Option<LikeState>,
}

impl LikeToggle {
    /// State of a post liked by `likes`, seen by `user_id`.
    pub fn new(likes: &[String], user_id: Option<&str>) -> Self {
        let liked = user_id.is_some_and(|id| likes.iter().any(|like| like == id));

        Self {
            state: LikeState {
                liked,
                count: likes.len(),
            },
            previous: None,
        }
    }

    pub fn state(&self) -> LikeState {
        self.state
    }

    /// Flip the state right away.
    pub fn apply(&mut self) -> LikeState {
        self.previous = Some(self.state);
        self.state = LikeState {
            liked: !self.state.liked,
            count: if self.state.liked {
                self.state.count.saturating_sub(1)
            } else {
                self.state.count + 1
            },
        };
        self.state
    }

    /// Restore the state preceding the last [`LikeToggle::apply`].
    pub fn rollback(&mut self) -> LikeState {
        if let Some(previous) = self.previous.take() {
            self.state = previous;
        }
        self.state
    }

    /// Flip, ask the server, and roll back if it refuses.
    pub async fn toggle(
        &mut self,
        api: &ApiClient,
        post_id: &str,
    ) -> Result<LikeState, RequestFailed> {
        self.apply();

        match api.toggle_like(post_id).await {
            Ok(_) => {
                self.previous = None;
                Ok(self.state)
            },
            Err(err) => {
                tracing::warn!(%err, post_id, "like failed, rolling back");
                self.rollback();
                Err(err)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn likes() -> Vec<String> {
        vec!["ada".into(), "bob".into()]
    }

    #[test]
    fn test_initial_state() {
        let toggle = LikeToggle::new(&likes(), Some("ada"));
        assert_eq!(toggle.state(), LikeState { liked: true, count: 2 });

        let anonymous = LikeToggle::new(&likes(), None);
        assert!(!anonymous.state().liked);
    }

    #[test]
    fn test_apply_then_rollback() {
        let mut toggle = LikeToggle::new(&likes(), Some("eve"));

        assert_eq!(toggle.apply(), LikeState { liked: true, count: 3 });
        assert_eq!(toggle.rollback(), LikeState { liked: false, count: 2 });
        // nothing left to roll back.
        assert_eq!(toggle.rollback(), LikeState { liked: false, count: 2 });
    }

    #[tokio::test]
    async fn test_failed_request_rolls_back() {
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        let mut toggle = LikeToggle::new(&likes(), Some("ada"));

        assert!(toggle.toggle(&api, "post").await.is_err());
        assert_eq!(toggle.state(), LikeState { liked: true, count: 2 });
    }
}
