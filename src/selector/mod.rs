//! Picks which posts are shown: drop the current post, optionally shuffle,
//! then keep the first `max_posts`.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::Configuration;
use crate::domain::{CurrentPostContext, Post};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPolicy {
    pub exclude_current_post: bool,
    pub shuffle: bool,
    pub max_posts: usize,
}

impl From<&Configuration> for SelectionPolicy {
    fn from(config: &Configuration) -> Self {
        Self {
            exclude_current_post: config.options().exclude_current_post,
            shuffle: config.options().shuffle_posts,
            max_posts: config.max_posts(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostSelector {
    policy: SelectionPolicy,
}

impl PostSelector {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self { policy }
    }

    pub fn from_config(config: &Configuration) -> Self {
        Self::new(SelectionPolicy::from(config))
    }

    /// With shuffling off, the output keeps input order and `rng` is unused.
    pub fn select<R>(&self, posts: Vec<Post>, context: &CurrentPostContext, rng: &mut R) -> Vec<Post>
    where
        R: Rng + ?Sized,
    {
        let mut posts: Vec<Post> = if self.policy.exclude_current_post {
            posts
                .into_iter()
                .filter(|post| !is_current_post(post, context))
                .collect()
        } else {
            posts
        };

        if self.policy.shuffle {
            posts.shuffle(rng);
        }

        posts.truncate(self.policy.max_posts);
        posts
    }
}

/// Exact path match against the page the widget is mounted on.
pub fn is_current_post(post: &Post, context: &CurrentPostContext) -> bool {
    match (post.path(), context.path.as_deref()) {
        (Some(post_path), Some(current_path)) => post_path == current_path,
        _ => false,
    }
}
