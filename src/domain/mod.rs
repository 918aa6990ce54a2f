pub mod context;
pub mod feed;
pub mod post;

pub use context::CurrentPostContext;
pub use feed::{RawEntry, RawFeedResponse};
pub use post::Post;
