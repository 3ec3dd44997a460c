//! Domain entities.

mod post;
mod user;

pub use post::{CONTENT_MIN_LEN, Post, PostStatus, TITLE_MAX_LEN, validate_content, validate_title};
pub use user::{Role, User};
