//! Blog records.
//!
//! Request bodies arrive as loose JSON; `model` turns them into validated
//! creates and patches, and `keywords` coerces the keyword list shapes
//! clients actually send.

pub mod keywords;
pub mod model;

pub use keywords::normalize_keywords;
pub use model::{blog_id_of, Blog, BlogError, BlogPatch, Keyword, NewBlog};
