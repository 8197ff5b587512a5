//! Domain DTOs for the post API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.
//!
//! A single `Post` shape is used for requests and responses. `id` is `None`
//! only for a post that has not been persisted yet and is sent as JSON
//! `null` in that case.

use serde::{Deserialize, Serialize};

/// A blog post as exchanged with the API.
///
/// `title`, `body` and `author` default to empty strings when a response
/// omits them, so a bare delete confirmation such as `{"id":7}` still parses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author: String,
}

impl Post {
    /// An unsaved post, ready to be passed to `create_post`.
    pub fn draft(title: &str, body: &str, author: &str) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            body: body.to_string(),
            author: author.to_string(),
        }
    }

    /// A post carrying only an id, used when the server confirms a delete
    /// without a body.
    pub fn with_id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }
}
