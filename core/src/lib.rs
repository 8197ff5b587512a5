//! API client core and state store for the blog post service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern), and keeps the client-side
//! view of the posts in a `PostStore`.
//!
//! # Design
//! - `PostClient` is stateless: it holds only `base_url`.
//! - Each CRUD operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - `PostStore` applies fulfilled operations through a pure `reduce` and
//!   drops completions made stale by a later request.
//! - `PostService` runs the whole cycle over a `Transport` for hosts that
//!   want async calls instead of driving build/parse themselves.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod service;
pub mod store;
pub mod transport;
pub mod types;

pub use client::PostClient;
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use service::PostService;
pub use store::{reduce, select_current_post, select_posts, Fulfilled, PostState, PostStore, Ticket};
pub use transport::Transport;
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use types::Post;
