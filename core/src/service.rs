//! Async post operations bound to a `PostStore`.
//!
//! # Design
//! `PostService` glues the three halves together: `PostClient` builds the
//! request, a `Transport` executes it, and the parsed answer is applied to
//! the store. Each operation returns `Result<_, ApiError>`; on error the
//! store is left unchanged and the caller decides how to surface it.
//!
//! The store sits behind a `Mutex` that is only held while issuing a ticket
//! or applying a completion, never across an `.await`, so operations take
//! `&self` and may run concurrently. Out-of-order completions are resolved
//! by the store's sequence numbers.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::client::PostClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::store::{select_current_post, select_posts, Fulfilled, PostState, PostStore};
use crate::transport::Transport;
use crate::types::Post;

pub struct PostService<T> {
    client: PostClient,
    transport: T,
    store: Mutex<PostStore>,
}

impl<T: Transport> PostService<T> {
    pub fn new(client: PostClient, transport: T) -> Self {
        Self::with_store(client, transport, PostStore::new())
    }

    pub fn with_store(client: PostClient, transport: T, store: PostStore) -> Self {
        Self {
            client,
            transport,
            store: Mutex::new(store),
        }
    }

    /// `GET /posts/{id}`; on success the post becomes the current post.
    pub async fn get_post(&self, id: i64) -> Result<Post, ApiError> {
        let request = self.client.build_get_post(id);
        self.run(
            Ok(request),
            |response| self.client.parse_get_post(response),
            |post| Fulfilled::Got(post.clone()),
        )
        .await
    }

    /// `GET /posts`; on success the collection is replaced.
    pub async fn list_posts(&self) -> Result<Vec<Post>, ApiError> {
        let request = self.client.build_list_posts();
        self.run(
            Ok(request),
            |response| self.client.parse_list_posts(response),
            |posts| Fulfilled::Listed(posts.clone()),
        )
        .await
    }

    /// `POST /posts/`; on success the created post is appended.
    pub async fn create_post(&self, input: &Post) -> Result<Post, ApiError> {
        let request = self.client.build_create_post(input);
        self.run(
            request,
            |response| self.client.parse_create_post(response),
            |post| Fulfilled::Created(post.clone()),
        )
        .await
    }

    /// `PUT /posts/{id}`; on success the stored entry is replaced and the
    /// collection re-sorted by id.
    pub async fn update_post(&self, input: &Post) -> Result<Post, ApiError> {
        let request = self.client.build_update_post(input);
        self.run(
            request,
            |response| self.client.parse_update_post(response),
            |post| Fulfilled::Updated(post.clone()),
        )
        .await
    }

    /// `DELETE /posts/{id}`; returns the server's confirmation.
    pub async fn delete_post(&self, id: i64) -> Result<Post, ApiError> {
        let request = self.client.build_delete_post(id);
        self.run(
            Ok(request),
            |response| self.client.parse_delete_post(id, response),
            |confirmed| Fulfilled::Deleted {
                requested: id,
                confirmed: confirmed.clone(),
            },
        )
        .await
    }

    pub fn snapshot(&self) -> PostState {
        self.lock().state().clone()
    }

    pub fn current_post(&self) -> Post {
        select_current_post(self.lock().state()).clone()
    }

    pub fn posts(&self) -> Vec<Post> {
        select_posts(self.lock().state()).to_vec()
    }

    async fn run<R, P, F>(
        &self,
        request: Result<HttpRequest, ApiError>,
        parse: P,
        fulfilled: F,
    ) -> Result<R, ApiError>
    where
        P: FnOnce(HttpResponse) -> Result<R, ApiError>,
        F: FnOnce(&R) -> Fulfilled,
    {
        let ticket = self.lock().begin();
        let result = match request {
            Ok(request) => {
                debug!(seq = ticket.seq(), method = %request.method, path = %request.path, "issuing request");
                match self.transport.execute(request).await {
                    Ok(response) => parse(response),
                    Err(err) => Err(err),
                }
            }
            Err(err) => Err(err),
        };

        let mut store = self.lock();
        match result {
            Ok(value) => {
                store.fulfill(ticket, fulfilled(&value));
                Ok(value)
            }
            Err(err) => {
                store.reject(ticket, &err);
                Err(err)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, PostStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
