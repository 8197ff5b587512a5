//! In-memory post state, its reducer and selectors.
//!
//! # Design
//! Every operation runs in two phases. `PostStore::begin` issues a `Ticket`
//! carrying a sequence number and leaves the state untouched (pending).
//! `PostStore::fulfill` applies the server's answer through `reduce`, and
//! `PostStore::reject` records a failure without touching the state.
//!
//! Completions may arrive in any order. A completion that would overwrite
//! the result of a later-issued request is discarded:
//! - `Got` against a newer applied `Got`,
//! - `Listed` against any newer applied change to the collection
//!   (`Listed`, `Created`, `Updated` or `Deleted`),
//! - `Updated` for id N against a newer applied `Updated` or `Deleted`
//!   for id N.
//!
//! `Created` and `Deleted` are incremental and always applied.
//!
//! Per-id sequence numbers are pruned once every ticket older than them
//! has settled, since nothing left in flight can be compared against them.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::error::ApiError;
use crate::types::Post;

/// The selected post plus the loaded collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostState {
    pub current_post: Post,
    pub posts: Vec<Post>,
}

/// A successful server answer, ready to be merged into `PostState`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fulfilled {
    Got(Post),
    Listed(Vec<Post>),
    Created(Post),
    Updated(Post),
    Deleted { requested: i64, confirmed: Post },
}

impl Fulfilled {
    pub fn kind(&self) -> &'static str {
        match self {
            Fulfilled::Got(_) => "get",
            Fulfilled::Listed(_) => "list",
            Fulfilled::Created(_) => "create",
            Fulfilled::Updated(_) => "update",
            Fulfilled::Deleted { .. } => "delete",
        }
    }
}

/// Handle for one in-flight operation. Consumed when the operation settles.
#[derive(Debug, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Apply a fulfilled operation to `state`, producing the next state.
pub fn reduce(state: PostState, outcome: Fulfilled) -> PostState {
    match outcome {
        Fulfilled::Got(post) => PostState {
            current_post: post,
            ..state
        },
        Fulfilled::Listed(posts) => PostState { posts, ..state },
        Fulfilled::Created(post) => {
            let mut posts = state.posts;
            posts.push(post);
            PostState { posts, ..state }
        }
        Fulfilled::Updated(post) => {
            let mut posts: Vec<Post> = state
                .posts
                .into_iter()
                .filter(|item| item.id != post.id)
                .collect();
            posts.push(post);
            sort_by_id(&mut posts);
            PostState { posts, ..state }
        }
        Fulfilled::Deleted {
            requested,
            confirmed,
        } => {
            let removed = confirmed.id.unwrap_or(requested);
            if removed != requested {
                warn!(requested, confirmed = removed, "delete confirmed a different id");
            }
            let posts = state
                .posts
                .into_iter()
                .filter(|item| item.id != Some(removed))
                .collect();
            PostState { posts, ..state }
        }
    }
}

/// Stable ascending sort by id. Posts without an id keep their positions.
pub fn sort_by_id(posts: &mut [Post]) {
    let slots: Vec<usize> = posts
        .iter()
        .enumerate()
        .filter(|(_, post)| post.id.is_some())
        .map(|(slot, _)| slot)
        .collect();
    let mut keyed: Vec<Post> = slots
        .iter()
        .map(|&slot| std::mem::take(&mut posts[slot]))
        .collect();
    keyed.sort_by_key(|post| post.id);
    for (slot, post) in slots.into_iter().zip(keyed) {
        posts[slot] = post;
    }
}

pub fn select_current_post(state: &PostState) -> &Post {
    &state.current_post
}

pub fn select_posts(state: &PostState) -> &[Post] {
    &state.posts
}

#[derive(Debug, Default)]
pub struct PostStore {
    state: PostState,
    issued: u64,
    pending: BTreeSet<u64>,
    last_get: u64,
    last_collection: u64,
    last_write: HashMap<i64, u64>,
}

impl PostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: PostState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &PostState {
        &self.state
    }

    /// Pending phase: allocate a sequence number. State is unchanged.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        self.pending.insert(self.issued);
        Ticket { seq: self.issued }
    }

    /// Fulfilled phase. Returns `false` when the completion was stale and
    /// therefore dropped.
    pub fn fulfill(&mut self, ticket: Ticket, outcome: Fulfilled) -> bool {
        let seq = ticket.seq;
        let kind = outcome.kind();
        self.settle(seq);
        if self.is_stale(seq, &outcome) {
            warn!(seq, kind, "discarding stale completion");
            self.prune();
            return false;
        }
        match &outcome {
            Fulfilled::Got(_) => self.last_get = seq,
            Fulfilled::Listed(_) => self.last_collection = self.last_collection.max(seq),
            Fulfilled::Created(_) => self.last_collection = self.last_collection.max(seq),
            Fulfilled::Updated(post) => {
                self.last_collection = self.last_collection.max(seq);
                if let Some(id) = post.id {
                    self.record_write(id, seq);
                }
            }
            Fulfilled::Deleted {
                requested,
                confirmed,
            } => {
                self.last_collection = self.last_collection.max(seq);
                self.record_write(confirmed.id.unwrap_or(*requested), seq);
            }
        }
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, outcome);
        self.prune();
        debug!(seq, kind, posts = self.state.posts.len(), "applied completion");
        true
    }

    /// Rejected phase. State is unchanged.
    pub fn reject(&mut self, ticket: Ticket, error: &ApiError) {
        self.settle(ticket.seq);
        self.prune();
        warn!(seq = ticket.seq, %error, "operation rejected");
    }

    /// Number of ids whose last write is still tracked.
    pub fn tracked_ids(&self) -> usize {
        self.last_write.len()
    }

    fn settle(&mut self, seq: u64) {
        self.pending.remove(&seq);
    }

    fn record_write(&mut self, id: i64, seq: u64) {
        let applied = self.last_write.entry(id).or_insert(seq);
        *applied = (*applied).max(seq);
    }

    /// Drop per-id entries no in-flight ticket is old enough to lose to.
    fn prune(&mut self) {
        match self.pending.first().copied() {
            Some(oldest) => self.last_write.retain(|_, applied| *applied > oldest),
            None => self.last_write.clear(),
        }
    }

    fn is_stale(&self, seq: u64, outcome: &Fulfilled) -> bool {
        match outcome {
            Fulfilled::Got(_) => seq < self.last_get,
            Fulfilled::Listed(_) => seq < self.last_collection,
            Fulfilled::Updated(Post { id: Some(id), .. }) => self
                .last_write
                .get(id)
                .is_some_and(|&applied| seq < applied),
            _ => false,
        }
    }
}
