use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub author: String,
}

/// Body accepted by create and update. An `id` in the body is not read;
/// the path or the server assigns it.
#[derive(Deserialize)]
pub struct PostInput {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author: String,
}

#[derive(Default)]
pub struct Store {
    next_id: i64,
    posts: BTreeMap<i64, Post>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/", post(create_post))
        .route("/posts/{id}", get(get_post).put(update_post).delete(delete_post))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// `null` while empty, matching backends that serialize a nil slice.
async fn list_posts(State(db): State<Db>) -> Json<Option<Vec<Post>>> {
    let store = db.read().await;
    if store.posts.is_empty() {
        return Json(None);
    }
    Json(Some(store.posts.values().cloned().collect()))
}

async fn create_post(
    State(db): State<Db>,
    Json(input): Json<PostInput>,
) -> (StatusCode, Json<Post>) {
    let mut store = db.write().await;
    store.next_id += 1;
    let post = Post {
        id: store.next_id,
        title: input.title,
        body: input.body,
        author: input.author,
    };
    store.posts.insert(post.id, post.clone());
    (StatusCode::CREATED, Json(post))
}

async fn get_post(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Post>, StatusCode> {
    let store = db.read().await;
    store.posts.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_post(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<PostInput>,
) -> Result<Json<Post>, StatusCode> {
    let mut store = db.write().await;
    let post = store.posts.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    post.title = input.title;
    post.body = input.body;
    post.author = input.author;
    Ok(Json(post.clone()))
}

async fn delete_post(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Post>, StatusCode> {
    let mut store = db.write().await;
    store.posts.remove(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}
