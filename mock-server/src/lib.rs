use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{any, get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thing {
    pub id: i64,
    pub name: String,
}

#[derive(Deserialize)]
pub struct NewThing {
    pub name: String,
}

#[derive(Deserialize)]
pub struct PatchThing {
    pub name: Option<String>,
}

/// What `/api/echo` saw, so callers can assert on the request they sent.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Echo {
    pub method: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub content_type: Option<String>,
}

#[derive(Deserialize)]
pub struct TokenRequest {
    pub grant_type: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[derive(Debug)]
pub struct Store {
    next_id: i64,
    things: BTreeMap<i64, Thing>,
}

impl Default for Store {
    fn default() -> Self {
        let seed = Thing {
            id: 1,
            name: "a".to_string(),
        };
        Self {
            next_id: 2,
            things: BTreeMap::from([(seed.id, seed)]),
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/api/values", get(list_things).post(create_thing))
        .route(
            "/api/values/{id}",
            get(get_thing)
                .put(replace_thing)
                .patch(patch_thing)
                .delete(delete_thing),
        )
        .route("/api/echo", any(echo))
        .route("/api/status/{code}", any(status))
        .route("/api/malformed", get(malformed))
        .route("/oauth/token", post(token))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock server listening");
    }
    axum::serve(listener, app()).await
}

async fn list_things(State(db): State<Db>) -> Json<Vec<Thing>> {
    let store = db.read().await;
    Json(store.things.values().cloned().collect())
}

async fn create_thing(
    State(db): State<Db>,
    Json(input): Json<NewThing>,
) -> (StatusCode, Json<Thing>) {
    let mut store = db.write().await;
    let thing = Thing {
        id: store.next_id,
        name: input.name,
    };
    store.next_id += 1;
    store.things.insert(thing.id, thing.clone());
    debug!(id = thing.id, "created thing");
    (StatusCode::CREATED, Json(thing))
}

async fn get_thing(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Thing>, StatusCode> {
    let store = db.read().await;
    store.things.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn replace_thing(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<NewThing>,
) -> Result<Json<Thing>, StatusCode> {
    let mut store = db.write().await;
    let thing = store.things.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    thing.name = input.name;
    Ok(Json(thing.clone()))
}

async fn patch_thing(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<PatchThing>,
) -> Result<Json<Thing>, StatusCode> {
    let mut store = db.write().await;
    let thing = store.things.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        thing.name = name;
    }
    Ok(Json(thing.clone()))
}

async fn delete_thing(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Thing>, StatusCode> {
    let mut store = db.write().await;
    let removed = store.things.remove(&id).ok_or(StatusCode::NOT_FOUND)?;
    debug!(id, "deleted thing");
    Ok(Json(removed))
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Echo> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let headers = headers
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
        .collect();
    Json(Echo {
        method: method.to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body,
        content_type,
    })
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

async fn malformed() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], "{\"id\": 1, \"name\": ")
}

async fn token(Form(input): Form<TokenRequest>) -> Result<Json<Token>, (StatusCode, Json<serde_json::Value>)> {
    if input.grant_type != "client_credentials" {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "unsupported_grant_type" })),
        ));
    }
    debug!(client_id = input.client_id.as_deref().unwrap_or(""), "issuing token");
    Ok(Json(Token {
        access_token: Uuid::new_v4().to_string(),
        token_type: "Bearer".to_string(),
        expires_in: 3600,
    }))
}
