use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    routing::{get, post},
    Form, Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};
use url::form_urlencoded;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const REQUIRED_PARAMS: [&str; 4] = ["api_key", "game_id", "request_date", "request_id"];

/// What a user has granted the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Standing {
    Authorized,
    ReadOnly,
    NotAuthorized,
}

#[derive(Clone, Debug)]
pub struct MockUser {
    pub access_token: String,
    pub standing: Standing,
}

/// A signed event the server accepted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub endpoint: String,
    pub user_id: String,
    pub params: BTreeMap<String, String>,
}

#[derive(Deserialize)]
pub struct ValidateUser {
    pub access_token: String,
    pub api_key: String,
}

struct Inner {
    app_id: String,
    app_secret: String,
    users: RwLock<HashMap<String, MockUser>>,
    seen_requests: RwLock<HashSet<String>>,
    events: RwLock<Vec<Event>>,
}

/// Shared server state: one game and its users.
#[derive(Clone)]
pub struct MockState {
    inner: Arc<Inner>,
}

impl MockState {
    pub fn new(app_id: &str, app_secret: &str) -> Self {
        MockState {
            inner: Arc::new(Inner {
                app_id: app_id.to_string(),
                app_secret: app_secret.to_string(),
                users: RwLock::new(HashMap::new()),
                seen_requests: RwLock::new(HashSet::new()),
                events: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Register or replace a user.
    pub async fn add_user(&self, user_id: &str, access_token: &str, standing: Standing) {
        let user = MockUser {
            access_token: access_token.to_string(),
            standing,
        };
        self.inner.users.write().await.insert(user_id.to_string(), user);
    }

    pub async fn events(&self) -> Vec<Event> {
        self.inner.events.read().await.clone()
    }
}

pub fn app(state: MockState) -> Router {
    Router::new()
        .route("/games/{game_id}/users.json", post(validate_user))
        .route("/me/achievements.json", post(signed_event))
        .route("/me/scores.json", post(signed_event))
        .route("/me/actions.json", post(signed_event))
        .route("/me/like.json", post(signed_event))
        .route("/me/tweet.json", get(tweet))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

async fn validate_user(
    State(state): State<MockState>,
    Path(game_id): Path<String>,
    Form(input): Form<ValidateUser>,
) -> StatusCode {
    if game_id != state.inner.app_id {
        return StatusCode::NOT_FOUND;
    }
    let users = state.inner.users.read().await;
    let Some(user) = users.get(&input.api_key) else {
        return StatusCode::UNPROCESSABLE_ENTITY;
    };
    if user.access_token != input.access_token {
        return StatusCode::METHOD_NOT_ALLOWED;
    }
    standing_status(user.standing).unwrap_or(StatusCode::OK)
}

async fn signed_event(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<serde_json::Value>) {
    match verify(&state, &method, uri.path(), &headers, &body).await {
        Ok(event) => {
            info!(endpoint = %event.endpoint, user = %event.user_id, "accepted event");
            state.inner.events.write().await.push(event);
            (StatusCode::CREATED, Json(serde_json::json!({ "success": true })))
        }
        Err(code) => (code, Json(serde_json::json!({ "success": false }))),
    }
}

/// GET with a form body; the signed parameters are not in the query string.
async fn tweet(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    match verify(&state, &method, uri.path(), &headers, &body).await {
        Ok(event) => {
            let action = event.params.get("action_id").cloned().unwrap_or_default();
            (StatusCode::OK, format!("{} just did {} #carrot", event.user_id, action))
        }
        Err(code) => (code, String::new()),
    }
}

async fn verify(
    state: &MockState,
    method: &Method,
    path: &str,
    headers: &HeaderMap,
    body: &str,
) -> Result<Event, StatusCode> {
    let mut params: BTreeMap<String, String> =
        form_urlencoded::parse(body.as_bytes()).into_owned().collect();
    let sig = params.remove("sig").ok_or(StatusCode::BAD_REQUEST)?;
    if REQUIRED_PARAMS.iter().any(|k| !params.contains_key(*k)) {
        return Err(StatusCode::BAD_REQUEST);
    }
    if Uuid::parse_str(&params["request_id"]).is_err() {
        return Err(StatusCode::BAD_REQUEST);
    }
    if params["game_id"] != state.inner.app_id {
        return Err(StatusCode::NOT_FOUND);
    }

    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(|h| h.split(':').next().unwrap_or(h))
        .ok_or(StatusCode::BAD_REQUEST)?;
    let canonical = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let message = format!("{}\n{host}\n{path}\n{canonical}", method.as_str());

    let expected = STANDARD.decode(sig.as_bytes()).map_err(|_| StatusCode::FORBIDDEN)?;
    let mut mac = HmacSha256::new_from_slice(state.inner.app_secret.as_bytes())
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    mac.update(message.as_bytes());
    if mac.verify_slice(&expected).is_err() {
        warn!(%path, "signature mismatch");
        return Err(StatusCode::FORBIDDEN);
    }

    if !state.inner.seen_requests.write().await.insert(params["request_id"].clone()) {
        warn!(request_id = %params["request_id"], "replayed request");
        return Err(StatusCode::CONFLICT);
    }

    let user_id = params["api_key"].clone();
    let users = state.inner.users.read().await;
    let user = users.get(&user_id).ok_or(StatusCode::UNPROCESSABLE_ENTITY)?;
    if let Some(code) = standing_status(user.standing) {
        return Err(code);
    }

    Ok(Event {
        endpoint: path.to_string(),
        user_id,
        params,
    })
}

/// The refusal code for a standing, or `None` when fully authorized.
fn standing_status(standing: Standing) -> Option<StatusCode> {
    match standing {
        Standing::Authorized => None,
        Standing::ReadOnly => Some(StatusCode::UNAUTHORIZED),
        Standing::NotAuthorized => Some(StatusCode::METHOD_NOT_ALLOWED),
    }
}
