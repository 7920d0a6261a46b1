//! Edge endpoint.
//!
//! `GET /?username=<u>` returns a profile with both images inlined as data
//! URIs, for the card authoring form. `GET /api/status` reports readiness.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::adapters::{extract_username, TwitterClient};
use crate::config::Config;
use crate::error::{Result, TpotmonError};
use crate::inline::ImageInliner;
use crate::profile::Profile;

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const USERNAME_REQUIRED: &str = "Username is required";
pub const UPSTREAM_FAILED: &str = "Failed to fetch data from Twitter API";

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub ready: bool,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub username: Option<String>,
}

/// Profile as served to the authoring form. Images are `null` when they could
/// not be inlined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub name: String,
    pub username: String,
    pub description: String,
    pub followers: u64,
    pub following: u64,
    pub is_blue_check: bool,
    pub tweet_count: u64,
    pub profile_pic: Option<String>,
    pub profile_banner: Option<String>,
}

impl ProfileResponse {
    pub fn new(profile: Profile, profile_pic: Option<String>, profile_banner: Option<String>) -> Self {
        Self {
            name: profile.name,
            username: profile.username,
            description: profile.description,
            followers: profile.followers,
            following: profile.following,
            is_blue_check: profile.is_blue_check,
            tweet_count: profile.post_count,
            profile_pic,
            profile_banner,
        }
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub port: u16,
    pub twitter_api_key: Option<String>,
    pub twitter_api_base: String,
    pub http_timeout_secs: u64,
}

impl ServerState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            port: config.port,
            twitter_api_key: config.twitter_api_key.clone(),
            twitter_api_base: config.twitter_api_base.clone(),
            http_timeout_secs: config.http_timeout_secs,
        }
    }

    fn twitter_client(&self) -> Result<TwitterClient> {
        let key = self
            .twitter_api_key
            .as_deref()
            .ok_or_else(|| TpotmonError::MissingConfig("TWITTER_API_KEY is not set".to_string()))?;
        TwitterClient::new_with_timeout(key, Some(&self.twitter_api_base), self.http_timeout_secs)
    }
}

fn with_allow_origin(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}

fn error_response(status: StatusCode, message: &str) -> Response {
    with_allow_origin(
        (
            status,
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )
            .into_response(),
    )
}

async fn status_handler(State(state): State<Arc<ServerState>>) -> Response {
    with_allow_origin(
        Json(StatusResponse {
            status: "ok".to_string(),
            version: SERVER_VERSION.to_string(),
            ready: true,
            port: state.port,
        })
        .into_response(),
    )
}

async fn fetch_profile_response(state: &ServerState, input: &str) -> Result<ProfileResponse> {
    let username = extract_username(input)?;
    let client = state.twitter_client()?;
    let profile = client.fetch_user_info(&username).await?.into_profile();

    let inliner = ImageInliner::new(state.http_timeout_secs)?;
    let profile_pic = inliner.inline_opt(profile.profile_image_url.as_deref()).await;
    let profile_banner = inliner.inline_opt(profile.banner_image_url.as_deref()).await;

    Ok(ProfileResponse::new(profile, profile_pic, profile_banner))
}

async fn profile_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ProfileQuery>,
) -> Response {
    let input = query.username.as_deref().map(str::trim).unwrap_or("");
    if input.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, USERNAME_REQUIRED);
    }

    match fetch_profile_response(&state, input).await {
        Ok(profile) => {
            info!(username = %profile.username, "served profile");
            with_allow_origin(Json(profile).into_response())
        }
        Err(e) => {
            error!(input = %input, error = %e, "profile request failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, UPSTREAM_FAILED)
        }
    }
}

pub fn create_router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(profile_handler))
        .route("/api/status", get(status_handler))
        .with_state(state)
        .layer(cors)
}

pub async fn start_server(config: &Config) -> std::result::Result<(), std::io::Error> {
    let state = Arc::new(ServerState::from_config(config));
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    info!(port = config.port, "profile server listening");
    axum::serve(listener, app).await
}
