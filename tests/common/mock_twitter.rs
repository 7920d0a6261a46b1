#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::Query,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};
use tokio::{net::TcpListener, task::JoinHandle};

pub const API_KEY: &str = "test-key";

/// 1x1 transparent PNG
pub const PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// JPEG magic bytes, served without a useful content type.
pub const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];

const PAGE_SIZE: usize = 20;

/// Total tweets each scenario username has upstream.
fn total_tweets(username: &str) -> usize {
    match username {
        "poster" | "noimages" | "nocursor" | "nullcursor" => 5,
        "paged" => 250,
        "small_paged" => 45,
        _ => 0,
    }
}

/// Local mock of the profile data API, plus image hosting.
///
/// Scenario by `userName`:
/// - `poster`: 5 tweets on a single page, avatar PNG and JPEG banner
/// - `paged`: 250 tweets in pages of 20
/// - `small_paged`: 45 tweets in pages of 20
/// - `endless`: empty pages that always claim a next page
/// - `nocursor`: 5 tweets, claims a next page with an empty `next_cursor`
/// - `nullcursor`: 5 tweets, claims a next page without a `next_cursor` key
/// - `malformed`: tweet page without `data.tweets`
/// - `ghost`: user info with `status: error`
/// - `unauthorized`: 401 on user info
/// - `noimages`: avatar URL that 404s, no banner
pub struct MockTwitterServer {
    pub base_url: String,
    pub info_calls: Arc<AtomicUsize>,
    pub page_calls: Arc<AtomicUsize>,
    _task: JoinHandle<()>,
}

impl MockTwitterServer {
    pub async fn start() -> Self {
        async fn avatar_png() -> impl IntoResponse {
            let mut headers = HeaderMap::new();
            headers.insert(
                axum::http::header::CONTENT_TYPE,
                HeaderValue::from_static("image/png"),
            );
            (headers, Bytes::from_static(PNG))
        }

        async fn banner_jpg() -> impl IntoResponse {
            let mut headers = HeaderMap::new();
            headers.insert(
                axum::http::header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            );
            (headers, Bytes::from_static(JPEG))
        }

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock server");
        let addr: SocketAddr = listener
            .local_addr()
            .expect("failed to get mock server addr");
        let base_url = format!("http://{}", addr);

        let info_calls = Arc::new(AtomicUsize::new(0));
        let page_calls = Arc::new(AtomicUsize::new(0));

        let base_for_info = base_url.clone();
        let info_counter = Arc::clone(&info_calls);
        let page_counter = Arc::clone(&page_calls);

        let app = Router::new()
            .route(
                "/twitter/user/info",
                get(
                    move |headers: HeaderMap, Query(q): Query<HashMap<String, String>>| {
                        let base_url = base_for_info.clone();
                        let counter = Arc::clone(&info_counter);
                        async move {
                            counter.fetch_add(1, Ordering::SeqCst);
                            if !has_key(&headers) {
                                return (StatusCode::UNAUTHORIZED, "").into_response();
                            }
                            let username = q.get("userName").cloned().unwrap_or_default();
                            user_info(&base_url, &username).into_response()
                        }
                    },
                ),
            )
            .route(
                "/twitter/user/last_tweets",
                get(
                    move |headers: HeaderMap, Query(q): Query<HashMap<String, String>>| {
                        let counter = Arc::clone(&page_counter);
                        async move {
                            counter.fetch_add(1, Ordering::SeqCst);
                            if !has_key(&headers) {
                                return (StatusCode::UNAUTHORIZED, "").into_response();
                            }
                            let username = q.get("userName").cloned().unwrap_or_default();
                            let cursor = q.get("cursor").cloned();
                            Json(tweet_page(&username, cursor.as_deref())).into_response()
                        }
                    },
                ),
            )
            .route("/avatar.png", get(avatar_png))
            .route("/banner.jpg", get(banner_jpg));

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("mock server failed");
        });

        Self {
            base_url,
            info_calls,
            page_calls,
            _task: task,
        }
    }

    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }
}

fn has_key(headers: &HeaderMap) -> bool {
    headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == API_KEY)
}

fn user_info(base_url: &str, username: &str) -> axum::response::Response {
    match username {
        "unauthorized" => return (StatusCode::UNAUTHORIZED, "").into_response(),
        "ghost" => {
            return Json(json!({"status": "error", "msg": "User not found", "data": null}))
                .into_response()
        }
        _ => {}
    }

    let (picture, cover) = if username == "noimages" {
        (Value::String(format!("{}/missing.png", base_url)), Value::Null)
    } else {
        (
            Value::String(format!("{}/avatar.png", base_url)),
            Value::String(format!("{}/banner.jpg", base_url)),
        )
    };

    Json(json!({
        "status": "success",
        "msg": "success",
        "data": {
            "userName": username,
            "name": format!("{} display", username),
            "description": "posting through it",
            "isBlueVerified": true,
            "followers": 1234,
            "following": 321,
            "statusesCount": 9876,
            "profilePicture": picture,
            "coverPicture": cover
        }
    }))
    .into_response()
}

fn tweet_page(username: &str, cursor: Option<&str>) -> Value {
    match username {
        "malformed" => return json!({"status": "success", "data": {}}),
        "endless" => {
            return json!({
                "status": "success",
                "data": {"tweets": []},
                "has_next_page": true,
                "next_cursor": "again"
            })
        }
        _ => {}
    }

    let total = total_tweets(username);
    let page: usize = cursor.and_then(|c| c.parse().ok()).unwrap_or(0);
    let start = (page * PAGE_SIZE).min(total);
    let end = (start + PAGE_SIZE).min(total);
    let has_next_page = end < total;

    let tweets: Vec<Value> = (start..end)
        .map(|i| {
            json!({
                "id": i.to_string(),
                "text": format!("tweet {}", i),
                "likeCount": i,
                "retweetCount": 1,
                "replyCount": 2,
                "viewCount": null
            })
        })
        .collect();

    match username {
        "nocursor" => {
            return json!({
                "status": "success",
                "data": {"tweets": tweets},
                "has_next_page": true,
                "next_cursor": ""
            })
        }
        "nullcursor" => {
            return json!({
                "status": "success",
                "data": {"tweets": tweets},
                "has_next_page": true
            })
        }
        _ => {}
    }

    let next_cursor = if has_next_page {
        (page + 1).to_string()
    } else {
        String::new()
    };

    json!({
        "status": "success",
        "msg": "success",
        "data": {"tweets": tweets},
        "has_next_page": has_next_page,
        "next_cursor": next_cursor
    })
}
