#![allow(dead_code)]

use axum::{http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use serde_json::{json, Value};
use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, sync::Mutex, task::JoinHandle};

/// Local mock of a chat-completions endpoint that always answers with `reply`
/// as the assistant message, and records the last request body.
pub struct MockOpenAiServer {
    pub base_url: String,
    pub last_request: Arc<Mutex<Option<Value>>>,
    _task: JoinHandle<()>,
}

impl MockOpenAiServer {
    pub async fn start(reply: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock server");
        let addr: SocketAddr = listener
            .local_addr()
            .expect("failed to get mock server addr");
        let base_url = format!("http://{}/v1", addr);

        let last_request: Arc<Mutex<Option<Value>>> = Arc::default();
        let recorder = Arc::clone(&last_request);
        let reply = reply.to_string();

        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |Json(body): Json<Value>| {
                let recorder = Arc::clone(&recorder);
                let reply = reply.clone();
                async move {
                    *recorder.lock().await = Some(body);
                    if reply.is_empty() {
                        return (StatusCode::OK, Json(json!({"choices": []}))).into_response();
                    }
                    Json(json!({
                        "id": "chatcmpl-test",
                        "object": "chat.completion",
                        "choices": [{
                            "index": 0,
                            "message": {"role": "assistant", "content": reply},
                            "finish_reason": "stop"
                        }]
                    }))
                    .into_response()
                }
            }),
        );

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("mock server failed");
        });

        Self {
            base_url,
            last_request,
            _task: task,
        }
    }
}
