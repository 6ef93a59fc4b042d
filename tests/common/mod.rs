//! Shared fixtures for the integration tests.
//!
//! Every test uses its own application id: the live-identity registry is
//! process wide and test functions run concurrently.

#![allow(dead_code)]

use std::sync::Arc;

use freebox_watcher::adapters::{InMemoryTokenStore, ReqwestHttpClient};
use freebox_watcher::auth::{AppIdentity, PairingPolicy};
use freebox_watcher::traits::TokenStore;
use freebox_watcher::{FreeBox, FreeBoxBuilder};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API: &str = "/api/v4";

pub fn identity(app_id: &str) -> AppIdentity {
    AppIdentity::with_device(app_id, "Integration tests", "1.0", "test-host")
}

/// `{success: true, result}` envelope.
pub fn ok(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"success": true, "result": result}))
}

/// `{success: false, error_code, msg}` envelope.
pub fn failure(status: u16, error_code: &str, msg: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "success": false,
        "error_code": error_code,
        "msg": msg,
    }))
}

/// Builder pointed at `server` with real HTTP and fast pairing polls.
pub fn builder_for(server: &MockServer, app_id: &str, store: Arc<dyn TokenStore>) -> FreeBoxBuilder {
    FreeBox::builder(identity(app_id))
        .base_url(server.uri())
        .http(Arc::new(ReqwestHttpClient::new()))
        .store(store)
        .pairing(PairingPolicy::default().with_poll_interval(Duration::from_millis(10)))
}

/// A client that already holds a pairing token.
pub async fn paired_client(server: &MockServer, app_id: &str) -> FreeBox {
    let store = Arc::new(InMemoryTokenStore::with_token(app_id, "app-token"));
    builder_for(server, app_id, store).build().await.unwrap()
}

/// Mount a login challenge and a session grant handing out `session_token`.
pub async fn mount_login(server: &MockServer, session_token: &str) {
    Mock::given(method("GET"))
        .and(path(format!("{}/login/", API)))
        .respond_with(ok(json!({"logged_in": false, "challenge": "c-123"})))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{}/login/session/", API)))
        .respond_with(ok(json!({
            "session_token": session_token,
            "permissions": {"calls": true},
        })))
        .mount(server)
        .await;
}

pub fn call_json(id: i64, kind: &str, duration: u64) -> Value {
    json!({
        "id": id,
        "type": kind,
        "datetime": 1_700_000_000 + id,
        "number": "0102030405",
        "name": "0102030405",
        "duration": duration,
        "new": true,
        "contact_id": 0,
    })
}

/// Count the requests `server` received on `path`.
pub async fn hits(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == request_path)
        .count()
}
