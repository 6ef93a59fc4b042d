//! Call log, voicemail and lifecycle operations of the client.

mod common;

use std::sync::Arc;

use common::*;
use freebox_watcher::adapters::{FileTokenStore, InMemoryTokenStore};
use freebox_watcher::auth::is_registered;
use freebox_watcher::traits::TokenStore;
use freebox_watcher::FreeboxError;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_get_call_unknown_id_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/call/log/99", API)))
        .respond_with(failure(404, "invalid_id", "No such call"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/call/log/98", API)))
        .respond_with(ok(call_json(98, "missed", 0)))
        .mount(&server)
        .await;

    let freebox = paired_client(&server, "fr.test.get-call").await;

    assert!(freebox.get_call(99).await.unwrap().is_none());
    let call = freebox.get_call(98).await.unwrap().unwrap();
    assert!(call.is_ringing());
}

#[tokio::test]
async fn test_empty_call_log_without_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/call/log/", API)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let freebox = paired_client(&server, "fr.test.empty-log").await;
    assert!(freebox.list_calls().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_server_error_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/call/voicemail/", API)))
        .respond_with(failure(500, "internal_error", "Internal error"))
        .mount(&server)
        .await;

    let freebox = paired_client(&server, "fr.test.server-error").await;
    let err = freebox.list_voicemails().await.unwrap_err();
    assert!(matches!(err, FreeboxError::Protocol { status: 500, .. }));
}

#[tokio::test]
async fn test_voicemail_audio_download() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/call/voicemail/", API)))
        .respond_with(ok(json!([{
            "id": "vm-1",
            "date": 1_700_000_100,
            "phone_number": "0612345678",
            "duration": 12,
            "read": false,
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/call/voicemail/vm-1/audio_file", API)))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", "attachment; filename=\"msg_0001.wav\"")
                .set_body_bytes(b"RIFF....WAVE".to_vec()),
        )
        .mount(&server)
        .await;

    let freebox = paired_client(&server, "fr.test.audio").await;
    let voicemails = freebox.list_voicemails().await.unwrap();
    assert_eq!(voicemails.len(), 1);
    assert!(voicemails[0].is_unread());

    let audio = freebox.download_voicemail_audio(&voicemails[0].id).await.unwrap();
    assert_eq!(audio.filename, "msg_0001.wav");
    assert_eq!(&audio.content[..], b"RIFF....WAVE");
}

#[tokio::test]
async fn test_audio_without_filename_gets_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/call/voicemail/7/audio_file", API)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1, 2, 3]))
        .mount(&server)
        .await;

    let freebox = paired_client(&server, "fr.test.audio-default").await;
    let audio = freebox.download_voicemail_audio("7").await.unwrap();
    assert_eq!(audio.filename, "voicemail.wav");
    assert_eq!(audio.len(), 3);
}

#[tokio::test]
async fn test_readiness() {
    let server = MockServer::start().await;
    let freebox = paired_client(&server, "fr.test.ready").await;

    assert!(!freebox.is_ready().await);

    Mock::given(method("GET"))
        .and(path("/api_version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"api_version": "4.0"})))
        .mount(&server)
        .await;
    assert!(freebox.is_ready().await);
}

#[tokio::test]
async fn test_unreachable_appliance_is_not_ready() {
    let freebox = freebox_watcher::FreeBox::builder(identity("fr.test.unreachable"))
        .base_url("http://127.0.0.1:1")
        .store(Arc::new(InMemoryTokenStore::new()))
        .build()
        .await
        .unwrap();
    assert!(!freebox.is_ready().await);
}

#[tokio::test]
async fn test_duplicate_instance_makes_no_request() {
    let server = MockServer::start().await;
    let first = paired_client(&server, "fr.test.duplicate").await;

    let second = builder_for(
        &server,
        "fr.test.duplicate",
        Arc::new(InMemoryTokenStore::with_token("fr.test.duplicate", "app-token")),
    )
    .build()
    .await;

    assert!(matches!(
        second,
        Err(FreeboxError::DuplicateInstance { ref app_id }) if app_id == "fr.test.duplicate"
    ));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
    drop(first);
}

#[tokio::test]
async fn test_close_releases_identity() {
    let server = MockServer::start().await;
    mount_login(&server, "s-close").await;
    Mock::given(method("POST"))
        .and(path(format!("{}/login/logout/", API)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let freebox = paired_client(&server, "fr.test.close").await;
    freebox.login().await.unwrap();
    assert!(is_registered("fr.test.close"));

    freebox.close().await;
    assert!(freebox.is_closed().await);
    assert!(!is_registered("fr.test.close"));

    let again = paired_client(&server, "fr.test.close").await;
    assert!(!again.is_closed().await);
}

#[tokio::test]
async fn test_close_survives_failed_logout() {
    let server = MockServer::start().await;
    mount_login(&server, "s-close").await;
    Mock::given(method("POST"))
        .and(path(format!("{}/login/logout/", API)))
        .respond_with(failure(500, "internal_error", "boom"))
        .mount(&server)
        .await;

    let freebox = paired_client(&server, "fr.test.close-failed").await;
    freebox.login().await.unwrap();
    freebox.close().await;
    assert!(freebox.is_closed().await);
}

#[tokio::test]
async fn test_lookalike_ids_keep_separate_tokens() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileTokenStore::with_dir(temp_dir.path()));

    let slash = builder_for(&server, "fr.test.app/one", store.clone())
        .build()
        .await
        .unwrap();
    let underscore = builder_for(&server, "fr.test.app_one", store.clone())
        .build()
        .await
        .unwrap();

    store.save(slash.identity(), "token-A").await.unwrap();
    store.save(underscore.identity(), "token-B").await.unwrap();

    assert_eq!(
        store.load(slash.identity()).await.unwrap().as_deref(),
        Some("token-A")
    );
    assert_eq!(
        store.load(underscore.identity()).await.unwrap().as_deref(),
        Some("token-B")
    );
}
