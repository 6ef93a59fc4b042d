//! Client for the Freebox call log and voicemail API.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::adapters::{FileTokenStore, ReqwestHttpClient};
use crate::auth::api::parse_envelope;
use crate::auth::{AppIdentity, IdentityGuard, PairingPolicy, Session};
use crate::error::{FreeboxError, FreeboxResult};
use crate::models::{filename_from_content_disposition, AudioFile, CallEntry, Voicemail};
use crate::traits::{Headers, HttpClient, TokenStore};

/// Default address of the appliance on the local network.
pub const DEFAULT_BASE_URL: &str = "http://mafreebox.freebox.fr";

/// Versioned API prefix.
pub const API_PREFIX: &str = "/api/v4";

/// Unauthenticated endpoint answering as soon as the appliance is up.
pub const READINESS_PATH: &str = "/api_version";

/// Builder for [`FreeBox`].
pub struct FreeBoxBuilder {
    identity: AppIdentity,
    base_url: String,
    http: Option<Arc<dyn HttpClient>>,
    store: Option<Arc<dyn TokenStore>>,
    pairing: PairingPolicy,
}

impl FreeBoxBuilder {
    /// Base URL of the appliance (scheme and host, no API prefix).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn http(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    pub fn store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn pairing(mut self, policy: PairingPolicy) -> Self {
        self.pairing = policy;
        self
    }

    /// Register the identity and load its pairing token.
    ///
    /// # Errors
    /// [`FreeboxError::DuplicateInstance`] if a live client already uses the
    /// same application id. No request is made in that case.
    pub async fn build(self) -> FreeboxResult<FreeBox> {
        let guard = IdentityGuard::register(&self.identity)?;

        let store: Arc<dyn TokenStore> = match self.store {
            Some(store) => store,
            None => Arc::new(FileTokenStore::new()?),
        };
        let http: Arc<dyn HttpClient> = match self.http {
            Some(http) => http,
            None => Arc::new(ReqwestHttpClient::new()),
        };

        let app_token = store.load(&self.identity).await?;
        debug!(
            app_id = self.identity.id(),
            paired = app_token.is_some(),
            "Loaded pairing token"
        );

        let api_url = format!("{}{}", self.base_url, API_PREFIX);
        let session = Session::new(
            Arc::clone(&http),
            api_url,
            self.identity,
            store,
            app_token,
            self.pairing,
        );

        Ok(FreeBox {
            session,
            http,
            base_url: self.base_url,
            guard: Mutex::new(Some(guard)),
        })
    }
}

/// A client bound to one application identity.
///
/// At most one live `FreeBox` exists per application id in a process. The id
/// is released by [`FreeBox::close`] or when the client is dropped.
pub struct FreeBox {
    session: Session,
    http: Arc<dyn HttpClient>,
    base_url: String,
    guard: Mutex<Option<IdentityGuard>>,
}

impl FreeBox {
    pub fn builder(identity: AppIdentity) -> FreeBoxBuilder {
        FreeBoxBuilder {
            identity,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: None,
            store: None,
            pairing: PairingPolicy::default(),
        }
    }

    pub fn identity(&self) -> &AppIdentity {
        self.session.identity()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Log in with the stored pairing token.
    pub async fn login(&self) -> FreeboxResult<String> {
        self.session.login().await
    }

    /// Log in, pairing once if needed. `Ok(None)` means no session.
    pub async fn easy_login(&self) -> FreeboxResult<Option<String>> {
        self.session.easy_login().await
    }

    /// Call log, newest first.
    pub async fn list_calls(&self) -> FreeboxResult<Vec<CallEntry>> {
        self.get_list("/call/log/").await
    }

    /// A single call log entry. `Ok(None)` when the id does not exist (yet).
    pub async fn get_call(&self, id: i64) -> FreeboxResult<Option<CallEntry>> {
        let endpoint = format!("/call/log/{}", id);
        let response = self.session.get(&endpoint).await?;
        let envelope = parse_envelope::<CallEntry>(&endpoint, &response)?;

        if envelope.is_invalid_id() {
            return Ok(None);
        }
        if !response.is_success() || !envelope.success {
            return Err(FreeboxError::protocol(
                &endpoint,
                response.status,
                envelope.describe_error(),
            ));
        }
        envelope
            .result
            .map(Some)
            .ok_or_else(|| FreeboxError::malformed(&endpoint, "missing result"))
    }

    /// Voicemail messages, as listed by the appliance.
    pub async fn list_voicemails(&self) -> FreeboxResult<Vec<Voicemail>> {
        self.get_list("/call/voicemail/").await
    }

    /// Download the audio recording of voicemail `id`.
    pub async fn download_voicemail_audio(&self, id: &str) -> FreeboxResult<AudioFile> {
        let endpoint = format!("/call/voicemail/{}/audio_file", urlencoding::encode(id));
        let response = self.session.get(&endpoint).await?;

        if !response.is_success() {
            let message = parse_envelope::<serde_json::Value>(&endpoint, &response)
                .map(|e| e.describe_error())
                .unwrap_or_else(|_| "audio download failed".to_string());
            return Err(FreeboxError::protocol(&endpoint, response.status, message));
        }

        let filename = filename_from_content_disposition(response.header("Content-Disposition"));
        debug!(id, filename = %filename, bytes = response.body.len(), "Downloaded voicemail audio");
        Ok(AudioFile::new(filename, response.body))
    }

    /// Whether the appliance answers its unauthenticated version endpoint.
    /// Never fails: any error means "not ready".
    pub async fn is_ready(&self) -> bool {
        let url = format!("{}{}", self.base_url, READINESS_PATH);
        match self.http.get(&url, &Headers::new()).await {
            Ok(response) => response.is_success(),
            Err(e) => {
                debug!(error = %e, "Readiness probe failed");
                false
            }
        }
    }

    /// Log out and release the application id. Logout errors are logged.
    pub async fn close(&self) {
        if let Err(e) = self.session.logout().await {
            warn!(error = %e, "Logout failed");
        }
        if let Some(guard) = self.guard.lock().await.take() {
            info!(app_id = guard.app_id(), "Freebox client closed");
        }
    }

    /// Whether [`FreeBox::close`] has already run.
    pub async fn is_closed(&self) -> bool {
        self.guard.lock().await.is_none()
    }

    async fn get_list<T: DeserializeOwned>(&self, endpoint: &str) -> FreeboxResult<Vec<T>> {
        let response = self.session.get(endpoint).await?;
        let envelope = parse_envelope::<Vec<T>>(endpoint, &response)?;
        if !response.is_success() || !envelope.success {
            return Err(FreeboxError::protocol(
                endpoint,
                response.status,
                envelope.describe_error(),
            ));
        }
        // An empty list comes back without a result field.
        Ok(envelope.result.unwrap_or_default())
    }
}

impl std::fmt::Debug for FreeBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreeBox")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{InMemoryTokenStore, MockHttpClient, MockResponse};
    use crate::traits::Response;
    use bytes::Bytes;
    use serde_json::json;

    const BASE: &str = "http://box.test";

    async fn client(app_id: &str, mock: &MockHttpClient) -> FreeBox {
        FreeBox::builder(AppIdentity::with_device(app_id, "Test", "1.0", "host"))
            .base_url(BASE)
            .http(Arc::new(mock.clone()))
            .store(Arc::new(InMemoryTokenStore::with_token(app_id, "tok")))
            .build()
            .await
            .unwrap()
    }

    fn api(path: &str) -> String {
        format!("{}{}{}", BASE, API_PREFIX, path)
    }

    #[tokio::test]
    async fn test_get_call_invalid_id_is_none() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &api("/call/log/99"),
            MockResponse::json(
                404,
                json!({"success": false, "error_code": "invalid_id", "msg": "not found"}),
            ),
        );
        let fbx = client("fr.test.fbx.invalid", &mock).await;
        assert!(fbx.get_call(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_call_other_error_is_protocol() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &api("/call/log/5"),
            MockResponse::json(500, json!({"success": false, "error_code": "internal_error"})),
        );
        let fbx = client("fr.test.fbx.err", &mock).await;
        let err = fbx.get_call(5).await.unwrap_err();
        assert!(matches!(err, FreeboxError::Protocol { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_list_calls_empty_without_result() {
        let mock = MockHttpClient::new();
        mock.set_response(&api("/call/log/"), MockResponse::json(200, json!({"success": true})));
        let fbx = client("fr.test.fbx.empty", &mock).await;
        assert!(fbx.list_calls().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_download_uses_content_disposition() {
        let mock = MockHttpClient::new();
        let mut headers = Headers::new();
        headers.insert(
            "content-disposition".to_string(),
            r#"attachment; filename="msg_1.wav""#.to_string(),
        );
        mock.set_response(
            &api("/call/voicemail/msg_1/audio_file"),
            MockResponse::Success(Response::with_headers(
                200,
                headers,
                Bytes::from_static(b"RIFF...."),
            )),
        );
        let fbx = client("fr.test.fbx.audio", &mock).await;
        let audio = fbx.download_voicemail_audio("msg_1").await.unwrap();
        assert_eq!(audio.filename, "msg_1.wav");
        assert_eq!(&audio.content[..], b"RIFF....");
    }

    #[tokio::test]
    async fn test_is_ready() {
        let mock = MockHttpClient::new();
        let fbx = client("fr.test.fbx.ready", &mock).await;
        assert!(!fbx.is_ready().await);

        mock.set_response(
            &format!("{}{}", BASE, READINESS_PATH),
            MockResponse::json(200, json!({"api_version": "4.0"})),
        );
        assert!(fbx.is_ready().await);
    }

    #[tokio::test]
    async fn test_duplicate_identity_rejected_then_released() {
        let mock = MockHttpClient::new();
        let first = client("fr.test.fbx.dup", &mock).await;

        let second = FreeBox::builder(AppIdentity::with_device("fr.test.fbx.dup", "T", "1", "h"))
            .http(Arc::new(mock.clone()))
            .store(Arc::new(InMemoryTokenStore::new()))
            .build()
            .await;
        assert!(matches!(second, Err(FreeboxError::DuplicateInstance { .. })));
        assert!(mock.get_requests().is_empty());

        first.close().await;
        assert!(first.is_closed().await);
        let third = client("fr.test.fbx.dup", &mock).await;
        third.close().await;
    }
}
