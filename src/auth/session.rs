//! Authenticated session with the appliance.
//!
//! Holds the pairing token and the current session token. Every
//! authenticated request goes through [`Session::get`] / [`Session::post`],
//! which refresh the session once when the appliance refuses the token and
//! replay the request.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::api::{LoginApi, AUTH_HEADER};
use super::challenge::compute_password;
use super::identity::AppIdentity;
use super::pairing::{self, PairingOutcome, PairingPolicy};
use crate::error::{FreeboxError, FreeboxResult};
use crate::traits::{Headers, HttpClient, Response, TokenStore};

/// Statuses the appliance uses when the session token is refused.
fn is_auth_failure(status: u16) -> bool {
    status == 401 || status == 403
}

#[derive(Debug, Clone, Copy)]
enum Method {
    Get,
    Post,
}

pub struct Session {
    http: Arc<dyn HttpClient>,
    api: LoginApi,
    identity: AppIdentity,
    store: Arc<dyn TokenStore>,
    pairing: PairingPolicy,
    app_token: RwLock<Option<String>>,
    session_token: RwLock<Option<String>>,
    /// Serializes refreshes so concurrent refusals log in only once.
    refresh_lock: Mutex<()>,
}

impl Session {
    /// Create a session for `identity`. `app_token` is the pairing token
    /// loaded from the store, if any.
    pub fn new(
        http: Arc<dyn HttpClient>,
        api_url: impl Into<String>,
        identity: AppIdentity,
        store: Arc<dyn TokenStore>,
        app_token: Option<String>,
        pairing: PairingPolicy,
    ) -> Self {
        Self {
            api: LoginApi::new(Arc::clone(&http), api_url),
            http,
            identity,
            store,
            pairing,
            app_token: RwLock::new(app_token),
            session_token: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn identity(&self) -> &AppIdentity {
        &self.identity
    }

    pub fn api_url(&self) -> &str {
        self.api.api_url()
    }

    pub async fn has_app_token(&self) -> bool {
        self.app_token.read().await.is_some()
    }

    /// Current session credential, if logged in.
    pub async fn session_token(&self) -> Option<String> {
        self.session_token.read().await.clone()
    }

    /// Log in with the stored pairing token.
    ///
    /// # Errors
    /// - [`FreeboxError::NotAuthorized`] if no pairing token is held or the
    ///   appliance refuses it
    /// - [`FreeboxError::Protocol`] on any other failure of the exchange
    pub async fn login(&self) -> FreeboxResult<String> {
        let app_token = self
            .app_token
            .read()
            .await
            .clone()
            .ok_or(FreeboxError::NotAuthorized)?;

        let challenge = self.api.challenge().await?;
        if challenge.logged_in {
            debug!("Challenge reports an already logged in session");
        }
        let challenge = challenge.challenge.ok_or(FreeboxError::NotAuthorized)?;

        let password = compute_password(&app_token, &challenge)?;
        let grant = self.api.open_session(self.identity.id(), &password).await?;

        *self.session_token.write().await = Some(grant.session_token.clone());
        info!(app_id = self.identity.id(), "Logged in to the Freebox");
        Ok(grant.session_token)
    }

    /// Run one pairing cycle. On success the new pairing token is persisted
    /// and kept for the next login.
    pub async fn pair(&self) -> FreeboxResult<bool> {
        match pairing::pair(&self.api, &self.identity, self.pairing).await? {
            PairingOutcome::Granted(token) => {
                self.store.save(&self.identity, &token).await?;
                *self.app_token.write().await = Some(token);
                Ok(true)
            }
            PairingOutcome::Refused(_) | PairingOutcome::TimedOut => Ok(false),
        }
    }

    /// Log in, pairing once if the appliance does not know the application.
    ///
    /// Makes at most two login attempts and one pairing cycle. Returns
    /// `Ok(None)` when no session could be obtained.
    pub async fn easy_login(&self) -> FreeboxResult<Option<String>> {
        match self.login().await {
            Ok(token) => return Ok(Some(token)),
            Err(FreeboxError::NotAuthorized) => {}
            Err(e) => return Err(e),
        }

        if !self.pair().await? {
            return Ok(None);
        }

        match self.login().await {
            Ok(token) => Ok(Some(token)),
            Err(FreeboxError::NotAuthorized) => {
                warn!("Login refused right after pairing");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Authenticated GET on `path` (relative to the API prefix).
    pub async fn get(&self, path: &str) -> FreeboxResult<Response> {
        self.execute(Method::Get, path, None).await
    }

    /// Authenticated POST of a JSON body on `path`.
    pub async fn post(&self, path: &str, body: &str) -> FreeboxResult<Response> {
        self.execute(Method::Post, path, Some(body)).await
    }

    /// Close the current session. Does nothing when not logged in.
    pub async fn logout(&self) -> FreeboxResult<()> {
        let token = self.session_token.write().await.take();
        match token {
            Some(token) => self.api.logout(&token).await,
            None => Ok(()),
        }
    }

    async fn execute(&self, method: Method, path: &str, body: Option<&str>) -> FreeboxResult<Response> {
        let url = format!("{}{}", self.api.api_url(), path);

        let used = self.session_token().await;
        let response = self.send(method, &url, body, used.as_deref()).await?;
        if !is_auth_failure(response.status) {
            return Ok(response);
        }

        debug!(path, status = response.status, "Session refused, refreshing");
        self.refresh(used.as_deref()).await?;

        let current = self.session_token().await;
        let retried = self.send(method, &url, body, current.as_deref()).await?;
        if is_auth_failure(retried.status) {
            return Err(FreeboxError::SessionRejected {
                endpoint: path.to_string(),
                status: retried.status,
            });
        }
        Ok(retried)
    }

    /// Log in again unless another request already replaced `stale`.
    async fn refresh(&self, stale: Option<&str>) -> FreeboxResult<()> {
        let _guard = self.refresh_lock.lock().await;
        if self.session_token.read().await.as_deref() != stale {
            debug!("Session already refreshed by a concurrent request");
            return Ok(());
        }
        self.login().await.map(|_| ())
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&str>,
        token: Option<&str>,
    ) -> FreeboxResult<Response> {
        let mut headers = Headers::new();
        if let Some(token) = token {
            headers.insert(AUTH_HEADER.to_string(), token.to_string());
        }
        let response = match method {
            Method::Get => self.http.get(url, &headers).await?,
            Method::Post => {
                headers.insert("Content-Type".to_string(), "application/json".to_string());
                self.http.post(url, body.unwrap_or_default(), &headers).await?
            }
        };
        Ok(response)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("api", &self.api)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{InMemoryTokenStore, MockHttpClient, MockResponse};
    use serde_json::json;
    use std::time::Duration;

    const API: &str = "http://box.test/api/v4";
    const APP_ID: &str = "fr.test.session";

    fn identity() -> AppIdentity {
        AppIdentity::with_device(APP_ID, "Test", "1.0", "host")
    }

    fn session(mock: &MockHttpClient, store: &InMemoryTokenStore) -> Session {
        Session::new(
            Arc::new(mock.clone()),
            API,
            identity(),
            Arc::new(store.clone()),
            store.token(APP_ID),
            PairingPolicy::default().with_poll_interval(Duration::from_millis(1)),
        )
    }

    fn mock_login(mock: &MockHttpClient) {
        mock.set_response(
            &format!("{}/login/", API),
            MockResponse::json(
                200,
                json!({"success": true, "result": {"logged_in": false, "challenge": "chal"}}),
            ),
        );
        mock.set_response(
            &format!("{}/login/session/", API),
            MockResponse::json(
                200,
                json!({"success": true, "result": {"session_token": "sess-1", "permissions": {}}}),
            ),
        );
    }

    #[tokio::test]
    async fn test_login_without_token_is_not_authorized() {
        let mock = MockHttpClient::new();
        let store = InMemoryTokenStore::new();
        let err = session(&mock, &store).login().await.unwrap_err();
        assert!(matches!(err, FreeboxError::NotAuthorized));
        assert!(mock.get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_login_sends_hmac_password() {
        let mock = MockHttpClient::new();
        mock_login(&mock);
        let store = InMemoryTokenStore::with_token(APP_ID, "app-token");
        let session = session(&mock, &store);

        let token = session.login().await.unwrap();
        assert_eq!(token, "sess-1");
        assert_eq!(session.session_token().await.as_deref(), Some("sess-1"));

        let requests = mock.get_requests();
        let open = requests
            .iter()
            .find(|r| r.url.ends_with("/login/session/"))
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(open.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["app_id"], APP_ID);
        assert_eq!(
            body["password"],
            compute_password("app-token", "chal").unwrap()
        );
    }

    #[tokio::test]
    async fn test_refused_request_is_replayed_once() {
        let mock = MockHttpClient::new();
        mock_login(&mock);
        let url = format!("{}/call/log/", API);
        mock.push_response(&url, MockResponse::json(403, json!({"success": false})));
        mock.push_response(&url, MockResponse::json(200, json!({"success": true, "result": []})));
        let store = InMemoryTokenStore::with_token(APP_ID, "app-token");
        let session = session(&mock, &store);

        let response = session.get("/call/log/").await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(mock.request_count(&url), 2);
        assert_eq!(mock.request_count(&format!("{}/login/session/", API)), 1);

        let replay = mock
            .get_requests()
            .into_iter()
            .filter(|r| r.url == url)
            .last()
            .unwrap();
        assert_eq!(replay.headers.get(AUTH_HEADER).map(String::as_str), Some("sess-1"));
    }

    #[tokio::test]
    async fn test_second_refusal_is_session_rejected() {
        let mock = MockHttpClient::new();
        mock_login(&mock);
        let url = format!("{}/call/log/", API);
        mock.set_response(&url, MockResponse::json(403, json!({"success": false})));
        let store = InMemoryTokenStore::with_token(APP_ID, "app-token");

        let err = session(&mock, &store).get("/call/log/").await.unwrap_err();
        assert!(matches!(err, FreeboxError::SessionRejected { status: 403, .. }));
        assert_eq!(mock.request_count(&url), 2);
    }

    #[tokio::test]
    async fn test_easy_login_pairs_once_when_refused() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &format!("{}/login/authorize/", API),
            MockResponse::json(
                200,
                json!({"success": true, "result": {"app_token": "paired", "track_id": 1}}),
            ),
        );
        mock.set_response(
            &format!("{}/login/authorize/1", API),
            MockResponse::json(200, json!({"success": true, "result": {"status": "denied"}})),
        );
        let store = InMemoryTokenStore::new();

        let result = session(&mock, &store).easy_login().await.unwrap();
        assert!(result.is_none());
        assert_eq!(mock.request_count(&format!("{}/login/authorize/", API)), 1);
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_logout_clears_token() {
        let mock = MockHttpClient::new();
        mock_login(&mock);
        mock.set_response(
            &format!("{}/login/logout/", API),
            MockResponse::json(200, json!({"success": true})),
        );
        let store = InMemoryTokenStore::with_token(APP_ID, "app-token");
        let session = session(&mock, &store);
        session.login().await.unwrap();

        session.logout().await.unwrap();
        assert!(session.session_token().await.is_none());
        // second logout is a no-op
        session.logout().await.unwrap();
        assert_eq!(mock.request_count(&format!("{}/login/logout/", API)), 1);
    }
}
