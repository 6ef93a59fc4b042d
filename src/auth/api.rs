//! Client for the unauthenticated `/login` endpoints of the appliance.
//!
//! - `GET  /login/` fetch a challenge
//! - `POST /login/authorize/` request pairing
//! - `GET  /login/authorize/{track_id}` pairing progress
//! - `POST /login/session/` open a session
//! - `POST /login/logout/` close the session

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::identity::AppIdentity;
use crate::error::{FreeboxError, FreeboxResult};
use crate::models::{deserialize_id, ApiEnvelope};
use crate::traits::{Headers, HttpClient, Response};

/// Header carrying the session credential.
pub const AUTH_HEADER: &str = "X-Fbx-App-Auth";

/// Reply of `GET /login/`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginChallenge {
    #[serde(default)]
    pub logged_in: bool,
    #[serde(default)]
    pub challenge: Option<String>,
}

/// Reply of `POST /login/authorize/`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizationGrant {
    pub app_token: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub track_id: String,
}

/// Pairing progress reported by the appliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairingStatus {
    Pending,
    Granted,
    Denied,
    Timeout,
    #[serde(other)]
    Unknown,
}

impl PairingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PairingStatus::Pending => "pending",
            PairingStatus::Granted => "granted",
            PairingStatus::Denied => "denied",
            PairingStatus::Timeout => "timeout",
            PairingStatus::Unknown => "unknown",
        }
    }
}

/// Reply of `GET /login/authorize/{track_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizationProgress {
    pub status: PairingStatus,
    #[serde(default)]
    pub challenge: Option<String>,
}

/// Reply of `POST /login/session/`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionGrant {
    pub session_token: String,
    #[serde(default)]
    pub permissions: serde_json::Value,
}

#[derive(Serialize)]
struct SessionRequest<'a> {
    app_id: &'a str,
    password: &'a str,
}

/// Decode the `{success, result}` envelope of a response.
///
/// A non-2xx status that still carries an envelope is decoded as well, so
/// callers can inspect `error_code`.
pub(crate) fn parse_envelope<T: DeserializeOwned>(
    endpoint: &str,
    response: &Response,
) -> FreeboxResult<ApiEnvelope<T>> {
    response.json::<ApiEnvelope<T>>().map_err(|e| {
        if response.is_success() {
            FreeboxError::malformed(endpoint, e)
        } else {
            let body = response.text().unwrap_or_default();
            FreeboxError::protocol(endpoint, response.status, truncate(&body, 200))
        }
    })
}

/// Decode a successful envelope and return its `result`.
pub(crate) fn expect_result<T: DeserializeOwned>(
    endpoint: &str,
    response: &Response,
) -> FreeboxResult<T> {
    let envelope = parse_envelope::<T>(endpoint, response)?;
    if !response.is_success() || !envelope.success {
        return Err(FreeboxError::protocol(
            endpoint,
            response.status,
            envelope.describe_error(),
        ));
    }
    envelope
        .result
        .ok_or_else(|| FreeboxError::malformed(endpoint, "missing result"))
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Login endpoints client.
#[derive(Clone)]
pub struct LoginApi {
    http: Arc<dyn HttpClient>,
    api_url: String,
}

impl LoginApi {
    /// `api_url` is the versioned prefix, e.g. `http://mafreebox.freebox.fr/api/v4`.
    pub fn new(http: Arc<dyn HttpClient>, api_url: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn json_headers() -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers
    }

    /// Fetch a fresh login challenge.
    ///
    /// GET /login/
    pub async fn challenge(&self) -> FreeboxResult<LoginChallenge> {
        let endpoint = "/login/";
        let url = format!("{}{}", self.api_url, endpoint);
        let response = self.http.get(&url, &Headers::new()).await?;
        expect_result(endpoint, &response)
    }

    /// Ask the appliance to pair `identity`. A human must confirm on the
    /// front panel.
    ///
    /// POST /login/authorize/
    pub async fn request_authorization(
        &self,
        identity: &AppIdentity,
    ) -> FreeboxResult<AuthorizationGrant> {
        let endpoint = "/login/authorize/";
        let url = format!("{}{}", self.api_url, endpoint);
        let body = serde_json::to_string(identity)
            .map_err(|e| FreeboxError::Config(format!("cannot encode identity: {}", e)))?;
        let response = self.http.post(&url, &body, &Self::json_headers()).await?;
        expect_result(endpoint, &response)
    }

    /// Check the progress of a pairing request.
    ///
    /// GET /login/authorize/{track_id}
    pub async fn authorization_progress(
        &self,
        track_id: &str,
    ) -> FreeboxResult<AuthorizationProgress> {
        let endpoint = format!("/login/authorize/{}", track_id);
        let url = format!("{}{}", self.api_url, endpoint);
        let response = self.http.get(&url, &Headers::new()).await?;
        expect_result(&endpoint, &response)
    }

    /// Exchange a challenge password for a session token.
    ///
    /// POST /login/session/
    ///
    /// A 403 means the pairing token is not (or no longer) accepted.
    pub async fn open_session(&self, app_id: &str, password: &str) -> FreeboxResult<SessionGrant> {
        let endpoint = "/login/session/";
        let url = format!("{}{}", self.api_url, endpoint);
        let body = serde_json::to_string(&SessionRequest { app_id, password })
            .map_err(|e| FreeboxError::Config(format!("cannot encode session request: {}", e)))?;
        let response = self.http.post(&url, &body, &Self::json_headers()).await?;

        if response.status == 403 {
            return Err(FreeboxError::NotAuthorized);
        }
        expect_result(endpoint, &response)
    }

    /// Close the session identified by `session_token`.
    ///
    /// POST /login/logout/
    pub async fn logout(&self, session_token: &str) -> FreeboxResult<()> {
        let endpoint = "/login/logout/";
        let url = format!("{}{}", self.api_url, endpoint);
        let mut headers = Self::json_headers();
        headers.insert(AUTH_HEADER.to_string(), session_token.to_string());
        let response = self.http.post(&url, "", &headers).await?;

        let envelope = parse_envelope::<serde_json::Value>(endpoint, &response)?;
        if !response.is_success() || !envelope.success {
            return Err(FreeboxError::protocol(
                endpoint,
                response.status,
                envelope.describe_error(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for LoginApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginApi")
            .field("api_url", &self.api_url)
            .finish()
    }
}
