use reqwest::header::{HeaderMap, ACCEPT, COOKIE, SET_COOKIE};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "access_token";

/// Envelope code the server uses for a missing or invalid session
pub const NOT_AUTHENTICATED: i64 = 40100;

/// Envelope code for an unknown resource, also sent for an unknown user at login
pub const NOT_FOUND: i64 = 40400;

const USER_AGENT: &str = concat!("FamilyGallery/", env!("CARGO_PKG_VERSION"));

/// Error type for API operations
#[derive(Debug)]
pub enum ApiError {
    NetworkError(String),
    JsonError(String),
    /// Non-success status without an envelope body
    Http { status: u16 },
    /// Envelope with a non-zero code
    Api { code: i64, status: u16, message: String },
    Validation(String),
}

impl ApiError {
    pub fn is_unauthenticated(&self) -> bool {
        match self {
            ApiError::Api { code, .. } => *code == NOT_AUTHENTICATED,
            ApiError::Http { status } => *status == 401,
            _ => false,
        }
    }

    pub fn code(&self) -> Option<i64> {
        match self {
            ApiError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether a sign-in attempt was refused for its username or password
    pub fn is_rejected_login(&self) -> bool {
        matches!(self.code(), Some(NOT_AUTHENTICATED | NOT_FOUND))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            ApiError::JsonError(msg) => write!(f, "JSON error: {}", msg),
            ApiError::Http { status } => write!(f, "Server returned status: {}", status),
            ApiError::Api {
                code,
                status,
                message,
            } => write!(f, "{} (code {}, status {})", message, code, status),
            ApiError::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// Shared HTTP client for the gallery API
///
/// Clones share the session token, so a login through one handle
/// authenticates every other handle.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    session: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Create a client with the default request timeout
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, Duration::from_secs(60))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .tcp_keepalive(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::NetworkError(format!("Client build failed: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            session: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn session_token(&self) -> Option<String> {
        self.session.read().ok().and_then(|guard| guard.clone())
    }

    pub fn set_session_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.session.write() {
            *guard = token;
        }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let request = self.http.get(self.url(path)).query(params);
        self.execute(request).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(Method::POST, path, body).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(Method::PUT, path, body).await
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(Method::PATCH, path, body).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.http.delete(self.url(path));
        self.execute(request).await
    }

    /// Send a multipart form (used for uploads)
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let request = self.http.post(self.url(path)).multipart(form);
        self.execute(request).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.http.request(method, self.url(path)).json(body);
        self.execute(request).await
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let request = match self.session_token() {
            Some(token) => request.header(COOKIE, format!("{}={}", SESSION_COOKIE, token)),
            None => request,
        };

        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::NetworkError(format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();
        log::debug!("{} -> {}", response.url().path(), status);
        self.capture_session(response.headers());

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::NetworkError(format!("Failed to read response: {}", e)))?;

        decode_response(status, &body)
    }

    fn capture_session(&self, headers: &HeaderMap) {
        for value in headers.get_all(SET_COOKIE) {
            let Ok(raw) = value.to_str() else {
                continue;
            };
            if let Some(token) = parse_session_cookie(raw) {
                if token.is_empty() {
                    log::debug!("Session cookie cleared by server");
                    self.set_session_token(None);
                } else {
                    self.set_session_token(Some(token));
                }
            }
        }
    }
}

/// Extract the session token from a `Set-Cookie` header value
fn parse_session_cookie(header: &str) -> Option<String> {
    let pair = header.split(';').next()?.trim();
    let (name, value) = pair.split_once('=')?;
    if name.trim() != SESSION_COOKIE {
        return None;
    }
    Some(value.trim().trim_matches('"').to_string())
}

/// Unwrap the server's `{code, data, message}` envelope
///
/// Bodies without a `code` field are passed through untouched.
pub fn decode_response<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, ApiError> {
    let success = (200..300).contains(&status);

    let payload: Value = if body.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(_) if !success => return Err(ApiError::Http { status }),
            Err(e) => {
                return Err(ApiError::JsonError(format!(
                    "Failed to parse response: {}",
                    e
                )))
            }
        }
    };

    let data = match payload.as_object().filter(|o| o.contains_key("code")) {
        Some(envelope) => {
            let code = envelope.get("code").and_then(Value::as_i64).unwrap_or(-1);
            if code != 0 {
                let message = envelope
                    .get("message")
                    .and_then(Value::as_str)
                    .filter(|m| !m.is_empty())
                    .unwrap_or("API_ERROR")
                    .to_string();
                return Err(ApiError::Api {
                    code,
                    status,
                    message,
                });
            }
            envelope.get("data").cloned().unwrap_or(Value::Null)
        }
        None if !success => return Err(ApiError::Http { status }),
        None => payload,
    };

    serde_json::from_value(data)
        .map_err(|e| ApiError::JsonError(format!("Failed to parse data: {}", e)))
}

/// Drop query parameters without a value
pub fn clean_params<'a>(params: &[(&'a str, Option<String>)]) -> Vec<(&'a str, String)> {
    params
        .iter()
        .filter_map(|(key, value)| match value {
            Some(v) if !v.is_empty() => Some((*key, v.clone())),
            _ => None,
        })
        .collect()
}
