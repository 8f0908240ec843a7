use crate::config::GalleryConfig;
use crate::error::AppError;
use crate::services::settings_service;
use gallery_api::{AccessRequest, ApiClient, ApiError, GalleryAuthService, Role, User};
use rusqlite::Connection;
use serde::Serialize;
use std::time::Duration;

/// Message sent with an access request made after a refused sign-in
pub const AUTO_ACCESS_REQUEST_MESSAGE: &str = "Automatically submitted guest access request";

/// Result of a sign-in that may fall back to requesting access
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginOutcome {
    SignedIn(User),
    AccessRequested(AccessRequest),
}

/// Builds the API client and restores the stored session token, if any
pub fn connect(conn: &Connection, config: &GalleryConfig) -> Result<ApiClient, AppError> {
    let client = ApiClient::with_timeout(
        &config.api_base,
        Duration::from_secs(config.request_timeout_secs),
    )?;

    if let Some(settings) = settings_service::load_settings(conn, client.base_url())? {
        if settings.is_signed_in() {
            log::debug!("Restoring session for {}", settings.server_url);
            client.set_session_token(settings.session_token);
        }
    }

    Ok(client)
}

/// Signs in and stores the session for the next run
pub async fn login(
    conn: &Connection,
    client: &ApiClient,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    let auth = GalleryAuthService::new(client.clone());
    let credentials = auth.login(username, password).await.map_err(login_error)?;
    settings_service::save_session(conn, &credentials)?;
    Ok(credentials.user)
}

/// A refused sign-in is about the credentials, not a missing session
fn login_error(e: ApiError) -> AppError {
    if e.is_rejected_login() {
        log::info!("Sign-in refused: {}", e);
        AppError::InvalidCredentials
    } else {
        e.into()
    }
}

/// Signs in, or submits an access request with the same credentials when
/// the server refuses them
pub async fn login_or_request_access(
    conn: &Connection,
    client: &ApiClient,
    username: &str,
    password: &str,
) -> Result<LoginOutcome, AppError> {
    match login(conn, client, username, password).await {
        Ok(user) => Ok(LoginOutcome::SignedIn(user)),
        Err(AppError::InvalidCredentials) => {
            let request =
                request_access(client, username, password, Some(AUTO_ACCESS_REQUEST_MESSAGE))
                    .await?;
            Ok(LoginOutcome::AccessRequested(request))
        }
        Err(e) => Err(e),
    }
}

/// Signs out; the stored token is removed even when the server is unreachable
pub async fn logout(conn: &Connection, client: &ApiClient) -> Result<(), AppError> {
    let auth = GalleryAuthService::new(client.clone());
    let result = auth.logout().await;
    settings_service::clear_session(conn, client.base_url())?;
    if let Err(e) = result {
        log::warn!("Server logout failed: {}", e);
    }
    Ok(())
}

/// Current user, or None when the stored session is missing or expired
///
/// An expired session is dropped from the local store.
pub async fn current_user(conn: &Connection, client: &ApiClient) -> Result<Option<User>, AppError> {
    if client.session_token().is_none() {
        return Ok(None);
    }

    let auth = GalleryAuthService::new(client.clone());
    let user = auth.me().await?;
    if user.is_none() {
        log::info!("Stored session has expired");
        client.set_session_token(None);
        settings_service::clear_session(conn, client.base_url())?;
    }
    Ok(user)
}

/// Like [`current_user`] but fails when nobody is signed in
pub async fn require_user(conn: &Connection, client: &ApiClient) -> Result<User, AppError> {
    current_user(conn, client).await?.ok_or(AppError::NotSignedIn)
}

pub async fn require_developer(conn: &Connection, client: &ApiClient) -> Result<User, AppError> {
    let user = require_user(conn, client).await?;
    if !user.is_developer() {
        return Err(AppError::Validation(
            "This action requires a developer account".to_string(),
        ));
    }
    Ok(user)
}

pub async fn require_manager(conn: &Connection, client: &ApiClient) -> Result<User, AppError> {
    let user = require_user(conn, client).await?;
    if !user.is_manager() {
        return Err(AppError::Validation(
            "This action requires a manager account".to_string(),
        ));
    }
    Ok(user)
}

/// Submits an access request as a guest
pub async fn request_access(
    client: &ApiClient,
    username: &str,
    password: &str,
    message: Option<&str>,
) -> Result<AccessRequest, AppError> {
    let auth = GalleryAuthService::new(client.clone());
    let request = auth.request_access(username, password, message).await?;
    log::info!("Access request {} submitted for {}", request.id, request.username);
    Ok(request)
}

/// Switches the role the signed-in user browses as
pub async fn set_view_role(
    conn: &Connection,
    client: &ApiClient,
    target: Role,
) -> Result<User, AppError> {
    let user = require_user(conn, client).await?;
    let auth = GalleryAuthService::new(client.clone());
    auth.set_view_role(&user, target).await?;
    require_user(conn, client).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database;
    use gallery_api::{AccessRequestStatus, SessionCredentials};
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    const REFUSED: &str = r#"{"code": 40100, "data": null, "message": "INVALID_CREDENTIALS"}"#;

    /// Answers one connection per canned `(status, body)` and returns what was asked
    fn serve(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let mut requests = Vec::new();
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());

                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                let mut content_length = 0;
                loop {
                    let mut header = String::new();
                    reader.read_line(&mut header).unwrap();
                    let header = header.trim_end();
                    if header.is_empty() {
                        break;
                    }
                    if let Some((name, value)) = header.split_once(':') {
                        if name.eq_ignore_ascii_case("content-length") {
                            content_length = value.trim().parse().unwrap();
                        }
                    }
                }
                let mut payload = vec![0; content_length];
                reader.read_exact(&mut payload).unwrap();
                requests.push(format!(
                    "{} {}",
                    request_line.trim_end(),
                    String::from_utf8_lossy(&payload)
                ));

                let response = format!(
                    "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                stream.write_all(response.as_bytes()).unwrap();
            }
            requests
        });
        (base, handle)
    }

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        database::schema::init_schema(&conn).unwrap();
        conn
    }

    fn config(api_base: &str) -> GalleryConfig {
        GalleryConfig {
            api_base: api_base.to_string(),
            ..GalleryConfig::default()
        }
    }

    fn store_token(conn: &Connection, server: &str, token: &str) {
        settings_service::save_session(
            conn,
            &SessionCredentials {
                server_url: server.to_string(),
                user: User {
                    id: 7,
                    username: "alice".to_string(),
                    role: Role::Viewer,
                    effective_role: None,
                },
                token: token.to_string(),
            },
        )
        .unwrap();
    }

    #[test]
    fn test_connect_without_stored_session() {
        let conn = setup();
        let client = connect(&conn, &config("http://127.0.0.1:9")).unwrap();
        assert!(client.session_token().is_none());
    }

    #[test]
    fn test_connect_restores_token_for_same_server() {
        let conn = setup();
        store_token(&conn, "http://127.0.0.1:9", "abc");

        let client = connect(&conn, &config("http://127.0.0.1:9/")).unwrap();
        assert_eq!(client.session_token().as_deref(), Some("abc"));

        let other = connect(&conn, &config("http://127.0.0.1:10")).unwrap();
        assert!(other.session_token().is_none());
    }

    #[tokio::test]
    async fn test_current_user_without_token_skips_request() {
        let conn = setup();
        let client = connect(&conn, &config("http://127.0.0.1:9")).unwrap();
        assert!(current_user(&conn, &client).await.unwrap().is_none());
        assert!(matches!(
            require_user(&conn, &client).await,
            Err(AppError::NotSignedIn)
        ));
    }

    #[tokio::test]
    async fn test_logout_clears_token_when_server_unreachable() {
        let conn = setup();
        store_token(&conn, "http://127.0.0.1:9", "abc");
        let client = connect(&conn, &config("http://127.0.0.1:9")).unwrap();

        logout(&conn, &client).await.unwrap();

        assert!(client.session_token().is_none());
        let stored = settings_service::load_settings(&conn, "http://127.0.0.1:9")
            .unwrap()
            .unwrap();
        assert!(!stored.is_signed_in());
    }

    #[test]
    fn test_refused_login_is_a_credentials_error() {
        let err = login_error(ApiError::Api {
            code: 40100,
            status: 401,
            message: "INVALID_CREDENTIALS".to_string(),
        });
        assert!(matches!(err, AppError::InvalidCredentials));
        assert_eq!(err.user_message(), "Wrong username or password.");

        let err = login_error(ApiError::NetworkError("refused".to_string()));
        assert!(matches!(err, AppError::Api(_)));
    }

    #[tokio::test]
    async fn test_wrong_password_does_not_ask_to_sign_in() {
        let (base, server) = serve(vec![(401, REFUSED)]);
        let conn = setup();
        let client = connect(&conn, &config(&base)).unwrap();

        let err = login(&conn, &client, "alice", "wrong").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
        assert_ne!(err.user_message(), AppError::NotSignedIn.user_message());

        let requests = server.join().unwrap();
        assert!(requests[0].starts_with("POST /auth/login "));
        assert!(settings_service::load_settings(&conn, &base).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_refused_login_submits_access_request() {
        let (base, server) = serve(vec![
            (401, REFUSED),
            (
                200,
                r#"{"code": 0, "message": "ok", "data": {"request": {"id": 3, "username": "alice", "status": "pending", "message": "Automatically submitted guest access request"}}}"#,
            ),
        ]);
        let conn = setup();
        let client = connect(&conn, &config(&base)).unwrap();

        let outcome = login_or_request_access(&conn, &client, "alice", "secret")
            .await
            .unwrap();
        match outcome {
            LoginOutcome::AccessRequested(request) => {
                assert_eq!(request.id, 3);
                assert_eq!(request.status, AccessRequestStatus::Pending);
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        let requests = server.join().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].starts_with("POST /auth/access-requests "));
        assert!(requests[1].contains(r#""password":"secret""#));
        assert!(requests[1].contains(AUTO_ACCESS_REQUEST_MESSAGE));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_not_a_refusal() {
        let conn = setup();
        let client = connect(&conn, &config("http://127.0.0.1:9")).unwrap();
        let err = login_or_request_access(&conn, &client, "alice", "secret")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Api(ApiError::NetworkError(_))));
    }

    #[tokio::test]
    async fn test_login_validates_before_request() {
        let conn = setup();
        let client = connect(&conn, &config("http://127.0.0.1:9")).unwrap();
        let err = login(&conn, &client, "  ", "secret").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
