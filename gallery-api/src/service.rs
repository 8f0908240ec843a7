use crate::client::{ApiClient, ApiError};
use crate::models::{
    AccessRequest, AccessRequestBody, AccessRequestEnvelope, LoginBody, Role, SessionCredentials,
    User, UserEnvelope, ViewRoleBody,
};

/// Authentication service for the gallery API
pub struct GalleryAuthService {
    client: ApiClient,
}

impl GalleryAuthService {
    /// Create a new authentication service on top of a shared client
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Sign in and capture the session cookie
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionCredentials, ApiError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ApiError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let envelope: UserEnvelope = self
            .client
            .post("/auth/login", &LoginBody { username, password })
            .await?;

        let user = envelope
            .user
            .ok_or_else(|| ApiError::JsonError("Login response without user".to_string()))?;

        let token = self.client.session_token().ok_or_else(|| {
            ApiError::NetworkError("Server did not issue a session cookie".to_string())
        })?;

        log::info!("Signed in as {} ({})", user.username, user.role);

        Ok(SessionCredentials {
            server_url: self.client.base_url().to_string(),
            user,
            token,
        })
    }

    /// Sign out; the local token is dropped even if the server call fails
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result: Result<(), ApiError> = self.client.post("/auth/logout", &()).await;
        self.client.set_session_token(None);
        match result {
            Err(e) if e.is_unauthenticated() => Ok(()),
            other => other,
        }
    }

    /// Returns Ok(None) when no valid session exists
    pub async fn me(&self) -> Result<Option<User>, ApiError> {
        match self.client.get::<UserEnvelope>("/auth/me", &[]).await {
            Ok(envelope) => Ok(envelope.user),
            Err(e) if e.is_unauthenticated() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Ask for a viewer account; a pending request for the same name is updated
    pub async fn request_access(
        &self,
        username: &str,
        password: &str,
        message: Option<&str>,
    ) -> Result<AccessRequest, ApiError> {
        let username = username.trim();
        if username.is_empty() || username.chars().count() > 50 {
            return Err(ApiError::Validation(
                "Username must be 1 to 50 characters".to_string(),
            ));
        }
        let password_len = password.chars().count();
        if !(4..=255).contains(&password_len) {
            return Err(ApiError::Validation(
                "Password must be 4 to 255 characters".to_string(),
            ));
        }
        let message = message.map(str::trim).filter(|m| !m.is_empty());
        if message.is_some_and(|m| m.chars().count() > 255) {
            return Err(ApiError::Validation(
                "Message must be at most 255 characters".to_string(),
            ));
        }

        let envelope: AccessRequestEnvelope = self
            .client
            .post(
                "/auth/access-requests",
                &AccessRequestBody {
                    username,
                    password,
                    message,
                },
            )
            .await?;
        Ok(envelope.request)
    }

    /// Switch the role the user browses as
    ///
    /// Choosing the user's own role clears the override.
    pub async fn set_view_role(&self, user: &User, target: Role) -> Result<(), ApiError> {
        let body = view_role_body(user, target)?;
        let _: serde_json::Value = self.client.post("/auth/view-role", &body).await?;
        log::info!("View role set to {}", target);
        Ok(())
    }
}

fn view_role_body(user: &User, target: Role) -> Result<ViewRoleBody, ApiError> {
    if !user.role.view_options().contains(&target) {
        return Err(ApiError::Validation(format!(
            "A {} cannot view the gallery as {}",
            user.role, target
        )));
    }
    Ok(ViewRoleBody {
        view_role: (target != user.role).then_some(target),
    })
}
