use crate::error::AppError;
use gallery_api::{AccessRequest, AccessRequestStatus, Account, ApiClient, Role};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct Items<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct RequestEnvelope {
    request: AccessRequest,
}

#[derive(Debug, Serialize)]
struct RoleBody {
    role: Role,
}

#[derive(Debug, Serialize)]
struct DecisionBody<'a> {
    note: Option<&'a str>,
}

/// Approve or reject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    fn path(&self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Reject => "reject",
        }
    }
}

pub async fn list_accounts(client: &ApiClient) -> Result<Vec<Account>, AppError> {
    let page: Items<Account> = client.get("/auth/users", &[]).await?;
    Ok(page.items)
}

/// Changes an account's role; developer accounts cannot be assigned here
pub async fn update_account_role(
    client: &ApiClient,
    user_id: i64,
    role: Role,
) -> Result<Account, AppError> {
    if role == Role::Developer {
        return Err(AppError::Validation(
            "Role must be viewer or manager".to_string(),
        ));
    }
    let account: Account = client
        .post(&format!("/auth/users/{}/role", user_id), &RoleBody { role })
        .await?;
    log::info!("Account {} is now {}", account.username, account.role);
    Ok(account)
}

/// Access requests, newest first; optionally only one status
pub async fn list_access_requests(
    client: &ApiClient,
    status: Option<AccessRequestStatus>,
) -> Result<Vec<AccessRequest>, AppError> {
    let page: Items<AccessRequest> = client.get("/auth/access-requests", &[]).await?;
    Ok(page
        .items
        .into_iter()
        .filter(|r| status.map_or(true, |s| r.status == s))
        .collect())
}

fn normalize_note(note: Option<&str>) -> Result<Option<&str>, AppError> {
    let note = note.map(str::trim).filter(|n| !n.is_empty());
    if note.is_some_and(|n| n.chars().count() > 255) {
        return Err(AppError::Validation(
            "Note must be at most 255 characters".to_string(),
        ));
    }
    Ok(note)
}

/// Approves or rejects a pending request
///
/// Approving creates a viewer account with the requested credentials.
pub async fn decide_access_request(
    client: &ApiClient,
    request_id: i64,
    decision: Decision,
    note: Option<&str>,
) -> Result<AccessRequest, AppError> {
    let note = normalize_note(note)?;
    let envelope: RequestEnvelope = client
        .post(
            &format!("/auth/access-requests/{}/{}", request_id, decision.path()),
            &DecisionBody { note },
        )
        .await?;
    log::info!(
        "Access request {} for {} is now {:?}",
        envelope.request.id,
        envelope.request.username,
        envelope.request.status
    );
    Ok(envelope.request)
}
