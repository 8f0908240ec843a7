//! # Gallery API
//!
//! HTTP transport and session authentication for the family gallery API server.
//!
//! This crate provides:
//! - A shared [`ApiClient`] that speaks the server's `{code, data, message}` envelope
//! - Session handling through the `access_token` cookie
//! - Login, logout, current user lookup, access requests and view-role switching
//!
//! ## Separation of Concerns
//!
//! This crate focuses solely on talking to the server. It does **not**:
//! - Persist the session token (handled by the application)
//! - Know about albums, sections or media paging (see `media-gallery`)
//! - Enforce permissions (the server is authoritative)
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use gallery_api::{ApiClient, GalleryAuthService};
//!
//! let client = ApiClient::new("http://localhost:8000")?;
//! let auth = GalleryAuthService::new(client.clone());
//! let session = auth.login("alice", "secret").await?;
//!
//! // Every clone of the client now carries the session cookie
//! let me = auth.me().await?;
//! ```

pub mod client;
pub mod models;
pub mod service;

pub use client::{clean_params, decode_response, ApiClient, ApiError, NOT_AUTHENTICATED, SESSION_COOKIE};
pub use models::{
    AccessRequest, AccessRequestStatus, Account, ProcessedBy, Role, SessionCredentials, User,
};
pub use service::GalleryAuthService;
