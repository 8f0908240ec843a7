use gallery_api::ApiError;
use std::fmt;

/// Central error types for the gallery client
#[derive(Debug)]
pub enum AppError {
    /// Database error (rusqlite)
    Database(rusqlite::Error),
    /// Filesystem error
    Filesystem(std::io::Error),
    /// Error reported by, or while talking to, the API server
    Api(ApiError),
    /// Invalid configuration file
    Config(String),
    /// Validation error (e.g. invalid inputs)
    Validation(String),
    /// Resource not found
    NotFound(String),
    /// No stored session
    NotSignedIn,
    /// Sign-in refused for the given username or password
    InvalidCredentials,
    /// General error
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Database(e) => write!(f, "Database error: {}", e),
            AppError::Filesystem(e) => write!(f, "Filesystem error: {}", e),
            AppError::Api(e) => write!(f, "API error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::NotSignedIn => write!(f, "Not signed in"),
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {}

// Conversions from other error types
impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Database(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Filesystem(e)
    }
}

impl From<pico_args::Error> for AppError {
    fn from(e: pico_args::Error) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Other(format!("JSON error: {}", e))
    }
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Validation(msg) => AppError::Validation(msg),
            ApiError::Api { code, .. } if code == gallery_api::NOT_AUTHENTICATED => {
                AppError::NotSignedIn
            }
            other => AppError::Api(other),
        }
    }
}

/// User-friendly error messages for the command line
impl AppError {
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(_) => {
                "The local settings database could not be read. Please try again.".to_string()
            }
            AppError::Filesystem(e) => format!("Error accessing files: {}", e),
            AppError::Api(ApiError::NetworkError(_)) => {
                "The gallery server could not be reached.".to_string()
            }
            AppError::Api(ApiError::Api { code: 40301, .. }) => {
                "You do not have permission to do that.".to_string()
            }
            AppError::Api(ApiError::Api { message, .. }) => message.clone(),
            AppError::Api(e) => e.to_string(),
            AppError::Config(msg) => format!("Invalid configuration: {}", msg),
            AppError::Validation(msg) => msg.clone(),
            AppError::NotFound(msg) => format!("{} was not found.", msg),
            AppError::NotSignedIn => "Please sign in first (family-gallery login).".to_string(),
            AppError::InvalidCredentials => "Wrong username or password.".to_string(),
            AppError::Other(msg) => msg.clone(),
        }
    }
}
