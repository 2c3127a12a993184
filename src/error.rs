use actix_web::http::StatusCode;
use actix_web::ResponseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("The requested variable is not public: {0}")]
    AccessDenied(String),

    #[error("The public environment was never injected into the page")]
    MissingInjection,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Header processing error: {0}")]
    Header(String),

    #[error("Policy validation error: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl ResponseError for PortalError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::AccessDenied(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,

            Self::Configuration(_)
            | Self::MissingInjection
            | Self::Serialization(_)
            | Self::Header(_)
            | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
