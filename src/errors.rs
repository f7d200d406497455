use thiserror::Error;

#[derive(Debug, Error)]
pub enum GhosthandError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credential invalid: {0}")]
    CredentialInvalid(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Perception error: {0}")]
    Perception(String),

    #[error("Actuator error: {0}")]
    Actuator(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type GhosthandResult<T> = Result<T, GhosthandError>;
