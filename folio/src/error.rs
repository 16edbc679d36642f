use thiserror::Error;

#[derive(Error, Debug)]
pub enum FolioError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Not found: {section}/{key}")]
    NotFound { section: String, key: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0}")]
    Other(String),
}

/// Coarse error category, used at the request boundary to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Auth,
    NotFound,
    Storage,
    ExternalService,
    Internal,
}

impl FolioError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FolioError::Validation(_) => ErrorKind::Validation,
            FolioError::Auth(_) => ErrorKind::Auth,
            FolioError::NotFound { .. } => ErrorKind::NotFound,
            FolioError::Storage(_) | FolioError::Io(_) | FolioError::Json(_) => ErrorKind::Storage,
            FolioError::ExternalService(_) => ErrorKind::ExternalService,
            FolioError::Config(_) | FolioError::Yaml(_) | FolioError::Other(_) => {
                ErrorKind::Internal
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, FolioError>;
