use thiserror::Error;

pub type Result<T> = std::result::Result<T, MirrorError>;

#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Remote protocol error: {0}")]
    RemoteProtocol(String),

    #[error("Error parsing response: {0}")]
    ResponseParse(String),

    #[error("Transfer failed: {0}")]
    Transfer(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<zip::result::ZipError> for MirrorError {
    fn from(e: zip::result::ZipError) -> Self {
        MirrorError::Extraction(e.to_string())
    }
}

impl MirrorError {
    pub fn status(context: &str, status: reqwest::StatusCode) -> Self {
        MirrorError::RemoteProtocol(format!("{context}: got status {status}"))
    }
}
