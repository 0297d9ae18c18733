use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetagameError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("unknown color symbol: '{0}'")]
    InvalidColor(char),
}

impl From<serde_json::Error> for MetagameError {
    fn from(e: serde_json::Error) -> Self {
        MetagameError::Serialize(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MetagameError>;
