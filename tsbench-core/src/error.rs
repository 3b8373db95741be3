use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(&'static str),

    #[error("Invalid topology: {0}")]
    InvalidTopology(String),
}
