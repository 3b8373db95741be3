use thiserror::Error;
use tsbench_config::ConfigError;
use tsbench_core::CoreError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid trial configuration: {0}")]
    InvalidTrial(String),

    #[error("Timestamp source unavailable: {0}")]
    Core(#[from] CoreError),

    #[error("Failed to spawn worker {index}: {source}")]
    Spawn {
        index: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker {0} panicked")]
    WorkerPanicked(usize),
}

impl EngineError {
    /// True when the trial was rejected before any thread was spawned
    /// because of its configuration.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, EngineError::Config(_) | EngineError::InvalidTrial(_))
    }
}
