use thiserror::Error;

/// Faults raised by the stateful parts of the engine (ensemble state,
/// performance persistence). Pure scoring functions never fail.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("performance store I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("performance store serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("ensemble state lock poisoned")]
    StatePoisoned,
}
