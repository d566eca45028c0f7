use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpanlogError {
    #[error("group id {got} out of range: must be below {max}")]
    InvalidGroupId { got: u64, max: u64 },

    #[error("machine id {got} out of range: must be below {max}")]
    InvalidMachineId { got: u64, max: u64 },

    #[error("clock regressed: now {now}ms is behind last issued {last}ms")]
    ClockRegression { now: u64, last: u64 },

    #[error("sequence exhausted: {capacity} identifiers already issued this millisecond")]
    SequenceExhausted { capacity: u64 },

    #[error("timestamp {now}ms does not fit the configured bit layout (max {max}ms)")]
    TimestampOverflow { now: u64, max: u64 },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),
}

/// Result type alias for spanlog operations
pub type Result<T> = std::result::Result<T, SpanlogError>;

impl SpanlogError {
    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Returns true if this error is recoverable.
    ///
    /// Generator failures mean "identifier unavailable now": the caller
    /// may retry on a later clock tick or fall back to a degraded id.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ClockRegression { .. } | Self::SequenceExhausted { .. }
        )
    }

    /// Returns the error category for metrics/logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidGroupId { .. } | Self::InvalidMachineId { .. } => "validation",
            Self::ClockRegression { .. } => "clock",
            Self::SequenceExhausted { .. } | Self::TimestampOverflow { .. } => "capacity",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }
}
