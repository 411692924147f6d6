use thiserror::Error;

/// Failure reported by a DSP engine while preparing one of its stages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine rejected the stage with a native status code.
    #[error("{stage} preparation failed with status {code}")]
    Prepare { stage: &'static str, code: i32 },

    /// The engine was handed data it cannot use.
    #[error("{stage} received malformed input: {reason}")]
    Malformed { stage: &'static str, reason: String },
}

/// Anything that stops a hearing aid from being configured.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("chunk size must be at least one sample")]
    EmptyChunk,

    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f64),

    #[error("cross frequency {index} must be positive and finite, got {value}")]
    InvalidCrossFrequency { index: usize, value: f64 },

    #[error("cross frequency {index} ({value}) does not rise above the one before it")]
    UnorderedCrossFrequencies { index: usize, value: f64 },

    #[error("FIR filterbank needs a window of at least one sample")]
    EmptyWindow,

    #[error("{channels} channels requested but the engine supports at most {max}")]
    TooManyChannels { channels: usize, max: usize },

    /// A per-channel vector does not line up with the cross frequencies.
    #[error("{field} has {actual} entries but there are {expected} channels")]
    ChannelCountMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),
}
