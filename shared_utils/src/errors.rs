use thiserror::Error;

/// Exit status for argument-count / flag errors (matches clap's own usage exit).
pub const EXIT_USAGE: u8 = 2;
/// Exit status for every other failure.
pub const EXIT_FAILURE: u8 = 1;

#[derive(Error, Debug)]
pub enum ShrinkError {
    #[error("{0}")]
    Usage(String),

    #[error("invalid output size '{value}': {reason}")]
    InvalidSizeArgument { value: String, reason: String },

    #[error("failed to get video info: {message}")]
    ProbeInvocation {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("failed to get video info: {0}")]
    ProbeParse(String),

    #[error(
        "calculated video bitrate ({computed_kbps} kbps) is too low, desired output size may be too small"
    )]
    BitrateTooLow { computed_kbps: i64 },

    #[error("ffmpeg compression failed: {message}")]
    EncodeInvocation {
        message: String,
        exit_code: Option<i32>,
    },

    #[error("failed to write report: {0}")]
    Report(String),
}

impl ShrinkError {
    /// Probe failure caused by an io error. The io error text is part of the
    /// message so a plain `Display` still tells the user why.
    pub fn probe_io(message: impl Into<String>, source: std::io::Error) -> Self {
        ShrinkError::ProbeInvocation {
            message: format!("{}: {}", message.into(), source),
            source: Some(source),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            ShrinkError::Usage(_) => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShrinkError>;
