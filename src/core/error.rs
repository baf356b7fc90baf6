use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// No credential for the completion provider was resolved at startup.
    ConfigMissing,
    /// The submitted subject failed validation. Carries the user-facing message.
    InvalidInput(String),
    /// The completion provider answered with a non-success status.
    Upstream {
        provider: String,
        status: u16,
        body: String,
    },
    /// The attempt ceiling was reached before enough unique names were collected.
    Exhausted {
        collected: usize,
        target: usize,
        attempts: usize,
    },
    /// A generic system or unknown error.
    System(String),
}

impl Error {
    /// Whether the failure was caused by the caller rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }

    /// Short stable label used in logs and telemetry.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::ConfigMissing => "config_missing",
            Error::InvalidInput(_) => "invalid_input",
            Error::Upstream { .. } => "upstream",
            Error::Exhausted { .. } => "exhausted",
            Error::System(_) => "system",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigMissing => write!(f, "Completion API key is not configured"),
            Error::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            Error::Upstream {
                provider,
                status,
                body,
            } => write!(f, "Upstream error ({provider}, status {status}): {body}"),
            Error::Exhausted {
                collected,
                target,
                attempts,
            } => write!(
                f,
                "Collected only {collected} of {target} unique names after {attempts} attempts"
            ),
            Error::System(msg) => write!(f, "System error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
