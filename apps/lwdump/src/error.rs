//! CLI error handling

use std::fmt;

use lwdump_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration error
    Config(lwdump_errors::ConfigError),
    /// Error from the dump itself
    Dump(lwdump_errors::Error),
    /// Invalid command arguments
    InvalidArguments(String),
    /// The run finished but some categories or assets failed
    Incomplete {
        failed_categories: usize,
        failed_assets: usize,
    },
    /// I/O error
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {e}"),
            CliError::Dump(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Incomplete {
                failed_categories,
                failed_assets,
            } => write!(
                f,
                "Dump incomplete: {failed_categories} categories and {failed_assets} assets failed"
            ),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Dump(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<lwdump_errors::ConfigError> for CliError {
    fn from(e: lwdump_errors::ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<lwdump_errors::Error> for CliError {
    fn from(e: lwdump_errors::Error) -> Self {
        match e {
            lwdump_errors::Error::Config(config) => CliError::Config(config),
            other => CliError::Dump(other),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
