//! Unified error taxonomy for autonfs
//!
//! Every fallible operation in the crate maps into one of these kinds.
//! The CLI collapses all of them to exit code 1; the kinds exist so log
//! output and tests can tell transport trouble apart from bad input.

use thiserror::Error;

/// Errors that can occur anywhere in autonfs
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed user input: bad MAC string, invalid YAML, bad durations
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Socket or SSH level failure (connect, handshake, auth, channel)
    #[error("transport failed: {0}")]
    Transport(String),

    /// A remote command exited non-zero; carries the combined output
    #[error("remote command failed (exit {code}): {output}")]
    RemoteCommandFailed { code: i32, output: String },

    /// Probe output did not match the expected `iface|ip|mac` shape
    #[error("malformed probe output: {0}")]
    MalformedProbe(String),

    /// Local or remote file operation failed
    #[error("file i/o: {0}")]
    FileIo(#[from] std::io::Error),

    /// A deadline passed: port prober, wake wait
    #[error("timed out: {0}")]
    Timeout(String),
}

impl From<ssh2::Error> for Error {
    fn from(e: ssh2::Error) -> Self {
        Error::Transport(e.to_string())
    }
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
