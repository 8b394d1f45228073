use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::anchor::Advisory;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid anchor: {reason}")]
    InvalidAnchor { reason: AnchorDefect },

    #[error("Invalid value {0}: expected a finite single-precision float")]
    InvalidValue(f32),

    #[error(
        "Couldn't find the anchor pattern in the image. The binary has likely changed \
         and the anchor must be refreshed"
    )]
    PatternNotFound,

    #[error(
        "Anchor pattern is not precise enough: found {0} matches. \
         Supply a longer anchor"
    )]
    AmbiguousPattern(usize),

    #[error(
        "Couldn't open {} for writing, close the process using it before retrying",
        path.display()
    )]
    TargetLocked {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image length changed from {expected} to {actual} bytes")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Steam installation not found: {0}")]
    SteamNotFound(String),

    #[error(
        "App {app_id} was not found in libraryfolders.vdf. If it was just installed, \
         restart Steam so it updates its library files"
    )]
    GameNotInstalled { app_id: String },

    #[error("Failed to parse {file}: {message}")]
    KeyValues { file: String, message: String },

    #[error("Failed to fetch anchor: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why an anchor string was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorDefect {
    Malformed(String),
    TooShort { digits: usize },
    BaselineAbsent { baseline_hex: String },
    /// An advisory promoted to a failure by strict validation.
    Strict(Advisory),
}

impl fmt::Display for AnchorDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorDefect::Malformed(detail) => write!(f, "malformed hex ({})", detail),
            AnchorDefect::TooShort { digits } => write!(
                f,
                "too short ({} hex digits), the search would certainly match more than \
                 once; use at least 24 hex digits",
                digits
            ),
            AnchorDefect::BaselineAbsent { baseline_hex } => write!(
                f,
                "baseline encoding {} absent from the anchor",
                baseline_hex
            ),
            AnchorDefect::Strict(advisory) => write!(f, "{}", advisory),
        }
    }
}

impl Error {
    pub(crate) fn invalid_anchor(reason: AnchorDefect) -> Self {
        Error::InvalidAnchor { reason }
    }

    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// The anchor no longer occurs in the image and a fresh one should be fetched.
    pub fn is_stale_anchor(&self) -> bool {
        matches!(self, Error::PatternNotFound)
    }

    /// Whether retrying the same call can succeed once an outside condition changes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::TargetLocked { .. } | Error::Network(_))
    }
}
