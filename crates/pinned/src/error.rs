//! Error types for pinned.

use thiserror::Error;

/// Result type alias using pinned's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the catalog, resolver and migration engine can report.
///
/// Request errors are separate variants so HTTP layers can pick a status
/// code by matching instead of inspecting messages.
#[derive(Error, Debug)]
pub enum Error {
    /// A version date is not a canonical `YYYY-MM-DD` calendar date.
    #[error("invalid version date {date:?}: {reason}")]
    InvalidDate { date: String, reason: String },

    /// A version with this date is already registered.
    #[error("version {0} is already registered")]
    DuplicateVersion(String),

    /// The request carried neither a query parameter nor a header version.
    #[error("no API version supplied")]
    NoVersionSupplied,

    /// The request named a version the catalog does not know.
    #[error("invalid API version {0:?}")]
    InvalidVersion(String),

    /// The request resolved to a deprecated version.
    #[error("API version {0} is deprecated")]
    VersionDeprecated(String),

    /// An operation referenced a version missing from the catalog.
    #[error("version {0} is not in the catalog")]
    UnknownVersion(String),

    /// An object's data did not serialize to a JSON object.
    #[error("object of type {0} did not produce a field map")]
    NotAnObject(String),

    /// Serialization/deserialization of a field map failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A catalog file could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for the three failures caused by what a client sent.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Error::NoVersionSupplied | Error::InvalidVersion(_) | Error::VersionDeprecated(_)
        )
    }
}

#[cfg(feature = "config")]
impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
