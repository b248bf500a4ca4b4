//! Centralized error types for ZipSnap.
//!
//! Every lookup-path failure is recovered at the store boundary and handed to
//! the presentation layer as an [`ErrorKind`] plus a `user_message()`. None of
//! these are fatal to the process.

use thiserror::Error;

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Lookup error: {0}")]
    Location(#[from] LocationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(anyhow::Error),
}

impl From<anyhow::Error> for AppError {
    /// Config loading reports through anyhow; a typed config error underneath
    /// any added context is recovered so it keeps its user message.
    fn from(e: anyhow::Error) -> Self {
        match e.downcast::<ConfigError>() {
            Ok(config) => AppError::Config(config),
            Err(other) => AppError::Other(other),
        }
    }
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Location(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Stable, machine-readable classification of a [`LocationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyInput,
    NotFound,
    UpstreamError,
    NoPlaces,
    NetworkUnavailable,
    InvalidResponse,
    NoActiveRecord,
    IndexOutOfRange,
    Superseded,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::EmptyInput => "empty_input",
            ErrorKind::NotFound => "not_found",
            ErrorKind::UpstreamError => "upstream_error",
            ErrorKind::NoPlaces => "no_places",
            ErrorKind::NetworkUnavailable => "network_unavailable",
            ErrorKind::InvalidResponse => "invalid_response",
            ErrorKind::NoActiveRecord => "no_active_record",
            ErrorKind::IndexOutOfRange => "index_out_of_range",
            ErrorKind::Superseded => "superseded",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by location lookup, collection edits and export.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Postal code is empty")]
    EmptyInput,

    #[error("Postal code not found")]
    NotFound,

    #[error("Upstream returned status {status}")]
    UpstreamError { status: u16 },

    #[error("Upstream returned no places")]
    NoPlaces,

    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    /// Upstream reported success but the body did not decode.
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    #[error("No active record")]
    NoActiveRecord,

    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// A newer lookup was issued before this one resolved.
    #[error("Lookup superseded by a newer request")]
    Superseded,
}

impl LocationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LocationError::EmptyInput => ErrorKind::EmptyInput,
            LocationError::NotFound => ErrorKind::NotFound,
            LocationError::UpstreamError { .. } => ErrorKind::UpstreamError,
            LocationError::NoPlaces => ErrorKind::NoPlaces,
            LocationError::NetworkUnavailable(_) => ErrorKind::NetworkUnavailable,
            LocationError::InvalidResponse(_) => ErrorKind::InvalidResponse,
            LocationError::NoActiveRecord => ErrorKind::NoActiveRecord,
            LocationError::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            LocationError::Superseded => ErrorKind::Superseded,
        }
    }

    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::EmptyInput => "Please enter a postal code",
            LocationError::NotFound => "Postal code not found. Please check and try again.",
            LocationError::UpstreamError { status } if *status >= 500 => {
                "The lookup service is experiencing issues. Please try again later."
            }
            LocationError::UpstreamError { .. } => "The lookup request failed. Please try again.",
            LocationError::NoPlaces => "No location data found for this postal code",
            LocationError::NetworkUnavailable(_) => {
                "Network error. Please check your internet connection."
            }
            LocationError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
            LocationError::NoActiveRecord => "No location selected",
            LocationError::IndexOutOfRange { .. } => "That entry no longer exists.",
            LocationError::Superseded => "A newer search replaced this one.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

/// Local key-value storage errors. The store logs these and carries on.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to write {key}: {message}")]
    WriteFailed { key: String, message: String },

    #[error("Storage directory unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        let errors = [
            LocationError::EmptyInput,
            LocationError::NotFound,
            LocationError::UpstreamError { status: 500 },
            LocationError::UpstreamError { status: 400 },
            LocationError::NoPlaces,
            LocationError::NetworkUnavailable("dns".into()),
            LocationError::InvalidResponse("eof".into()),
            LocationError::NoActiveRecord,
            LocationError::IndexOutOfRange { index: 3, len: 1 },
            LocationError::Superseded,
        ];

        for e in errors {
            assert!(!e.user_message().is_empty(), "{:?} has empty message", e);
        }
    }

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(LocationError::NotFound.kind(), ErrorKind::NotFound);
        assert_eq!(
            LocationError::UpstreamError { status: 503 }.kind(),
            ErrorKind::UpstreamError
        );
        assert_eq!(
            LocationError::IndexOutOfRange { index: 0, len: 0 }.kind().as_str(),
            "index_out_of_range"
        );
    }

    #[test]
    fn test_upstream_status_in_display() {
        let err = LocationError::UpstreamError { status: 502 };
        assert!(err.to_string().contains("502"));
        assert_eq!(
            err.user_message(),
            "The lookup service is experiencing issues. Please try again later."
        );
    }

    #[test]
    fn test_app_error_conversion() {
        let app_err: AppError = LocationError::EmptyInput.into();
        assert!(matches!(app_err, AppError::Location(LocationError::EmptyInput)));
        assert_eq!(app_err.user_message(), "Please enter a postal code");
    }

    #[test]
    fn test_anyhow_conversion_recovers_config_error() {
        let wrapped = anyhow::Error::from(ConfigError::Invalid("api.base_url".into()))
            .context("Failed to load config");
        let app_err: AppError = wrapped.into();
        assert!(matches!(app_err, AppError::Config(ConfigError::Invalid(_))));
        assert_eq!(
            app_err.user_message(),
            "Invalid configuration. Check your settings."
        );

        let other: AppError = anyhow::anyhow!("boom").into();
        assert!(matches!(other, AppError::Other(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let app_err: AppError = io.into();
        assert!(matches!(app_err, AppError::Io(_)));
        assert_eq!(app_err.user_message(), "A file operation failed. Please try again.");
    }
}
