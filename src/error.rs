//! Centralized error types for f2b-mail-notify using thiserror.
//!
//! Each stage of the pipeline owns one error enum:
//! configuration (fatal), stdin payload (recovered locally) and
//! delivery (reported as a failed send).

use thiserror::Error;

/// Errors related to configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("EMAIL_TO not configured")]
    MissingRecipient,
    #[error("invalid value '{value}' for {var}: {message}")]
    InvalidValue {
        var: String,
        value: String,
        message: String,
    },
}

/// Errors raised while reading the optional JSON payload on stdin.
///
/// These never abort the process: the collector logs them at debug
/// level and keeps the environment-derived event.
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("failed to read stdin: {0}")]
    Read(String),
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
    #[error("payload is not a JSON object")]
    NotAnObject,
}

/// Errors related to composing and delivering the email.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("invalid '{field}' address '{address}': {message}")]
    InvalidAddress {
        field: &'static str,
        address: String,
        message: String,
    },
    #[error("TLS configuration error: {0}")]
    Tls(String),
    #[error("failed to build email: {0}")]
    Compose(String),
    #[error("failed to send notification: {0}")]
    SendFailed(String),
}
