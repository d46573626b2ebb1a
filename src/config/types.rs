//! Core configuration types and loading.

use super::env::{parse_flag, parse_port, process_env, var_or};
use super::secret::SecretString;
use crate::error::ConfigError;

pub const ENV_SMTP_SERVER: &str = "EMAIL_SMTP_SERVER";
pub const ENV_SMTP_PORT: &str = "EMAIL_SMTP_PORT";
pub const ENV_SMTP_USER: &str = "EMAIL_SMTP_USER";
pub const ENV_SMTP_PASSWORD: &str = "EMAIL_SMTP_PASSWORD";
pub const ENV_SMTP_TLS: &str = "EMAIL_SMTP_TLS";
pub const ENV_FROM: &str = "EMAIL_FROM";
pub const ENV_TO: &str = "EMAIL_TO";
pub const ENV_SUBJECT_PREFIX: &str = "EMAIL_SUBJECT_PREFIX";

pub const DEFAULT_SMTP_SERVER: &str = "localhost";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_FROM: &str = "fail2ban@localhost";
/// Placeholder recipient; a configuration still carrying it is treated as unset.
pub const DEFAULT_TO: &str = "admin@localhost";
pub const DEFAULT_SUBJECT_PREFIX: &str = "[Fail2Ban]";

/// Main configuration structure, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Relay connection settings.
    pub smtp: SmtpConfig,
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Prefix prepended to every subject line.
    pub subject_prefix: String,
}

/// SMTP relay configuration.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Username, `None` when empty.
    pub username: Option<String>,
    /// Password (never exposed in logs), `None` when empty.
    pub password: Option<SecretString>,
    /// Upgrade the connection with STARTTLS before authenticating.
    pub tls: bool,
}

impl SmtpConfig {
    /// Credentials to authenticate with, only when both halves are set.
    pub fn credentials(&self) -> Option<(&str, &SecretString)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass)),
            _ => None,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(process_env)
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Only type coercion happens here; call [`Config::validate`] to
    /// check the addressing invariants.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup(ENV_SMTP_PORT) {
            Some(raw) => parse_port(ENV_SMTP_PORT, &raw)?,
            None => DEFAULT_SMTP_PORT,
        };

        let username = lookup(ENV_SMTP_USER).filter(|u| !u.is_empty());
        let password = lookup(ENV_SMTP_PASSWORD)
            .filter(|p| !p.is_empty())
            .map(SecretString::new);

        let tls = lookup(ENV_SMTP_TLS).map_or(true, |v| parse_flag(&v));

        Ok(Config {
            smtp: SmtpConfig {
                host: var_or(&lookup, ENV_SMTP_SERVER, DEFAULT_SMTP_SERVER),
                port,
                username,
                password,
                tls,
            },
            from: var_or(&lookup, ENV_FROM, DEFAULT_FROM),
            to: var_or(&lookup, ENV_TO, DEFAULT_TO),
            subject_prefix: var_or(&lookup, ENV_SUBJECT_PREFIX, DEFAULT_SUBJECT_PREFIX),
        })
    }
}
