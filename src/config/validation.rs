//! Configuration invariants checked before anything is sent.

use super::types::{Config, DEFAULT_TO};
use crate::error::ConfigError;

impl Config {
    /// Validate the configuration, collecting every violation.
    ///
    /// The recipient must be set and must differ from the
    /// `admin@localhost` placeholder.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();

        if !has_recipient(&self.to) {
            errors.push(ConfigError::MissingRecipient);
        }

        if self.smtp.username.is_some() != self.smtp.password.is_some() {
            // Half-configured credentials are not an error: auth is simply skipped.
            tracing::debug!(
                host = %self.smtp.host,
                "Only one of EMAIL_SMTP_USER / EMAIL_SMTP_PASSWORD is set, authentication disabled"
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn has_recipient(to: &str) -> bool {
    let to = to.trim();
    !to.is_empty() && to != DEFAULT_TO
}
