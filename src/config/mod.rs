//! Configuration loading and validation for f2b-mail-notify.
//!
//! All settings come from `EMAIL_*` environment variables. The
//! resulting [`Config`] is built once in `main` and passed by
//! reference to the renderer and the mailer.

mod env;
mod secret;
mod types;
mod validation;

// Re-exports publics
pub use env::{parse_flag, parse_port, process_env, var_or};
pub use secret::SecretString;
pub use types::{
    Config, DEFAULT_FROM, DEFAULT_SMTP_PORT, DEFAULT_SMTP_SERVER, DEFAULT_SUBJECT_PREFIX,
    DEFAULT_TO, ENV_FROM, ENV_SMTP_PASSWORD, ENV_SMTP_PORT, ENV_SMTP_SERVER, ENV_SMTP_TLS,
    ENV_SMTP_USER, ENV_SUBJECT_PREFIX, ENV_TO, SmtpConfig,
};
