//! Command-line interface using clap.
//!
//! fail2ban invokes the binary without arguments; everything functional
//! comes from the environment. The CLI only controls log output.

use clap::{Parser, ValueEnum};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format for log aggregation.
    Json,
}

/// Email notifications for fail2ban ban and unban actions.
///
/// SMTP settings are read from EMAIL_* variables, event data from F2B_*
/// variables and an optional JSON object on stdin.
#[derive(Parser, Debug)]
#[command(name = "f2b-mail-notify")]
#[command(version)]
#[command(about = "Email notifications for fail2ban ban and unban actions")]
pub struct Cli {
    /// Log format: text or json.
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Text, env = "LOG_FORMAT")]
    pub log_format: LogFormat,
}
