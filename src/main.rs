//! f2b-mail-notify - Email notifications for fail2ban ban and unban actions.
//!
//! Pipeline: load config → validate → collect event → render → send.
//! Exit status 0 when the relay accepted the message, 1 otherwise.

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use f2b_mail_notify::cli::{Cli, LogFormat};
use f2b_mail_notify::config::Config;
use f2b_mail_notify::{EmailNotifier, event, template};

/// Build the log filter from `RUST_LOG`-style directives.
///
/// Falls back to `info` when no directive is given. Invalid directives
/// are skipped.
fn log_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives)
}

/// Initialize the tracing subscriber with the specified log format.
///
/// Logs go to stderr; stdout carries only the confirmation line.
fn init_logging(format: LogFormat) {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    let filter = log_filter(&directives);

    match format {
        LogFormat::Text => {
            // fail2ban captures stderr into its own log file
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_env_filter(filter)
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .flatten_event(true)
                .with_env_filter(filter)
                .init();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_format);

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    // Fail fast: nothing is sent without a real recipient
    if let Err(errors) = config.validate() {
        for e in &errors {
            error!(error = %e, "Configuration validation error");
        }
        std::process::exit(1);
    }

    let event = event::collect_from_process();
    tracing::debug!(
        ip = %event.ip,
        jail = %event.jail,
        action = %event.action,
        failures = event.failures,
        "Event collected"
    );

    let message = template::render(&event, &config);

    let notifier = match EmailNotifier::from_config(&config) {
        Ok(n) => n,
        Err(e) => {
            error!(error = %e, "Failed to send email");
            std::process::exit(1);
        }
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match runtime.block_on(notifier.send(&message)) {
        Ok(()) => {
            info!(
                ip = %event.ip,
                jail = %event.jail,
                host = %config.smtp.host,
                port = config.smtp.port,
                "Notification delivered"
            );
            println!("Email notification sent successfully to {}", config.to);
            Ok(())
        }
        Err(e) => {
            error!(
                error = %e,
                host = %config.smtp.host,
                port = config.smtp.port,
                "Failed to send email"
            );
            std::process::exit(1);
        }
    }
}
