//! f2b-mail-notify - Email notifications for fail2ban ban and unban actions.

pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod notify;
pub mod template;

// Re-export commonly used types
pub use cli::LogFormat;
pub use config::Config;
pub use event::{Action, Event};
pub use notify::{EmailNotifier, EmailTransport};
pub use template::{RenderedMessage, render};
