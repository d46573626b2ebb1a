//! Notification delivery.
//!
//! Only the email channel exists; it lives in [`email`].

pub mod email;

pub use email::{EmailNotifier, EmailTransport, SmtpTransport};
