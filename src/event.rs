//! Ban/unban event collection.
//!
//! The event is assembled in two layers:
//!
//! 1. `F2B_*` environment variables, with defaults for anything unset.
//! 2. An optional JSON object on stdin whose known keys overwrite the
//!    environment values field by field.
//!
//! The stdin layer is best-effort: a payload that cannot be read or
//! parsed, or that is not a JSON object, is dropped and the
//! environment-derived event is used unchanged.
//!
//! ```
//! use f2b_mail_notify::event::Event;
//!
//! let mut event = Event::from_lookup(|var| match var {
//!     "F2B_IP" => Some("1.1.1.1".to_string()),
//!     "F2B_TIME" => Some("2026-01-15T10:00:00".to_string()),
//!     _ => None,
//! });
//! event.apply_overlay(r#"{"ip": "9.9.9.9"}"#).unwrap();
//! assert_eq!(event.ip, "9.9.9.9");
//! assert_eq!(event.jail, "unknown");
//! ```

use crate::error::PayloadError;
use serde::Deserialize;
use serde_json::Value;
use std::io::{IsTerminal, Read};

pub const ENV_IP: &str = "F2B_IP";
pub const ENV_JAIL: &str = "F2B_JAIL";
pub const ENV_ACTION: &str = "F2B_ACTION";
pub const ENV_TIME: &str = "F2B_TIME";
pub const ENV_COUNTRY: &str = "F2B_COUNTRY";
pub const ENV_REGION: &str = "F2B_REGION";
pub const ENV_CITY: &str = "F2B_CITY";
pub const ENV_ISP: &str = "F2B_ISP";
pub const ENV_HOSTNAME: &str = "F2B_HOSTNAME";
pub const ENV_FAILURES: &str = "F2B_FAILURES";

const UNKNOWN: &str = "unknown";

/// Action reported by fail2ban.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Action {
    #[default]
    Ban,
    Unban,
    /// Any other action name, kept verbatim.
    Other(String),
}

impl Action {
    pub fn parse(value: &str) -> Self {
        match value {
            "ban" => Action::Ban,
            "unban" => Action::Unban,
            other => Action::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Action::Ban => "ban",
            Action::Unban => "unban",
            Action::Other(s) => s,
        }
    }

    pub fn is_ban(&self) -> bool {
        matches!(self, Action::Ban)
    }

    /// First letter uppercased, the rest lowercased (`ban` -> `Ban`).
    pub fn capitalized(&self) -> String {
        let mut chars = self.as_str().chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ban or unban event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub ip: String,
    pub jail: String,
    pub action: Action,
    /// Event time, rendered verbatim.
    pub time: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub isp: String,
    pub hostname: String,
    pub failures: u64,
}

/// Known stdin keys. Unknown keys are ignored by serde; `null` maps to `None`.
#[derive(Debug, Default, Deserialize)]
struct EventOverlay {
    ip: Option<Value>,
    jail: Option<Value>,
    action: Option<Value>,
    time: Option<Value>,
    country: Option<Value>,
    region: Option<Value>,
    city: Option<Value>,
    isp: Option<Value>,
    hostname: Option<Value>,
    failures: Option<Value>,
}

impl Event {
    /// Build the event from `F2B_*` variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |var: &str, default: &str| lookup(var).unwrap_or_else(|| default.to_string());

        let failures = match lookup(ENV_FAILURES) {
            Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|e| {
                tracing::warn!(value = %raw, error = %e, "Invalid F2B_FAILURES, using 0");
                0
            }),
            None => 0,
        };

        Event {
            ip: text(ENV_IP, UNKNOWN),
            jail: text(ENV_JAIL, UNKNOWN),
            action: lookup(ENV_ACTION)
                .map(|a| Action::parse(&a))
                .unwrap_or_default(),
            time: lookup(ENV_TIME).unwrap_or_else(local_timestamp),
            country: text(ENV_COUNTRY, ""),
            region: text(ENV_REGION, ""),
            city: text(ENV_CITY, ""),
            isp: text(ENV_ISP, ""),
            hostname: text(ENV_HOSTNAME, ""),
            failures,
        }
    }

    /// Overlay a JSON object onto this event.
    ///
    /// Returns the number of fields overwritten. On error the event is
    /// left untouched. A blank payload is not an error and changes nothing.
    pub fn apply_overlay(&mut self, payload: &str) -> Result<usize, PayloadError> {
        if payload.trim().is_empty() {
            return Ok(0);
        }

        let value: Value =
            serde_json::from_str(payload).map_err(|e| PayloadError::InvalidJson(e.to_string()))?;
        if !value.is_object() {
            return Err(PayloadError::NotAnObject);
        }
        let overlay: EventOverlay =
            serde_json::from_value(value).map_err(|e| PayloadError::InvalidJson(e.to_string()))?;

        let mut applied = 0;
        let mut set_text = |field: &mut String, value: Option<Value>| {
            if let Some(text) = value.as_ref().and_then(value_as_text) {
                *field = text;
                applied += 1;
            }
        };

        set_text(&mut self.ip, overlay.ip);
        set_text(&mut self.jail, overlay.jail);
        set_text(&mut self.time, overlay.time);
        set_text(&mut self.country, overlay.country);
        set_text(&mut self.region, overlay.region);
        set_text(&mut self.city, overlay.city);
        set_text(&mut self.isp, overlay.isp);
        set_text(&mut self.hostname, overlay.hostname);

        if let Some(action) = overlay.action.as_ref().and_then(value_as_text) {
            self.action = Action::parse(&action);
            applied += 1;
        }

        if let Some(raw) = overlay.failures {
            match value_as_count(&raw) {
                Some(count) => {
                    self.failures = count;
                    applied += 1;
                }
                None => {
                    tracing::debug!(value = %raw, "Ignoring non-integer failures in payload");
                }
            }
        }

        Ok(applied)
    }
}

/// Current local time as ISO 8601 with microseconds and no offset.
fn local_timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn value_as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read the whole payload from `reader`.
pub fn read_payload<R: Read>(mut reader: R) -> Result<String, PayloadError> {
    let mut payload = String::new();
    reader
        .read_to_string(&mut payload)
        .map_err(|e| PayloadError::Read(e.to_string()))?;
    Ok(payload)
}

/// Build the event from `lookup`, then overlay whatever `input` yields.
///
/// `input` is `None` when there is nothing to read (interactive stdin).
/// Payload errors are logged at debug level and otherwise ignored.
pub fn collect<F, R>(lookup: F, input: Option<R>) -> Event
where
    F: Fn(&str) -> Option<String>,
    R: Read,
{
    let mut event = Event::from_lookup(lookup);

    let Some(reader) = input else {
        tracing::debug!("stdin is a terminal, skipping payload");
        return event;
    };

    match read_payload(reader).and_then(|payload| event.apply_overlay(&payload)) {
        Ok(applied) => {
            tracing::debug!(fields = applied, "Applied stdin payload");
        }
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring stdin payload, keeping environment values");
        }
    }

    event
}

/// Collect the event from the process environment and stdin.
///
/// Stdin is only read when it is not attached to a terminal, so an
/// interactive invocation never blocks waiting for input.
pub fn collect_from_process() -> Event {
    let stdin = std::io::stdin();
    let input = if stdin.is_terminal() {
        None
    } else {
        Some(stdin.lock())
    };
    collect(crate::config::process_env, input)
}
