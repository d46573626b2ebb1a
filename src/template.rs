//! Message rendering for ban/unban alerts.
//!
//! Turns an [`Event`] into the subject line, HTML body and plain-text
//! body of the notification email.
//!
//! ```text
//! event.rs → template.rs → notify/email.rs
//! ```
//!
//! Rendering is a pure function of the event and the configuration: it
//! never reads the clock or the environment, so the same inputs always
//! produce byte-identical output. Event values interpolated into the
//! HTML body are escaped; the subject and text body carry them verbatim.

use crate::config::Config;
use crate::event::{Action, Event};
use std::fmt::Write;

const BAN_EMOJI: &str = "🚫";
const CLEAR_EMOJI: &str = "✅";
const LOOKUP_URL: &str = "https://whatismyipaddress.com/ip/";

/// Rendered message ready for the mailer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMessage {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// Header tint and highlight colour for an action.
struct Palette {
    header_background: &'static str,
    highlight: &'static str,
}

fn palette(action: &Action) -> Palette {
    if action.is_ban() {
        Palette {
            header_background: "#ffebee",
            highlight: "#d32f2f",
        }
    } else {
        Palette {
            header_background: "#e8f5e8",
            highlight: "#388e3c",
        }
    }
}

fn emoji(action: &Action) -> &'static str {
    if action.is_ban() { BAN_EMOJI } else { CLEAR_EMOJI }
}

/// `" from {country}"`, `" from {city}, {country}"` or empty without a country.
pub fn location_phrase(event: &Event) -> String {
    match location(event) {
        Some(loc) => format!(" from {}", loc),
        None => String::new(),
    }
}

/// `{city}, {country}` or `{country}`; `None` without a country.
fn location(event: &Event) -> Option<String> {
    if event.country.is_empty() {
        None
    } else if event.city.is_empty() {
        Some(event.country.clone())
    } else {
        Some(format!("{}, {}", event.city, event.country))
    }
}

/// Label/value rows shown in both bodies, in display order.
///
/// IP, jail, action and time are always present; the rest only when
/// they carry information.
fn detail_rows(event: &Event) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("IP Address", event.ip.clone()),
        ("Jail", event.jail.clone()),
        ("Action", event.action.capitalized()),
        ("Time", event.time.clone()),
    ];

    if event.failures > 0 {
        rows.push(("Failures", event.failures.to_string()));
    }
    if let Some(loc) = location(event) {
        rows.push(("Location", loc));
    }
    if !event.isp.is_empty() {
        rows.push(("ISP", event.isp.clone()));
    }
    if !event.hostname.is_empty() {
        rows.push(("Hostname", event.hostname.clone()));
    }

    rows
}

/// Render subject, HTML body and text body for `event`.
pub fn render(event: &Event, config: &Config) -> RenderedMessage {
    let subject = render_subject(event, config);
    let html_body = render_html(event);
    let text_body = render_text(event);

    tracing::trace!(
        subject_len = subject.len(),
        html_len = html_body.len(),
        text_len = text_body.len(),
        "Message rendered"
    );

    RenderedMessage {
        subject,
        html_body,
        text_body,
    }
}

/// `{prefix} {emoji} {Action}: {ip} in {jail}`
pub fn render_subject(event: &Event, config: &Config) -> String {
    format!(
        "{} {} {}: {} in {}",
        config.subject_prefix,
        emoji(&event.action),
        event.action.capitalized(),
        event.ip,
        event.jail
    )
}

/// Plain-text body, no markup.
pub fn render_text(event: &Event) -> String {
    let mut body = String::new();

    // write! into a String cannot fail
    let _ = writeln!(body, "Fail2Ban {} Alert", event.action.capitalized());
    body.push('\n');
    let _ = writeln!(
        body,
        "IP {}{} has been {}ned in jail '{}'",
        event.ip,
        location_phrase(event),
        event.action,
        event.jail
    );
    body.push('\n');
    body.push_str("Details:\n");
    for (label, value) in detail_rows(event) {
        let _ = writeln!(body, "- {}: {}", label, value);
    }
    body.push('\n');
    body.push_str("For more information about this IP, visit:\n");
    let _ = writeln!(body, "{}{}", LOOKUP_URL, event.ip);
    body.push('\n');
    body.push_str("This is an automated security alert from Fail2Ban.\n");

    body
}

/// Minimal HTML document with inline styles.
pub fn render_html(event: &Event) -> String {
    let colors = palette(&event.action);
    let action = escape_html(&event.action.capitalized());
    let ip = escape_html(&event.ip);

    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n");
    html.push_str("  body { font-family: Arial, sans-serif; margin: 20px; }\n");
    let _ = writeln!(
        html,
        "  .header {{ background-color: {}; padding: 15px; border-radius: 5px; margin-bottom: 20px; }}",
        colors.header_background
    );
    html.push_str("  .info-table { border-collapse: collapse; width: 100%; }\n");
    html.push_str("  .info-table td { border: 1px solid #ddd; padding: 8px; }\n");
    html.push_str(
        "  .info-table th { border: 1px solid #ddd; padding: 8px; background-color: #f2f2f2; }\n",
    );
    let _ = writeln!(
        html,
        "  .highlight {{ font-weight: bold; color: {}; }}",
        colors.highlight
    );
    html.push_str("</style>\n</head>\n<body>\n");

    let _ = writeln!(
        html,
        "<div class=\"header\" style=\"background-color: {}; padding: 15px; border-radius: 5px;\">",
        colors.header_background
    );
    let _ = writeln!(
        html,
        "  <h2>{} Fail2Ban {} Alert</h2>",
        emoji(&event.action),
        action
    );
    let _ = writeln!(
        html,
        "  <p>IP <span class=\"highlight\">{}</span>{} has been <strong>{}ned</strong> in jail '<strong>{}</strong>'</p>",
        ip,
        escape_html(&location_phrase(event)),
        escape_html(event.action.as_str()),
        escape_html(&event.jail)
    );
    html.push_str("</div>\n");

    html.push_str("<table class=\"info-table\">\n");
    html.push_str("  <tr><th>Field</th><th>Value</th></tr>\n");
    for (label, value) in detail_rows(event) {
        let _ = writeln!(
            html,
            "  <tr><td>{}</td><td>{}</td></tr>",
            label,
            escape_html(&value)
        );
    }
    html.push_str("</table>\n");

    html.push_str("<p style=\"margin-top: 20px; font-size: 12px; color: #666;\">\n");
    html.push_str("  This is an automated security alert from Fail2Ban.<br>\n");
    let _ = writeln!(
        html,
        "  For more information about this IP, visit: <a href=\"{url}{ip}\">whatismyipaddress.com/ip/{ip}</a>",
        url = LOOKUP_URL,
        ip = ip
    );
    html.push_str("</p>\n</body>\n</html>\n");

    html
}

/// Escape the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}
