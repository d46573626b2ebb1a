//! Common test utilities: a loopback SMTP stub and a binary runner.

#![allow(dead_code)]

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Command, Output, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;

/// What the stub relay received during one session.
#[derive(Debug, Default, Clone)]
pub struct Captured {
    /// Every command line received outside DATA, in order.
    pub commands: Vec<String>,
    pub mail_from: String,
    pub rcpt_to: Vec<String>,
    pub data: String,
}

/// Minimal SMTP relay accepting a single plaintext session.
///
/// Speaks just enough of RFC 5321 for lettre: EHLO, MAIL, RCPT, DATA,
/// RSET, NOOP and QUIT. STARTTLS is never advertised; `AUTH PLAIN` only
/// when started with [`SmtpStub::start_with_auth`].
pub struct SmtpStub {
    port: u16,
    handle: JoinHandle<Captured>,
}

impl SmtpStub {
    pub fn start() -> Self {
        Self::spawn(false)
    }

    /// Stub that advertises `AUTH PLAIN` and accepts any credentials.
    pub fn start_with_auth() -> Self {
        Self::spawn(true)
    }

    fn spawn(auth: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub relay");
        let port = listener.local_addr().expect("stub address").port();

        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept client");
            serve(stream, auth)
        });

        Self { port, handle }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Wait for the session to end and return what was received.
    pub fn finish(self) -> Captured {
        self.handle.join().expect("stub relay thread panicked")
    }
}

fn serve(stream: TcpStream, auth: bool) -> Captured {
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .expect("set read timeout");
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut writer = stream;
    let mut captured = Captured::default();

    reply(&mut writer, "220 stub.local ESMTP ready\r\n");

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let command = line.trim_end().to_string();
        let verb = command
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();
        captured.commands.push(command.clone());

        match verb.as_str() {
            "EHLO" if auth => reply(&mut writer, "250-stub.local\r\n250 AUTH PLAIN\r\n"),
            "EHLO" | "HELO" => reply(&mut writer, "250 stub.local\r\n"),
            "AUTH" if auth => reply(&mut writer, "235 2.7.0 Authentication successful\r\n"),
            "MAIL" => {
                captured.mail_from = command.clone();
                reply(&mut writer, "250 2.1.0 OK\r\n");
            }
            "RCPT" => {
                captured.rcpt_to.push(command.clone());
                reply(&mut writer, "250 2.1.5 OK\r\n");
            }
            "DATA" => {
                reply(&mut writer, "354 End data with <CR><LF>.<CR><LF>\r\n");
                loop {
                    let mut data_line = String::new();
                    match reader.read_line(&mut data_line) {
                        Ok(0) | Err(_) => return captured,
                        Ok(_) => {}
                    }
                    if data_line == ".\r\n" || data_line == ".\n" {
                        break;
                    }
                    captured.data.push_str(&data_line);
                }
                reply(&mut writer, "250 2.0.0 OK queued\r\n");
            }
            "RSET" | "NOOP" => reply(&mut writer, "250 2.0.0 OK\r\n"),
            "QUIT" => {
                reply(&mut writer, "221 2.0.0 Bye\r\n");
                break;
            }
            _ => reply(&mut writer, "502 5.5.2 Command not recognized\r\n"),
        }
    }

    captured
}

fn reply(writer: &mut TcpStream, line: &str) {
    writer.write_all(line.as_bytes()).expect("write reply");
    writer.flush().expect("flush reply");
}

/// Decode the `Subject:` header of a raw message, joining folded lines
/// and RFC 2047 base64 encoded words.
pub fn decoded_subject(data: &str) -> String {
    let mut lines = data.lines();
    let mut header = match lines.by_ref().find(|l| l.starts_with("Subject:")) {
        Some(line) => line["Subject:".len()..].to_string(),
        None => return String::new(),
    };
    for line in lines {
        if !line.starts_with([' ', '\t']) {
            break;
        }
        header.push_str(line);
    }

    // Whitespace between two adjacent encoded words is not part of the text.
    let mut decoded = Vec::new();
    let mut previous_encoded = None;
    for token in header.split_whitespace() {
        let parts: Vec<&str> = token.split('?').collect();
        let encoded = parts.len() == 5
            && token.starts_with("=?")
            && token.ends_with("?=")
            && parts[2].eq_ignore_ascii_case("b");

        if let Some(previous) = previous_encoded {
            if !(previous && encoded) {
                decoded.push(b' ');
            }
        }
        if encoded {
            decoded.extend(STANDARD.decode(parts[3]).expect("base64 encoded word"));
        } else {
            decoded.extend_from_slice(token.as_bytes());
        }
        previous_encoded = Some(encoded);
    }

    String::from_utf8(decoded).expect("utf-8 subject")
}

/// A local port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe");
    listener.local_addr().expect("probe address").port()
}

/// Run the binary with a clean environment, `vars`, and optional stdin.
pub fn run_notifier(vars: &[(&str, &str)], stdin: Option<&str>) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_f2b-mail-notify"));
    command
        .env_clear()
        .envs(vars.iter().copied())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    match stdin {
        Some(_) => {
            command.stdin(Stdio::piped());
        }
        None => {
            command.stdin(Stdio::null());
        }
    }

    let mut child = command.spawn().expect("spawn f2b-mail-notify");

    if let Some(payload) = stdin {
        let mut pipe = child.stdin.take().expect("child stdin");
        pipe.write_all(payload.as_bytes()).expect("write stdin");
        // dropping the pipe closes stdin
    }

    child.wait_with_output().expect("wait for f2b-mail-notify")
}
