//! Remote command oracle client.
//!
//! Wraps an [`HttpPort`] and a [`ConnectivityPort`] and implements the
//! oracle policy:
//!
//! 1. No WiFi association → `Forward` immediately, no call attempted.
//! 2. One POST of the raw JPEG (`Content-Type: image/jpeg`).  No retry;
//!    the next cycle is the retry.
//! 3. 2xx → trim the body and match it case-sensitively against the
//!    command vocabulary.  Anything else → `Forward`, including a body whose
//!    trimmed content overflowed the response buffer.
//! 4. Transport failure or non-2xx status → `Forward`, plus a warning.
//!
//! The reply records *why* a command was chosen so diagnostics can tell a
//! real `FORWARD` from a fallback.

use core::fmt;
use log::{debug, warn};

use crate::app::commands::{Command, trim_response};
use crate::app::ports::{ConnectivityPort, HttpPort, OraclePort};
use crate::error::CommsError;

/// Content type of the request body.
pub const CONTENT_TYPE: &str = "image/jpeg";

/// Longest token kept for diagnostics.
const TOKEN_CAPACITY: usize = 16;

/// Where the command in an [`OracleReply`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOrigin {
    /// The oracle answered with a valid token.
    Oracle,
    /// The oracle answered, but not with a known token (kept, truncated).
    Unrecognized(heapless::String<TOKEN_CAPACITY>),
    /// No association; no request was made.
    NotAssociated,
    /// The exchange failed.
    Transport(CommsError),
}

impl ReplyOrigin {
    /// True when the command is the fallback rather than the oracle's answer.
    pub fn is_fallback(&self) -> bool {
        !matches!(self, Self::Oracle)
    }
}

impl fmt::Display for ReplyOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oracle => write!(f, "oracle"),
            Self::Unrecognized(token) => write!(f, "unrecognized token {:?}", token.as_str()),
            Self::NotAssociated => write!(f, "not associated"),
            Self::Transport(e) => write!(f, "{e}"),
        }
    }
}

/// A command plus its provenance.  `command` is always safe to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleReply {
    pub command: Command,
    pub origin: ReplyOrigin,
}

impl OracleReply {
    pub fn answered(command: Command) -> Self {
        Self {
            command,
            origin: ReplyOrigin::Oracle,
        }
    }

    pub fn fallback(origin: ReplyOrigin) -> Self {
        Self {
            command: Command::Forward,
            origin,
        }
    }

    /// Interpret a response body.  Total: unknown bodies fall back.
    pub fn from_body(body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body);
        let token = trim_response(&text);
        match Command::parse_token(token) {
            Some(cmd) => Self::answered(cmd),
            None => Self::fallback(ReplyOrigin::Unrecognized(clip(token))),
        }
    }
}

fn clip(token: &str) -> heapless::String<TOKEN_CAPACITY> {
    let mut out = heapless::String::new();
    for c in token.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Oracle adapter over an HTTP transport and a link-state probe.
pub struct OracleClient<H, L> {
    http: H,
    link: L,
}

impl<H: HttpPort, L: ConnectivityPort> OracleClient<H, L> {
    pub fn new(http: H, link: L) -> Self {
        Self { http, link }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn http(&self) -> &H {
        &self.http
    }

    pub fn http_mut(&mut self) -> &mut H {
        &mut self.http
    }
}

impl<H: HttpPort, L: ConnectivityPort> OraclePort for OracleClient<H, L> {
    fn request_command(&mut self, frame: &[u8]) -> OracleReply {
        if !self.link.is_connected() {
            warn!("oracle: WiFi not associated, using {}", Command::Forward);
            return OracleReply::fallback(ReplyOrigin::NotAssociated);
        }

        let response = match self.http.post(CONTENT_TYPE, frame) {
            Ok(r) => r,
            Err(e) => {
                warn!("oracle: request failed ({}), using {}", e, Command::Forward);
                return OracleReply::fallback(ReplyOrigin::Transport(e));
            }
        };

        if !response.is_success() {
            warn!("oracle: HTTP {}, using {}", response.status, Command::Forward);
            return OracleReply::fallback(ReplyOrigin::Transport(CommsError::Status(
                response.status,
            )));
        }

        if response.truncated {
            let text = String::from_utf8_lossy(&response.body);
            warn!("oracle: oversize reply, using {}", Command::Forward);
            return OracleReply::fallback(ReplyOrigin::Unrecognized(clip(&text)));
        }

        let reply = OracleReply::from_body(&response.body);
        debug!("oracle: {} ({}, {} bytes)", reply.command, reply.origin, frame.len());
        if let ReplyOrigin::Unrecognized(token) = &reply.origin {
            warn!("oracle: unrecognized reply {:?}, using {}", token.as_str(), Command::Forward);
        }
        reply
    }
}
