//! Steering commands returned by the remote oracle.
//!
//! The wire vocabulary is exactly `FORWARD`, `LEFT` and `RIGHT`
//! (case-sensitive).  [`Command::from_response`] is total: anything the
//! oracle sends maps to some command, and the default arm is `Forward`.

use core::fmt;

/// The closed command vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Command {
    /// Keep straight.  Also the fallback for anything untrusted.
    #[default]
    Forward,
    Left,
    Right,
}

impl Command {
    pub const ALL: [Command; 3] = [Command::Forward, Command::Left, Command::Right];

    /// Wire token for this command.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Forward => "FORWARD",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
        }
    }

    /// Exact, case-sensitive token match.  No trimming.
    pub fn parse_token(token: &str) -> Option<Self> {
        match token {
            "FORWARD" => Some(Self::Forward),
            "LEFT" => Some(Self::Left),
            "RIGHT" => Some(Self::Right),
            _ => None,
        }
    }

    /// Map a raw response body to a command.
    ///
    /// Surrounding whitespace is stripped first; a body that still does not
    /// match a token exactly is `Forward`.
    pub fn from_response(body: &str) -> Self {
        match Self::parse_token(trim_response(body)) {
            Some(cmd) => cmd,
            None => Self::Forward,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// C-locale whitespace: space, \t, \n, \v, \f, \r.
pub fn is_padding(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

/// Strip [`is_padding`] bytes from both ends.
pub fn trim_response(body: &str) -> &str {
    body.trim_matches(|c: char| c.is_ascii() && is_padding(c as u8))
}
