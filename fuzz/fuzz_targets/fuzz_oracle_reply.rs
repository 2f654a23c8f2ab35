//! Fuzz target: oracle response parsing
//!
//! Feeds arbitrary bytes to `OracleClient` as a 200 response body, split
//! into arbitrary chunks the way a transport reads them, and checks the
//! client agrees with `Command::from_response` on the *whole* input.
//!
//! cargo fuzz run fuzz_oracle_reply

#![no_main]

use edgepilot::app::commands::Command;
use edgepilot::app::ports::{
    BodyCollector, ConnectivityPort, HttpPort, HttpResponse, MAX_BODY_READ, MAX_RESPONSE_LEN,
    OraclePort,
};
use edgepilot::error::CommsError;
use edgepilot::oracle::OracleClient;
use libfuzzer_sys::fuzz_target;

struct Canned(Option<HttpResponse>);

impl HttpPort for Canned {
    fn post(&mut self, _content_type: &str, _body: &[u8]) -> Result<HttpResponse, CommsError> {
        self.0.take().ok_or(CommsError::Io)
    }
}

struct Up;

impl ConnectivityPort for Up {
    fn is_connected(&self) -> bool {
        true
    }
}

fuzz_target!(|data: &[u8]| {
    let Some((&split, body)) = data.split_first() else {
        return;
    };
    if body.len() > MAX_BODY_READ {
        return;
    }

    let mut collector = BodyCollector::new();
    for chunk in body.chunks(usize::from(split) + 1) {
        collector.push(chunk);
    }
    let response = collector.finish(200);
    assert!(response.body.len() <= MAX_RESPONSE_LEN);
    assert_eq!(response, HttpResponse::new(200, body));

    let mut client = OracleClient::new(Canned(Some(response)), Up);
    let reply = client.request_command(b"jpeg");

    let expected = Command::from_response(&String::from_utf8_lossy(body));
    assert_eq!(reply.command, expected);
    if reply.origin.is_fallback() {
        assert_eq!(reply.command, Command::Forward);
    }
});
