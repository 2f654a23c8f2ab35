//! HTTP(S) transport for the oracle request.
//!
//! Implements [`HttpPort`]: one POST per call, no retry, the whole
//! exchange bounded by the configured timeout.  The response body streams
//! through a [`BodyCollector`], which strips padding and keeps at most
//! [`MAX_RESPONSE_LEN`] bytes of content.  Reading stops after
//! [`MAX_BODY_READ`] raw bytes; a longer body is flagged as truncated.
//!
//! - **`target_os = "espidf"`**: `EspHttpConnection` with the ESP-IDF
//!   certificate bundle attached for TLS.
//! - **other targets**: `reqwest` blocking client with rustls.

use log::debug;

use crate::app::ports::{
    BodyCollector, HttpPort, HttpResponse, MAX_BODY_READ, MAX_RESPONSE_LEN,
};
use crate::config::SystemConfig;
use crate::error::CommsError;

pub struct HttpTransport {
    url: String,
    #[cfg(target_os = "espidf")]
    timeout: std::time::Duration,
    #[cfg(not(target_os = "espidf"))]
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Transport aimed at `config.oracle_url`.
    pub fn new(config: &SystemConfig) -> Result<Self, CommsError> {
        Self::with_endpoint(&config.oracle_url, config.http_timeout_ms)
    }

    #[cfg(target_os = "espidf")]
    pub fn with_endpoint(url: &str, timeout_ms: u32) -> Result<Self, CommsError> {
        Ok(Self {
            url: url.to_owned(),
            timeout: std::time::Duration::from_millis(u64::from(timeout_ms)),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn with_endpoint(url: &str, timeout_ms: u32) -> Result<Self, CommsError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("edgepilot/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_millis(u64::from(timeout_ms)))
            .build()
            .map_err(|e| {
                log::warn!("http: client build failed: {}", e);
                CommsError::Io
            })?;
        Ok(Self {
            url: url.to_owned(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

// ── Host: reqwest ─────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl HttpPort for HttpTransport {
    fn post(&mut self, content_type: &str, body: &[u8]) -> Result<HttpResponse, CommsError> {
        use std::io::Read;

        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body.to_vec())
            .send()
            .map_err(classify)?;

        let status = response.status().as_u16();
        let mut reader = response.take(MAX_BODY_READ as u64 + 1);
        let mut collector = BodyCollector::new();
        let mut chunk = [0u8; MAX_RESPONSE_LEN];
        let mut total = 0;
        loop {
            let n = reader.read(&mut chunk).map_err(|e| {
                debug!("http: body read failed: {}", e);
                CommsError::Io
            })?;
            if n == 0 {
                break;
            }
            total += n;
            collector.push(&chunk[..n]);
        }
        // One extra byte tells a full read from an oversize body.
        if total > MAX_BODY_READ {
            collector.mark_truncated();
        }

        debug!("http: {} -> {} ({} body bytes)", self.url, status, total);
        Ok(collector.finish(status))
    }
}

#[cfg(not(target_os = "espidf"))]
fn classify(e: reqwest::Error) -> CommsError {
    debug!("http: {}", e);
    if e.is_timeout() {
        CommsError::Timeout
    } else if e.is_connect() {
        CommsError::Connect
    } else {
        CommsError::Io
    }
}

// ── Device: esp-idf-svc ───────────────────────────────────────

#[cfg(target_os = "espidf")]
impl HttpPort for HttpTransport {
    fn post(&mut self, content_type: &str, body: &[u8]) -> Result<HttpResponse, CommsError> {
        use esp_idf_svc::http::Method;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

        let config = Configuration {
            timeout: Some(self.timeout),
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        };
        // A fresh connection per request; nothing is kept across cycles.
        let mut conn = EspHttpConnection::new(&config).map_err(|e| {
            debug!("http: connection setup failed: {}", e);
            CommsError::Connect
        })?;

        let length = body.len().to_string();
        let headers = [("Content-Type", content_type), ("Content-Length", length.as_str())];
        conn.initiate_request(Method::Post, &self.url, &headers)
            .map_err(|e| {
                debug!("http: request failed: {}", e);
                CommsError::Connect
            })?;

        let mut sent = 0;
        while sent < body.len() {
            let n = conn.write(&body[sent..]).map_err(|_| CommsError::Io)?;
            if n == 0 {
                return Err(CommsError::Io);
            }
            sent += n;
        }

        conn.initiate_response().map_err(|e| {
            debug!("http: no response: {}", e);
            CommsError::Timeout
        })?;
        let status = conn.status();

        let mut collector = BodyCollector::new();
        let mut chunk = [0u8; MAX_RESPONSE_LEN];
        let mut total = 0;
        while total <= MAX_BODY_READ {
            let n = conn.read(&mut chunk).map_err(|_| CommsError::Io)?;
            if n == 0 {
                break;
            }
            total += n;
            collector.push(&chunk[..n]);
        }
        if total > MAX_BODY_READ {
            collector.mark_truncated();
        }

        debug!("http: {} -> {} ({} body bytes)", self.url, status, total);
        Ok(collector.finish(status))
    }
}
