//! Blocking HTTP client for the stove's local `/status.cgi` endpoint.
//!
//! - `ureq` agent, no async: one device, short requests, fixed cadence.
//! - GET is unauthenticated; POST carries the vendor app's header set plus
//!   the `X-HS-PIN` challenge response computed in `crate::auth`.
//! - No retries: a failed poll is simply skipped until the next tick.

use std::time::Duration;

use crate::models::hsp::{Command, StatusRaw};

/// Backend origin the stock mobile app announces; the firmware expects it.
const BACKEND_IP_HEADER: &str = "https://app.hsp.com";
/// Overall deadline per request; a hung stove must not stall the tick loop.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub enum HspClientError {
    Transport(String),
    Http { status: u16, message: String },
    Json(serde_path_to_error::Error<serde_json::Error>),
}

impl core::fmt::Display for HspClientError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HspClientError::Transport(s) => write!(f, "transport error: {}", s),
            HspClientError::Http { status, message } => write!(f, "http {}: {}", status, message),
            HspClientError::Json(e) => write!(f, "json error: {}", e),
        }
    }
}

impl std::error::Error for HspClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HspClientError::Json(e) => Some(e),
            _ => None,
        }
    }
}

pub struct HspClient {
    agent: ureq::Agent,
    status_url: String,
}

impl HspClient {
    pub fn new(host: &str) -> HspClient {
        Self::with_timeout(host, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(host: &str, timeout: Duration) -> HspClient {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        HspClient {
            agent,
            status_url: format!("http://{}/status.cgi", host),
        }
    }

    /// Unauthenticated status poll. Also the only source of fresh nonces.
    pub fn fetch_status(&self) -> Result<StatusRaw, HspClientError> {
        let resp = self
            .agent
            .get(&self.status_url)
            .set("Accept", "application/json")
            .call();
        Self::parse_status(resp)
    }

    /// Authenticated write: a body with exactly the one changed field, plus
    /// the header set the vendor app sends. The firmware rejects requests
    /// whose `X-HS-PIN` does not match the nonce it last issued.
    pub fn send_command(&self, command: Command, pin_hash: &str) -> Result<StatusRaw, HspClientError> {
        let body = command.to_body().to_string();
        let resp = self
            .agent
            .post(&self.status_url)
            .set("Accept", "*/*")
            .set("Proxy-Connection", "keep-alive")
            .set("X-BACKEND-IP", BACKEND_IP_HEADER)
            .set("Accept-Language", "de-DE;q=1.0, en-DE;q=0.9")
            .set("Accept-Encoding", "gzip;q=1.0, compress;q=0.5")
            .set("token", "32bytes")
            .set("Content-Type", "application/json")
            .set("User-Agent", "ios")
            .set("Connection", "keep-alive")
            .set("X-HS-PIN", pin_hash)
            .send_string(&body);
        Self::parse_status(resp)
    }

    fn parse_status(resp: Result<ureq::Response, ureq::Error>) -> Result<StatusRaw, HspClientError> {
        match resp {
            Ok(res) => {
                let body = res
                    .into_string()
                    .map_err(|e| HspClientError::Transport(e.to_string()))?;
                let mut de = serde_json::Deserializer::from_str(&body);
                serde_path_to_error::deserialize(&mut de).map_err(HspClientError::Json)
            }
            Err(ureq::Error::Transport(t)) => Err(HspClientError::Transport(t.to_string())),
            Err(ureq::Error::Status(status, res)) => {
                let message = res.into_string().unwrap_or_else(|_| String::from("<no body>"));
                Err(HspClientError::Http { status, message })
            }
        }
    }
}
