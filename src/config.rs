//! Minimal runtime configuration helpers.
//! Everything comes from the environment; `main` layers an optional `.env`
//! file underneath it.

use std::time::Duration;
use std::{fs, path::Path};

pub const DEFAULT_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MODEL_TYPE: &str = "HSP-1/2";
pub const DEFAULT_SERIAL: &str = "0000000";

#[derive(Debug, Clone)]
pub struct Config {
    /// Device IP or hostname on the local network.
    pub host: String,
    /// Pre-shared PIN used for the write challenge-response.
    pub pin: String,
    /// Polling cadence.
    pub interval: Duration,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Display metadata only; not sent to the device.
    pub model_type: String,
    pub serial: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let host = match std::env::var("HSP_HOST") {
            Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => return Err("Missing device host: set HSP_HOST".to_string()),
        };

        // Prefer env var; fallback to pin.txt in working directory
        let pin = match std::env::var("HSP_PIN") {
            Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => {
                let path = Path::new("pin.txt");
                match fs::read_to_string(path) {
                    Ok(s) if !s.trim().is_empty() => s.trim().to_string(),
                    _ => {
                        return Err(
                            "Missing device PIN: set HSP_PIN or provide pin.txt in working directory"
                                .to_string(),
                        );
                    }
                }
            }
        };

        // 0 or unparsable falls back to the default cadence.
        let interval_secs = std::env::var("HSP_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(DEFAULT_INTERVAL_SECS);

        let timeout_secs = std::env::var("HSP_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let model_type = std::env::var("HSP_MODEL_TYPE").unwrap_or_else(|_| DEFAULT_MODEL_TYPE.to_string());
        let serial = std::env::var("HSP_SERIAL").unwrap_or_else(|_| DEFAULT_SERIAL.to_string());

        Ok(Config {
            host,
            pin,
            interval: Duration::from_secs(interval_secs),
            request_timeout: Duration::from_secs(timeout_secs),
            model_type,
            serial,
        })
    }
}
