//! Wire models for the stove's `/status.cgi` endpoint.
//!
//! Scope: types only — the HTTP calls live in `crate::client`.
//!
//! Notes
//! - Field names mirror the device firmware JSON verbatim (`prg`, `wprg`, ...).
//! - The firmware omits some fields depending on its state; those are modeled
//!   with serde defaults so one missing counter never fails the whole parse.

use serde::Deserialize;

/// Raw `/status.cgi` payload as the firmware emits it, for both the GET poll
/// and the snapshot returned after an accepted POST.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusRaw {
    /// Stove running ("program" active).
    pub prg: bool,
    /// Weekly schedule toggle.
    pub wprg: bool,
    /// Free-text operating mode: `start`, `heating`, `cooling`, `standby`, ...
    pub mode: String,
    /// Measured room temperature, °C.
    pub is_temp: f64,
    /// Target temperature, °C.
    pub sp_temp: f64,
    pub eco_mode: bool,
    /// String on some firmware revisions, array on others; empty means no error.
    #[serde(default)]
    pub error: ErrorRaw,
    pub meta: MetaRaw,
    #[serde(default = "unknown_counter")]
    pub ignitions: i64,
    #[serde(default = "unknown_counter")]
    pub on_time: i64,
    #[serde(default = "unknown_counter")]
    pub consumption: i64,
    #[serde(default = "unknown_counter")]
    pub maintenance_in: i64,
    #[serde(default = "unknown_counter")]
    pub cleaning_in: i64,
    /// Progress through the ignition phase, roughly 0..20. Only present while
    /// starting up; absent is not the same as zero.
    #[serde(default)]
    pub zone: Option<f64>,
}

// Counters the device has not populated yet read as -1.
fn unknown_counter() -> i64 {
    -1
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetaRaw {
    /// One-time challenge consumed by the next authenticated POST.
    pub nonce: String,
    pub sw_version: String,
    pub language: String,
    pub typ: String,
    pub sn: String,
}

/// The `error` field of `/status.cgi`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorRaw {
    Text(String),
    List(Vec<String>),
}

impl Default for ErrorRaw {
    fn default() -> Self {
        ErrorRaw::List(Vec::new())
    }
}

impl ErrorRaw {
    /// Collapse into an optional message; both empty forms mean "no error".
    pub fn into_message(self) -> Option<String> {
        match self {
            ErrorRaw::Text(s) if s.is_empty() => None,
            ErrorRaw::Text(s) => Some(s),
            ErrorRaw::List(v) if v.is_empty() => None,
            ErrorRaw::List(v) => Some(v.join(", ")),
        }
    }
}

/// A mutating request. The firmware expects a body carrying exactly the one
/// changed field, so each variant serializes to a single-key object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Running(bool),
    WeekProgram(bool),
    EcoMode(bool),
    /// Whole degrees only; the firmware rejects fractional setpoints.
    TargetTemperature(i64),
}

impl Command {
    pub fn to_body(&self) -> serde_json::Value {
        match *self {
            Command::Running(v) => serde_json::json!({ "prg": v }),
            Command::WeekProgram(v) => serde_json::json!({ "wprg": v }),
            Command::EcoMode(v) => serde_json::json!({ "eco_mode": v }),
            Command::TargetTemperature(v) => serde_json::json!({ "sp_temp": v }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FULL_PAYLOAD: &str = r#"{
        "prg": true,
        "wprg": false,
        "mode": "heating",
        "is_temp": 21.4,
        "sp_temp": 23.0,
        "eco_mode": false,
        "error": [],
        "meta": {
            "nonce": "0003c76eb9",
            "sw_version": "V6.03",
            "language": "de",
            "typ": "HSP 2.17",
            "sn": "2000123"
        },
        "ignitions": 412,
        "on_time": 76120,
        "consumption": 880,
        "maintenance_in": 120,
        "cleaning_in": 8,
        "zone": 12.5
    }"#;

    #[test]
    fn parses_full_payload() {
        let raw: StatusRaw = serde_json::from_str(FULL_PAYLOAD).unwrap();
        assert!(raw.prg);
        assert!(!raw.wprg);
        assert_eq!(raw.mode, "heating");
        assert_eq!(raw.is_temp, 21.4);
        assert_eq!(raw.sp_temp, 23.0);
        assert_eq!(raw.meta.nonce, "0003c76eb9");
        assert_eq!(raw.meta.sn, "2000123");
        assert_eq!(raw.ignitions, 412);
        assert_eq!(raw.zone, Some(12.5));
    }

    #[test]
    fn missing_optionals_default_without_failing() {
        // No counters, no error, no zone.
        let raw: StatusRaw = serde_json::from_str(
            r#"{
                "prg": false,
                "wprg": false,
                "mode": "standby",
                "is_temp": 19.0,
                "sp_temp": 20.0,
                "eco_mode": true,
                "meta": {
                    "nonce": "aa",
                    "sw_version": "V6.03",
                    "language": "de",
                    "typ": "HSP 2.17",
                    "sn": "2000123"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(raw.ignitions, -1);
        assert_eq!(raw.on_time, -1);
        assert_eq!(raw.consumption, -1);
        assert_eq!(raw.maintenance_in, -1);
        assert_eq!(raw.cleaning_in, -1);
        assert_eq!(raw.zone, None);
        assert_eq!(raw.error.into_message(), None);
    }

    #[test]
    fn zone_zero_is_distinct_from_absent() {
        let raw: StatusRaw = serde_json::from_str(&FULL_PAYLOAD.replace("12.5", "0.0")).unwrap();
        assert_eq!(raw.zone, Some(0.0));
    }

    #[test]
    fn error_forms_collapse_to_message() {
        assert_eq!(ErrorRaw::Text(String::new()).into_message(), None);
        assert_eq!(ErrorRaw::List(vec![]).into_message(), None);
        assert_eq!(
            ErrorRaw::Text("E127".to_string()).into_message(),
            Some("E127".to_string())
        );
        assert_eq!(
            ErrorRaw::List(vec!["E127".to_string(), "E005".to_string()]).into_message(),
            Some("E127, E005".to_string())
        );
    }

    #[test]
    fn command_bodies_carry_exactly_one_field() {
        assert_eq!(
            Command::Running(true).to_body().to_string(),
            r#"{"prg":true}"#
        );
        assert_eq!(
            Command::WeekProgram(false).to_body().to_string(),
            r#"{"wprg":false}"#
        );
        assert_eq!(
            Command::EcoMode(true).to_body().to_string(),
            r#"{"eco_mode":true}"#
        );
        assert_eq!(
            Command::TargetTemperature(20).to_body().to_string(),
            r#"{"sp_temp":20}"#
        );
    }
}
