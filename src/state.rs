//! Canonical device state, normalized from the wire payload.
//!
//! One `DeviceState` is the single snapshot all outward consumers read. It is
//! built from a raw payload in one shot and swapped in wholesale, never
//! mutated field by field from an older value.

use core::fmt;

use crate::models::hsp::StatusRaw;

/// Operating mode reported by the stove. Free text on the wire; recognized
/// values are matched case-insensitively, anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum StoveMode {
    Start,
    Heating,
    Cooling,
    Standby,
    Unknown(String),
}

impl StoveMode {
    pub fn parse(raw: &str) -> StoveMode {
        match raw.trim().to_ascii_lowercase().as_str() {
            "start" => StoveMode::Start,
            "heating" => StoveMode::Heating,
            "cooling" => StoveMode::Cooling,
            "standby" => StoveMode::Standby,
            _ => StoveMode::Unknown(raw.to_string()),
        }
    }
}

impl fmt::Display for StoveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoveMode::Start => write!(f, "start"),
            StoveMode::Heating => write!(f, "heating"),
            StoveMode::Cooling => write!(f, "cooling"),
            StoveMode::Standby => write!(f, "standby"),
            StoveMode::Unknown(s) => write!(f, "{}", s),
        }
    }
}

/// Static-ish device metadata. Reparsed every cycle anyway since the firmware
/// sends it with every response.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    pub software_version: String,
    pub language: String,
    pub model_type: String,
    pub serial_number: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceState {
    pub running: bool,
    pub week_program_active: bool,
    pub mode: StoveMode,
    pub current_temperature: f64,
    pub target_temperature: f64,
    pub eco_mode_active: bool,
    /// One-time challenge from the last response; stale once used.
    pub nonce: String,
    /// Device-reported fault. Surfaced to consumers, never fatal to polling.
    pub error: Option<String>,
    pub device_info: DeviceInfo,
    /// Lifetime counters; -1 until the device populates them.
    pub ignitions: i64,
    pub on_time_seconds: i64,
    pub consumption_units: i64,
    pub maintenance_countdown: i64,
    pub cleaning_countdown: i64,
    /// Ignition progress, present only while starting up.
    pub zone: Option<f64>,
}

impl DeviceState {
    /// Placeholder snapshot used until the first successful poll.
    pub fn unknown() -> DeviceState {
        DeviceState {
            running: false,
            week_program_active: false,
            mode: StoveMode::Unknown("unknown".to_string()),
            current_temperature: 0.0,
            target_temperature: 0.0,
            eco_mode_active: false,
            nonce: String::new(),
            error: None,
            device_info: DeviceInfo {
                software_version: "unknown".to_string(),
                language: "unknown".to_string(),
                model_type: "HSP-1/2".to_string(),
                serial_number: "0000000".to_string(),
            },
            ignitions: -1,
            on_time_seconds: -1,
            consumption_units: -1,
            maintenance_countdown: -1,
            cleaning_countdown: -1,
            zone: None,
        }
    }

    /// Map one raw payload into a fresh canonical record. Pure, no I/O.
    pub fn from_raw(raw: StatusRaw) -> DeviceState {
        DeviceState {
            running: raw.prg,
            week_program_active: raw.wprg,
            mode: StoveMode::parse(&raw.mode),
            current_temperature: raw.is_temp,
            target_temperature: raw.sp_temp,
            eco_mode_active: raw.eco_mode,
            nonce: raw.meta.nonce,
            error: raw.error.into_message(),
            device_info: DeviceInfo {
                software_version: raw.meta.sw_version,
                language: raw.meta.language,
                model_type: raw.meta.typ,
                serial_number: raw.meta.sn,
            },
            ignitions: raw.ignitions,
            on_time_seconds: raw.on_time,
            consumption_units: raw.consumption,
            maintenance_countdown: raw.maintenance_in,
            cleaning_countdown: raw.cleaning_in,
            zone: raw.zone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::hsp::{ErrorRaw, MetaRaw};
    use pretty_assertions::assert_eq;

    fn raw_fixture() -> StatusRaw {
        StatusRaw {
            prg: true,
            wprg: true,
            mode: "Heating".to_string(),
            is_temp: 21.4,
            sp_temp: 23.0,
            eco_mode: false,
            error: ErrorRaw::Text(String::new()),
            meta: MetaRaw {
                nonce: "0003c76eb9".to_string(),
                sw_version: "V6.03".to_string(),
                language: "de".to_string(),
                typ: "HSP 2.17".to_string(),
                sn: "2000123".to_string(),
            },
            ignitions: 412,
            on_time: 76120,
            consumption: 880,
            maintenance_in: 120,
            cleaning_in: 8,
            zone: None,
        }
    }

    #[test]
    fn maps_vendor_fields_to_canonical_names() {
        let state = DeviceState::from_raw(raw_fixture());
        assert!(state.running);
        assert!(state.week_program_active);
        assert_eq!(state.mode, StoveMode::Heating);
        assert_eq!(state.current_temperature, 21.4);
        assert_eq!(state.target_temperature, 23.0);
        assert_eq!(state.nonce, "0003c76eb9");
        assert_eq!(state.error, None);
        assert_eq!(state.device_info.model_type, "HSP 2.17");
        assert_eq!(state.device_info.serial_number, "2000123");
        assert_eq!(state.on_time_seconds, 76120);
        assert_eq!(state.zone, None);
    }

    #[test]
    fn normalization_is_deterministic() {
        assert_eq!(
            DeviceState::from_raw(raw_fixture()),
            DeviceState::from_raw(raw_fixture())
        );
    }

    #[test]
    fn nonempty_error_is_surfaced() {
        let mut raw = raw_fixture();
        raw.error = ErrorRaw::List(vec!["E127".to_string()]);
        let state = DeviceState::from_raw(raw);
        assert_eq!(state.error, Some("E127".to_string()));
    }

    #[test]
    fn unrecognized_mode_is_preserved() {
        assert_eq!(StoveMode::parse("start"), StoveMode::Start);
        assert_eq!(StoveMode::parse(" Standby "), StoveMode::Standby);
        assert_eq!(
            StoveMode::parse("pellet_feed"),
            StoveMode::Unknown("pellet_feed".to_string())
        );
    }

    #[test]
    fn unknown_snapshot_uses_sentinels() {
        let state = DeviceState::unknown();
        assert_eq!(state.ignitions, -1);
        assert_eq!(state.cleaning_countdown, -1);
        assert_eq!(state.device_info.serial_number, "0000000");
        assert_eq!(state.device_info.model_type, "HSP-1/2");
        assert_eq!(state.zone, None);
        assert_eq!(state.error, None);
    }
}
