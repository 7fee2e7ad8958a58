//! Thin outward adapter over the shared stove core.
//!
//! A deployment registers whichever subset of capabilities it exposes on a
//! single `Accessory`; every capability reads the same cached snapshot and
//! writes through the same serialized command path.

use std::sync::Arc;

use crate::stove::{CommandError, Stove};

pub const MANUFACTURER: &str = "Haas+Sohn";
/// The stove has no filter sensor; the indication is pinned to "no change
/// needed".
pub const FILTER_CHANGE_INDICATION: i64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Running,
    WeekProgram,
    EcoMode,
    TargetTemperature,
    CurrentTemperature,
    IndicatorBrightness,
    IndicatorOn,
    FilterChange,
}

impl Capability {
    pub fn name(&self) -> &'static str {
        match self {
            Capability::Running => "running",
            Capability::WeekProgram => "week-program",
            Capability::EcoMode => "eco-mode",
            Capability::TargetTemperature => "target-temperature",
            Capability::CurrentTemperature => "current-temperature",
            Capability::IndicatorBrightness => "indicator-brightness",
            Capability::IndicatorOn => "indicator-on",
            Capability::FilterChange => "filter-change",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
}

#[derive(Debug)]
pub enum AccessError {
    /// Capability not registered on this accessory.
    Unsupported(Capability),
    /// Write attempted on a read-only capability.
    ReadOnly(Capability),
    /// Wrong value type for the capability.
    TypeMismatch(Capability),
    Command(CommandError),
}

impl core::fmt::Display for AccessError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AccessError::Unsupported(c) => write!(f, "capability {} not registered", c.name()),
            AccessError::ReadOnly(c) => write!(f, "capability {} is read-only", c.name()),
            AccessError::TypeMismatch(c) => write!(f, "wrong value type for capability {}", c.name()),
            AccessError::Command(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AccessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AccessError::Command(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CommandError> for AccessError {
    fn from(value: CommandError) -> Self {
        AccessError::Command(value)
    }
}

pub struct Accessory {
    stove: Arc<Stove>,
    capabilities: Vec<Capability>,
    model_type: String,
    serial_number: String,
}

impl Accessory {
    pub fn new(
        stove: Arc<Stove>,
        capabilities: Vec<Capability>,
        model_type: impl Into<String>,
        serial_number: impl Into<String>,
    ) -> Accessory {
        Accessory {
            stove,
            capabilities,
            model_type: model_type.into(),
            serial_number: serial_number.into(),
        }
    }

    /// The full capability set, for deployments that expose everything.
    pub fn all_capabilities() -> Vec<Capability> {
        vec![
            Capability::Running,
            Capability::WeekProgram,
            Capability::EcoMode,
            Capability::TargetTemperature,
            Capability::CurrentTemperature,
            Capability::IndicatorBrightness,
            Capability::IndicatorOn,
            Capability::FilterChange,
        ]
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Read from the cached snapshot; never touches the network.
    pub fn get(&self, capability: Capability) -> Result<Value, AccessError> {
        if !self.supports(capability) {
            return Err(AccessError::Unsupported(capability));
        }
        let value = match capability {
            Capability::Running => Value::Bool(self.stove.state().running),
            Capability::WeekProgram => Value::Bool(self.stove.state().week_program_active),
            Capability::EcoMode => Value::Bool(self.stove.state().eco_mode_active),
            Capability::TargetTemperature => Value::Float(self.stove.state().target_temperature),
            Capability::CurrentTemperature => Value::Float(self.stove.state().current_temperature),
            Capability::IndicatorBrightness => Value::Int(i64::from(self.stove.indicator().brightness())),
            Capability::IndicatorOn => Value::Bool(self.stove.indicator().is_on()),
            Capability::FilterChange => Value::Int(FILTER_CHANGE_INDICATION),
        };
        Ok(value)
    }

    /// Write through the stove's serialized command path. Reads-only
    /// capabilities reject writes; setpoints must be whole degrees.
    pub fn set(&self, capability: Capability, value: Value) -> Result<(), AccessError> {
        if !self.supports(capability) {
            return Err(AccessError::Unsupported(capability));
        }
        match (capability, value) {
            (Capability::Running, Value::Bool(v)) => Ok(self.stove.set_running(v)?),
            (Capability::WeekProgram, Value::Bool(v)) => Ok(self.stove.set_week_program(v)?),
            (Capability::EcoMode, Value::Bool(v)) => Ok(self.stove.set_eco_mode(v)?),
            (Capability::TargetTemperature, Value::Int(v)) => {
                Ok(self.stove.set_target_temperature(v)?)
            }
            (Capability::TargetTemperature, Value::Float(v)) if v.fract() == 0.0 => {
                Ok(self.stove.set_target_temperature(v as i64)?)
            }
            (Capability::TargetTemperature, Value::Float(v)) => {
                Err(AccessError::Command(CommandError::InvalidInput(format!(
                    "target temperature must be a whole number of degrees, got {}",
                    v
                ))))
            }
            (
                Capability::Running
                | Capability::WeekProgram
                | Capability::EcoMode
                | Capability::TargetTemperature,
                _,
            ) => Err(AccessError::TypeMismatch(capability)),
            (other, _) => Err(AccessError::ReadOnly(other)),
        }
    }

    // Static accessory information, mirroring the stock integration's
    // placeholder values until the device reports real metadata.

    pub fn manufacturer(&self) -> &'static str {
        MANUFACTURER
    }

    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::HspClient;

    fn offline_accessory(capabilities: Vec<Capability>) -> Accessory {
        let stove = Arc::new(Stove::new(HspClient::new("127.0.0.1:9"), "1234"));
        Accessory::new(stove, capabilities, "HSP 2.17 Home II", "2000123")
    }

    #[test]
    fn reads_come_from_the_cached_snapshot() {
        let acc = offline_accessory(Accessory::all_capabilities());
        assert_eq!(acc.get(Capability::Running).unwrap(), Value::Bool(false));
        assert_eq!(acc.get(Capability::CurrentTemperature).unwrap(), Value::Float(0.0));
        assert_eq!(acc.get(Capability::IndicatorBrightness).unwrap(), Value::Int(0));
        assert_eq!(acc.get(Capability::IndicatorOn).unwrap(), Value::Bool(false));
        assert_eq!(
            acc.get(Capability::FilterChange).unwrap(),
            Value::Int(FILTER_CHANGE_INDICATION)
        );
    }

    #[test]
    fn unregistered_capability_is_unsupported() {
        let acc = offline_accessory(vec![Capability::Running]);
        match acc.get(Capability::EcoMode) {
            Err(AccessError::Unsupported(Capability::EcoMode)) => {}
            other => panic!("expected Unsupported, got {:?}", other),
        }
        match acc.set(Capability::EcoMode, Value::Bool(true)) {
            Err(AccessError::Unsupported(Capability::EcoMode)) => {}
            other => panic!("expected Unsupported, got {:?}", other.err()),
        }
    }

    #[test]
    fn read_only_capabilities_reject_writes() {
        let acc = offline_accessory(Accessory::all_capabilities());
        for cap in [
            Capability::CurrentTemperature,
            Capability::IndicatorBrightness,
            Capability::IndicatorOn,
            Capability::FilterChange,
        ] {
            match acc.set(cap, Value::Int(1)) {
                Err(AccessError::ReadOnly(c)) => assert_eq!(c, cap),
                other => panic!("expected ReadOnly for {}, got {:?}", cap.name(), other.err()),
            }
        }
    }

    #[test]
    fn wrong_value_type_is_rejected() {
        let acc = offline_accessory(Accessory::all_capabilities());
        match acc.set(Capability::Running, Value::Int(1)) {
            Err(AccessError::TypeMismatch(Capability::Running)) => {}
            other => panic!("expected TypeMismatch, got {:?}", other.err()),
        }
    }

    #[test]
    fn fractional_setpoint_is_invalid_input() {
        let acc = offline_accessory(Accessory::all_capabilities());
        match acc.set(Capability::TargetTemperature, Value::Float(19.5)) {
            Err(AccessError::Command(CommandError::InvalidInput(_))) => {}
            other => panic!("expected InvalidInput, got {:?}", other.err()),
        }
        // A low whole-degree setpoint is still refused by the stove core.
        match acc.set(Capability::TargetTemperature, Value::Int(15)) {
            Err(AccessError::Command(CommandError::InvalidInput(_))) => {}
            other => panic!("expected InvalidInput, got {:?}", other.err()),
        }
    }

    #[test]
    fn exposes_static_metadata() {
        let acc = offline_accessory(vec![]);
        assert_eq!(acc.manufacturer(), "Haas+Sohn");
        assert_eq!(acc.model_type(), "HSP 2.17 Home II");
        assert_eq!(acc.serial_number(), "2000123");
    }
}
