//! Explicit per-accessory session state.
//!
//! Holds the last good canonical snapshot together with the heating
//! indicator that decays across ticks; both live exactly as long as the
//! accessory they belong to.

use chrono::{DateTime, Utc};

use crate::indicator::HeatingIndicator;
use crate::models::hsp::StatusRaw;
use crate::state::DeviceState;

#[derive(Debug, Clone)]
pub struct DeviceSession {
    state: DeviceState,
    indicator: HeatingIndicator,
    last_update: Option<DateTime<Utc>>,
}

impl DeviceSession {
    pub fn new() -> DeviceSession {
        DeviceSession {
            state: DeviceState::unknown(),
            indicator: HeatingIndicator::new(),
            last_update: None,
        }
    }

    /// Fold one successful response into the session: normalize, advance the
    /// indicator, then swap the snapshot in wholesale so readers never see a
    /// half-updated record.
    pub fn apply(&mut self, raw: StatusRaw) {
        let state = DeviceState::from_raw(raw);
        self.indicator.update(&state.mode, state.zone);
        self.state = state;
        self.last_update = Some(Utc::now());
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn indicator(&self) -> &HeatingIndicator {
        &self.indicator
    }

    /// Timestamp of the last successful poll or command, if any.
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }
}

impl Default for DeviceSession {
    fn default() -> Self {
        Self::new()
    }
}
