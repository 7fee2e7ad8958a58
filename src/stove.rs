//! One stove behind a single shared handle: HTTP client, credentials and
//! session state, plus the command path that keeps nonce use serialized.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::debug;

use crate::auth;
use crate::client::{HspClient, HspClientError};
use crate::indicator::HeatingIndicator;
use crate::models::hsp::{Command, StatusRaw};
use crate::session::DeviceSession;
use crate::state::DeviceState;

/// Setpoints at or below this are refused before any network traffic.
pub const MIN_TARGET_TEMPERATURE: i64 = 15;

#[derive(Debug)]
pub enum CommandError {
    /// Input refused before any network call was made.
    InvalidInput(String),
    Client(HspClientError),
}

impl core::fmt::Display for CommandError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CommandError::InvalidInput(s) => write!(f, "invalid input: {}", s),
            CommandError::Client(e) => write!(f, "device request failed: {}", e),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Client(e) => Some(e),
            _ => None,
        }
    }
}

impl From<HspClientError> for CommandError {
    fn from(value: HspClientError) -> Self {
        CommandError::Client(value)
    }
}

/// Receives every fresh snapshot after a successful poll or command.
pub trait StateSink: Send + Sync {
    fn publish(&self, state: &DeviceState, indicator: &HeatingIndicator);
}

pub struct Stove {
    client: HspClient,
    pin: String,
    session: Mutex<DeviceSession>,
    /// Serializes the whole nonce-fetch + POST unit. Two writes must never
    /// interleave their challenge use; the device rejects reused nonces.
    command_gate: Mutex<()>,
    sinks: Vec<Box<dyn StateSink>>,
}

impl Stove {
    pub fn new(client: HspClient, pin: impl Into<String>) -> Stove {
        Stove {
            client,
            pin: pin.into(),
            session: Mutex::new(DeviceSession::new()),
            command_gate: Mutex::new(()),
            sinks: Vec::new(),
        }
    }

    /// Register an outward consumer. Call before sharing the stove.
    pub fn add_sink(&mut self, sink: Box<dyn StateSink>) {
        self.sinks.push(sink);
    }

    fn session(&self) -> MutexGuard<'_, DeviceSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// One poll tick: fetch, normalize, replace, publish. On failure the
    /// previous snapshot stays authoritative and nothing is published.
    pub fn poll(&self) -> Result<(), HspClientError> {
        let raw = self.client.fetch_status()?;
        self.apply(raw);
        Ok(())
    }

    /// Last good canonical snapshot (the unknown placeholder before the
    /// first successful poll).
    pub fn state(&self) -> DeviceState {
        self.session().state().clone()
    }

    pub fn indicator(&self) -> HeatingIndicator {
        self.session().indicator().clone()
    }

    pub fn set_running(&self, on: bool) -> Result<(), CommandError> {
        if self.session().state().running == on {
            debug!("running already {}; skipping write", on);
            return Ok(());
        }
        debug!("set running -> {}", on);
        self.execute(Command::Running(on))
    }

    pub fn set_week_program(&self, on: bool) -> Result<(), CommandError> {
        if self.session().state().week_program_active == on {
            debug!("week program already {}; skipping write", on);
            return Ok(());
        }
        debug!("set week program -> {}", on);
        self.execute(Command::WeekProgram(on))
    }

    pub fn set_eco_mode(&self, on: bool) -> Result<(), CommandError> {
        if self.session().state().eco_mode_active == on {
            debug!("eco mode already {}; skipping write", on);
            return Ok(());
        }
        debug!("set eco mode -> {}", on);
        self.execute(Command::EcoMode(on))
    }

    /// Whole degrees, above the firmware's 15 °C floor. Writing the current
    /// setpoint again is a successful no-op without network traffic.
    pub fn set_target_temperature(&self, celsius: i64) -> Result<(), CommandError> {
        if celsius <= MIN_TARGET_TEMPERATURE {
            return Err(CommandError::InvalidInput(format!(
                "target temperature must be above {} °C, got {}",
                MIN_TARGET_TEMPERATURE, celsius
            )));
        }
        if self.session().state().target_temperature.round() as i64 == celsius {
            debug!("target temperature already {} °C; skipping write", celsius);
            return Ok(());
        }
        debug!("set target temperature -> {} °C", celsius);
        self.execute(Command::TargetTemperature(celsius))
    }

    /// Fresh nonce, hash, single-field POST, fold in the response snapshot.
    /// The gate makes the whole unit atomic relative to other commands.
    fn execute(&self, command: Command) -> Result<(), CommandError> {
        let _gate = self.command_gate.lock().unwrap_or_else(PoisonError::into_inner);
        // The poll-cached nonce may already be stale; fetch a fresh one.
        let fresh = self.client.fetch_status()?;
        let hash = auth::pin_hash(&fresh.meta.nonce, &self.pin);
        let raw = self.client.send_command(command, &hash)?;
        self.apply(raw);
        Ok(())
    }

    fn apply(&self, raw: StatusRaw) {
        let (state, indicator) = {
            let mut session = self.session();
            session.apply(raw);
            (session.state().clone(), session.indicator().clone())
        };
        for sink in &self.sinks {
            sink.publish(&state, &indicator);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A port from the reserved range; nothing listens there, so any test
    // that accidentally reaches the network fails fast with a transport
    // error instead of an assertion on the happy path.
    fn offline_stove() -> Stove {
        Stove::new(HspClient::new("127.0.0.1:9"), "1234")
    }

    #[test]
    fn low_setpoint_rejected_before_any_network_call() {
        let stove = offline_stove();
        for bad in [15, 0, -20] {
            match stove.set_target_temperature(bad) {
                Err(CommandError::InvalidInput(_)) => {}
                other => panic!("expected InvalidInput for {}, got {:?}", bad, other.err()),
            }
        }
    }

    #[test]
    fn unchanged_toggles_are_noops_without_network() {
        let stove = offline_stove();
        // The unknown snapshot reports everything off, so writing `false`
        // matches current state and must succeed without a request.
        stove.set_running(false).unwrap();
        stove.set_week_program(false).unwrap();
        stove.set_eco_mode(false).unwrap();
    }

    #[test]
    fn changed_toggle_attempts_a_request() {
        let stove = offline_stove();
        match stove.set_running(true) {
            Err(CommandError::Client(HspClientError::Transport(_))) => {}
            other => panic!("expected transport error, got {:?}", other.err()),
        }
    }
}
