//! Steady-cadence polling loop with an explicit shutdown path.
//!
//! The stop channel doubles as the tick timer: `recv_timeout` sleeps out the
//! remainder of the interval and wakes immediately when the handle is
//! stopped or dropped, so accessory teardown never waits a full tick.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::stove::Stove;

/// Handle to a running poll loop. Dropping it ends the loop; `stop`
/// additionally joins the thread.
pub struct Poller {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

pub fn spawn(stove: Arc<Stove>, interval: Duration) -> Poller {
    let (stop_tx, stop_rx) = mpsc::channel();
    let handle = thread::spawn(move || run_loop(&stove, interval, &stop_rx));
    Poller {
        stop_tx: Some(stop_tx),
        handle: Some(handle),
    }
}

impl Poller {
    /// Stop the loop and wait for the thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop_tx.take(); // dropping the sender wakes the loop
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Poll until the stop channel fires or disconnects. A failed tick keeps the
/// previous snapshot authoritative and the loop running.
pub fn run_loop(stove: &Stove, interval: Duration, stop: &Receiver<()>) {
    loop {
        let tick_start = Instant::now();

        match stove.poll() {
            Ok(()) => {
                let state = stove.state();
                debug!(
                    "poll ok: mode={}, is_temp={:.1}, sp_temp={:.1}",
                    state.mode, state.current_temperature, state.target_temperature
                );
            }
            Err(e) => warn!("poll failed, keeping last snapshot: {}", e),
        }

        // Maintain steady cadence
        let wait = interval.saturating_sub(tick_start.elapsed());
        match stop.recv_timeout(wait) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }
}
