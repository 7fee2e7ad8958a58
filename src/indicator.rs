//! Heating indicator derived from operating mode and ignition progress.
//!
//! Stateful on purpose: the cooling phase decays one step per tick relative
//! to the previous value, so one instance lives for the whole accessory
//! session instead of being recomputed from scratch.

use crate::state::StoveMode;

// The zone value tops out around 20 on real firmware; 95 is the brightest
// the ignition ramp gets before the mode flips to heating.
const START_BRIGHTNESS_SCALE: f64 = 95.0 / 20.0;
const ZONE_MAX: f64 = 20.0;
/// Shown while igniting when the firmware omits the zone field.
const START_FALLBACK_BRIGHTNESS: u8 = 11;

#[derive(Debug, Clone, PartialEq)]
pub struct HeatingIndicator {
    brightness: u8,
    cooling_level: u8,
}

impl HeatingIndicator {
    pub fn new() -> HeatingIndicator {
        HeatingIndicator {
            brightness: 0,
            cooling_level: 0,
        }
    }

    /// Advance one tick with the freshly polled mode and zone.
    pub fn update(&mut self, mode: &StoveMode, zone: Option<f64>) {
        match mode {
            StoveMode::Start => {
                self.cooling_level = 100;
                self.brightness = match zone {
                    Some(z) => (START_BRIGHTNESS_SCALE * z.clamp(0.0, ZONE_MAX)).round() as u8,
                    None => START_FALLBACK_BRIGHTNESS,
                };
            }
            StoveMode::Heating => {
                self.brightness = 100;
            }
            StoveMode::Cooling => {
                // Decrement by one per tick, floor at 1 so the indicator
                // stays visibly lit until the stove leaves the cooling phase.
                let level = self.cooling_level.saturating_sub(1).max(1);
                self.cooling_level = level;
                self.brightness = level;
            }
            StoveMode::Standby | StoveMode::Unknown(_) => {
                self.brightness = 0;
                self.cooling_level = 0;
            }
        }
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn cooling_level(&self) -> u8 {
        self.cooling_level
    }

    /// Summary shown on the on/off face of the indicator.
    pub fn is_on(&self) -> bool {
        self.brightness > 0
    }
}

impl Default for HeatingIndicator {
    fn default() -> Self {
        Self::new()
    }
}
