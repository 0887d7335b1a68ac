//! Pure conversion rules between accessory-facing values and appliance codes.

use crate::types::{FanLevel, HumidifierState};

/// Calibration factor mapping the raw water level code (roughly 0–125) to a
/// percentage. Inferred from observed hardware behavior, not documented by
/// the protocol, so callers may override it.
pub const WATER_LEVEL_SCALE: f64 = 1.25;

/// Quantize a rotation-speed percentage into a manual fan level
///
/// Buckets are `[1,33)` → Low, `[33,66]` → Medium, `(66,100]` → High.
/// Zero and anything outside `[1,100]` yields `None`, meaning no write
/// should be issued. The asymmetric edges match the appliance's accessory
/// bindings and are load-bearing.
pub fn fan_level_for_percent(percent: f64) -> Option<FanLevel> {
    if (1.0..33.0).contains(&percent) {
        Some(FanLevel::Low)
    } else if (33.0..=66.0).contains(&percent) {
        Some(FanLevel::Medium)
    } else if percent > 66.0 && percent <= 100.0 {
        Some(FanLevel::High)
    } else {
        None
    }
}

/// Derive the water level percentage from the raw appliance code
pub fn water_percent(raw: f64, scale: f64) -> f64 {
    raw / scale
}

/// Whether a power code means the appliance is active
pub fn power_active(code: f64) -> bool {
    code != 0.0
}

/// Map the power state onto the two-valued accessory state
pub fn humidifier_state(active: bool) -> HumidifierState {
    if active {
        HumidifierState::Humidifying
    } else {
        HumidifierState::Inactive
    }
}
