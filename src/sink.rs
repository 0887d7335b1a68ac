use crate::types::{HumidifierState, ScreenBrightness, TargetState};

/// Write-only accessory surface owned by the home-automation framework
///
/// The reconciliation loop pushes every derived value through this trait on
/// each successful poll. Implementations route the updates into whatever
/// characteristic model the framework exposes; the core never reads back
/// through it, and updates are infallible from the core's perspective.
pub trait CharacteristicSink: Send + Sync {
    /// Power state of the appliance
    fn update_active(&self, active: bool);

    /// Coarse current state (inactive or humidifying, never a third value)
    fn update_current_state(&self, state: HumidifierState);

    /// Target mode, re-asserted every cycle since the appliance cannot
    /// report one
    fn update_target_state(&self, state: TargetState);

    /// Current relative humidity, percent
    fn update_current_humidity(&self, percent: f64);

    /// Target humidity threshold, percent
    fn update_humidity_threshold(&self, percent: f64);

    /// Water level, percent (already calibrated)
    fn update_water_level(&self, percent: f64);

    /// Screen brightness level
    fn update_screen_brightness(&self, brightness: ScreenBrightness);

    /// Whether the screen is lit at all
    fn update_screen_on(&self, on: bool);

    /// Temperature in degrees Celsius
    fn update_temperature(&self, celsius: f64);
}
