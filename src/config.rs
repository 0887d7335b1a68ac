use crate::convert::WATER_LEVEL_SCALE;
use crate::poll::PollOptions;
use serde::Deserialize;
use std::time::Duration;

/// Manufacturer reported to the accessory framework
pub const MANUFACTURER: &str = "SmartMi";

/// Model reported to the accessory framework
pub const MODEL: &str = "Humidifier2";

/// Per-accessory configuration supplied by the framework collaborator
///
/// One accessory is registered per `{address, token, displayName}` tuple.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumidifierConfig {
    /// Network address of the appliance
    pub address: String,
    /// Access token for the transport's encryption layer
    pub token: String,
    /// User-facing accessory name
    pub display_name: String,
    /// Polling period in milliseconds
    #[serde(default = "default_poll_interval_millis")]
    pub poll_interval_millis: u64,
    /// Water level calibration factor
    #[serde(default = "default_water_level_scale")]
    pub water_level_scale: f64,
}

fn default_poll_interval_millis() -> u64 {
    3000
}

fn default_water_level_scale() -> f64 {
    WATER_LEVEL_SCALE
}

impl HumidifierConfig {
    /// Polling period as a `Duration`
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_millis)
    }

    /// Poll options derived from this configuration
    pub fn poll_options(&self) -> PollOptions {
        PollOptions {
            interval: self.poll_interval(),
            water_level_scale: self.water_level_scale,
            ..PollOptions::default()
        }
    }
}
