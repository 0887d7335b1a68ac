use crate::error::{HumidifierError, Result};
use crate::properties::{Property, BATCH_PROPERTIES};
use crate::transport::PropertyReading;
use serde::{Deserialize, Serialize};

/// Fan level codes accepted by the appliance
///
/// 0 is automatic; 1–3 are the manual speeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FanLevel {
    Auto,
    Low,
    Medium,
    High,
}

impl FanLevel {
    /// Appliance-facing code for this level
    pub fn code(self) -> u8 {
        match self {
            FanLevel::Auto => 0,
            FanLevel::Low => 1,
            FanLevel::Medium => 2,
            FanLevel::High => 3,
        }
    }

    /// Parse an appliance code
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(FanLevel::Auto),
            1 => Some(FanLevel::Low),
            2 => Some(FanLevel::Medium),
            3 => Some(FanLevel::High),
            _ => None,
        }
    }
}

/// Screen brightness codes accepted by the appliance
///
/// 0 is dark, 1 is a dim glimmer, 2 is full brightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenBrightness {
    Dark,
    Glimmer,
    Brightest,
}

impl ScreenBrightness {
    /// Appliance-facing code for this brightness
    pub fn code(self) -> u8 {
        match self {
            ScreenBrightness::Dark => 0,
            ScreenBrightness::Glimmer => 1,
            ScreenBrightness::Brightest => 2,
        }
    }

    /// Parse an appliance code
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ScreenBrightness::Dark),
            1 => Some(ScreenBrightness::Glimmer),
            2 => Some(ScreenBrightness::Brightest),
            _ => None,
        }
    }

    /// Whether the screen is lit at all
    pub fn is_on(self) -> bool {
        self != ScreenBrightness::Dark
    }
}

/// Coarse accessory-facing humidifier state
///
/// The appliance only distinguishes powered and unpowered, so exactly two
/// states are ever derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HumidifierState {
    Inactive,
    Humidifying,
}

impl HumidifierState {
    /// Accessory-model code (CurrentHumidifierDehumidifierState)
    pub fn code(self) -> u8 {
        match self {
            HumidifierState::Inactive => 0,
            HumidifierState::Humidifying => 2,
        }
    }
}

/// Target operating mode
///
/// The appliance has no readable target mode distinct from its power state,
/// so the single supported mode is re-asserted every poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetState {
    Humidifier,
}

impl TargetState {
    /// Accessory-model code (TargetHumidifierDehumidifierState)
    pub fn code(self) -> u8 {
        1
    }
}

/// Named-field snapshot of one poll cycle
///
/// Built once from the positionally-ordered batch response; consumers never
/// index into the raw result list.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    pub power: bool,
    /// Current relative humidity, percent
    pub humidity: f64,
    /// Raw appliance status code (siid 6, piid 1)
    pub status: f64,
    /// Raw water level code, roughly 0–125
    pub water_level_raw: f64,
    /// Dry mode enabled
    pub dry: bool,
    pub screen_brightness: ScreenBrightness,
    pub fan_level: FanLevel,
    /// Degrees Celsius
    pub temperature: f64,
    /// Target humidity threshold, percent
    pub humidity_threshold: f64,
}

impl StateSnapshot {
    /// Build a snapshot from a batch response
    ///
    /// The readings must mirror [`BATCH_PROPERTIES`] positionally. Any
    /// rejected item or shape mismatch fails the whole snapshot; the poller
    /// treats that as a missed cycle.
    pub fn from_readings(readings: &[PropertyReading]) -> Result<Self> {
        if readings.len() != BATCH_PROPERTIES.len() {
            return Err(HumidifierError::InvalidResponse(format!(
                "Expected {} batch readings, got {}",
                BATCH_PROPERTIES.len(),
                readings.len()
            )));
        }

        for (property, reading) in BATCH_PROPERTIES.iter().zip(readings) {
            if !reading.is_ok() {
                let address = property.address();
                return Err(HumidifierError::DeviceRejected {
                    siid: address.siid,
                    piid: address.piid,
                    code: reading.code,
                });
            }
        }

        Ok(Self {
            power: bool_field(&readings[0], Property::Power)?,
            humidity: f64_field(&readings[1], Property::Humidity)?,
            status: f64_field(&readings[2], Property::Status)?,
            water_level_raw: f64_field(&readings[3], Property::WaterLevel)?,
            dry: bool_field(&readings[4], Property::Dry)?,
            screen_brightness: f64_field(&readings[5], Property::ScreenBrightness)
                .and_then(|v| {
                    ScreenBrightness::from_code(v as i64).ok_or_else(|| {
                        HumidifierError::InvalidResponse(format!(
                            "Unknown screen brightness code {v}"
                        ))
                    })
                })?,
            fan_level: f64_field(&readings[6], Property::FanLevel).and_then(|v| {
                FanLevel::from_code(v as i64).ok_or_else(|| {
                    HumidifierError::InvalidResponse(format!("Unknown fan level code {v}"))
                })
            })?,
            temperature: f64_field(&readings[7], Property::Temperature)?,
            humidity_threshold: f64_field(&readings[8], Property::HumidityThreshold)?,
        })
    }
}

fn f64_field(reading: &PropertyReading, property: Property) -> Result<f64> {
    reading.as_f64().ok_or_else(|| {
        HumidifierError::InvalidResponse(format!(
            "Non-numeric value for {property:?}: {}",
            reading.value
        ))
    })
}

fn bool_field(reading: &PropertyReading, property: Property) -> Result<bool> {
    reading.as_bool().ok_or_else(|| {
        HumidifierError::InvalidResponse(format!(
            "Non-boolean value for {property:?}: {}",
            reading.value
        ))
    })
}
