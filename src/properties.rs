//! Fixed MIoT property address table for the SmartMi Humidifier 2.

/// A stable `(siid, piid)` coordinate identifying one appliance property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyAddress {
    /// Service index
    pub siid: u32,
    /// Property index within the service
    pub piid: u32,
}

/// Semantic appliance properties
///
/// Each property maps to exactly one fixed address. The table is part of the
/// device model and is never derived at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Power,
    FanLevel,
    HumidityThreshold,
    WaterLevel,
    Dry,
    Humidity,
    Temperature,
    ScreenBrightness,
    Status,
}

impl Property {
    /// Get the MIoT address of this property
    pub const fn address(self) -> PropertyAddress {
        match self {
            Property::Power => PropertyAddress { siid: 2, piid: 1 },
            Property::FanLevel => PropertyAddress { siid: 2, piid: 5 },
            Property::HumidityThreshold => PropertyAddress { siid: 2, piid: 6 },
            Property::WaterLevel => PropertyAddress { siid: 2, piid: 7 },
            Property::Dry => PropertyAddress { siid: 2, piid: 8 },
            Property::Humidity => PropertyAddress { siid: 3, piid: 9 },
            Property::Temperature => PropertyAddress { siid: 3, piid: 7 },
            Property::ScreenBrightness => PropertyAddress { siid: 5, piid: 2 },
            Property::Status => PropertyAddress { siid: 6, piid: 1 },
        }
    }
}

/// The fixed, ordered property list read by every poll cycle
///
/// A batch response mirrors this order positionally. `StateSnapshot` is the
/// only place that indexes into a batch result; everything downstream works
/// with named fields.
pub const BATCH_PROPERTIES: [Property; 9] = [
    Property::Power,
    Property::Humidity,
    Property::Status,
    Property::WaterLevel,
    Property::Dry,
    Property::ScreenBrightness,
    Property::FanLevel,
    Property::Temperature,
    Property::HumidityThreshold,
];
