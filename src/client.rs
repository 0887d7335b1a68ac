use crate::convert::{self, WATER_LEVEL_SCALE};
use crate::error::{HumidifierError, Result};
use crate::properties::{Property, BATCH_PROPERTIES};
use crate::session::DeviceSession;
use crate::transport::{CallConfig, MiotMethod, MiotTransport, PropertyParam, PropertyReading};
use crate::types::{FanLevel, ScreenBrightness, StateSnapshot};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Delay hint passed with power writes so the transport refreshes its own
/// view once the appliance has settled.
const POWER_REFRESH_DELAY: Duration = Duration::from_millis(200);

/// Semantic property client for one humidifier appliance
///
/// Every operation resolves the device session first and then issues exactly
/// one addressed read or write. No retries happen here; transport rejections
/// propagate to the caller.
pub struct HumidifierClient {
    session: DeviceSession,
    water_level_scale: f64,
}

impl HumidifierClient {
    /// Create a client over the given transport
    ///
    /// The session is established lazily on the first operation.
    pub fn new(transport: Arc<dyn MiotTransport>) -> Self {
        Self {
            session: DeviceSession::new(transport),
            water_level_scale: WATER_LEVEL_SCALE,
        }
    }

    /// Override the water level calibration factor
    pub fn with_water_level_scale(mut self, scale: f64) -> Self {
        self.water_level_scale = scale;
        self
    }

    /// The water level calibration factor in use
    pub fn water_level_scale(&self) -> f64 {
        self.water_level_scale
    }

    async fn get_property(&self, property: Property) -> Result<PropertyReading> {
        let device = self.session.ensure().await?;
        let address = property.address();
        let params = vec![PropertyParam {
            did: device.device_id.clone(),
            siid: address.siid,
            piid: address.piid,
            value: None,
        }];

        let mut readings = self
            .session
            .transport()
            .call(MiotMethod::GetProperties, params, None)
            .await?;

        if readings.is_empty() {
            return Err(HumidifierError::InvalidResponse(format!(
                "Empty result for {property:?}"
            )));
        }
        let reading = readings.remove(0);
        if !reading.is_ok() {
            return Err(HumidifierError::DeviceRejected {
                siid: address.siid,
                piid: address.piid,
                code: reading.code,
            });
        }
        Ok(reading)
    }

    async fn set_property(
        &self,
        property: Property,
        value: Value,
        config: Option<CallConfig>,
    ) -> Result<PropertyReading> {
        let device = self.session.ensure().await?;
        let address = property.address();
        let params = vec![PropertyParam {
            did: device.device_id.clone(),
            siid: address.siid,
            piid: address.piid,
            value: Some(value),
        }];

        let mut readings = self
            .session
            .transport()
            .call(MiotMethod::SetProperties, params, config)
            .await?;

        if readings.is_empty() {
            return Err(HumidifierError::InvalidResponse(format!(
                "Empty result for {property:?}"
            )));
        }
        Ok(readings.remove(0))
    }

    fn numeric(&self, property: Property, reading: &PropertyReading) -> Result<f64> {
        reading.as_f64().ok_or_else(|| {
            HumidifierError::InvalidResponse(format!(
                "Non-numeric value for {property:?}: {}",
                reading.value
            ))
        })
    }

    // ========== Reads ==========

    /// Whether the appliance is powered on
    pub async fn get_power(&self) -> Result<bool> {
        let reading = self.get_property(Property::Power).await?;
        reading.as_bool().ok_or_else(|| {
            HumidifierError::InvalidResponse(format!("Non-boolean power value: {}", reading.value))
        })
    }

    /// Current relative humidity in percent
    pub async fn get_humidity(&self) -> Result<f64> {
        let reading = self.get_property(Property::Humidity).await?;
        self.numeric(Property::Humidity, &reading)
    }

    /// Current temperature in degrees Celsius
    pub async fn get_temperature(&self) -> Result<f64> {
        let reading = self.get_property(Property::Temperature).await?;
        self.numeric(Property::Temperature, &reading)
    }

    /// Current fan level
    pub async fn get_fan_level(&self) -> Result<FanLevel> {
        let reading = self.get_property(Property::FanLevel).await?;
        let code = self.numeric(Property::FanLevel, &reading)?;
        tracing::debug!(code, "getFanLevel");
        FanLevel::from_code(code as i64).ok_or_else(|| {
            HumidifierError::InvalidResponse(format!("Unknown fan level code {code}"))
        })
    }

    /// Water level as a percentage, derived from the raw code via the
    /// calibration factor
    pub async fn get_water_level(&self) -> Result<f64> {
        let reading = self.get_property(Property::WaterLevel).await?;
        let raw = self.numeric(Property::WaterLevel, &reading)?;
        let percent = convert::water_percent(raw, self.water_level_scale);
        tracing::debug!(raw, percent, "getWaterLevel");
        Ok(percent)
    }

    /// Current screen brightness
    pub async fn get_screen_brightness(&self) -> Result<ScreenBrightness> {
        let reading = self.get_property(Property::ScreenBrightness).await?;
        let code = self.numeric(Property::ScreenBrightness, &reading)?;
        ScreenBrightness::from_code(code as i64).ok_or_else(|| {
            HumidifierError::InvalidResponse(format!("Unknown screen brightness code {code}"))
        })
    }

    /// Target humidity threshold in percent
    pub async fn get_humidity_threshold(&self) -> Result<f64> {
        let reading = self.get_property(Property::HumidityThreshold).await?;
        self.numeric(Property::HumidityThreshold, &reading)
    }

    // ========== Writes ==========

    /// Power the appliance on or off
    ///
    /// Returns whether the appliance accepted the write. The refresh hint
    /// tells the transport to re-read power and mode shortly after.
    pub async fn set_power(&self, on: bool) -> Result<bool> {
        tracing::info!(on, "setPower");
        let config = CallConfig {
            refresh: vec!["power".to_string(), "mode".to_string()],
            refresh_delay: POWER_REFRESH_DELAY,
        };
        let reading = self
            .set_property(Property::Power, json!(on), Some(config))
            .await?;
        Ok(reading.is_ok())
    }

    /// Set the fan level directly with an appliance code
    ///
    /// This is a pure pass-through; quantizing a percentage belongs to
    /// [`set_rotation_speed`](Self::set_rotation_speed).
    pub async fn set_fan_level(&self, level: FanLevel) -> Result<()> {
        tracing::info!(code = level.code(), "setFanLevel");
        self.set_property(Property::FanLevel, json!(level.code()), None)
            .await?;
        Ok(())
    }

    /// Quantize a rotation-speed percentage and write the resulting fan level
    ///
    /// Values of exactly 0 or outside `[1, 100]` perform no write at all.
    pub async fn set_rotation_speed(&self, percent: f64) -> Result<()> {
        match convert::fan_level_for_percent(percent) {
            Some(level) => self.set_fan_level(level).await,
            None => {
                tracing::debug!(percent, "Rotation speed outside quantization range, ignoring");
                Ok(())
            }
        }
    }

    /// Set the screen brightness
    pub async fn set_screen_brightness(&self, brightness: ScreenBrightness) -> Result<()> {
        tracing::info!(code = brightness.code(), "setScreenBrightness");
        self.set_property(Property::ScreenBrightness, json!(brightness.code()), None)
            .await?;
        Ok(())
    }

    /// Set the target humidity threshold in percent
    pub async fn set_humidity_threshold(&self, percent: f64) -> Result<()> {
        tracing::info!(percent, "setHumidityThreshold");
        self.set_property(Property::HumidityThreshold, json!(percent), None)
            .await?;
        Ok(())
    }

    // ========== Batch ==========

    /// Read every polled property in one round trip
    ///
    /// The result mirrors [`BATCH_PROPERTIES`] positionally: same length,
    /// same order, no filtering, whether or not individual items carry a
    /// rejection code.
    pub async fn batch_get(&self) -> Result<Vec<PropertyReading>> {
        let device = self.session.ensure().await?;
        let params = BATCH_PROPERTIES
            .iter()
            .map(|property| {
                let address = property.address();
                PropertyParam {
                    did: device.device_id.clone(),
                    siid: address.siid,
                    piid: address.piid,
                    value: None,
                }
            })
            .collect();

        self.session
            .transport()
            .call(MiotMethod::GetProperties, params, None)
            .await
    }

    /// Read every polled property and fold the result into a named snapshot
    pub async fn poll_snapshot(&self) -> Result<StateSnapshot> {
        let readings = self.batch_get().await?;
        StateSnapshot::from_readings(&readings)
    }
}
