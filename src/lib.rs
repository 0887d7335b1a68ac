//! Rust library for bridging SmartMi Humidifier 2 appliances to
//! home-automation accessories
//!
//! The appliance exposes addressed `(siid, piid)` properties over the miIO
//! transport and has no push mechanism, so this library keeps an
//! externally-owned characteristic model synchronized by polling. It
//! provides:
//!
//! - Lazy, memoized session establishment (one handshake, shared by all
//!   concurrent operations)
//! - Semantic get/set operations for power, humidity, water level, fan
//!   level, screen brightness, temperature and the humidity threshold
//! - A single-round-trip batch poll folded into a named-field snapshot
//! - An owned, cancellable reconciliation loop that fans each snapshot out
//!   to the accessory's characteristic sinks
//! - Pure quantization rules between accessory percentages and appliance
//!   codes
//!
//! # Quick Start
//!
//! ```no_run
//! use smartmi_humidifier::{
//!     CharacteristicSink, HumidifierClient, MiotTransport, PollOptions, Poller,
//! };
//! use std::sync::Arc;
//!
//! # use smartmi_humidifier::{
//! #     CallConfig, DeviceInfo, HumidifierState, MiotMethod, PropertyParam, PropertyReading,
//! #     ScreenBrightness, TargetState,
//! # };
//! # struct UdpTransport;
//! # #[async_trait::async_trait]
//! # impl MiotTransport for UdpTransport {
//! #     async fn handshake(&self) -> smartmi_humidifier::Result<DeviceInfo> { unimplemented!() }
//! #     async fn call(
//! #         &self,
//! #         _method: MiotMethod,
//! #         _params: Vec<PropertyParam>,
//! #         _config: Option<CallConfig>,
//! #     ) -> smartmi_humidifier::Result<Vec<PropertyReading>> { unimplemented!() }
//! # }
//! # struct AccessorySink;
//! # impl CharacteristicSink for AccessorySink {
//! #     fn update_active(&self, _: bool) {}
//! #     fn update_current_state(&self, _: HumidifierState) {}
//! #     fn update_target_state(&self, _: TargetState) {}
//! #     fn update_current_humidity(&self, _: f64) {}
//! #     fn update_humidity_threshold(&self, _: f64) {}
//! #     fn update_water_level(&self, _: f64) {}
//! #     fn update_screen_brightness(&self, _: ScreenBrightness) {}
//! #     fn update_screen_on(&self, _: bool) {}
//! #     fn update_temperature(&self, _: f64) {}
//! # }
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Any miIO transport implementation works; the session is
//!     // established lazily on first use.
//!     let transport = Arc::new(UdpTransport /* address + token */);
//!     let client = Arc::new(HumidifierClient::new(transport));
//!
//!     // Direct, user-triggered operations.
//!     client.set_power(true).await?;
//!     let humidity = client.get_humidity().await?;
//!     println!("Humidity: {humidity}%");
//!
//!     // Background reconciliation into the accessory's characteristics.
//!     let sink = Arc::new(AccessorySink);
//!     let mut poller = Poller::start(client, sink, PollOptions::default());
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(30)).await;
//!     poller.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Transport**: boundary trait for the miIO protocol (framing,
//!   encryption and discovery live outside this crate)
//! - **Session**: lazy, memoized device handshake shared by every operation
//! - **Client**: semantic property operations and the batch poll
//! - **Poll**: the owned reconciliation loop pushing derived values into
//!   characteristic sinks
//! - **Convert**: pure quantization and derivation rules
//! - **Config**: the accessory's configuration surface

mod client;
mod config;
mod convert;
mod error;
mod poll;
mod properties;
mod session;
mod sink;
mod transport;
mod types;

// Public exports
pub use client::HumidifierClient;
pub use config::{HumidifierConfig, MANUFACTURER, MODEL};
pub use convert::{fan_level_for_percent, humidifier_state, power_active, water_percent, WATER_LEVEL_SCALE};
pub use error::{HumidifierError, Result};
pub use poll::{PollOptions, Poller, DEFAULT_POLL_INTERVAL};
pub use properties::{Property, PropertyAddress, BATCH_PROPERTIES};
pub use session::{DeviceHandle, DeviceSession};
pub use sink::CharacteristicSink;
pub use transport::{
    CallConfig, DeviceInfo, MiotMethod, MiotTransport, PropertyParam, PropertyReading,
};
pub use types::{
    FanLevel, HumidifierState, ScreenBrightness, StateSnapshot, TargetState,
};
