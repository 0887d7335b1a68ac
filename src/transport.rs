//! Boundary contract for the miIO device transport.
//!
//! The low-level protocol (UDP framing, token encryption, discovery) lives
//! outside this crate. The core only needs a handshake that resolves the
//! device id and a single addressed get/set call primitive.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Addressed call methods understood by the appliance
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MiotMethod {
    GetProperties,
    SetProperties,
}

impl MiotMethod {
    /// Wire name of the method
    pub fn as_str(self) -> &'static str {
        match self {
            MiotMethod::GetProperties => "get_properties",
            MiotMethod::SetProperties => "set_properties",
        }
    }
}

/// One addressed item in a get/set call
///
/// `value` is `None` for reads (serialized as JSON null) and `Some` for
/// writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyParam {
    pub did: String,
    pub siid: u32,
    pub piid: u32,
    pub value: Option<Value>,
}

/// One positional result of an addressed call
///
/// `code == 0` means the appliance accepted the operation; any other code is
/// an appliance-level rejection carried on an otherwise successful round
/// trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyReading {
    pub siid: u32,
    pub piid: u32,
    pub code: i32,
    #[serde(default)]
    pub value: Value,
}

impl PropertyReading {
    /// Check whether the appliance accepted this item
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }

    /// Interpret the value as a number
    ///
    /// Booleans are coerced (true → 1.0), matching how the appliance mixes
    /// boolean and numeric property encodings.
    pub fn as_f64(&self) -> Option<f64> {
        match &self.value {
            Value::Number(n) => n.as_f64(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Interpret the value as a boolean (any nonzero number is true)
    pub fn as_bool(&self) -> Option<bool> {
        match &self.value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_f64().map(|v| v != 0.0),
            _ => None,
        }
    }
}

/// Freshness hints attached to a write call
///
/// The transport may use these to refresh its own view of the named
/// properties after the write settles; the core does not depend on their
/// semantics beyond best-effort freshness.
#[derive(Debug, Clone)]
pub struct CallConfig {
    pub refresh: Vec<String>,
    pub refresh_delay: Duration,
}

/// Identity returned by the session handshake
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// The appliance's device id, required on every addressed call
    pub device_id: String,
}

/// Transport to one humidifier appliance
///
/// Implementations own the network resource and the token-based encryption.
/// `call` must return results in the same order as `params`, one per item,
/// with no filtering.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MiotTransport: Send + Sync {
    /// Perform the `miIO.info` handshake and resolve the device id
    async fn handshake(&self) -> Result<DeviceInfo>;

    /// Issue one addressed multi-item get or set
    async fn call(
        &self,
        method: MiotMethod,
        params: Vec<PropertyParam>,
        config: Option<CallConfig>,
    ) -> Result<Vec<PropertyReading>>;
}
