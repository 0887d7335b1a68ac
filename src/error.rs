use thiserror::Error;

/// Result type for humidifier operations
pub type Result<T> = std::result::Result<T, HumidifierError>;

/// Errors that can occur when interacting with the humidifier
#[derive(Error, Debug)]
pub enum HumidifierError {
    /// Transport-level call failure (appliance unreachable, timeout, framing)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Session handshake was rejected or never completed
    #[error("Handshake failed: {0}")]
    Handshake(String),

    /// The appliance answered the round trip but rejected the operation
    #[error("Device rejected property {siid}/{piid} with code {code}")]
    DeviceRejected {
        /// Service index of the rejected property
        siid: u32,
        /// Property index of the rejected property
        piid: u32,
        /// Non-zero appliance status code
        code: i32,
    },

    /// Response did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
