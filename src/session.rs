use crate::error::Result;
use crate::transport::MiotTransport;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Resolved appliance identity, cached for the lifetime of the session
#[derive(Debug, Clone)]
pub struct DeviceHandle {
    /// Device id required on every addressed call
    pub device_id: String,
}

/// Lazily-established, memoized session with one appliance
///
/// The first caller performs the handshake; concurrent first-use callers all
/// await that single in-flight handshake instead of triggering their own. A
/// failed handshake caches nothing, so the next call retries from scratch.
/// There is no teardown; the session lives as long as its owner.
pub struct DeviceSession {
    transport: Arc<dyn MiotTransport>,
    handle: OnceCell<DeviceHandle>,
}

impl DeviceSession {
    /// Create a session that will connect on first use
    pub fn new(transport: Arc<dyn MiotTransport>) -> Self {
        Self {
            transport,
            handle: OnceCell::new(),
        }
    }

    /// Get the device handle, performing the handshake if necessary
    pub async fn ensure(&self) -> Result<&DeviceHandle> {
        self.handle
            .get_or_try_init(|| async {
                tracing::info!("Establishing device session");
                let info = self.transport.handshake().await?;
                tracing::info!(device_id = %info.device_id, "Device session established");
                Ok(DeviceHandle {
                    device_id: info.device_id,
                })
            })
            .await
    }

    /// The shared transport this session runs over
    pub fn transport(&self) -> &Arc<dyn MiotTransport> {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HumidifierError;
    use crate::transport::{DeviceInfo, MockMiotTransport};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn transport_with_handshakes(times: usize) -> MockMiotTransport {
        let mut transport = MockMiotTransport::new();
        transport
            .expect_handshake()
            .times(times)
            .returning(|| Ok(DeviceInfo { device_id: "267090".to_string() }));
        transport
    }

    #[tokio::test]
    async fn test_session_is_memoized() {
        let session = DeviceSession::new(Arc::new(transport_with_handshakes(1)));

        let first = session.ensure().await.unwrap().device_id.clone();
        let second = session.ensure().await.unwrap().device_id.clone();
        assert_eq!(first, "267090");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_concurrent_first_use_handshakes_once() {
        let session = Arc::new(DeviceSession::new(Arc::new(transport_with_handshakes(1))));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let session = session.clone();
            tasks.push(tokio::spawn(async move {
                session.ensure().await.unwrap().device_id.clone()
            }));
        }
        for task in tasks {
            assert_eq!(task.await.unwrap(), "267090");
        }
    }

    #[tokio::test]
    async fn test_failed_handshake_is_not_cached() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let mut transport = MockMiotTransport::new();
        let counter = attempts.clone();
        transport.expect_handshake().times(2).returning(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(HumidifierError::Handshake("device unreachable".to_string()))
            } else {
                Ok(DeviceInfo { device_id: "267090".to_string() })
            }
        });

        let session = DeviceSession::new(Arc::new(transport));
        assert!(session.ensure().await.is_err());

        // Second attempt starts the handshake over instead of reusing failure.
        let handle = session.ensure().await.unwrap();
        assert_eq!(handle.device_id, "267090");
    }
}
