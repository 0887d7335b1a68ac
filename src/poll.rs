use crate::client::HumidifierClient;
use crate::convert::{self, WATER_LEVEL_SCALE};
use crate::error::Result;
use crate::sink::CharacteristicSink;
use crate::types::{StateSnapshot, TargetState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

/// Default polling period, matching the accessory's observed refresh rate
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Tuning knobs for the reconciliation loop
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Time between poll cycles
    pub interval: Duration,
    /// Water level calibration factor used on the read path
    pub water_level_scale: f64,
    /// Skip a tick while the previous one is still in flight instead of
    /// letting cycles overlap
    pub skip_overlapping: bool,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            water_level_scale: WATER_LEVEL_SCALE,
            skip_overlapping: false,
        }
    }
}

/// Owned handle to the background reconciliation loop
///
/// Each tick fetches one batch snapshot and fans the derived values into the
/// characteristic sink. A failed tick is logged and absorbed; the loop keeps
/// running and simply leaves the previously-reported values stale until the
/// next successful cycle.
///
/// The loop is bound to this handle: `stop` shuts it down gracefully and
/// dropping the handle aborts it. It never self-starts from a constructor.
pub struct Poller {
    stop_tx: Option<broadcast::Sender<()>>,
    task_handle: Option<tokio::task::JoinHandle<()>>,
}

impl Poller {
    /// Start polling the appliance on a fixed period
    pub fn start(
        client: Arc<HumidifierClient>,
        sink: Arc<dyn CharacteristicSink>,
        options: PollOptions,
    ) -> Self {
        let (stop_tx, mut stop_rx) = broadcast::channel(1);

        let task_handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(options.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let in_flight = Arc::new(AtomicBool::new(false));

            loop {
                tokio::select! {
                    _ = stop_rx.recv() => {
                        tracing::info!("Polling stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        if options.skip_overlapping && in_flight.swap(true, Ordering::SeqCst) {
                            tracing::debug!("Previous poll still in flight, skipping tick");
                            continue;
                        }

                        // Ticks are fire-and-forget: a slow transport never
                        // delays the timer, and overlapping cycles are
                        // allowed unless skip_overlapping is set.
                        let client = client.clone();
                        let sink = sink.clone();
                        let in_flight = in_flight.clone();
                        let scale = options.water_level_scale;
                        tokio::spawn(async move {
                            if let Err(e) = poll_once(&client, sink.as_ref(), scale).await {
                                tracing::warn!("Poll failed: {}", e);
                            }
                            in_flight.store(false, Ordering::SeqCst);
                        });
                    }
                }
            }
        });

        Self {
            stop_tx: Some(stop_tx),
            task_handle: Some(task_handle),
        }
    }

    /// Stop the polling loop
    ///
    /// In-flight ticks are not cancelled; they finish on their own.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.task_handle.take() {
            // Give it a moment to stop gracefully
            let _ = tokio::time::timeout(Duration::from_millis(500), handle).await;
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }
}

/// Run one poll cycle: fetch a snapshot and push it into the sink
async fn poll_once(
    client: &HumidifierClient,
    sink: &dyn CharacteristicSink,
    water_level_scale: f64,
) -> Result<()> {
    let snapshot = client.poll_snapshot().await?;
    apply_snapshot(&snapshot, sink, water_level_scale);
    Ok(())
}

/// Fan one snapshot out to the characteristic sink, applying the per-field
/// derivation rules
fn apply_snapshot(snapshot: &StateSnapshot, sink: &dyn CharacteristicSink, water_level_scale: f64) {
    sink.update_active(snapshot.power);
    sink.update_current_state(convert::humidifier_state(snapshot.power));
    sink.update_target_state(TargetState::Humidifier);
    sink.update_current_humidity(snapshot.humidity);
    sink.update_humidity_threshold(snapshot.humidity_threshold);
    sink.update_water_level(convert::water_percent(
        snapshot.water_level_raw,
        water_level_scale,
    ));
    sink.update_screen_brightness(snapshot.screen_brightness);
    sink.update_screen_on(snapshot.screen_brightness.is_on());
    sink.update_temperature(snapshot.temperature);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::{Property, BATCH_PROPERTIES};
    use crate::transport::{DeviceInfo, MockMiotTransport, PropertyReading};
    use crate::types::{FanLevel, HumidifierState, ScreenBrightness};
    use serde_json::{json, Value};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    #[derive(Default)]
    struct TestSink {
        active: Mutex<Vec<bool>>,
        states: Mutex<Vec<HumidifierState>>,
        target_states: Mutex<Vec<TargetState>>,
        humidity: Mutex<Vec<f64>>,
        thresholds: Mutex<Vec<f64>>,
        water: Mutex<Vec<f64>>,
        brightness: Mutex<Vec<ScreenBrightness>>,
        screen_on: Mutex<Vec<bool>>,
        temperature: Mutex<Vec<f64>>,
    }

    impl CharacteristicSink for TestSink {
        fn update_active(&self, active: bool) {
            self.active.lock().unwrap().push(active);
        }
        fn update_current_state(&self, state: HumidifierState) {
            self.states.lock().unwrap().push(state);
        }
        fn update_target_state(&self, state: TargetState) {
            self.target_states.lock().unwrap().push(state);
        }
        fn update_current_humidity(&self, percent: f64) {
            self.humidity.lock().unwrap().push(percent);
        }
        fn update_humidity_threshold(&self, percent: f64) {
            self.thresholds.lock().unwrap().push(percent);
        }
        fn update_water_level(&self, percent: f64) {
            self.water.lock().unwrap().push(percent);
        }
        fn update_screen_brightness(&self, brightness: ScreenBrightness) {
            self.brightness.lock().unwrap().push(brightness);
        }
        fn update_screen_on(&self, on: bool) {
            self.screen_on.lock().unwrap().push(on);
        }
        fn update_temperature(&self, celsius: f64) {
            self.temperature.lock().unwrap().push(celsius);
        }
    }

    fn snapshot() -> StateSnapshot {
        StateSnapshot {
            power: true,
            humidity: 45.0,
            status: 2.0,
            water_level_raw: 80.0,
            dry: false,
            screen_brightness: ScreenBrightness::Glimmer,
            fan_level: FanLevel::Auto,
            temperature: 22.0,
            humidity_threshold: 50.0,
        }
    }

    #[test]
    fn test_apply_snapshot_derives_every_characteristic() {
        let sink = TestSink::default();
        apply_snapshot(&snapshot(), &sink, WATER_LEVEL_SCALE);

        assert_eq!(*sink.active.lock().unwrap(), vec![true]);
        assert_eq!(*sink.states.lock().unwrap(), vec![HumidifierState::Humidifying]);
        assert_eq!(*sink.target_states.lock().unwrap(), vec![TargetState::Humidifier]);
        assert_eq!(*sink.humidity.lock().unwrap(), vec![45.0]);
        assert_eq!(*sink.thresholds.lock().unwrap(), vec![50.0]);
        assert_eq!(*sink.water.lock().unwrap(), vec![64.0]);
        assert_eq!(*sink.brightness.lock().unwrap(), vec![ScreenBrightness::Glimmer]);
        assert_eq!(*sink.screen_on.lock().unwrap(), vec![true]);
        assert_eq!(*sink.temperature.lock().unwrap(), vec![22.0]);
    }

    #[test]
    fn test_apply_snapshot_inactive_appliance() {
        let sink = TestSink::default();
        let mut inactive = snapshot();
        inactive.power = false;
        inactive.screen_brightness = ScreenBrightness::Dark;
        apply_snapshot(&inactive, &sink, WATER_LEVEL_SCALE);

        assert_eq!(*sink.active.lock().unwrap(), vec![false]);
        assert_eq!(*sink.states.lock().unwrap(), vec![HumidifierState::Inactive]);
        // Target mode is still asserted even while off.
        assert_eq!(*sink.target_states.lock().unwrap(), vec![TargetState::Humidifier]);
        assert_eq!(*sink.screen_on.lock().unwrap(), vec![false]);
    }

    fn batch_response(params: &[crate::transport::PropertyParam]) -> Vec<PropertyReading> {
        let values: Vec<Value> = vec![
            json!(true), // power
            json!(45),   // humidity
            json!(2),    // status
            json!(80),   // water level
            json!(false),
            json!(1), // screen brightness
            json!(0), // fan level
            json!(22),
            json!(50),
        ];
        params
            .iter()
            .zip(values)
            .map(|(p, value)| PropertyReading {
                siid: p.siid,
                piid: p.piid,
                code: 0,
                value,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_failed_ticks_are_absorbed() {
        let mut transport = MockMiotTransport::new();
        transport
            .expect_handshake()
            .times(1)
            .returning(|| Ok(DeviceInfo { device_id: "267090".to_string() }));

        // Reject the second batch; the loop must keep polling.
        let calls = Arc::new(AtomicUsize::new(0));
        let call_counter = calls.clone();
        transport.expect_call().returning(move |_, params, _| {
            let n = call_counter.fetch_add(1, Ordering::SeqCst);
            if n == 1 {
                Err(crate::error::HumidifierError::Transport("timeout".to_string()))
            } else {
                Ok(batch_response(&params))
            }
        });

        let client = Arc::new(HumidifierClient::new(Arc::new(transport)));
        let sink = Arc::new(TestSink::default());
        let mut poller = Poller::start(
            client,
            sink.clone(),
            PollOptions {
                interval: Duration::from_millis(20),
                ..PollOptions::default()
            },
        );

        // Wait for at least three ticks to have completed.
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while calls.load(Ordering::SeqCst) < 3 {
            assert!(tokio::time::Instant::now() < deadline, "poller stalled");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        poller.stop().await;

        let updates = sink.active.lock().unwrap().len();
        assert!(updates >= 2, "expected sink updates from successful ticks");
        // Tick 2 rejected: one fewer sink update than transport calls.
        assert_eq!(sink.active.lock().unwrap().iter().filter(|a| **a).count(), updates);
        assert!(calls.load(Ordering::SeqCst) > updates);
    }

    #[tokio::test]
    async fn test_stop_halts_the_loop() {
        let mut transport = MockMiotTransport::new();
        transport
            .expect_handshake()
            .returning(|| Ok(DeviceInfo { device_id: "267090".to_string() }));
        let calls = Arc::new(AtomicUsize::new(0));
        let call_counter = calls.clone();
        transport.expect_call().returning(move |_, params, _| {
            call_counter.fetch_add(1, Ordering::SeqCst);
            Ok(batch_response(&params))
        });

        let client = Arc::new(HumidifierClient::new(Arc::new(transport)));
        let sink = Arc::new(TestSink::default());
        let mut poller = Poller::start(
            client,
            sink,
            PollOptions {
                interval: Duration::from_millis(10),
                ..PollOptions::default()
            },
        );

        tokio::time::sleep(Duration::from_millis(35)).await;
        poller.stop().await;

        // Let any tick that was already in flight drain before sampling.
        tokio::time::sleep(Duration::from_millis(30)).await;
        let after_stop = calls.load(Ordering::SeqCst);
        assert!(after_stop >= 1);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), after_stop);
    }

    #[test]
    fn test_default_options() {
        let options = PollOptions::default();
        assert_eq!(options.interval, Duration::from_secs(3));
        assert_eq!(options.water_level_scale, 1.25);
        assert!(!options.skip_overlapping);
        // The batch list the loop depends on stays full-width.
        assert_eq!(BATCH_PROPERTIES.len(), 9);
        assert_eq!(BATCH_PROPERTIES[0], Property::Power);
    }
}
