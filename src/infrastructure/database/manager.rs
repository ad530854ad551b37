//! Supervised store handle with a background health loop.

use async_trait::async_trait;
use metrics::counter;
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::{Mutex, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_retry::Retry;
use tracing::{error, info, warn};

use super::backoff::reconnect_delays;
use super::{ConnectionError, Connector};

/// Lifecycle of the primary store connection.
///
/// ```text
/// Disconnected -> Connecting -> Connected -> (probe fails) -> Reconnecting
///                                   ^                             |
///                                   +---------- success ----------+
///                                                                 |
///                               Unavailable <--- attempts exhausted
/// ```
///
/// `Unavailable` is not terminal: the health loop keeps probing and retries
/// the reconnect on every failed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    Unavailable,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owns the primary store handle and keeps it alive.
///
/// Readers call [`ConnectionManager::handle`] and get a clone of the current
/// handle taken under a read lock. A reconnect replaces the handle under the
/// write lock, so a reader sees either the old or the new handle in full.
/// The health loop is the only writer in normal operation.
pub struct ConnectionManager<C: Connector> {
    connector: C,
    handle: RwLock<C::Handle>,
    state: watch::Sender<ConnectionState>,
    retry_attempts: usize,
    reconnect_lock: Mutex<()>,
}

impl<C: Connector> ConnectionManager<C> {
    /// Opens and verifies the initial handle.
    ///
    /// There is no request path without a store, so callers should treat a
    /// failure here as fatal.
    ///
    /// # Arguments
    ///
    /// - `retry_attempts` - total attempts per [`Self::reconnect`] round
    ///
    /// # Errors
    ///
    /// Returns the connect or probe error of the single attempt made.
    pub async fn connect(connector: C, retry_attempts: usize) -> Result<Arc<Self>, ConnectionError> {
        let (state, _) = watch::channel(ConnectionState::Connecting);

        let handle = open(&connector).await.inspect_err(|e| {
            error!(error = %e, "Initial store connection failed");
        })?;

        state.send_replace(ConnectionState::Connected);
        info!("Connected to the primary store");

        Ok(Arc::new(Self {
            connector,
            handle: RwLock::new(handle),
            state,
            retry_attempts,
            reconnect_lock: Mutex::new(()),
        }))
    }

    /// Returns the current handle, or fails fast when the store is unavailable.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Unavailable`] after a reconnect round has
    /// been exhausted and before the next successful one.
    pub fn handle(&self) -> Result<C::Handle, ConnectionError> {
        if self.state() == ConnectionState::Unavailable {
            return Err(ConnectionError::Unavailable {
                attempts: self.retry_attempts,
            });
        }
        Ok(self.current())
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Subscribes to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Runs one liveness check against the current handle.
    pub async fn probe(&self) -> Result<(), ConnectionError> {
        let handle = self.current();
        self.connector.ping(&handle).await
    }

    /// Replaces the handle with a freshly opened one.
    ///
    /// Tries up to `retry_attempts` times with jittered exponential backoff
    /// (see [`super::backoff`]). On exhaustion the state becomes
    /// [`ConnectionState::Unavailable`] and the old handle is kept for the
    /// next round.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Unavailable`] when every attempt failed.
    pub async fn reconnect(&self) -> Result<(), ConnectionError> {
        let _guard = self.reconnect_lock.lock().await;

        self.state.send_replace(ConnectionState::Reconnecting);
        warn!(max_attempts = self.retry_attempts, "Reconnecting to the primary store");

        let max_attempts = self.retry_attempts;
        let mut attempt = 0usize;
        let result = Retry::spawn(reconnect_delays(max_attempts), || {
            attempt += 1;
            let attempt = attempt;
            async move {
                counter!("store_reconnect_attempts_total").increment(1);
                open(&self.connector).await.inspect_err(|e| {
                    warn!(attempt, max_attempts, error = %e, "Reconnect attempt failed");
                })
            }
        })
        .await;

        match result {
            Ok(new_handle) => {
                let old_handle = {
                    let mut guard = self.handle.write().unwrap_or_else(|e| e.into_inner());
                    std::mem::replace(&mut *guard, new_handle)
                };
                self.state.send_replace(ConnectionState::Connected);
                info!("Reconnected to the primary store");

                self.connector.close(old_handle).await;
                Ok(())
            }
            Err(e) => {
                self.state.send_replace(ConnectionState::Unavailable);
                counter!("store_reconnect_exhausted_total").increment(1);
                error!(
                    attempts = max_attempts,
                    error = %e,
                    "Reconnect attempts exhausted, store marked unavailable"
                );
                Err(ConnectionError::Unavailable {
                    attempts: max_attempts,
                })
            }
        }
    }

    /// Spawns the background loop that probes the store every `interval`
    /// and reconnects when a probe fails.
    ///
    /// The loop runs until [`HealthLoop::stop`] is called or the returned
    /// [`HealthLoop`] is dropped.
    pub fn start_health_loop(self: &Arc<Self>, interval: Duration) -> HealthLoop {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let manager = Arc::clone(self);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately; the initial connect was just verified.
            ticker.tick().await;

            info!(interval_ms = interval.as_millis() as u64, "Store health loop started");

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => match manager.probe().await {
                        Ok(()) => manager.mark_recovered(),
                        Err(e) => {
                            warn!(state = %manager.state(), error = %e, "Store probe failed");
                            // Failure is already logged and reflected in the state.
                            let _ = manager.reconnect().await;
                        }
                    },
                }
            }

            info!("Store health loop stopped");
        });

        HealthLoop {
            stop_tx: Some(stop_tx),
            task,
        }
    }

    /// The kept handle answered a probe again after an exhausted round.
    fn mark_recovered(&self) {
        let recovered = self.state.send_if_modified(|state| {
            if *state == ConnectionState::Unavailable {
                *state = ConnectionState::Connected;
                true
            } else {
                false
            }
        });
        if recovered {
            info!("Primary store reachable again");
        }
    }

    fn current(&self) -> C::Handle {
        self.handle
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Opens a handle and verifies it with a probe.
async fn open<C: Connector>(connector: &C) -> Result<C::Handle, ConnectionError> {
    let handle = connector.connect().await?;
    if let Err(e) = connector.ping(&handle).await {
        connector.close(handle).await;
        return Err(e);
    }
    Ok(handle)
}

/// Handle to a running health loop.
pub struct HealthLoop {
    stop_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl HealthLoop {
    /// Signals the loop to stop and waits for it to finish.
    pub async fn stop(self) {
        let Self { stop_tx, task } = self;
        if let Some(tx) = stop_tx {
            let _ = tx.send(());
        }
        if let Err(e) = task.await {
            warn!(error = %e, "Store health loop ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Read-only view of store health, as consumed by the health endpoint.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    fn connection_state(&self) -> ConnectionState;

    async fn ping(&self) -> Result<(), ConnectionError>;
}

#[async_trait]
impl<C: Connector> StoreHealth for ConnectionManager<C> {
    fn connection_state(&self) -> ConnectionState {
        self.state()
    }

    async fn ping(&self) -> Result<(), ConnectionError> {
        self.probe().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    /// Fake store whose availability is toggled by the test.
    /// Handles are generation numbers so swaps are observable.
    #[derive(Clone)]
    struct FakeConnector {
        up: Arc<AtomicBool>,
        generation: Arc<AtomicU64>,
        closed: Arc<AtomicU64>,
    }

    impl FakeConnector {
        fn new(up: bool) -> Self {
            Self {
                up: Arc::new(AtomicBool::new(up)),
                generation: Arc::new(AtomicU64::new(0)),
                closed: Arc::new(AtomicU64::new(0)),
            }
        }

        fn set_up(&self, up: bool) {
            self.up.store(up, Ordering::SeqCst);
        }

        fn connects(&self) -> u64 {
            self.generation.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Connector for FakeConnector {
        type Handle = u64;

        async fn connect(&self) -> Result<u64, ConnectionError> {
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            if self.up.load(Ordering::SeqCst) {
                Ok(generation)
            } else {
                Err(ConnectionError::Connect(sqlx::Error::PoolTimedOut))
            }
        }

        async fn ping(&self, _handle: &u64) -> Result<(), ConnectionError> {
            if self.up.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(ConnectionError::Probe(sqlx::Error::PoolClosed))
            }
        }

        async fn close(&self, _handle: u64) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_connect_fails_fast_when_store_is_down() {
        let connector = FakeConnector::new(false);

        let result = ConnectionManager::connect(connector.clone(), 3).await;

        assert!(matches!(result, Err(ConnectionError::Connect(_))));
        assert_eq!(connector.connects(), 1);
    }

    #[tokio::test]
    async fn test_connect_reports_connected() {
        let manager = ConnectionManager::connect(FakeConnector::new(true), 3)
            .await
            .unwrap();

        assert_eq!(manager.state(), ConnectionState::Connected);
        assert_eq!(manager.handle().unwrap(), 1);
        assert!(manager.probe().await.is_ok());
    }

    #[tokio::test]
    async fn test_reconnect_swaps_handle_and_closes_old() {
        let connector = FakeConnector::new(true);
        let manager = ConnectionManager::connect(connector.clone(), 3)
            .await
            .unwrap();

        manager.reconnect().await.unwrap();

        assert_eq!(manager.handle().unwrap(), 2);
        assert_eq!(manager.state(), ConnectionState::Connected);
        assert_eq!(connector.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_exhaustion_marks_unavailable() {
        let connector = FakeConnector::new(true);
        let manager = ConnectionManager::connect(connector.clone(), 4)
            .await
            .unwrap();
        connector.set_up(false);

        let result = manager.reconnect().await;

        assert!(matches!(
            result,
            Err(ConnectionError::Unavailable { attempts: 4 })
        ));
        assert_eq!(manager.state(), ConnectionState::Unavailable);
        // One initial connect plus exactly four reconnect attempts.
        assert_eq!(connector.connects(), 5);
        assert!(matches!(
            manager.handle(),
            Err(ConnectionError::Unavailable { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_health_loop_recovers_after_outage() {
        let connector = FakeConnector::new(true);
        let manager = ConnectionManager::connect(connector.clone(), 2)
            .await
            .unwrap();
        let mut states = manager.subscribe();
        let health = manager.start_health_loop(Duration::from_secs(1));

        connector.set_up(false);
        tokio::time::timeout(
            Duration::from_secs(30),
            states.wait_for(|s| *s == ConnectionState::Unavailable),
        )
        .await
        .expect("store never marked unavailable")
        .unwrap();

        connector.set_up(true);
        tokio::time::timeout(
            Duration::from_secs(30),
            states.wait_for(|s| *s == ConnectionState::Connected),
        )
        .await
        .expect("store never recovered")
        .unwrap();

        assert!(manager.handle().is_ok());
        health.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_health_loop_leaves_healthy_store_alone() {
        let connector = FakeConnector::new(true);
        let manager = ConnectionManager::connect(connector.clone(), 3)
            .await
            .unwrap();
        let health = manager.start_health_loop(Duration::from_millis(500));

        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(connector.connects(), 1);
        assert_eq!(manager.state(), ConnectionState::Connected);
        health.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_terminates_loop() {
        let manager = ConnectionManager::connect(FakeConnector::new(true), 3)
            .await
            .unwrap();
        let health = manager.start_health_loop(Duration::from_secs(1));

        assert!(!health.is_finished());
        tokio::time::timeout(Duration::from_secs(5), health.stop())
            .await
            .expect("health loop did not stop");
    }
}
