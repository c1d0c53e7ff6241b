//! Coordinated refresh and shutdown
//!
//! A registry of pipeline participants that can reload configuration and
//! stop cleanly. Registration happens at participant construction time and
//! is idempotent; refresh and shutdown broadcasts iterate a point-in-time
//! copy of the registry so participants may register concurrently.

use super::error::Result;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// A participant that can reload its configuration
pub trait Refreshable: Send + Sync {
    /// Reload from the participant's original configuration source
    fn refresh(&self) -> Result<()>;

    /// Replace the configuration with the given values, bypassing the source
    fn refresh_with(&self, overrides: &HashMap<String, String>) -> Result<()>;
}

/// A participant that can stop after draining its in-flight work
pub trait Stoppable: Send + Sync {
    /// Signal the participant to stop accepting new work; returns
    /// immediately while draining continues in the background
    fn stop(&self);

    /// True only once all accepted work is delivered and resources closed
    fn is_stopped(&self) -> bool;

    /// Block until [`is_stopped`] would return true
    ///
    /// [`is_stopped`]: Stoppable::is_stopped
    fn await_stopped(&self);
}

static GLOBAL: Lazy<LifecycleCoordinator> = Lazy::new(LifecycleCoordinator::new);

/// Registry that broadcasts refresh and orchestrates ordered shutdown
///
/// Refresh across distinct participants is sequential, not atomic: a
/// concurrent reader may observe participants refreshed at different
/// instants. Shutdown stops every participant first, then waits without a
/// timeout for each to report drained.
#[derive(Default)]
pub struct LifecycleCoordinator {
    refreshables: Mutex<Vec<Arc<dyn Refreshable>>>,
    stoppables: Mutex<Vec<Arc<dyn Stoppable>>>,
}

impl LifecycleCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide coordinator, for embedders without a composition
    /// root to thread an explicit one through. Tests should construct their
    /// own instances instead.
    pub fn global() -> &'static LifecycleCoordinator {
        &GLOBAL
    }

    /// Register a refreshable participant; registering the same `Arc` twice
    /// has no additional effect
    pub fn register_refreshable(&self, participant: Arc<dyn Refreshable>) {
        let mut registry = self.refreshables.lock();
        if !registry.iter().any(|p| Arc::ptr_eq(p, &participant)) {
            registry.push(participant);
        }
    }

    /// Register a stoppable participant; registering the same `Arc` twice
    /// has no additional effect
    pub fn register_stoppable(&self, participant: Arc<dyn Stoppable>) {
        let mut registry = self.stoppables.lock();
        if !registry.iter().any(|p| Arc::ptr_eq(p, &participant)) {
            registry.push(participant);
        }
    }

    /// Remove every registration. Intended for test teardown; a live engine
    /// keeps running, it just stops receiving broadcasts.
    pub fn clear(&self) {
        self.refreshables.lock().clear();
        self.stoppables.lock().clear();
    }

    /// Ask every refreshable to reload from its original source.
    ///
    /// A participant that fails is reported to the diagnostic stream and the
    /// broadcast continues.
    pub fn refresh_all(&self) {
        for participant in self.refreshables_snapshot() {
            if let Err(e) = participant.refresh() {
                eprintln!("[LOGWEAVE ERROR] refresh failed: {}", e);
            }
        }
    }

    /// Ask every refreshable to apply the given values directly
    pub fn refresh_all_with(&self, overrides: &HashMap<String, String>) {
        for participant in self.refreshables_snapshot() {
            if let Err(e) = participant.refresh_with(overrides) {
                eprintln!("[LOGWEAVE ERROR] refresh with overrides failed: {}", e);
            }
        }
    }

    /// Stop every stoppable, then block until each reports drained.
    ///
    /// There is no timeout: delivering every accepted event outranks
    /// shutdown latency.
    pub fn shutdown_all(&self) {
        let participants = self.stoppables_snapshot();
        for participant in &participants {
            participant.stop();
        }
        for participant in &participants {
            participant.await_stopped();
        }
    }

    /// An RAII handle that runs [`shutdown_all`] when dropped, usable as a
    /// process-exit hook held by `main`
    ///
    /// [`shutdown_all`]: LifecycleCoordinator::shutdown_all
    #[must_use = "shutdown runs when the guard is dropped"]
    pub fn shutdown_guard(&self) -> ShutdownGuard<'_> {
        ShutdownGuard { coordinator: self }
    }

    fn refreshables_snapshot(&self) -> Vec<Arc<dyn Refreshable>> {
        self.refreshables.lock().clone()
    }

    fn stoppables_snapshot(&self) -> Vec<Arc<dyn Stoppable>> {
        self.stoppables.lock().clone()
    }
}

/// Runs an ordered shutdown of every registered stoppable on drop
pub struct ShutdownGuard<'a> {
    coordinator: &'a LifecycleCoordinator,
}

impl Drop for ShutdownGuard<'_> {
    fn drop(&mut self) {
        self.coordinator.shutdown_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    #[derive(Default)]
    struct Probe {
        refreshes: AtomicU64,
        override_refreshes: AtomicU64,
        stopped: AtomicBool,
    }

    impl Refreshable for Probe {
        fn refresh(&self) -> Result<()> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn refresh_with(&self, _overrides: &HashMap<String, String>) -> Result<()> {
            self.override_refreshes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl Stoppable for Probe {
        fn stop(&self) {
            self.stopped.store(true, Ordering::SeqCst);
        }

        fn is_stopped(&self) -> bool {
            self.stopped.load(Ordering::SeqCst)
        }

        fn await_stopped(&self) {
            assert!(self.is_stopped());
        }
    }

    #[test]
    fn test_registration_is_idempotent() {
        let coordinator = LifecycleCoordinator::new();
        let probe = Arc::new(Probe::default());

        coordinator.register_refreshable(probe.clone());
        coordinator.register_refreshable(probe.clone());
        coordinator.refresh_all();

        assert_eq!(probe.refreshes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_refresh_all_with_overrides() {
        let coordinator = LifecycleCoordinator::new();
        let probe = Arc::new(Probe::default());
        coordinator.register_refreshable(probe.clone());

        let overrides = HashMap::from([("pattern".to_string(), "{level}".to_string())]);
        coordinator.refresh_all_with(&overrides);

        assert_eq!(probe.override_refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(probe.refreshes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_shutdown_stops_all_before_waiting() {
        let coordinator = LifecycleCoordinator::new();
        let first = Arc::new(Probe::default());
        let second = Arc::new(Probe::default());
        coordinator.register_stoppable(first.clone());
        coordinator.register_stoppable(second.clone());

        coordinator.shutdown_all();

        assert!(first.is_stopped());
        assert!(second.is_stopped());
    }

    #[test]
    fn test_clear() {
        let coordinator = LifecycleCoordinator::new();
        let probe = Arc::new(Probe::default());
        coordinator.register_refreshable(probe.clone());
        coordinator.clear();
        coordinator.refresh_all();

        assert_eq!(probe.refreshes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_shutdown_guard_runs_on_drop() {
        let coordinator = LifecycleCoordinator::new();
        let probe = Arc::new(Probe::default());
        coordinator.register_stoppable(probe.clone());

        {
            let _guard = coordinator.shutdown_guard();
        }
        assert!(probe.is_stopped());
    }

    #[test]
    fn test_global_is_shared() {
        let a = LifecycleCoordinator::global();
        let b = LifecycleCoordinator::global();
        assert!(std::ptr::eq(a, b));
    }
}
