use std::sync::Arc;
use std::time::Duration;

use hier_core::{CancellationToken, Cancelled};
use parking_lot::{Condvar, Mutex};

use crate::hierarchy::SingleClassHierarchy;
use crate::pipeline::{BuildError, BuildStats, HierarchyBuilder, UnitProvider};

/// How often a caller blocked on someone else's build re-checks its own token.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Default)]
struct ServiceState {
    cached: Option<Cached>,
    building: bool,
    builds_started: u64,
}

#[derive(Debug)]
struct Cached {
    modification_count: u64,
    hierarchy: Arc<SingleClassHierarchy>,
    stats: BuildStats,
}

/// Hands out the hierarchy for a provider's current state.
///
/// Builds are single-flight: while one caller builds, others block until it
/// finishes and then share its result. A hierarchy is reused until the
/// provider's modification count changes.
pub struct HierarchyService<P> {
    provider: P,
    builder: HierarchyBuilder,
    state: Mutex<ServiceState>,
    finished: Condvar,
}

impl<P: UnitProvider> HierarchyService<P> {
    pub fn new(provider: P, builder: HierarchyBuilder) -> Self {
        Self {
            provider,
            builder,
            state: Mutex::new(ServiceState::default()),
            finished: Condvar::new(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The cached hierarchy, if it is still current.
    pub fn current(&self) -> Option<Arc<SingleClassHierarchy>> {
        let count = self.provider.modification_count();
        let state = self.state.lock();
        state
            .cached
            .as_ref()
            .filter(|cached| cached.modification_count == count)
            .map(|cached| cached.hierarchy.clone())
    }

    /// Stats of the build that produced the cached hierarchy.
    pub fn last_stats(&self) -> Option<BuildStats> {
        self.state.lock().cached.as_ref().map(|cached| cached.stats.clone())
    }

    /// Number of builds started so far, including cancelled ones.
    pub fn builds_started(&self) -> u64 {
        self.state.lock().builds_started
    }

    /// Drop the cached hierarchy so the next call rebuilds.
    pub fn invalidate(&self) {
        self.state.lock().cached = None;
    }

    /// The hierarchy for the provider's current state, building it if needed.
    ///
    /// If another caller's in-flight build is cancelled, a waiter whose own
    /// token is still live starts a fresh build.
    pub fn hierarchy(
        &self,
        token: &CancellationToken,
    ) -> Result<Arc<SingleClassHierarchy>, BuildError> {
        let mut state = self.state.lock();
        let count = loop {
            let count = self.provider.modification_count();
            if let Some(cached) = &state.cached {
                if cached.modification_count == count {
                    return Ok(cached.hierarchy.clone());
                }
            }
            if token.is_cancelled() {
                return Err(Cancelled.into());
            }
            if !state.building {
                break count;
            }
            self.finished.wait_for(&mut state, WAIT_POLL_INTERVAL);
        };

        state.building = true;
        state.builds_started += 1;
        drop(state);

        let flight = InFlight { service: self };
        tracing::debug!(
            target = "hier.index",
            modification_count = count,
            "starting class hierarchy build"
        );
        let result = self.builder.build_with_stats(&self.provider, token);

        let outcome = match result {
            Ok((hierarchy, stats)) => {
                let hierarchy = Arc::new(hierarchy);
                self.state.lock().cached = Some(Cached {
                    modification_count: count,
                    hierarchy: hierarchy.clone(),
                    stats,
                });
                Ok(hierarchy)
            }
            Err(err) => {
                tracing::debug!(target = "hier.index", error = %err, "class hierarchy build stopped");
                Err(err)
            }
        };
        drop(flight);
        outcome
    }
}

/// Clears the in-flight flag and wakes waiters, also when the build panics.
struct InFlight<'a, P> {
    service: &'a HierarchyService<P>,
}

impl<P> Drop for InFlight<'_, P> {
    fn drop(&mut self) {
        self.service.state.lock().building = false;
        self.service.finished.notify_all();
    }
}
