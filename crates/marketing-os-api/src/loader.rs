//! Timer-backed stand-in for a remote call.
//!
//! `begin` flips the state to `Loading` synchronously and spawns a timer that
//! settles it after the configured delay. At most one load is in flight per
//! loader; `cancel` (and `Drop`) abort the timer and bump the generation so a
//! timer that still fires applies nothing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::ConsoleConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> LoadState<T> {
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Ready(_) | Self::Failed(_))
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready(_) => "ready",
            Self::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    #[error("a load is already pending")]
    AlreadyPending,
    #[error("simulated loads need a running tokio runtime")]
    NoRuntime,
}

pub struct SimulatedLoader<T> {
    delay: Duration,
    success_probability: f64,
    rng: StdRng,
    generation: Arc<AtomicU64>,
    state: Arc<watch::Sender<LoadState<T>>>,
    task: Option<JoinHandle<()>>,
}

impl<T> std::fmt::Debug for SimulatedLoader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedLoader")
            .field("delay", &self.delay)
            .field("success_probability", &self.success_probability)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .field("state", &self.state.borrow().label())
            .finish_non_exhaustive()
    }
}

impl<T> SimulatedLoader<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// `success_probability` is clamped to `[0, 1]`; `NaN` means always succeed.
    #[must_use]
    pub fn new(delay: Duration, success_probability: f64, seed: Option<u64>) -> Self {
        let success_probability =
            if success_probability.is_nan() { 1.0 } else { success_probability.clamp(0.0, 1.0) };
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let (state, _) = watch::channel(LoadState::Idle);
        Self {
            delay,
            success_probability,
            rng,
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
            task: None,
        }
    }

    #[must_use]
    pub fn from_config(config: &ConsoleConfig) -> Self {
        Self::new(config.load_delay(), config.success_probability, config.rng_seed)
    }

    /// A loader that never fails.
    #[must_use]
    pub fn reliable(delay: Duration) -> Self {
        Self::new(delay, 1.0, None)
    }

    /// Start a load that settles to `Ready(payload)` or `Failed(failure)`.
    ///
    /// Returns the generation of the new load.
    ///
    /// # Errors
    /// [`LoadError::AlreadyPending`] while a previous load is in flight, and
    /// [`LoadError::NoRuntime`] when called outside a tokio runtime.
    pub fn begin(&mut self, payload: T, failure: impl Into<String>) -> Result<u64, LoadError> {
        if self.is_pending() {
            return Err(LoadError::AlreadyPending);
        }
        let runtime = Handle::try_current().map_err(|_| LoadError::NoRuntime)?;

        let outcome = if self.rng.gen_bool(self.success_probability) {
            LoadState::Ready(payload)
        } else {
            LoadState::Failed(failure.into())
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(LoadState::Loading);
        debug!(generation, delay = ?self.delay, "simulated load started");

        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);
        let delay = self.delay;
        self.task = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let applied = state.send_if_modified(|slot| {
                if current.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *slot = outcome;
                true
            });
            if applied {
                debug!(generation, "simulated load settled");
            } else {
                debug!(generation, "stale simulated load ignored");
            }
        }));
        Ok(generation)
    }

    /// Abort the pending timer, if any, and return to `Idle`.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        let generation = &self.generation;
        let cancelled = self.state.send_if_modified(|slot| {
            generation.fetch_add(1, Ordering::SeqCst);
            if matches!(slot, LoadState::Loading) {
                *slot = LoadState::Idle;
                true
            } else {
                false
            }
        });
        if cancelled {
            debug!(generation = self.generation.load(Ordering::SeqCst), "simulated load cancelled");
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(*self.state.borrow(), LoadState::Loading)
    }

    #[must_use]
    pub fn state(&self) -> LoadState<T> {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LoadState<T>> {
        self.state.subscribe()
    }

    /// Wait until the current load leaves `Loading`.
    pub async fn settled(&self) -> LoadState<T> {
        let mut receiver = self.subscribe();
        if let Ok(state) = receiver.wait_for(|state| !matches!(state, LoadState::Loading)).await {
            return state.clone();
        }
        self.state()
    }
}

impl<T> Drop for SimulatedLoader<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
