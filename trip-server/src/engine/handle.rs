//! Process-wide routing engine handle.
//!
//! Building the engine's network is expensive, so it happens once, lazily,
//! on the first request that needs it. Concurrent first requests wait on the
//! same initialisation. A failed initialisation is remembered for reporting
//! but retried by the next request rather than cached forever.

use std::future::Future;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use super::error::EngineError;

/// Lifecycle of the shared engine.
#[derive(Debug)]
pub enum EngineState<E> {
    Uninitialized,
    Initializing,
    Ready(Arc<E>),
    Failed(String),
}

impl<E> Clone for EngineState<E> {
    fn clone(&self) -> Self {
        match self {
            EngineState::Uninitialized => EngineState::Uninitialized,
            EngineState::Initializing => EngineState::Initializing,
            EngineState::Ready(engine) => EngineState::Ready(Arc::clone(engine)),
            EngineState::Failed(msg) => EngineState::Failed(msg.clone()),
        }
    }
}

impl<E> EngineState<E> {
    pub fn label(&self) -> &'static str {
        match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Initializing => "initializing",
            EngineState::Ready(_) => "ready",
            EngineState::Failed(_) => "failed",
        }
    }
}

fn lock<E>(state: &Mutex<EngineState<E>>) -> std::sync::MutexGuard<'_, EngineState<E>> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Puts an abandoned initialisation back to `Uninitialized`.
struct InitGuard<'a, E> {
    state: &'a Mutex<EngineState<E>>,
    finished: bool,
}

impl<E> Drop for InitGuard<'_, E> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut state = lock(self.state);
        if matches!(*state, EngineState::Initializing) {
            warn!("routing engine initialisation abandoned");
            *state = EngineState::Uninitialized;
        }
    }
}

/// Shared, lazily initialised engine.
#[derive(Debug)]
pub struct EngineHandle<E> {
    state: Mutex<EngineState<E>>,
    init_lock: tokio::sync::Mutex<()>,
}

impl<E> Default for EngineHandle<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EngineHandle<E> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(EngineState::Uninitialized),
            init_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState<E> {
        self.lock_state().clone()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, EngineState<E>> {
        lock(&self.state)
    }

    fn set_state(&self, state: EngineState<E>) {
        *self.lock_state() = state;
    }

    fn ready_engine(&self) -> Option<Arc<E>> {
        match &*self.lock_state() {
            EngineState::Ready(engine) => Some(Arc::clone(engine)),
            _ => None,
        }
    }

    /// Return the engine, initialising it with `init` if needed.
    ///
    /// Only one initialisation runs at a time; callers that arrive while it
    /// is in progress wait and then share its result.
    pub async fn get_or_init<F, Fut>(&self, init: F) -> Result<Arc<E>, EngineError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<E, EngineError>>,
    {
        if let Some(engine) = self.ready_engine() {
            return Ok(engine);
        }

        let _guard = self.init_lock.lock().await;

        // Someone else may have finished while we waited
        if let Some(engine) = self.ready_engine() {
            return Ok(engine);
        }

        self.set_state(EngineState::Initializing);
        info!("initialising routing engine");

        // The caller may drop us mid-initialisation
        let mut init_guard = InitGuard {
            state: &self.state,
            finished: false,
        };
        let result = init().await;
        init_guard.finished = true;

        match result {
            Ok(engine) => {
                let engine = Arc::new(engine);
                self.set_state(EngineState::Ready(Arc::clone(&engine)));
                info!("routing engine ready");
                Ok(engine)
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "routing engine initialisation failed");
                self.set_state(EngineState::Failed(message.clone()));
                Err(match e {
                    EngineError::InitFailed(_) => e,
                    _ => EngineError::InitFailed(message),
                })
            }
        }
    }
}
