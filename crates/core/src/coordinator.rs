//! Single-flight load coordination.
//!
//! A [`LoadCoordinator`] runs at most one load at a time and remembers the
//! outcome:
//!
//! ```text
//! idle ──start──▶ loading ──ok──▶ loaded
//!   ▲               │
//!   │               └──err──▶ failed ──start──▶ loading
//!   └──────── reset (from any state) ────────┘
//! ```
//!
//! Callers that arrive while a load is in flight share its handle; once
//! loaded, the stored value is returned until [`LoadCoordinator::reset`].
//! Every `start` and `reset` bumps a generation counter, and a completion is
//! only recorded if its generation is still current, so a load that finishes
//! after a reset cannot mark the coordinator as loaded.

use std::future::Future;
use std::sync::{Arc, Mutex};

use futures_util::future::{self, BoxFuture, FutureExt, Shared};
use serde::Serialize;

use crate::Error;
use crate::lock::mutex_lock;

const SOURCE: &str = "coordinator";

/// Shared handle to a load result. Every clone resolves to the same outcome.
pub type LoadHandle<T> = Shared<BoxFuture<'static, Result<T, Error>>>;

/// Callback invoked on every state transition.
pub type Subscriber = Arc<dyn Fn(&LoadState) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    Idle,
    Loading,
    Loaded,
    /// The last attempt failed; a new `start_loading` retries.
    Failed,
}

/// Snapshot of a coordinator's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadState {
    pub phase: LoadPhase,
    pub last_error: Option<Error>,
    pub generation: u64,
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }

    pub fn is_loaded(&self) -> bool {
        self.phase == LoadPhase::Loaded
    }
}

impl Default for LoadState {
    fn default() -> Self {
        Self { phase: LoadPhase::Idle, last_error: None, generation: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Inner<T> {
    state: LoadState,
    value: Option<T>,
    in_flight: Option<LoadHandle<T>>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

type Notification = (Vec<Subscriber>, LoadState);

impl<T> Inner<T> {
    fn notification(&self) -> Notification {
        let subscribers = self.subscribers.iter().map(|(_, s)| Arc::clone(s)).collect();
        (subscribers, self.state.clone())
    }
}

fn notify((subscribers, state): Notification) {
    for subscriber in subscribers {
        subscriber(&state);
    }
}

/// Coordinates loads of a single value of type `T`.
///
/// Cloning yields another handle to the same coordinator.
pub struct LoadCoordinator<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for LoadCoordinator<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T: Clone + Send + Sync + 'static> Default for LoadCoordinator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> LoadCoordinator<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: LoadState::default(),
                value: None,
                in_flight: None,
                subscribers: Vec::new(),
                next_subscription: 0,
            })),
        }
    }

    /// Start a load, or join the one already running.
    ///
    /// - idle / failed: `load_fn` is invoked once and its future becomes the
    ///   in-flight handle.
    /// - loading: the in-flight handle is returned; `load_fn` is not invoked.
    /// - loaded: the stored value is returned; `load_fn` is not invoked.
    ///
    /// When called inside a tokio runtime the load is spawned, so it runs to
    /// completion even if every returned handle is dropped.
    pub fn start_loading<F, Fut>(&self, load_fn: F) -> LoadHandle<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
    {
        let (handle, notification) = {
            let mut inner = mutex_lock(&self.inner, SOURCE, "start_loading");
            match inner.state.phase {
                LoadPhase::Loaded => {
                    if let Some(value) = inner.value.clone() {
                        return future::ready(Ok(value)).boxed().shared();
                    }
                }
                LoadPhase::Loading => {
                    if let Some(handle) = inner.in_flight.clone() {
                        tracing::debug!(generation = inner.state.generation, "joining in-flight load");
                        return handle;
                    }
                }
                LoadPhase::Idle | LoadPhase::Failed => {}
            }

            inner.state.generation += 1;
            inner.state.phase = LoadPhase::Loading;
            let generation = inner.state.generation;

            let coordinator = self.clone();
            let handle = async move {
                let result = load_fn().await;
                coordinator.complete(generation, &result);
                result
            }
            .boxed()
            .shared();

            inner.in_flight = Some(handle.clone());
            (handle, inner.notification())
        };

        // Subscribers must see `Loading` before the spawned load can complete.
        notify(notification);

        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(handle.clone());
        }
        handle
    }

    fn complete(&self, generation: u64, result: &Result<T, Error>) {
        let notification = {
            let mut inner = mutex_lock(&self.inner, SOURCE, "complete");
            if inner.state.generation != generation {
                tracing::debug!(
                    generation,
                    current = inner.state.generation,
                    "ignoring completion of a superseded load"
                );
                return;
            }

            inner.in_flight = None;
            match result {
                Ok(value) => {
                    inner.state.phase = LoadPhase::Loaded;
                    inner.state.last_error = None;
                    inner.value = Some(value.clone());
                }
                Err(err) => {
                    tracing::warn!(generation, error = %err, "load failed");
                    inner.state.phase = LoadPhase::Failed;
                    inner.state.last_error = Some(err.clone());
                    inner.value = None;
                }
            }
            inner.notification()
        };

        notify(notification);
    }

    /// Return to idle, forgetting any loaded value or error.
    ///
    /// A load still in flight keeps running and its callers still receive its
    /// result, but it no longer affects this coordinator's state.
    pub fn reset(&self) {
        let notification = {
            let mut inner = mutex_lock(&self.inner, SOURCE, "reset");
            inner.state.generation += 1;
            inner.state.phase = LoadPhase::Idle;
            inner.state.last_error = None;
            inner.value = None;
            inner.in_flight = None;
            inner.notification()
        };

        notify(notification);
    }

    /// Register a callback for every subsequent transition.
    ///
    /// Callbacks run synchronously, in registration order, outside the
    /// coordinator's lock.
    pub fn subscribe<F>(&self, subscriber: F) -> SubscriptionId
    where
        F: Fn(&LoadState) + Send + Sync + 'static,
    {
        let mut inner = mutex_lock(&self.inner, SOURCE, "subscribe");
        let id = SubscriptionId(inner.next_subscription);
        inner.next_subscription += 1;
        inner.subscribers.push((id, Arc::new(subscriber)));
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = mutex_lock(&self.inner, SOURCE, "unsubscribe");
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(sid, _)| *sid != id);
        inner.subscribers.len() != before
    }

    pub fn state(&self) -> LoadState {
        mutex_lock(&self.inner, SOURCE, "state").state.clone()
    }

    /// The loaded value, if the coordinator is in the loaded state.
    pub fn value(&self) -> Option<T> {
        mutex_lock(&self.inner, SOURCE, "value").value.clone()
    }
}
