//! In-process event bus.
//!
//! Listeners subscribe to an event by its name. Immediate listeners run inline
//! while the event is being published; deferred listeners are spawned as
//! background tasks whose completion the publisher never waits for.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::errors::{AppError, AppResult};

/// Payload that can be published on the [`EventBus`].
pub trait Event: Clone + Send + Sync + 'static {
    /// Name listeners subscribe to (e.g. `created.user`)
    const NAME: &'static str;
}

/// How a listener is invoked relative to `publish`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerMode {
    /// Runs to completion before `publish` returns
    Immediate,
    /// Spawned as a background task
    Deferred,
}

type ImmediateFn<E> = Arc<dyn Fn(&E) + Send + Sync>;
type DeferredFn<E> = Arc<dyn Fn(E) -> BoxFuture<'static, AppResult<()>> + Send + Sync>;

enum Listener<E> {
    Immediate {
        name: &'static str,
        handler: ImmediateFn<E>,
    },
    Deferred {
        name: &'static str,
        handler: DeferredFn<E>,
    },
}

impl<E> Listener<E> {
    fn name(&self) -> &'static str {
        match self {
            Listener::Immediate { name, .. } | Listener::Deferred { name, .. } => *name,
        }
    }

    fn mode(&self) -> ListenerMode {
        match self {
            Listener::Immediate { .. } => ListenerMode::Immediate,
            Listener::Deferred { .. } => ListenerMode::Deferred,
        }
    }
}

impl<E> Clone for Listener<E> {
    fn clone(&self) -> Self {
        match self {
            Listener::Immediate { name, handler } => Listener::Immediate {
                name: *name,
                handler: Arc::clone(handler),
            },
            Listener::Deferred { name, handler } => Listener::Deferred {
                name: *name,
                handler: Arc::clone(handler),
            },
        }
    }
}

/// Listeners of one event name. `listeners` holds a `Vec<Listener<E>>`.
struct Slot {
    listeners: Box<dyn Any + Send + Sync>,
    count: usize,
}

/// Outcome of a single `publish` call
#[derive(Debug, Default)]
pub struct Dispatch {
    immediate: usize,
    deferred: Vec<JoinHandle<()>>,
}

impl Dispatch {
    /// Number of immediate listeners that already ran
    pub fn immediate_count(&self) -> usize {
        self.immediate
    }

    /// Number of background listeners spawned
    pub fn deferred_count(&self) -> usize {
        self.deferred.len()
    }

    /// True when nobody was listening
    pub fn is_empty(&self) -> bool {
        self.immediate == 0 && self.deferred.is_empty()
    }

    /// Wait for every deferred listener spawned by this dispatch.
    ///
    /// Listener errors are already logged by the task itself; only a
    /// panicked or aborted task is reported here.
    pub async fn join(self) -> AppResult<()> {
        for result in futures::future::join_all(self.deferred).await {
            result.map_err(|e| AppError::internal(format!("Deferred listener task failed: {}", e)))?;
        }
        Ok(())
    }
}

/// Publish/subscribe hub shared through an `Arc`.
#[derive(Default)]
pub struct EventBus {
    slots: RwLock<HashMap<&'static str, Slot>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slots = self.read();
        let mut map = f.debug_map();
        for (name, slot) in slots.iter() {
            map.entry(name, &slot.count);
        }
        map.finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener that runs inline during `publish`.
    pub fn on<E, F>(&self, listener: &'static str, handler: F) -> AppResult<()>
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.register(Listener::<E>::Immediate {
            name: listener,
            handler: Arc::new(handler),
        })
    }

    /// Register a listener that runs as a background task.
    pub fn on_async<E, F, Fut>(&self, listener: &'static str, handler: F) -> AppResult<()>
    where
        E: Event,
        F: Fn(E) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        let handler: DeferredFn<E> = Arc::new(move |event: E| handler(event).boxed());
        self.register(Listener::Deferred {
            name: listener,
            handler,
        })
    }

    /// Number of listeners subscribed to `event`
    pub fn listener_count(&self, event: &str) -> usize {
        self.read().get(event).map(|slot| slot.count).unwrap_or(0)
    }

    /// Publish an event to every listener subscribed to `E::NAME`.
    ///
    /// Immediate listeners have finished when this returns; deferred ones are
    /// only spawned. Nothing is invoked if the deferred listeners cannot be
    /// spawned (no tokio runtime).
    pub fn publish<E: Event>(&self, event: E) -> AppResult<Dispatch> {
        let listeners = self.snapshot::<E>()?;

        if listeners.is_empty() {
            tracing::debug!(event = E::NAME, "Event published with no listeners");
            return Ok(Dispatch::default());
        }

        let (immediate, deferred): (Vec<_>, Vec<_>) = listeners
            .into_iter()
            .partition(|listener| listener.mode() == ListenerMode::Immediate);

        let runtime = if deferred.is_empty() {
            None
        } else {
            let handle = Handle::try_current().map_err(|e| {
                AppError::event_bus(format!(
                    "cannot spawn deferred listeners for '{}': {}",
                    E::NAME,
                    e
                ))
            })?;
            Some(handle)
        };

        let mut dispatch = Dispatch::default();

        for listener in immediate {
            if let Listener::Immediate { name, handler } = listener {
                tracing::trace!(event = E::NAME, listener = name, "Running immediate listener");
                handler(&event);
                dispatch.immediate += 1;
            }
        }

        if let Some(runtime) = runtime {
            for listener in deferred {
                if let Listener::Deferred { name, handler } = listener {
                    let payload = event.clone();
                    let span = tracing::info_span!("listener", event = E::NAME, listener = name);
                    let task = runtime.spawn(
                        async move {
                            if let Err(e) = handler(payload).await {
                                tracing::error!(error = %e, "Deferred listener failed");
                            }
                        }
                        .instrument(span),
                    );
                    dispatch.deferred.push(task);
                }
            }
        }

        tracing::debug!(
            event = E::NAME,
            immediate = dispatch.immediate_count(),
            deferred = dispatch.deferred_count(),
            "Event published"
        );

        Ok(dispatch)
    }

    fn register<E: Event>(&self, listener: Listener<E>) -> AppResult<()> {
        let mut slots = self.write();
        let slot = slots.entry(E::NAME).or_insert_with(|| Slot {
            listeners: Box::new(Vec::<Listener<E>>::new()),
            count: 0,
        });

        let listeners = slot
            .listeners
            .downcast_mut::<Vec<Listener<E>>>()
            .ok_or_else(|| payload_mismatch(E::NAME))?;

        tracing::debug!(
            event = E::NAME,
            listener = listener.name(),
            mode = ?listener.mode(),
            "Listener registered"
        );

        listeners.push(listener);
        slot.count += 1;
        Ok(())
    }

    /// Clone the listener list so no lock is held while listeners run.
    fn snapshot<E: Event>(&self) -> AppResult<Vec<Listener<E>>> {
        let slots = self.read();
        match slots.get(E::NAME) {
            None => Ok(Vec::new()),
            Some(slot) => slot
                .listeners
                .downcast_ref::<Vec<Listener<E>>>()
                .cloned()
                .ok_or_else(|| payload_mismatch(E::NAME)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<&'static str, Slot>> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<&'static str, Slot>> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn payload_mismatch(event: &str) -> AppError {
    AppError::event_bus(format!(
        "event '{}' is already bound to a different payload type",
        event
    ))
}
