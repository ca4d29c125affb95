//! Single-threaded event-processing context.
//!
//! [`EventLoop`] runs every read handler on one dispatch task, so handlers for
//! different endpoints never run in parallel with each other. Each
//! registration gets a watcher task that waits for readiness, queues a
//! notification, and waits for the handler to finish before re-arming.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::error::{TransportError, TransportResult};
use super::stack::{EndpointId, PacketEndpoint};

/// Callback run on the dispatch task when an endpoint becomes readable.
pub type ReadHandler = Box<dyn FnMut() + Send>;

/// Readiness notification from a watcher to the dispatch task.
struct Ready {
    id: EndpointId,
    generation: u64,
    ack: oneshot::Sender<()>,
}

struct Slot {
    generation: u64,
    /// Taken out while the handler runs.
    handler: Option<ReadHandler>,
    watcher: CancellationToken,
}

struct Inner {
    slots: Mutex<HashMap<EndpointId, Slot>>,
    next_generation: AtomicU64,
    ready_tx: mpsc::UnboundedSender<Ready>,
    shutdown: CancellationToken,
    runtime: Handle,
}

impl Inner {
    fn slots(&self) -> MutexGuard<'_, HashMap<EndpointId, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run_handler(&self, id: EndpointId, generation: u64) {
        let handler = match self.slots().get_mut(&id) {
            Some(slot) if slot.generation == generation => slot.handler.take(),
            _ => None,
        };
        let Some(mut handler) = handler else {
            return;
        };

        handler();

        // The handler may have unregistered (or re-registered) its endpoint.
        if let Some(slot) = self.slots().get_mut(&id) {
            if slot.generation == generation {
                slot.handler = Some(handler);
            }
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Handle to a running event loop. Cheap to clone.
#[derive(Clone)]
pub struct EventLoop {
    inner: Arc<Inner>,
}

impl EventLoop {
    /// Start an event loop on the current tokio runtime.
    ///
    /// The returned task finishes after [`shutdown`](Self::shutdown) or once
    /// every handle has been dropped.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start() -> (Self, JoinHandle<()>) {
        let (ready_tx, ready_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let inner = Arc::new(Inner {
            slots: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(1),
            ready_tx,
            shutdown: shutdown.clone(),
            runtime: Handle::current(),
        });

        let task = tokio::spawn(dispatch(Arc::downgrade(&inner), ready_rx, shutdown));
        (Self { inner }, task)
    }

    /// Register `endpoint` for readability notifications.
    ///
    /// `handler` runs on the dispatch task each time the endpoint becomes
    /// readable, and is expected to drain one frame.
    pub fn register_read(
        &self,
        endpoint: Arc<dyn PacketEndpoint>,
        handler: ReadHandler,
    ) -> TransportResult<()> {
        if self.inner.shutdown.is_cancelled() {
            return Err(TransportError::EventLoopClosed);
        }

        let id = endpoint.id();
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let watcher = self.inner.shutdown.child_token();
        {
            let mut slots = self.inner.slots();
            if slots.contains_key(&id) {
                return Err(TransportError::AlreadyRegistered(id));
            }
            slots.insert(
                id,
                Slot {
                    generation,
                    handler: Some(handler),
                    watcher: watcher.clone(),
                },
            );
        }

        self.inner.runtime.spawn(watch_readable(
            endpoint,
            generation,
            self.inner.ready_tx.clone(),
            watcher,
        ));
        debug!(endpoint = %id, "registered for read events");
        Ok(())
    }

    /// Remove a registration. Returns `false` if `id` was not registered.
    pub fn unregister_read(&self, id: EndpointId) -> bool {
        let removed = self.inner.slots().remove(&id);
        match removed {
            Some(slot) => {
                slot.watcher.cancel();
                debug!(endpoint = %id, "unregistered from read events");
                true
            }
            None => false,
        }
    }

    /// Check whether `id` currently has a registered handler.
    pub fn is_registered(&self, id: EndpointId) -> bool {
        self.inner.slots().contains_key(&id)
    }

    /// Number of registered endpoints.
    pub fn registered_count(&self) -> usize {
        self.inner.slots().len()
    }

    /// Check whether the loop still accepts registrations.
    pub fn is_running(&self) -> bool {
        !self.inner.shutdown.is_cancelled()
    }

    /// Stop the loop and drop every registration.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
        self.inner.slots().clear();
    }
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoop")
            .field("registered", &self.registered_count())
            .field("running", &self.is_running())
            .finish()
    }
}

async fn dispatch(
    inner: Weak<Inner>,
    mut ready_rx: mpsc::UnboundedReceiver<Ready>,
    shutdown: CancellationToken,
) {
    loop {
        let ready = tokio::select! {
            _ = shutdown.cancelled() => break,
            ready = ready_rx.recv() => match ready {
                Some(ready) => ready,
                None => break,
            },
        };

        let Some(inner) = inner.upgrade() else {
            break;
        };
        inner.run_handler(ready.id, ready.generation);
        drop(inner);

        let _ = ready.ack.send(());
    }
    debug!("event loop stopped");
}

async fn watch_readable(
    endpoint: Arc<dyn PacketEndpoint>,
    generation: u64,
    ready_tx: mpsc::UnboundedSender<Ready>,
    cancel: CancellationToken,
) {
    let id = endpoint.id();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            readable = endpoint.readable() => {
                if let Err(e) = readable {
                    warn!(endpoint = %id, error = %e, "readiness wait failed, watcher stopping");
                    break;
                }
            }
        }

        let (ack, acked) = oneshot::channel();
        if ready_tx.send(Ready { id, generation, ack }).is_err() {
            break;
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = acked => {}
        }
    }
}
