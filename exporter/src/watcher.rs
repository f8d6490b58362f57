//! Cluster event watcher.
//!
//! Bridges the push-based watch session into a pull-based channel the caller
//! drains, and owns the start/stop lifecycle of that bridge. Forwarding runs
//! inline on the session task and awaits channel capacity, so consumer speed
//! throttles the session instead of growing a queue.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Event;
use kube::{Api, Client, Config};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::ExporterError;
use crate::informer::{EventInformer, EventSink};

/// Default capacity of the output channel.
///
/// A single slot keeps the watch session coupled to consumer speed: the next
/// forward awaits a free slot until the consumer has received the previous
/// event.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1;

/// Forwards watch notifications onto the output channel.
///
/// Only the newest version of an object is forwarded; deletions are not
/// surfaced to the output stream.
struct EventForwarder {
    events: mpsc::Sender<Event>,
}

impl EventForwarder {
    async fn forward(&self, obj: Event) {
        if self.events.send(obj).await.is_err() {
            // Out of contract: the consumer dropped the receiver while the
            // watcher was still started.
            warn!("event channel closed, discarding event");
        }
    }
}

#[async_trait]
impl EventSink for EventForwarder {
    async fn on_add(&self, obj: Event) {
        self.forward(obj).await;
    }

    async fn on_update(&self, _old: Event, new: Event) {
        self.forward(new).await;
    }

    async fn on_delete(&self, _obj: Event) {}
}

/// Watches cluster events in one namespace and republishes them on a channel.
///
/// Lifecycle is linear: [`EventWatcher::new`] → [`EventWatcher::start`] →
/// [`EventWatcherHandle::stop`]. Stopping is only reachable through the
/// handle returned by `start`, and both `start` and `stop` consume their
/// receiver, so stopping before starting, starting twice, or stopping twice
/// does not compile.
pub struct EventWatcher {
    informer: EventInformer<EventForwarder>,
}

impl EventWatcher {
    /// Creates a watcher scoped to `namespace`, or to all namespaces when
    /// `None`.
    ///
    /// Returns the watcher together with the receiving end of its output
    /// channel. The channel is open immediately but carries nothing until
    /// [`EventWatcher::start`] is called. Fails if cluster configuration
    /// cannot be resolved or the client cannot be built from it.
    pub async fn new(
        namespace: Option<&str>,
    ) -> Result<(Self, mpsc::Receiver<Event>), ExporterError> {
        Self::with_channel_capacity(namespace, DEFAULT_CHANNEL_CAPACITY).await
    }

    /// Same as [`EventWatcher::new`] with an explicit output channel capacity.
    ///
    /// Capacities above one relax the consumer/session coupling by letting
    /// the session run ahead of the consumer by `capacity` events.
    pub async fn with_channel_capacity(
        namespace: Option<&str>,
        capacity: usize,
    ) -> Result<(Self, mpsc::Receiver<Event>), ExporterError> {
        let config = Config::infer().await?;
        let client = Client::try_from(config)?;
        Self::from_client(client, namespace, capacity)
    }

    fn from_client(
        client: Client,
        namespace: Option<&str>,
        capacity: usize,
    ) -> Result<(Self, mpsc::Receiver<Event>), ExporterError> {
        if capacity == 0 {
            return Err(ExporterError::InvalidConfig(
                "event channel capacity must be at least 1".to_string(),
            ));
        }

        let api: Api<Event> = match namespace {
            Some(ns) => Api::namespaced(client, ns),
            None => Api::all(client),
        };
        let (events_tx, events_rx) = mpsc::channel(capacity);
        let informer = EventInformer::new(api, EventForwarder { events: events_tx });

        Ok((Self { informer }, events_rx))
    }

    /// Starts the background list-then-watch loop.
    ///
    /// Returns immediately without waiting for the initial synchronization.
    /// Notifications begin flowing onto the output channel as the session
    /// observes them, possibly before the caller starts draining.
    pub fn start(self) -> EventWatcherHandle {
        debug!("starting event watcher");

        let (stop_tx, stop_rx) = oneshot::channel();
        let session = tokio::spawn(self.informer.run(stop_rx));

        EventWatcherHandle {
            stop: stop_tx,
            session,
        }
    }
}

/// Handle to a started [`EventWatcher`].
pub struct EventWatcherHandle {
    stop: oneshot::Sender<()>,
    session: JoinHandle<()>,
}

impl EventWatcherHandle {
    /// Signals the watch session to terminate and waits until it has.
    ///
    /// No notifications are forwarded after this returns, and the output
    /// channel closes. If the session is blocked forwarding an event, `stop`
    /// waits until the consumer drains it: keep draining the channel until
    /// `stop` completes.
    pub async fn stop(self) {
        debug!("stopping event watcher");

        let _ = self.stop.send(());
        if let Err(err) = self.session.await {
            warn!("event watcher session failed: {}", err);
        }
    }
}
