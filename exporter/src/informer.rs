//! Namespace-scoped event watch session.
//!
//! This module bridges the raw `kube_runtime::watcher` stream into
//! informer-style add/update/delete notifications. A local cache keyed by
//! object reference decides whether an observed object is new or a newer
//! version of one already seen, mirroring the list-then-watch behavior of a
//! shared informer. Reconnection and re-list on watch errors are handled by
//! the underlying watcher stream, not here.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use k8s_openapi::api::core::v1::Event;
use kube::Api;
use kube_runtime::reflector::ObjectRef;
use kube_runtime::{WatchStreamExt, watcher};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Notification sink invoked by the watch session for every observed change.
///
/// The session is the only caller. Callbacks run inline with stream
/// processing, so a slow implementation throttles the session itself.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Called when an object is observed for the first time.
    async fn on_add(&self, obj: Event);

    /// Called when a newer version of a known object is observed.
    /// `old` is the previously cached version.
    async fn on_update(&self, old: Event, new: Event);

    /// Called when a known object is removed from the cluster.
    async fn on_delete(&self, obj: Event);
}

/// Watch session over cluster events in one namespace.
///
/// Lists existing events once, then streams subsequent changes, invoking the
/// registered [`EventSink`] until the stop signal fires.
pub struct EventInformer<S> {
    api: Api<Event>,
    sink: S,
}

impl<S: EventSink> EventInformer<S> {
    /// Creates a watch session that delivers notifications to `sink`.
    pub fn new(api: Api<Event>, sink: S) -> Self {
        Self { api, sink }
    }

    /// Runs the list-then-watch loop until `stop` fires.
    ///
    /// Watch errors are transient: the stream re-lists and retries with
    /// backoff on its own, so errors are logged and the loop keeps going.
    pub async fn run(self, stop: oneshot::Receiver<()>) {
        let changes = watcher(self.api, watcher::Config::default())
            .default_backoff()
            .boxed();
        Self::process(self.sink, changes, stop).await;
    }

    pub(crate) async fn process<St>(sink: S, mut changes: St, mut stop: oneshot::Receiver<()>)
    where
        St: Stream<Item = Result<watcher::Event<Event>, watcher::Error>> + Unpin,
    {
        let mut cache: HashMap<ObjectRef<Event>, Event> = HashMap::new();
        let mut relisted: HashSet<ObjectRef<Event>> = HashSet::new();

        loop {
            tokio::select! {
                _ = &mut stop => {
                    debug!("watch session received stop signal");
                    break;
                }
                item = changes.next() => match item {
                    Some(Ok(change)) => {
                        Self::dispatch(&sink, change, &mut cache, &mut relisted).await;
                    }
                    Some(Err(err)) => warn!("event watch interrupted, retrying: {}", err),
                    None => {
                        warn!("event watch stream ended");
                        break;
                    }
                },
            }
        }
    }

    async fn dispatch(
        sink: &S,
        change: watcher::Event<Event>,
        cache: &mut HashMap<ObjectRef<Event>, Event>,
        relisted: &mut HashSet<ObjectRef<Event>>,
    ) {
        match change {
            watcher::Event::Init => relisted.clear(),
            watcher::Event::InitApply(obj) => {
                relisted.insert(ObjectRef::from_obj(&obj));
                Self::apply(sink, obj, cache).await;
            }
            watcher::Event::InitDone => {
                // Objects that disappeared while the watch was down are
                // absent from the re-list; retire them from the cache.
                let gone: Vec<ObjectRef<Event>> = cache
                    .keys()
                    .filter(|key| !relisted.contains(key))
                    .cloned()
                    .collect();
                for key in gone {
                    if let Some(obj) = cache.remove(&key) {
                        sink.on_delete(obj).await;
                    }
                }
                relisted.clear();
            }
            watcher::Event::Apply(obj) => Self::apply(sink, obj, cache).await,
            watcher::Event::Delete(obj) => {
                cache.remove(&ObjectRef::from_obj(&obj));
                sink.on_delete(obj).await;
            }
        }
    }

    /// First sight of an object reference is an add; a cached reference is
    /// an update carrying the previously observed version.
    async fn apply(sink: &S, obj: Event, cache: &mut HashMap<ObjectRef<Event>, Event>) {
        match cache.insert(ObjectRef::from_obj(&obj), obj.clone()) {
            Some(old) => sink.on_update(old, obj).await,
            None => sink.on_add(obj).await,
        }
    }
}
