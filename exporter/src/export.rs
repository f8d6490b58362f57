//! Downstream export of watched events.
//!
//! The default consumer: drains the watcher's output channel and writes one
//! structured line per event to the log. Richer sinks can replace this loop
//! by draining the channel themselves.

use k8s_openapi::api::core::v1::Event;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Flattened view of a cluster event, serialized as one JSON line.
#[derive(Debug, Serialize)]
struct ExportRecord<'a> {
    namespace: Option<&'a str>,
    name: Option<&'a str>,
    #[serde(rename = "type")]
    type_: Option<&'a str>,
    reason: Option<&'a str>,
    object_kind: Option<&'a str>,
    object_name: Option<&'a str>,
    message: Option<&'a str>,
    count: Option<i32>,
    first_seen: Option<String>,
    last_seen: Option<String>,
}

impl<'a> ExportRecord<'a> {
    fn from_event(event: &'a Event) -> Self {
        Self {
            namespace: event.metadata.namespace.as_deref(),
            name: event.metadata.name.as_deref(),
            type_: event.type_.as_deref(),
            reason: event.reason.as_deref(),
            object_kind: event.involved_object.kind.as_deref(),
            object_name: event.involved_object.name.as_deref(),
            message: event.message.as_deref(),
            count: event.count,
            first_seen: event.first_timestamp.as_ref().map(|t| t.0.to_rfc3339()),
            last_seen: event.last_timestamp.as_ref().map(|t| t.0.to_rfc3339()),
        }
    }
}

/// Drains the output channel until the watcher stops and the channel closes.
pub async fn run(mut events: mpsc::Receiver<Event>) {
    while let Some(event) = events.recv().await {
        export(&event);
    }

    debug!("event channel closed, export loop ending");
}

fn export(event: &Event) {
    match serde_json::to_string(&ExportRecord::from_event(event)) {
        Ok(line) => info!("{}", line),
        Err(err) => warn!("failed to serialize event: {}", err),
    }
}
