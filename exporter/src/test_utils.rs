//! Test utilities for unit testing the watch-to-channel bridge.
//!
//! This module provides helpers for creating cluster event fixtures.

use k8s_openapi::api::core::v1::{Event, ObjectReference};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Helper to create a test cluster event about a pod
pub fn test_event(namespace: &str, name: &str, reason: &str) -> Event {
    Event {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        involved_object: ObjectReference {
            kind: Some("Pod".to_string()),
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        reason: Some(reason.to_string()),
        type_: Some("Normal".to_string()),
        ..Default::default()
    }
}

/// Helper to create a test cluster event with an occurrence count
pub fn test_event_with_count(namespace: &str, name: &str, reason: &str, count: i32) -> Event {
    Event {
        count: Some(count),
        ..test_event(namespace, name, reason)
    }
}
