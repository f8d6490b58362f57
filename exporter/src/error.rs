//! Exporter-specific error types.
//!
//! This module defines error types specific to the event exporter
//! that are not covered by upstream library errors.

use kube::Error as KubeError;
use thiserror::Error;

/// Errors that can occur in the event exporter.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// Cluster configuration could not be resolved
    #[error("Cluster configuration error: {0}")]
    Configuration(#[from] kube::config::InferConfigError),

    /// Kubernetes client error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
