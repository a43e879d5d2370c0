//! Error taxonomy for the simulation core
//!
//! Nothing here crosses the tick boundary: callers inside `tick()` log and
//! carry on. The only user-visible failure is the `RunFailed` transition.

use thiserror::Error;

/// Errors raised by pools, the obstacle catalog and subsystem wiring
#[derive(Debug, Error)]
pub enum SimError {
    /// No catalog entry carries the requested value
    #[error("no obstacle configuration for value {value}")]
    ConfigNotFound { value: u32 },

    /// A collaborator a subsystem needs was never wired; the subsystem stays inert
    #[error("{what} is unavailable")]
    ResourceUnavailable { what: &'static str },

    /// A collaborator is not placed yet; retry on the next tick
    #[error("{what} is not available yet")]
    TransientUnavailable { what: &'static str },

    /// A pooled instance was released while already free
    #[error("pool slot {slot} released twice")]
    DoubleRelease { slot: u32 },

    /// A handle that does not belong to this pool
    #[error("pool slot {slot} does not exist")]
    UnknownHandle { slot: u32 },

    /// Catalog values must be strictly ascending
    #[error("obstacle catalog is not strictly ascending at index {index}")]
    UnorderedCatalog { index: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
