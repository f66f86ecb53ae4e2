//! Error types
//!
//! Every fallible public operation returns one of these. None of them are
//! fatal: callers log and carry on with a degraded result.

use thiserror::Error;

use crate::entity::EntityId;

/// Errors from the object factory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FactoryError {
    /// No recipe registered under this name.
    #[error("unknown object type: {0}")]
    UnknownType(String),

    /// An object description could not be parsed.
    #[error("invalid object description: {0}")]
    InvalidDescription(String),
}

/// Errors from physics operations. All of them leave state untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhysicsError {
    /// The body already owns a rigid body.
    #[error("entity {0} already has a physics body")]
    AlreadyAttached(EntityId),

    /// A simulated body was requested but no physics world exists.
    #[error("no physics world available for entity {0}")]
    NoWorld(EntityId),

    /// The body has no rigid body (or its handle is stale).
    #[error("entity {0} has no live physics body")]
    NotAttached(EntityId),

    /// The world stepped since this body last pulled its state; pushing now
    /// would discard the simulation result.
    #[error("entity {0} must pull physics state before pushing")]
    PendingPull(EntityId),
}

/// Errors loading configuration or description files.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// File contents were not valid JSON for the expected shape.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Mode name not recognised.
    #[error("unknown game mode: {0}")]
    UnknownMode(String),
}

/// Result type for factory operations.
pub type FactoryResult<T> = Result<T, FactoryError>;

/// Result type for physics operations.
pub type PhysicsResult<T> = Result<T, PhysicsError>;
