// Copyright © 2025 Stephan Kunz
//! Errors raised while constructing or instantiating a model tree.

use thiserror::Error;

use crate::status::Status;

/// Fatal, programmer-facing errors from the model layer.
///
/// Every variant here corresponds to a construction-time contract violation: the engine
/// does not attempt to recover, it surfaces the error to the embedder.
#[derive(Error, Debug)]
pub enum Error {
    /// A composite was constructed with zero children.
    #[error("{kind} requires at least one child, got none")]
    NoChildren {
        /// The node kind that was misconstructed.
        kind: &'static str,
    },
    /// A `PerformInterruption` leaf was built with a substitute status other than
    /// Success or Failure.
    #[error("interrupt substitute status must be Success or Failure, got {status:?}")]
    InvalidInterruptStatus {
        /// The offending status.
        status: Status,
    },
}
