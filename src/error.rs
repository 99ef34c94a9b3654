// Copyright © 2025 Stephan Kunz
//! The crate-level error, aggregating every fallible construction path.

use thiserror::Error;

/// The aggregate error type for embedders who would rather not match on a
/// module-specific error.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A model tree could not be constructed.
    #[error(transparent)]
    Model(#[from] crate::model::error::Error),
}

/// A `Result` defaulting its error to the crate-level [`Error`].
pub type EngineResult<T> = Result<T, Error>;
