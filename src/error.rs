use std::{error::Error as StdError, fmt};

use crate::{key::AssetType, utils::SharedString};

/// An error produced by a [`Loader`](crate::Loader) phase.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// An error returned by cache operations.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// The same key was requested under two different asset types.
    ///
    /// The conflicting entry (queued, in-flight or cached) is left untouched.
    TypeConflict {
        /// The key of the asset.
        key: SharedString,
        /// The type the key is already associated with.
        existing: AssetType,
        /// The type of the rejected request.
        requested: AssetType,
    },

    /// No registered loader matches the requested type and key suffix.
    NoLoaderFound {
        /// The key of the asset.
        key: SharedString,
        /// The requested asset type.
        typ: AssetType,
    },

    /// `unload`, a required `get` or `finish_loading_asset` named a key that
    /// is not cached.
    NotLoaded {
        /// The key of the asset.
        key: SharedString,
    },

    /// A loader declared a dependency on one of its in-flight ancestors.
    CycleDetected {
        /// The key closing the cycle.
        key: SharedString,
    },

    /// A loader phase failed.
    LoaderFailure {
        /// The key of the asset being loaded.
        key: SharedString,
        /// The error raised by the loader.
        source: BoxedError,
    },

    /// The worker pool was shut down while work remained.
    WorkerShutdown,
}

impl Error {
    /// The key of the asset the error relates to, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Error::TypeConflict { key, .. }
            | Error::NoLoaderFound { key, .. }
            | Error::NotLoaded { key }
            | Error::CycleDetected { key }
            | Error::LoaderFailure { key, .. } => Some(key),
            Error::WorkerShutdown => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TypeConflict {
                key,
                existing,
                requested,
            } => write!(
                f,
                "asset \"{key}\" already known with type {existing}, requested as {requested}"
            ),
            Error::NoLoaderFound { key, typ } => {
                write!(f, "no loader for type {typ} matches \"{key}\"")
            }
            Error::NotLoaded { key } => write!(f, "asset not loaded: \"{key}\""),
            Error::CycleDetected { key } => {
                write!(f, "dependency cycle detected through \"{key}\"")
            }
            Error::LoaderFailure { key, source } => {
                write!(f, "failed to load \"{key}\": {source}")
            }
            Error::WorkerShutdown => f.pad("the worker pool was shut down"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::LoaderFailure { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
