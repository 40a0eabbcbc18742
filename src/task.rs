//! In-flight load tasks.

use std::{sync::Arc, time::Instant};

use crate::{
    error::{BoxedError, Error},
    executor::{AsyncExecutor, AsyncResult},
    key::Descriptor,
    loader::{IntermediateData, LoadOutput, Loader},
    utils::SharedString,
};

/// Where a task stands in its lifecycle.
pub(crate) enum Phase {
    /// Pushed on the stack, blocking phase not submitted yet.
    Unstarted,
    /// The blocking phase runs on a worker thread.
    AsyncRunning(AsyncResult<Result<LoadOutput, BoxedError>>),
    /// The blocking phase is done; waiting for dependencies to be cached.
    DependenciesPending(IntermediateData),
    /// Placeholder taken out while `finish` runs on the driving thread.
    /// Exists only inside that call: the task pops on success, and on
    /// failure the stack is cleared before the next update.
    Finalizing,
}

/// A load in progress.
///
/// Tasks live on a stack: the topmost one is the only task whose phase
/// advances, and dependencies it discovers are pushed above it.
pub(crate) struct LoadTask {
    pub desc: Descriptor,
    pub loader: Arc<dyn Loader>,
    pub phase: Phase,
    /// Keys injected for this task, in injection order.
    pub dependencies: Vec<SharedString>,
    /// Set when the asset was unloaded while loading; the task finishes its
    /// blocking phase and is then discarded without registering.
    pub cancel: bool,
    pub start: Instant,
}

impl LoadTask {
    pub fn new(desc: Descriptor, loader: Arc<dyn Loader>) -> Self {
        Self {
            desc,
            loader,
            phase: Phase::Unstarted,
            dependencies: Vec::new(),
            cancel: false,
            start: Instant::now(),
        }
    }

    #[inline]
    pub fn key(&self) -> &SharedString {
        &self.desc.key
    }

    /// Submits the blocking phase to the worker pool.
    pub fn submit(&mut self, executor: &AsyncExecutor) -> Result<(), Error> {
        debug_assert!(matches!(self.phase, Phase::Unstarted));

        let loader = self.loader.clone();
        let key = self.desc.key.clone();
        let params = self.desc.params.clone();
        let result = executor.submit(move || loader.load(&key, params.as_deref()))?;

        self.phase = Phase::AsyncRunning(result);
        Ok(())
    }

    /// Polls the blocking phase without blocking.
    ///
    /// Returns `Ok(Some(_))` once the worker delivered its output, `Ok(None)`
    /// while it is still running, and an error if the loader failed or its
    /// worker thread died.
    pub fn poll(&mut self) -> Result<Option<LoadOutput>, Error> {
        let Phase::AsyncRunning(result) = &self.phase else {
            return Ok(None);
        };

        match result.try_take() {
            Ok(None) => Ok(None),
            Ok(Some(Ok(output))) => Ok(Some(output)),
            Ok(Some(Err(source))) => Err(Error::LoaderFailure {
                key: self.desc.key.clone(),
                source,
            }),
            Err(_) => Err(Error::LoaderFailure {
                key: self.desc.key.clone(),
                source: "worker thread terminated".into(),
            }),
        }
    }
}
