//! Definition of the cache.

use std::{
    collections::VecDeque,
    fmt, mem,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use crate::{
    dependencies::DependencyTable,
    error::Error,
    executor::AsyncExecutor,
    key::{AssetType, Descriptor, LoadedCallback},
    loader::{Loader, LoaderRegistry},
    registry::Registry,
    task::{LoadTask, Phase},
    utils::{HashMap, HashSet, SharedString},
    Asset,
};

/// Called on the driving thread when a load fails after being queued.
///
/// Receives the key and type of the request that could not complete and the
/// error that sank it.
pub type ErrorListener = Box<dyn FnMut(&str, AssetType, &Error) + Send>;

/// Extra holders of a key whose load is still in flight.
///
/// Created when a second request for an in-flight key arrives; applied when
/// the single shared task registers its result.
#[derive(Default)]
struct PendingShare {
    bumps: usize,
    callbacks: Vec<LoadedCallback>,
}

/// An asynchronous, reference-counted cache of loaded assets.
///
/// Assets are requested with [`load`](AssetCache::load) and produced by the
/// [`Loader`]s registered for their type. Loading proceeds in small steps
/// driven by [`update`](AssetCache::update), so a frame loop can interleave
/// loading with its own work; [`finish_loading`](AssetCache::finish_loading)
/// blocks instead.
///
/// Each successful `load` of a key holds one reference on it, released with
/// [`unload`](AssetCache::unload). Dependencies declared by loaders are
/// counted the same way, so unloading an asset releases everything it pulled
/// in, and assets shared between parents stay cached until the last parent
/// lets go.
///
/// The cache is not [`Sync`]: one owner drives it, which is also what makes
/// references returned by [`get`](AssetCache::get) safe to hold between
/// updates.
pub struct AssetCache {
    registry: Registry,
    dependencies: DependencyTable,
    loaders: LoaderRegistry,
    queue: VecDeque<Descriptor>,
    tasks: Vec<LoadTask>,
    pending: HashMap<SharedString, PendingShare>,
    executor: AsyncExecutor,
    listener: Option<ErrorListener>,

    // progress accounting for the current batch
    loaded: usize,
    to_load: usize,
    peak_tasks: usize,
    progress_mark: f32,
}

impl AssetCache {
    /// Creates a cache driving its blocking loads on a single worker thread.
    pub fn new() -> Self {
        Self::with_workers(1)
    }

    /// Creates a cache with `workers` threads for blocking loads (at least
    /// one).
    pub fn with_workers(workers: usize) -> Self {
        Self {
            registry: Registry::new(),
            dependencies: DependencyTable::new(),
            loaders: LoaderRegistry::new(),
            queue: VecDeque::new(),
            tasks: Vec::new(),
            pending: HashMap::default(),
            executor: AsyncExecutor::new(workers),
            listener: None,
            loaded: 0,
            to_load: 0,
            peak_tasks: 0,
            progress_mark: 0.0,
        }
    }

    /// Registers the default loader for assets of type `A`.
    #[inline]
    pub fn set_loader<A: Asset>(&mut self, loader: impl Loader) {
        self.set_loader_for_suffix::<A>("", loader);
    }

    /// Registers a loader for assets of type `A` whose keys end with
    /// `suffix`.
    ///
    /// Resolution picks the longest matching suffix, so a suffix loader
    /// overrides the default one for the keys it matches. Registering the
    /// same `(type, suffix)` pair again replaces the previous loader.
    pub fn set_loader_for_suffix<A: Asset>(&mut self, suffix: &str, loader: impl Loader) {
        self.loaders.insert(AssetType::of::<A>(), suffix, Arc::new(loader));
    }

    /// Routes load failures to `listener` instead of returning them from
    /// [`update`](AssetCache::update).
    pub fn set_error_listener(
        &mut self,
        listener: impl FnMut(&str, AssetType, &Error) + Send + 'static,
    ) {
        self.listener = Some(Box::new(listener));
    }

    /// Removes the error listener, if any was set.
    pub fn remove_error_listener(&mut self) {
        self.listener = None;
    }

    /// Requests the asset of type `A` identified by `key`.
    ///
    /// The load is queued, not started: drive it with
    /// [`update`](AssetCache::update) or [`finish_loading`](AssetCache::finish_loading).
    /// Requesting an already cached key increments its reference count
    /// instead of loading it again.
    #[inline]
    pub fn load<A: Asset>(&mut self, key: impl Into<SharedString>) -> Result<(), Error> {
        self.load_descriptor(Descriptor::new::<A>(key))
    }

    /// Queues a load request built with [`Descriptor`].
    ///
    /// Fails with [`Error::NoLoaderFound`] if no registered loader matches
    /// the request, and with [`Error::TypeConflict`] if the key is already
    /// known under another type.
    pub fn load_descriptor(&mut self, desc: Descriptor) -> Result<(), Error> {
        if self.loaders.resolve(desc.typ, &desc.key).is_none() {
            return Err(Error::NoLoaderFound {
                key: desc.key.clone(),
                typ: desc.typ,
            });
        }

        // a request starting from idle begins a new progress batch
        if self.queue.is_empty() && self.tasks.is_empty() {
            self.loaded = 0;
            self.to_load = 0;
            self.peak_tasks = 0;
            self.progress_mark = 0.0;
        }

        self.check_type(&desc.key, desc.typ)?;
        self.to_load += 1;
        log::debug!("Queued: {}", desc.key);
        self.queue.push_back(desc);
        Ok(())
    }

    /// Returns the cached asset of type `A` for `key`.
    ///
    /// Fails with [`Error::NotLoaded`] if the key is not cached and with
    /// [`Error::TypeConflict`] if it is cached under another type.
    pub fn get<A: Asset>(&self, key: &str) -> Result<&A, Error> {
        match self.registry.get_typed::<A>(key) {
            Some(asset) => Ok(asset),
            None => match self.registry.type_of(key) {
                Some(existing) => Err(Error::TypeConflict {
                    key: key.into(),
                    existing,
                    requested: AssetType::of::<A>(),
                }),
                None => Err(Error::NotLoaded { key: key.into() }),
            },
        }
    }

    /// Returns the cached asset of type `A` for `key`, or `None` if it is
    /// not cached with that type.
    #[inline]
    pub fn try_get<A: Asset>(&self, key: &str) -> Option<&A> {
        self.registry.get_typed(key)
    }

    /// Advances loading by one small step.
    ///
    /// Returns `true` once neither queued requests nor in-flight tasks
    /// remain. Load failures are routed to the error listener if one is set,
    /// otherwise returned; either way the failed load and its ancestors are
    /// rolled back before this returns.
    pub fn update(&mut self) -> Result<bool, Error> {
        while self.tasks.is_empty() {
            match self.queue.pop_front() {
                Some(desc) => self.next_task(desc)?,
                None => return Ok(true),
            }
        }

        let result = self.update_task();
        // a late-injected dependency grows the stack again and shrinks the
        // fractional term; reported progress holds the batch high-water mark
        self.progress_mark = self.progress_mark.max(self.raw_progress());
        if let Err(error) = result {
            self.handle_task_error(error)?;
        }
        Ok(self.is_finished())
    }

    /// Calls [`update`](AssetCache::update) repeatedly for up to `budget`.
    ///
    /// Returns as soon as loading finishes or the budget runs out, whichever
    /// comes first.
    pub fn update_for(&mut self, budget: Duration) -> Result<bool, Error> {
        let deadline = Instant::now() + budget;
        loop {
            let done = self.update()?;
            if done || Instant::now() >= deadline {
                return Ok(done);
            }
            thread::yield_now();
        }
    }

    /// Blocks until every queued request has been processed.
    pub fn finish_loading(&mut self) -> Result<(), Error> {
        while !self.update()? {
            thread::yield_now();
        }
        Ok(())
    }

    /// Blocks until `key` is cached, then returns it.
    ///
    /// Fails with [`Error::NotLoaded`] if loading finishes without producing
    /// the key, which happens when it was never requested or its load was
    /// cancelled.
    pub fn finish_loading_asset<A: Asset>(&mut self, key: &str) -> Result<&A, Error> {
        loop {
            if self.registry.contains(key) || self.update()? {
                break;
            }
            thread::yield_now();
        }
        self.get(key)
    }

    /// Releases one reference on `key`.
    ///
    /// The last reference removes the asset from the cache and disposes it.
    /// Either way, every dependency recorded for the key loses the reference
    /// the key held on it.
    ///
    /// An in-flight key at the top of the task stack is cancelled instead: it
    /// finishes its blocking phase, then unwinds without registering and
    /// without invoking callbacks. A key still in the load queue is simply
    /// forgotten.
    pub fn unload(&mut self, key: &str) -> Result<(), Error> {
        if let Some(task) = self.tasks.last_mut() {
            if &**task.key() == key {
                task.cancel = true;
                log::debug!("Unload (in flight): {key}");
                return Ok(());
            }
        }

        if let Some(pos) = self.queue.iter().position(|desc| &*desc.key == key) {
            if let Some(desc) = self.queue.remove(pos) {
                self.to_load -= 1;
                log::debug!("Unload (queued): {key}");
                // a request for an already cached asset still reports
                // completion to its callback
                if self.registry.contains(key) {
                    if let Some(callback) = desc.callback {
                        callback(self, key);
                    }
                }
            }
            return Ok(());
        }

        if !self.registry.contains(key) {
            return Err(Error::NotLoaded { key: key.into() });
        }
        self.unload_cached(key);
        Ok(())
    }

    /// Empties the cache.
    ///
    /// Forgets queued requests, drains in-flight tasks, then disposes every
    /// cached asset. Assets are disposed parents first so that no disposed
    /// object is still referenced by a parent mid-teardown.
    pub fn clear(&mut self) -> Result<(), Error> {
        self.queue.clear();
        self.finish_loading()?;
        self.release_all();
        self.loaded = 0;
        self.to_load = 0;
        self.peak_tasks = 0;
        self.progress_mark = 0.0;
        Ok(())
    }

    /// Progress of the current batch, in `[0, 1]`.
    ///
    /// Counts completed requests, with a fractional part for the partially
    /// drained task stack. Non-decreasing between
    /// [`update`](AssetCache::update) calls of one batch, and exactly `1.0`
    /// when `update` reports completion.
    pub fn progress(&self) -> f32 {
        self.raw_progress().max(self.progress_mark)
    }

    fn raw_progress(&self) -> f32 {
        if self.to_load == 0 {
            return 1.0;
        }
        let mut fractional = self.loaded as f32;
        if self.peak_tasks > 0 {
            fractional += (self.peak_tasks - self.tasks.len()) as f32 / self.peak_tasks as f32;
        }
        (fractional / self.to_load as f32).min(1.0)
    }

    /// Whether neither queued requests nor in-flight tasks remain.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.queue.is_empty() && self.tasks.is_empty()
    }

    /// Whether `key` is cached, queued or in flight.
    pub fn contains(&self, key: &str) -> bool {
        self.registry.contains(key)
            || self.tasks.iter().any(|task| &**task.key() == key)
            || self.queue.iter().any(|desc| &*desc.key == key)
    }

    /// Whether `key` is cached.
    #[inline]
    pub fn is_loaded(&self, key: &str) -> bool {
        self.registry.contains(key)
    }

    /// The number of references held on a cached key.
    pub fn reference_count(&self, key: &str) -> Result<usize, Error> {
        match self.registry.get(key) {
            Some(entry) => Ok(entry.ref_count),
            None => Err(Error::NotLoaded { key: key.into() }),
        }
    }

    /// Overrides the reference count of a cached key.
    ///
    /// The caller takes over the accounting: counts set here are not
    /// reconciled with the references dependencies hold, so mismatched
    /// `unload`s can strand or over-release children.
    pub fn set_reference_count(&mut self, key: &str, count: usize) -> Result<(), Error> {
        match self.registry.get_mut(key) {
            Some(entry) => {
                entry.ref_count = count;
                Ok(())
            }
            None => Err(Error::NotLoaded { key: key.into() }),
        }
    }

    /// The dependencies recorded for `key`, in injection order.
    pub fn dependencies_of(&self, key: &str) -> Option<&[SharedString]> {
        self.dependencies.of(key)
    }

    /// The type `key` is cached under, if it is cached.
    #[inline]
    pub fn asset_type(&self, key: &str) -> Option<AssetType> {
        self.registry.type_of(key)
    }

    /// The keys of every cached asset, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &SharedString> {
        self.registry.keys()
    }

    /// The number of cached assets.
    #[inline]
    pub fn loaded_count(&self) -> usize {
        self.registry.len()
    }

    /// The number of requests not yet completed, queued or in flight.
    #[inline]
    pub fn queued_count(&self) -> usize {
        self.queue.len() + self.tasks.len()
    }

    /// A human-readable dump of the cache contents, for debugging.
    pub fn diagnostics(&self) -> String {
        use std::fmt::Write as _;

        let mut out = String::new();
        for key in self.registry.keys() {
            let Some(entry) = self.registry.get(key) else {
                continue;
            };
            if !out.is_empty() {
                out.push('\n');
            }
            let typ = self.registry.type_of(key).map_or("?", AssetType::name);
            let _ = write!(out, "{key}, {typ}, refs: {}", entry.ref_count);
            if let Some(deps) = self.dependencies.of(key) {
                let _ = write!(out, ", deps: {deps:?}");
            }
        }
        out
    }

    /// Rejects a request whose key is already known under another type.
    fn check_type(&self, key: &str, requested: AssetType) -> Result<(), Error> {
        let existing = self
            .registry
            .type_of(key)
            .or_else(|| {
                self.tasks
                    .iter()
                    .find(|task| &**task.key() == key)
                    .map(|task| task.desc.typ)
            })
            .or_else(|| {
                self.queue
                    .iter()
                    .find(|desc| &*desc.key == key)
                    .map(|desc| desc.typ)
            });

        match existing {
            Some(existing) if existing != requested => Err(Error::TypeConflict {
                key: key.into(),
                existing,
                requested,
            }),
            _ => Ok(()),
        }
    }

    /// Turns the next queued request into a task, or resolves it on the spot
    /// when the key is already cached.
    fn next_task(&mut self, desc: Descriptor) -> Result<(), Error> {
        if self.registry.contains(&desc.key) {
            // the registry may have gained the key since the request was
            // queued; the type still has to agree
            self.check_type(&desc.key, desc.typ)?;
            log::debug!("Already cached: {}", desc.key);
            let key = desc.key.clone();
            self.bump_existing(&key);
            self.loaded += 1;
            if let Some(callback) = desc.callback {
                callback(self, &key);
            }
            Ok(())
        } else {
            self.push_task(desc)
        }
    }

    fn push_task(&mut self, desc: Descriptor) -> Result<(), Error> {
        let loader = self
            .loaders
            .resolve(desc.typ, &desc.key)
            .ok_or_else(|| Error::NoLoaderFound {
                key: desc.key.clone(),
                typ: desc.typ,
            })?;
        log::debug!("Loading: {}", desc.key);
        self.tasks.push(LoadTask::new(desc, loader));
        self.peak_tasks += 1;
        Ok(())
    }

    /// Advances the top task by at most one phase.
    fn update_task(&mut self) -> Result<(), Error> {
        let Some(task) = self.tasks.last() else {
            return Ok(());
        };

        if task.cancel {
            self.drain_cancelled();
            return Ok(());
        }

        enum Step {
            Submit,
            Poll,
            TryFinish,
        }

        let step = match task.phase {
            Phase::Unstarted => Step::Submit,
            Phase::AsyncRunning(_) => Step::Poll,
            Phase::DependenciesPending(_) => Step::TryFinish,
            Phase::Finalizing => {
                // the placeholder never survives to the next update: the
                // task either registers and pops in `finish_top_task` or
                // the whole stack unwinds on error
                debug_assert!(false, "task observed mid-finalize");
                return Ok(());
            }
        };

        match step {
            Step::Submit => {
                if let Some(task) = self.tasks.last_mut() {
                    task.submit(&self.executor)?;
                }
                Ok(())
            }
            Step::Poll => {
                let output = match self.tasks.last_mut() {
                    Some(task) => task.poll()?,
                    None => None,
                };
                if let Some(output) = output {
                    if let Some(task) = self.tasks.last_mut() {
                        task.phase = Phase::DependenciesPending(output.data);
                    }
                    self.inject_dependencies(output.dependencies)?;
                }
                Ok(())
            }
            Step::TryFinish => {
                if self.top_dependencies_ready() {
                    self.finish_top_task()
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Whether every dependency of the top task is cached.
    fn top_dependencies_ready(&self) -> bool {
        match self.tasks.last() {
            Some(task) => task
                .dependencies
                .iter()
                .all(|dep| self.registry.contains(dep)),
            None => true,
        }
    }

    /// Records the dependencies the top task's blocking phase discovered.
    ///
    /// Duplicate keys within one batch count once.
    fn inject_dependencies(&mut self, dependencies: Vec<Descriptor>) -> Result<(), Error> {
        let Some(parent) = self.tasks.last().map(|task| task.key().clone()) else {
            return Ok(());
        };

        let mut seen = HashSet::default();
        for desc in dependencies {
            if !seen.insert(desc.key.clone()) {
                continue;
            }
            self.inject_dependency(&parent, desc)?;
        }
        Ok(())
    }

    fn inject_dependency(&mut self, parent: &SharedString, desc: Descriptor) -> Result<(), Error> {
        let key = desc.key.clone();
        self.check_type(&key, desc.typ)?;

        if let Some(pos) = self.tasks.iter().position(|task| task.key() == &key) {
            if !matches!(self.tasks[pos].phase, Phase::Unstarted) {
                // the key is an ancestor mid-load: the dependency can never
                // be satisfied
                return Err(Error::CycleDetected { key });
            }
            // an unstarted sibling: move it to the top so it completes
            // before the parent resumes, and share its result instead of
            // starting a second load
            let task = self.tasks.remove(pos);
            self.tasks.push(task);
            let share = self.pending.entry(key.clone()).or_default();
            share.bumps += 1;
            if let Some(callback) = desc.callback {
                share.callbacks.push(callback);
            }
        } else if self.registry.contains(&key) {
            self.bump_existing(&key);
            if let Some(callback) = desc.callback {
                callback(self, &key);
            }
        } else {
            self.push_task(desc)?;
        }

        self.dependencies.record(parent, key.clone());
        if let Some(task) = self.tasks.iter_mut().find(|task| task.key() == parent) {
            task.dependencies.push(key);
        }
        Ok(())
    }

    /// Shares a cached key: one more reference on it and on everything it
    /// depends on, transitively.
    fn bump_existing(&mut self, key: &str) {
        self.registry.bump(key);
        self.increment_dependencies(key);
    }

    fn increment_dependencies(&mut self, key: &str) {
        let Some(children) = self.dependencies.of(key).map(<[_]>::to_vec) else {
            return;
        };
        for child in children {
            if !self.registry.bump(&child) {
                log::warn!("dependency of {key} not cached: {child}");
            }
            self.increment_dependencies(&child);
        }
    }

    /// Runs the finalize phase of the top task and registers its result.
    fn finish_top_task(&mut self) -> Result<(), Error> {
        let (loader, key, typ, params, data) = {
            let Some(task) = self.tasks.last_mut() else {
                return Ok(());
            };
            let data = match mem::replace(&mut task.phase, Phase::Finalizing) {
                Phase::DependenciesPending(data) => data,
                other => {
                    task.phase = other;
                    return Ok(());
                }
            };
            (
                task.loader.clone(),
                task.desc.key.clone(),
                task.desc.typ,
                task.desc.params.clone(),
                data,
            )
        };

        let object = loader
            .finish(&key, params.as_deref(), data, self)
            .map_err(|source| Error::LoaderFailure {
                key: key.clone(),
                source,
            })?;

        let Some(task) = self.tasks.pop() else {
            return Ok(());
        };
        if self.tasks.is_empty() {
            self.loaded += 1;
            self.peak_tasks = 0;
        }

        self.registry.insert(key.clone(), typ, object);

        // requests that piggybacked on this load while it was in flight
        let mut shared_callbacks = Vec::new();
        if let Some(share) = self.pending.remove(&key) {
            for _ in 0..share.bumps {
                self.bump_existing(&key);
            }
            shared_callbacks = share.callbacks;
        }

        log::debug!("Loaded: {key} in {}ms", task.start.elapsed().as_millis());

        if let Some(callback) = task.desc.callback {
            callback(self, &key);
        }
        for callback in shared_callbacks {
            callback(self, &key);
        }
        Ok(())
    }

    /// Unwinds a cancelled task once its blocking phase has drained.
    fn drain_cancelled(&mut self) {
        {
            let Some(task) = self.tasks.last_mut() else {
                return;
            };
            if matches!(task.phase, Phase::AsyncRunning(_)) {
                match task.poll() {
                    // still running: the worker slot must not be leaked
                    Ok(None) => return,
                    // the result is discarded either way
                    Ok(Some(_)) | Err(_) => {}
                }
            }
        }

        let Some(task) = self.tasks.pop() else {
            return;
        };
        if self.tasks.is_empty() {
            self.loaded += 1;
            self.peak_tasks = 0;
        }

        let key = task.key().clone();
        log::debug!("Cancelled: {key}");

        for dep in &task.dependencies {
            if self.registry.contains(dep) {
                self.unload_cached(dep);
            }
        }
        self.dependencies.remove(&key);
        self.pending.remove(&key);

        // parents waiting on the cancelled key stop waiting for it
        for other in &mut self.tasks {
            other.dependencies.retain(|dep| *dep != key);
        }
        let parents: Vec<SharedString> = self.tasks.iter().map(|task| task.key().clone()).collect();
        for parent in parents {
            self.dependencies.remove_child(&parent, &key);
        }
    }

    /// Clears the task stack after a failure and reports it.
    fn handle_task_error(&mut self, error: Error) -> Result<(), Error> {
        log::error!("Load failed: {error}");

        let Some((key, typ)) = self
            .tasks
            .first()
            .map(|task| (task.key().clone(), task.desc.typ))
        else {
            return Err(error);
        };

        // ancestors of the failed task cannot complete either; the whole
        // stack unwinds
        while let Some(task) = self.tasks.pop() {
            self.rollback_task(task);
        }
        self.loaded += 1;
        self.peak_tasks = 0;

        match &mut self.listener {
            Some(listener) => {
                listener(&key, typ, &error);
                Ok(())
            }
            None => Err(error),
        }
    }

    /// Releases everything a discarded task had already acquired.
    fn rollback_task(&mut self, task: LoadTask) {
        for dep in &task.dependencies {
            if self.registry.contains(dep) {
                self.unload_cached(dep);
            }
        }
        self.dependencies.remove(task.key());
        self.pending.remove(task.key());
    }

    /// Releases one reference on a cached key and on its recorded
    /// dependencies, disposing entries that reach zero.
    fn unload_cached(&mut self, key: &str) {
        let remaining = match self.registry.get_mut(key) {
            Some(entry) => {
                entry.ref_count = entry.ref_count.saturating_sub(1);
                entry.ref_count
            }
            None => {
                log::warn!("asset already gone on unload: {key}");
                return;
            }
        };

        // snapshot before the entry goes away; children lose this parent's
        // reference in both branches
        let children = self.dependencies.of(key).map(<[_]>::to_vec);

        if remaining == 0 {
            log::debug!("Unload (dispose): {key}");
            if let Some(mut entry) = self.registry.remove(key) {
                entry.object.dispose();
            }
            self.dependencies.remove(key);
        }

        if let Some(children) = children {
            for child in children {
                self.unload_cached(&child);
            }
        }
    }

    /// Disposes every cached asset, parents before children.
    fn release_all(&mut self) {
        while !self.registry.is_empty() {
            let cached: Vec<SharedString> = self.registry.keys().cloned().collect();
            let counts = self.dependencies.in_degrees(cached.iter());
            let roots: Vec<SharedString> = cached
                .into_iter()
                .filter(|key| !counts.contains_key(key))
                .collect();

            if roots.is_empty() {
                // should be unreachable; dispose the rest rather than spin
                log::error!("dependency cycle among cached assets");
                let remainder: Vec<SharedString> = self.registry.keys().cloned().collect();
                for key in remainder {
                    if let Some(mut entry) = self.registry.remove(&key) {
                        entry.object.dispose();
                    }
                }
                break;
            }

            for key in roots {
                self.unload_cached(&key);
            }
        }
        self.dependencies.clear();
        self.pending.clear();
    }
}

impl Default for AssetCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetCache")
            .field("cached", &self.registry.len())
            .field("queued", &self.queue.len())
            .field("in_flight", &self.tasks.len())
            .finish_non_exhaustive()
    }
}

impl Drop for AssetCache {
    fn drop(&mut self) {
        self.queue.clear();
        while !self.tasks.is_empty() {
            match self.update() {
                Ok(_) => thread::yield_now(),
                // the failed stack was already rolled back
                Err(error) => log::error!("Load failed during teardown: {error}"),
            }
        }
        self.release_all();
    }
}
