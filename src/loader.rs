//! Generic asset loading.
//!
//! A [`Loader`] turns a key into an asset in two phases: a blocking phase
//! that runs on a worker thread and may discover further dependencies, and a
//! finalize phase that runs on the driving thread once every dependency is
//! cached. Loaders own their formats; this crate only schedules them.

use std::{any::Any, fmt, sync::Arc};

use crate::{
    cache::AssetCache,
    error::BoxedError,
    key::{AssetType, Descriptor, Params},
    utils::HashMap,
    Asset,
};

/// Intermediate state produced by the blocking phase and consumed by
/// [`Loader::finish`].
pub type IntermediateData = Box<dyn Any + Send>;

/// The result of a loader's blocking phase.
pub struct LoadOutput {
    /// State handed to the finalize phase.
    pub data: IntermediateData,

    /// Further assets the final object depends on. They are loaded and
    /// cached before `finish` runs.
    pub dependencies: Vec<Descriptor>,
}

impl LoadOutput {
    /// An output with no intermediate state and no dependencies.
    #[inline]
    pub fn empty() -> Self {
        Self::of(())
    }

    /// Wraps intermediate state, with no dependencies.
    #[inline]
    pub fn of(data: impl Any + Send) -> Self {
        Self {
            data: Box::new(data),
            dependencies: Vec::new(),
        }
    }

    /// Declares the dependencies of the asset being loaded.
    pub fn with_dependencies(mut self, dependencies: Vec<Descriptor>) -> Self {
        self.dependencies = dependencies;
        self
    }
}

impl fmt::Debug for LoadOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOutput")
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// Specifies how to load an asset from its key.
///
/// A loader whose blocking phase has nothing to do can return
/// [`LoadOutput::empty`] from [`load`](Loader::load) and do all its work in
/// [`finish`](Loader::finish), which is also where thread-affine work (eg
/// GPU uploads) belongs.
pub trait Loader: Send + Sync + 'static {
    /// The blocking I/O phase, run on a worker thread.
    ///
    /// Returns intermediate state for [`finish`](Loader::finish) along with
    /// the dependencies discovered while reading the asset.
    fn load(&self, key: &str, params: Option<&Params>) -> Result<LoadOutput, BoxedError>;

    /// The finalize phase, run on the driving thread once every declared
    /// dependency is cached.
    ///
    /// Dependencies can be read back from `cache`.
    fn finish(
        &self,
        key: &str,
        params: Option<&Params>,
        data: IntermediateData,
        cache: &AssetCache,
    ) -> Result<Box<dyn Asset>, BoxedError>;
}

/// Loaders registered for each asset type, keyed by key suffix.
///
/// The empty suffix is the type's default loader. Resolution picks the
/// longest registered suffix the key ends with; among suffixes of equal
/// length the latest registration wins.
pub(crate) struct LoaderRegistry {
    loaders: HashMap<AssetType, Vec<(Box<str>, Arc<dyn Loader>)>>,
}

impl LoaderRegistry {
    pub fn new() -> Self {
        Self {
            loaders: HashMap::default(),
        }
    }

    pub fn insert(&mut self, typ: AssetType, suffix: &str, loader: Arc<dyn Loader>) {
        let loaders = self.loaders.entry(typ).or_default();
        if let Some(slot) = loaders.iter_mut().find(|(s, _)| &**s == suffix) {
            slot.1 = loader;
        } else {
            loaders.push((suffix.into(), loader));
        }
    }

    pub fn resolve(&self, typ: AssetType, key: &str) -> Option<Arc<dyn Loader>> {
        let loaders = self.loaders.get(&typ)?;
        let mut result = None;
        let mut length = None;
        for (suffix, loader) in loaders {
            if key.ends_with(&**suffix) && length <= Some(suffix.len()) {
                result = Some(loader);
                length = Some(suffix.len());
            }
        }
        result.cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub;

    impl Loader for Stub {
        fn load(&self, _: &str, _: Option<&Params>) -> Result<LoadOutput, BoxedError> {
            Ok(LoadOutput::empty())
        }

        fn finish(
            &self,
            _: &str,
            _: Option<&Params>,
            _: IntermediateData,
            _: &AssetCache,
        ) -> Result<Box<dyn Asset>, BoxedError> {
            Ok(Box::new(String::new()))
        }
    }

    fn stub() -> Arc<dyn Loader> {
        Arc::new(Stub)
    }

    fn resolves_to(registry: &LoaderRegistry, key: &str, expected: &Arc<dyn Loader>) -> bool {
        let resolved = registry.resolve(AssetType::of::<String>(), key);
        resolved.is_some_and(|loader| Arc::ptr_eq(&loader, expected))
    }

    #[test]
    fn longest_suffix_wins() {
        let mut registry = LoaderRegistry::new();
        let typ = AssetType::of::<String>();
        let (default, png, nine_patch) = (stub(), stub(), stub());
        registry.insert(typ, "", default.clone());
        registry.insert(typ, ".png", png.clone());
        registry.insert(typ, ".9.png", nine_patch.clone());

        assert!(resolves_to(&registry, "ui/button.9.png", &nine_patch));
        assert!(resolves_to(&registry, "tiles.png", &png));
        assert!(resolves_to(&registry, "notes.txt", &default));
    }

    #[test]
    fn unknown_type_resolves_to_none() {
        let registry = LoaderRegistry::new();
        assert!(registry.resolve(AssetType::of::<String>(), "a.png").is_none());
    }

    #[test]
    fn no_matching_suffix_resolves_to_none() {
        let mut registry = LoaderRegistry::new();
        registry.insert(AssetType::of::<String>(), ".png", stub());
        assert!(registry.resolve(AssetType::of::<String>(), "a.txt").is_none());
    }

    #[test]
    fn same_suffix_replaces() {
        let mut registry = LoaderRegistry::new();
        let typ = AssetType::of::<String>();
        let (old, new) = (stub(), stub());
        registry.insert(typ, ".png", old);
        registry.insert(typ, ".png", new.clone());
        assert!(resolves_to(&registry, "a.png", &new));
    }
}
