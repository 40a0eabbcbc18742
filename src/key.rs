//! Types identifying assets and load requests.

use std::{
    any::{type_name, Any, TypeId},
    fmt, hash,
    sync::Arc,
};

use crate::{cache::AssetCache, utils::SharedString, Asset};

/// A tag identifying the Rust type of an asset.
///
/// Two tags are equal iff they represent the same type; the type name is
/// carried along for diagnostics only.
#[derive(Clone, Copy)]
pub struct AssetType {
    type_id: TypeId,
    name: &'static str,
}

impl AssetType {
    /// Creates an `AssetType` for type `A`.
    #[inline]
    pub fn of<A: Asset>() -> Self {
        Self {
            type_id: TypeId::of::<A>(),
            name: type_name::<A>(),
        }
    }

    /// The name of the represented type, as given by [`std::any::type_name`].
    #[inline]
    pub fn name(self) -> &'static str {
        self.name
    }
}

impl PartialEq for AssetType {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for AssetType {}

impl hash::Hash for AssetType {
    #[inline]
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetType").field("name", &self.name).finish()
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name)
    }
}

/// Parameters forwarded to both loader phases.
pub type Params = dyn Any + Send + Sync;

/// A callback invoked on the driving thread once a load request completes.
///
/// One callback fires per `load` call, including calls that resolved to a
/// reference-count bump of an already-cached asset. Callbacks of completed
/// tasks fire dependency-first, in the order their tasks complete.
pub type LoadedCallback = Box<dyn FnOnce(&mut AssetCache, &str) + Send>;

/// A single load request: a key, the asset type, optional loader parameters
/// and an optional completion callback.
///
/// Two descriptors request the same asset iff their keys are equal; the type
/// must then agree, which the cache enforces at enqueue time.
pub struct Descriptor {
    pub(crate) key: SharedString,
    pub(crate) typ: AssetType,
    pub(crate) params: Option<Arc<Params>>,
    pub(crate) callback: Option<LoadedCallback>,
}

impl Descriptor {
    /// Creates a request for the asset of type `A` identified by `key`.
    #[inline]
    pub fn new<A: Asset>(key: impl Into<SharedString>) -> Self {
        Self {
            key: key.into(),
            typ: AssetType::of::<A>(),
            params: None,
            callback: None,
        }
    }

    /// Attaches loader parameters to the request.
    pub fn with_params(mut self, params: impl Any + Send + Sync) -> Self {
        self.params = Some(Arc::new(params));
        self
    }

    /// Attaches a completion callback to the request.
    pub fn with_callback(
        mut self,
        callback: impl FnOnce(&mut AssetCache, &str) + Send + 'static,
    ) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// The key of the requested asset.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The type of the requested asset.
    #[inline]
    pub fn asset_type(&self) -> AssetType {
        self.typ
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("key", &self.key)
            .field("type", &self.typ.name())
            .finish()
    }
}
