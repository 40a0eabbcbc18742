//! Asynchronously load, reference-count and cache external resources.
//!
//! This crate schedules the loading of assets and keeps them cached as long
//! as something uses them. It was originally thought for games, where assets
//! reference each other and loading happens a slice at a time between
//! frames, but can of course be used in other contexts.
//!
//! The structure [`AssetCache`] is the entry point of the crate: register a
//! [`Loader`] per asset type, queue requests with
//! [`load`](AssetCache::load), and drive them with
//! [`update`](AssetCache::update) or [`finish_loading`](AssetCache::finish_loading).
//! Loaders run their blocking phase on a worker thread and may declare
//! dependencies, which the cache loads first and releases together with the
//! asset that pulled them in.
//!
//! ## Cargo features
//!
//! ### Internal features
//!
//! These features change inner data structures implementations. They usually
//! increase performances, and are therefore enabled by default.
//!
//! - `ahash`: Use ahash algorithm instead Sip1-3 used in `std`.
//!
//! ## Example
//!
//! ```
//! use asset_cache::{
//!     Asset, AssetCache, BoxedError, IntermediateData, LoadOutput, Loader, Params,
//! };
//!
//! // The type you want to cache
//! struct Text(String);
//! impl Asset for Text {}
//!
//! // Specify how to load it
//! struct TextLoader;
//! impl Loader for TextLoader {
//!     fn load(&self, key: &str, _: Option<&Params>) -> Result<LoadOutput, BoxedError> {
//!         // runs on a worker thread; real loaders do their I/O here
//!         Ok(LoadOutput::of(format!("contents of {key}")))
//!     }
//!
//!     fn finish(
//!         &self,
//!         _: &str,
//!         _: Option<&Params>,
//!         data: IntermediateData,
//!         _: &AssetCache,
//!     ) -> Result<Box<dyn Asset>, BoxedError> {
//!         let text = data.downcast::<String>().map_err(|_| "invalid intermediate data")?;
//!         Ok(Box::new(Text(*text)))
//!     }
//! }
//!
//! # fn main() -> Result<(), asset_cache::Error> {
//! let mut cache = AssetCache::new();
//! cache.set_loader::<Text>(TextLoader);
//!
//! cache.load::<Text>("hello.txt")?;
//! cache.finish_loading()?;
//!
//! let text = cache.get::<Text>("hello.txt")?;
//! assert_eq!(text.0, "contents of hello.txt");
//! # Ok(()) }
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
)]

mod cache;
mod dependencies;
mod error;
mod executor;
mod key;
mod loader;
mod registry;
mod task;
mod utils;


pub use crate::{
    cache::{AssetCache, ErrorListener},
    error::{BoxedError, Error},
    key::{AssetType, Descriptor, LoadedCallback, Params},
    loader::{IntermediateData, LoadOutput, Loader},
    utils::SharedString,
};

use std::any::Any;

/// Conversion to [`Any`], implemented for every `'static` type.
///
/// This only exists because trait objects cannot be upcast to their
/// supertraits on stable Rust; user code never needs to name it.
pub trait AsAny: Any {
    /// Returns `self` as a [`Any`] trait object.
    fn as_any(&self) -> &dyn Any;

    /// Returns `self` as a mutable [`Any`] trait object.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A value that can be stored in an [`AssetCache`].
///
/// Assets travel from the worker thread that finishes loading them, so they
/// have to be [`Send`].
pub trait Asset: AsAny + Send {
    /// Releases resources owned by the value.
    ///
    /// Called exactly once, when the value leaves the cache. The default
    /// implementation does nothing, which is right for plain data; assets
    /// owning GPU handles or other external resources free them here.
    fn dispose(&mut self) {}
}

impl dyn Asset {
    /// Whether the boxed value has type `A`.
    #[inline]
    pub fn is<A: Asset>(&self) -> bool {
        self.as_any().is::<A>()
    }

    /// Borrows the boxed value as an `A`, if it has that type.
    #[inline]
    pub fn downcast_ref<A: Asset>(&self) -> Option<&A> {
        self.as_any().downcast_ref()
    }

    /// Mutably borrows the boxed value as an `A`, if it has that type.
    #[inline]
    pub fn downcast_mut<A: Asset>(&mut self) -> Option<&mut A> {
        self.as_any_mut().downcast_mut()
    }
}

impl Asset for String {}

impl Asset for Vec<u8> {}
