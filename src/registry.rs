//! Storage of cached assets and their reference counts.

use crate::{
    key::AssetType,
    utils::{HashMap, SharedString},
    Asset,
};

/// A cached object and the number of live holders.
///
/// An entry exists only while its count is above zero; dropping to zero
/// disposes the object and removes the entry.
pub(crate) struct CacheEntry {
    pub object: Box<dyn Asset>,
    pub ref_count: usize,
}

/// Maps keys to asset types and `(type, key)` to cache entries.
///
/// A key is associated with at most one type at a time; the per-type entry
/// maps are only ever addressed through the type recorded here.
pub(crate) struct Registry {
    types: HashMap<SharedString, AssetType>,
    entries: HashMap<AssetType, HashMap<SharedString, CacheEntry>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            types: HashMap::default(),
            entries: HashMap::default(),
        }
    }

    /// Adds a freshly loaded object with a reference count of one.
    ///
    /// # Panics
    ///
    /// Panics if the key is already registered: the cache never starts two
    /// loads for one key, so a duplicate registration is a logic fault.
    pub fn insert(&mut self, key: SharedString, typ: AssetType, object: Box<dyn Asset>) {
        let previous = self.types.insert(key.clone(), typ);
        assert!(
            previous.is_none(),
            "asset \"{key}\" registered twice",
        );
        let entry = CacheEntry {
            object,
            ref_count: 1,
        };
        self.entries.entry(typ).or_default().insert(key, entry);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.types.contains_key(key)
    }

    pub fn type_of(&self, key: &str) -> Option<AssetType> {
        self.types.get(key).copied()
    }

    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        let typ = self.types.get(key)?;
        self.entries.get(typ)?.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut CacheEntry> {
        let typ = self.types.get(key)?;
        self.entries.get_mut(typ)?.get_mut(key)
    }

    /// Returns the cached object for `key` if it has type `A`.
    pub fn get_typed<A: Asset>(&self, key: &str) -> Option<&A> {
        let entry = self.entries.get(&AssetType::of::<A>())?.get(key)?;
        entry.object.downcast_ref::<A>()
    }

    /// Increments the reference count of a cached key.
    ///
    /// Returns `false` if the key is not cached.
    pub fn bump(&mut self, key: &str) -> bool {
        match self.get_mut(key) {
            Some(entry) => {
                entry.ref_count += 1;
                true
            }
            None => false,
        }
    }

    /// Removes an entry regardless of its reference count.
    pub fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let typ = self.types.remove(key)?;
        self.entries.get_mut(&typ)?.remove(key)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &SharedString> {
        self.types.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_remove() {
        let mut registry = Registry::new();
        registry.insert(
            "hello.txt".into(),
            AssetType::of::<String>(),
            Box::new(String::from("hello")),
        );

        assert!(registry.contains("hello.txt"));
        assert_eq!(registry.type_of("hello.txt"), Some(AssetType::of::<String>()));
        assert_eq!(
            registry.get_typed::<String>("hello.txt").map(String::as_str),
            Some("hello"),
        );
        assert!(registry.get_typed::<Vec<u8>>("hello.txt").is_none());

        let entry = registry.remove("hello.txt").unwrap();
        assert_eq!(entry.ref_count, 1);
        assert!(!registry.contains("hello.txt"));
    }

    #[test]
    fn bump_counts_holders() {
        let mut registry = Registry::new();
        registry.insert("a".into(), AssetType::of::<String>(), Box::new(String::new()));

        assert!(registry.bump("a"));
        assert!(!registry.bump("missing"));
        assert_eq!(registry.get("a").unwrap().ref_count, 2);
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn double_insert_is_a_fault() {
        let mut registry = Registry::new();
        registry.insert("a".into(), AssetType::of::<String>(), Box::new(String::new()));
        registry.insert("a".into(), AssetType::of::<String>(), Box::new(String::new()));
    }
}
