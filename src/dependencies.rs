//! The table of dependencies injected during loads.
//!
//! Edges are directed from a parent key to the keys its loader injected, in
//! injection order. A parent appears here only while it is cached or
//! in-flight; its entry is dropped when it leaves the cache.

use crate::utils::{HashMap, SharedString};

pub(crate) struct DependencyTable {
    edges: HashMap<SharedString, Vec<SharedString>>,
}

impl DependencyTable {
    pub fn new() -> Self {
        Self {
            edges: HashMap::default(),
        }
    }

    /// Records that `parent` injected `child`.
    pub fn record(&mut self, parent: &SharedString, child: SharedString) {
        self.edges.entry(parent.clone()).or_default().push(child);
    }

    /// The keys injected by `parent`, in injection order.
    pub fn of(&self, parent: &str) -> Option<&[SharedString]> {
        self.edges.get(parent).map(Vec::as_slice)
    }

    /// Drops the whole entry of `parent`.
    pub fn remove(&mut self, parent: &str) -> Option<Vec<SharedString>> {
        self.edges.remove(parent)
    }

    /// Removes one recorded `parent -> child` edge, if any.
    pub fn remove_child(&mut self, parent: &str, child: &str) {
        if let Some(children) = self.edges.get_mut(parent) {
            if let Some(index) = children.iter().position(|c| &**c == child) {
                children.remove(index);
            }
        }
    }

    /// Counts, for every key of `parents`, how many of those keys list it as
    /// a dependency. Keys absent from the result have in-degree zero and are
    /// safe to release first.
    pub fn in_degrees<'a>(
        &self,
        parents: impl Iterator<Item = &'a SharedString>,
    ) -> HashMap<SharedString, usize> {
        let mut counts = HashMap::default();
        for parent in parents {
            if let Some(children) = self.edges.get(parent) {
                for child in children {
                    *counts.entry(child.clone()).or_insert(0) += 1;
                }
            }
        }
        counts
    }

    pub fn clear(&mut self) {
        self.edges.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> SharedString {
        s.into()
    }

    #[test]
    fn records_in_order() {
        let mut table = DependencyTable::new();
        let parent = key("model.obj");
        table.record(&parent, key("tex.png"));
        table.record(&parent, key("mat.json"));

        let children = table.of("model.obj").unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(&*children[0], "tex.png");
        assert_eq!(&*children[1], "mat.json");

        table.remove_child("model.obj", "tex.png");
        assert_eq!(table.of("model.obj").unwrap().len(), 1);

        table.remove("model.obj");
        assert!(table.of("model.obj").is_none());
    }

    #[test]
    fn in_degrees_counts_cached_parents_only() {
        let mut table = DependencyTable::new();
        let (a, b, c) = (key("a"), key("b"), key("c"));
        table.record(&a, b.clone());
        table.record(&b, c.clone());
        table.record(&a, c.clone());

        let cached = [a.clone(), b.clone(), c.clone()];
        let counts = table.in_degrees(cached.iter());
        assert_eq!(counts.get("a"), None);
        assert_eq!(counts.get("b"), Some(&1));
        assert_eq!(counts.get("c"), Some(&2));

        // with "b" gone, only the direct edge from "a" remains
        let counts = table.in_degrees([a, c].iter());
        assert_eq!(counts.get("c"), Some(&1));
    }
}
