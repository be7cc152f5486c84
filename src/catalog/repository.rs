//! Per-variant category map.
//!
//! Layers are filed under their category and keyed by name so the output is
//! sorted by category, then layer. A name clash inside a category is resolved
//! by `merge_layer`: the first registered record stays authoritative.

use crate::catalog::identity::{CategoryName, LayerName};
use crate::catalog::model::{CategoryEntry, Layer};
use std::collections::BTreeMap;

/// What happened when a layer was registered.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Registration {
    Inserted,
    /// Merged into an existing layer; carries the number of appended dependencies.
    Merged(usize),
}

#[derive(Default, Debug)]
/// Category → layer name → layer, accumulated across the packages of one variant.
pub struct CategoryMap {
    categories: BTreeMap<CategoryName, BTreeMap<LayerName, Layer>>,
}

impl CategoryMap {
    /// File a layer under its category, merging into an existing same-named layer.
    pub fn register(&mut self, layer: Layer) -> Registration {
        let layers = self.categories.entry(layer.category.clone()).or_default();
        match layers.get_mut(&layer.name) {
            Some(existing) => Registration::Merged(merge_layer(existing, layer)),
            None => {
                layers.insert(layer.name.clone(), layer);
                Registration::Inserted
            }
        }
    }

    /// Fetch a layer by category and name, if present.
    pub fn get(&self, category: &CategoryName, name: &LayerName) -> Option<&Layer> {
        self.categories.get(category)?.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn layer_count(&self) -> usize {
        self.categories.values().map(BTreeMap::len).sum()
    }

    /// Consume the map into sorted output entries.
    pub fn into_entries(self) -> Vec<CategoryEntry> {
        self.categories
            .into_iter()
            .map(|(name, layers)| CategoryEntry {
                name,
                functionalities: layers.into_values().collect(),
            })
            .collect()
    }
}

/// Merge a later definition of a layer into the one already registered.
///
/// Only dependencies flow from `incoming`: entries not already listed are
/// appended after the existing ones. Every other field of `incoming` is
/// discarded. Returns the number of appended entries.
pub fn merge_layer(existing: &mut Layer, incoming: Layer) -> usize {
    let Some(new_deps) = incoming.dependencies else {
        return 0;
    };
    let deps = existing.dependencies.get_or_insert_with(Vec::new);
    let mut appended = 0;
    for dep in new_deps {
        if !deps.contains(&dep) {
            deps.push(dep);
            appended += 1;
        }
    }
    appended
}
