//! Folds feature-pack layers into a variant's category map.
//!
//! `VariantCatalog` is the state of one variant build: the category map and
//! the reference roots of every package materialized so far. Packages are
//! aggregated in declaration order; order decides which definition of a
//! shared layer wins and which reference pages are visible.

use crate::annotations::extract_annotations;
use crate::catalog::{
    CategoryEntry, CategoryMap, CategoryName, Coordinates, FeaturePackMetadata, Layer, RawLayer,
    Registration,
};
use crate::reference::{ReferenceResolver, ReferenceRoot, ResolutionStats};
use crate::rules::RuleDescriptions;
use anyhow::{Context, Result};
use serde_json::Value;

const DEFAULT_STABILITY: &str = "default";

// Output fields computed by the catalog; stale copies in the raw layer are dropped.
const DERIVED_FIELDS: &[&str] = &[
    "feature-pack",
    "glowAddOn",
    "glowRules",
    "glowDiscoverable",
];

/// Per-package aggregation counters, used for logging and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PackageSummary {
    pub inserted: usize,
    pub merged: usize,
    pub skipped: usize,
    pub addresses: ResolutionStats,
}

#[derive(Default, Debug)]
/// Accumulated catalog for one variant.
pub struct VariantCatalog {
    categories: CategoryMap,
    reference_roots: Vec<ReferenceRoot>,
}

impl VariantCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a materialized package's reference pages visible to address
    /// resolution. Roots are probed in registration order.
    pub fn register_reference_root(&mut self, root: ReferenceRoot) {
        if !self.reference_roots.contains(&root) {
            self.reference_roots.push(root);
        }
    }

    pub fn reference_roots(&self) -> &[ReferenceRoot] {
        &self.reference_roots
    }

    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    /// Aggregate every layer of one feature pack.
    pub fn aggregate(
        &mut self,
        package: FeaturePackMetadata,
        descriptions: &RuleDescriptions,
    ) -> Result<PackageSummary> {
        let coordinates = package.coordinates();
        let mut summary = PackageSummary::default();
        for raw in package.layers {
            let name = raw.name.clone();
            let built = build_layer(raw, &coordinates, descriptions)
                .with_context(|| format!("layer '{}' of {coordinates}", name.as_str()))?;
            let Some(mut layer) = built else {
                tracing::info!(
                    layer = name.as_str(),
                    feature_pack = %coordinates,
                    "internal layer with metadata only, ignoring"
                );
                summary.skipped += 1;
                continue;
            };

            // A merged layer only contributes dependencies, so its trees are never emitted.
            if self.categories.get(&layer.category, &layer.name).is_none() {
                summary.addresses.absorb(self.resolve_references(&mut layer));
            }

            match self.categories.register(layer) {
                Registration::Inserted => summary.inserted += 1,
                Registration::Merged(appended) => {
                    tracing::debug!(
                        layer = name.as_str(),
                        feature_pack = %coordinates,
                        appended,
                        "layer already registered, merged dependencies"
                    );
                    summary.merged += 1;
                }
            }
        }
        Ok(summary)
    }

    fn resolve_references(&self, layer: &mut Layer) -> ResolutionStats {
        let resolver = ReferenceResolver::new(&self.reference_roots);
        let mut stats = ResolutionStats::default();
        for tree in [&mut layer.management_model, &mut layer.configurations]
            .into_iter()
            .flatten()
        {
            stats.absorb(resolver.resolve_tree(tree));
        }
        stats
    }

    /// Finish the variant: categories sorted by name, layers by name.
    pub fn into_categories(self) -> Vec<CategoryEntry> {
        self.categories.into_entries()
    }
}

/// Turn a raw layer into a catalog layer.
///
/// Returns `None` for internal layers with nothing to document: no category,
/// an empty management model, and neither a `dependencies` nor a `packages`
/// field. A declared empty dependency list still counts as content.
pub fn build_layer(
    raw: RawLayer,
    coordinates: &Coordinates,
    descriptions: &RuleDescriptions,
) -> Result<Option<Layer>> {
    let properties = raw.properties.unwrap_or_default();
    let annotations = extract_annotations(&properties, descriptions)?;

    let category = match annotations.category {
        Some(category) => category,
        None => {
            if is_empty_tree(raw.management_model.as_ref())
                && raw.dependencies.is_none()
                && raw.packages.as_ref().is_none_or(Value::is_null)
            {
                return Ok(None);
            }
            CategoryName::internal()
        }
    };

    let mut extra = raw.extra;
    for field in DERIVED_FIELDS {
        extra.remove(*field);
    }

    let discoverable = !annotations.discovery_rules.is_empty();
    Ok(Some(Layer {
        name: raw.name,
        source_package: coordinates.clone(),
        category,
        description: annotations.description.or(raw.description),
        note: annotations.note.or(raw.note),
        stability: annotations
            .stability
            .or(raw.stability)
            .unwrap_or_else(|| DEFAULT_STABILITY.to_string()),
        add_on: annotations.add_on,
        discovery_rules: annotations.discovery_rules,
        discoverable,
        dependencies: raw.dependencies,
        management_model: raw.management_model,
        configurations: raw.configurations,
        packages: raw.packages,
        extra,
    }))
}

fn is_empty_tree(tree: Option<&Value>) -> bool {
    match tree {
        None | Some(Value::Null) => true,
        Some(Value::Object(fields)) => fields.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}
