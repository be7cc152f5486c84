//! Catalog data model.
//!
//! `model` mirrors the feature-pack metadata files and the generated catalog
//! document, `identity` holds the small typed identifiers shared by both, and
//! `repository` is the per-variant category map that layers are filed into.

pub mod identity;
pub mod model;
pub mod repository;

pub use identity::{CategoryName, Coordinates, INTERNAL_CATEGORY, LayerName};
pub use model::{
    CATEGORY_PROPERTY, CatalogDocument, CategoryEntry, FeaturePackEntry, FeaturePackMetadata,
    Layer, Property, RawLayer, Rule,
};
pub use repository::{CategoryMap, Registration, merge_layer};

pub use model::load_feature_pack_metadata;
