//! Feature-pack layer catalog generator.
//!
//! Every feature pack ships a `metadata.json` describing its layers with
//! generic properties, plus generated management-model reference pages. The
//! crate folds the layers of all packages of a product variant into one
//! category → layer catalog, rewriting model addresses into links to those
//! reference pages.
//!
//! Pipeline, leaf first: `annotations` pulls the catalog fields out of layer
//! properties (with rule texts from `rules`), `reference` resolves model
//! addresses, `aggregate` files layers into a per-variant `CategoryMap`, and
//! `variant` drives packages and variants end to end.

use anyhow::{Context, Result};
use std::env;
use std::ffi::OsString;

pub mod aggregate;
pub mod annotations;
pub mod catalog;
pub mod reference;
pub mod rules;
pub mod variant;

pub use aggregate::{PackageSummary, VariantCatalog, build_layer};
pub use annotations::{AnnotationKey, Annotations, extract_annotations};
pub use catalog::{
    CatalogDocument, CategoryEntry, CategoryMap, CategoryName, Coordinates, FeaturePackEntry,
    FeaturePackMetadata, Layer, LayerName, Property, RawLayer, Registration, Rule,
    load_feature_pack_metadata, merge_layer,
};
pub use reference::{ReferenceResolver, ReferenceRoot, ResolutionStats, format_address};
pub use rules::{RuleDescription, RuleDescriptions};
pub use variant::{
    CATALOG_FILE, CatalogGenerator, CatalogMetadata, DocSource, MirrorDocSource, VariantSpec,
};

/// Environment variable holding the `tracing` filter directives.
pub const LOG_ENV: &str = "CATALOG_LOG";

/// Install the fmt subscriber used by the binaries.
///
/// Directives come from `CATALOG_LOG`, falling back to `default_level`.
pub fn init_logging(default_level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(default_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install log subscriber: {err}"))
}

/// Read a non-empty environment variable.
pub fn env_value(name: &str) -> Option<OsString> {
    env::var_os(name).filter(|value| !value.is_empty())
}
