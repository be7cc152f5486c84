//! Serde representation of feature-pack metadata and the generated catalog.
//!
//! Input types (`FeaturePackMetadata`, `RawLayer`, `Property`) mirror the
//! `doc/META-INF/metadata.json` file shipped in every feature-pack
//! documentation archive. Output types (`CatalogDocument`, `Layer`, ...) use
//! the field names the catalog viewer reads, which is why several of them are
//! renamed from their Rust names.

use crate::catalog::identity::{CategoryName, Coordinates, LayerName};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Property name that marks a layer as documented (non-internal).
pub const CATEGORY_PROPERTY: &str = "org.wildfly.category";

#[derive(Clone, Debug, Deserialize)]
/// Metadata file published by one feature pack.
pub struct FeaturePackMetadata {
    #[serde(rename = "groupId")]
    pub group_id: String,
    #[serde(rename = "artifactId")]
    pub artifact_id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub url: String,
    #[serde(rename = "scm-url")]
    pub scm_url: String,
    #[serde(default)]
    pub licenses: Option<Value>,
    pub layers: Vec<RawLayer>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
/// Generic key/value annotation attached to a layer.
pub struct Property {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, Deserialize)]
/// Layer exactly as declared by a feature pack, before annotation extraction.
///
/// Fields the catalog does not interpret are kept in `extra` and passed
/// through to the output untouched.
pub struct RawLayer {
    pub name: LayerName,
    #[serde(default)]
    pub properties: Option<Vec<Property>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub stability: Option<String>,
    #[serde(default)]
    pub dependencies: Option<Vec<Value>>,
    #[serde(default, rename = "managementModel")]
    pub management_model: Option<Value>,
    #[serde(default)]
    pub configurations: Option<Value>,
    #[serde(default)]
    pub packages: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
/// Discovery rule extracted from a `org.wildfly.rule*` property.
pub struct Rule {
    pub name: String,
    pub value: String,
    #[serde(rename = "ruleDescription", skip_serializing_if = "Option::is_none")]
    pub rule_description: Option<String>,
    #[serde(rename = "valueDescription", skip_serializing_if = "Option::is_none")]
    pub value_description: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
/// Catalog entry for one layer.
pub struct Layer {
    pub name: LayerName,
    #[serde(rename = "feature-pack")]
    pub source_package: Coordinates,
    #[serde(skip)]
    pub category: CategoryName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub stability: String,
    #[serde(rename = "glowAddOn", skip_serializing_if = "Option::is_none")]
    pub add_on: Option<String>,
    #[serde(rename = "glowRules", skip_serializing_if = "Vec::is_empty")]
    pub discovery_rules: Vec<Rule>,
    #[serde(rename = "glowDiscoverable")]
    pub discoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<Value>>,
    #[serde(rename = "managementModel", skip_serializing_if = "Option::is_none")]
    pub management_model: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configurations: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packages: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Serialize)]
/// Category with its layers, sorted by layer name.
pub struct CategoryEntry {
    pub name: CategoryName,
    pub functionalities: Vec<Layer>,
}

#[derive(Clone, Debug, Serialize)]
/// Package-level metadata listed at the top of a variant catalog.
pub struct FeaturePackEntry {
    #[serde(rename = "mavenCoordinates")]
    pub coordinates: Coordinates,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub licenses: Option<Value>,
    #[serde(rename = "projectURL")]
    pub project_url: String,
    #[serde(rename = "scmURL")]
    pub scm_url: String,
    pub layers: Vec<LayerName>,
    #[serde(rename = "modelReference", skip_serializing_if = "Option::is_none")]
    pub model_reference: Option<String>,
    #[serde(rename = "logMessagesReference", skip_serializing_if = "Option::is_none")]
    pub log_messages_reference: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
/// The catalog written for one product variant.
pub struct CatalogDocument {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Value>,
    #[serde(rename = "featurePacks")]
    pub feature_packs: Vec<FeaturePackEntry>,
    pub categories: Vec<CategoryEntry>,
}

impl FeaturePackMetadata {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(&self.group_id, &self.artifact_id, &self.version)
    }

    /// Names of the layers that declare a category, sorted and deduplicated.
    pub fn documented_layer_names(&self) -> Vec<LayerName> {
        let mut names: Vec<LayerName> = self
            .layers
            .iter()
            .filter(|layer| layer.declares_category())
            .map(|layer| layer.name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

impl RawLayer {
    /// True when the layer carries an explicit `org.wildfly.category`.
    pub fn declares_category(&self) -> bool {
        self.properties
            .as_deref()
            .unwrap_or_default()
            .iter()
            .any(|prop| prop.name == CATEGORY_PROPERTY)
    }
}

impl Layer {
    /// Dependencies as a slice, empty when none were declared.
    pub fn dependency_entries(&self) -> &[Value] {
        self.dependencies.as_deref().unwrap_or_default()
    }
}

/// Read and parse a feature pack's `metadata.json`.
pub fn load_feature_pack_metadata(path: &Path) -> Result<FeaturePackMetadata> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let metadata: FeaturePackMetadata = serde_json::from_str(&data)
        .with_context(|| format!("parsing feature-pack metadata {}", path.display()))?;
    Ok(metadata)
}
