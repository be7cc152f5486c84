//! Builds one catalog document per product variant.
//!
//! A run is described by `CatalogMetadata`. For each variant the generator
//! materializes every feature pack's documentation under
//! `<output>/<version>/<variant>/featurePacks/`, aggregates the packages in
//! declared order, and writes `wildfly-catalog.json` next to them so the
//! reference links in the document resolve relative to it.

use crate::aggregate::VariantCatalog;
use crate::catalog::{
    CatalogDocument, Coordinates, FeaturePackEntry, FeaturePackMetadata,
    load_feature_pack_metadata,
};
use crate::reference::ReferenceRoot;
use crate::rules::RuleDescriptions;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub const CATALOG_FILE: &str = "wildfly-catalog.json";
const FEATURE_PACKS_DIR: &str = "featurePacks";
const METADATA_FILE: &str = "doc/META-INF/metadata.json";
const MANAGEMENT_API_FILE: &str = "doc/META-INF/management-api.json";
const LOG_MESSAGES_FILE: &str = "log-message-reference.html";

#[derive(Clone, Debug, Deserialize)]
/// Run description: shared document fields plus the variants to build.
pub struct CatalogMetadata {
    pub description: String,
    #[serde(default)]
    pub documentation: Option<Value>,
    #[serde(default)]
    pub legend: Option<Value>,
    #[serde(default, rename = "ruleDescriptions")]
    pub rule_descriptions: Option<PathBuf>,
    pub variants: Vec<VariantSpec>,
}

#[derive(Clone, Debug, Deserialize)]
/// One product flavor and the feature packs it is made of.
pub struct VariantSpec {
    pub directory: String,
    pub description: String,
    #[serde(rename = "featurePacks")]
    pub feature_packs: Vec<Coordinates>,
}

impl CatalogMetadata {
    /// Load the run description. A relative `ruleDescriptions` path is
    /// resolved against the metadata file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let data =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let mut metadata: CatalogMetadata = serde_json::from_str(&data)
            .with_context(|| format!("parsing catalog metadata {}", path.display()))?;
        if let (Some(rules), Some(base)) = (metadata.rule_descriptions.as_mut(), path.parent()) {
            if rules.is_relative() {
                *rules = base.join(&*rules);
            }
        }
        metadata.validate()?;
        Ok(metadata)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = Vec::new();
        for variant in &self.variants {
            let dir = variant.directory.trim();
            if dir.is_empty() || dir.contains(['/', '\\']) || dir == "." || dir == ".." {
                bail!("invalid variant directory '{}'", variant.directory);
            }
            if seen.contains(&dir) {
                bail!("duplicate variant directory '{dir}'");
            }
            seen.push(dir);
        }
        Ok(())
    }

    /// Rule description table, empty when none is configured.
    pub fn load_rule_descriptions(&self) -> Result<RuleDescriptions> {
        match &self.rule_descriptions {
            Some(path) => RuleDescriptions::load(path),
            None => Ok(RuleDescriptions::default()),
        }
    }
}

/// Places a feature pack's extracted documentation tree on disk.
///
/// Implementations must have finished writing when `materialize` returns:
/// reference resolution checks the tree synchronously.
pub trait DocSource {
    fn materialize(&self, coordinates: &Coordinates, dest: &Path) -> Result<()>;
}

/// Copies already-extracted documentation from a local mirror laid out as
/// `<root>/<groupId>/<artifactId>/<version>/`.
pub struct MirrorDocSource {
    root: PathBuf,
}

impl MirrorDocSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn package_dir(&self, coordinates: &Coordinates) -> PathBuf {
        self.root
            .join(&coordinates.group_id)
            .join(&coordinates.artifact_id)
            .join(&coordinates.version)
    }
}

impl DocSource for MirrorDocSource {
    fn materialize(&self, coordinates: &Coordinates, dest: &Path) -> Result<()> {
        let source = self.package_dir(coordinates);
        if !source.is_dir() {
            bail!(
                "documentation for {coordinates} not found under {}",
                source.display()
            );
        }
        copy_tree(&source, dest)
            .with_context(|| format!("copying {} to {}", source.display(), dest.display()))
    }
}

fn copy_tree(source: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let path = entry.path();
        let target = dest.join(entry.file_name());
        if path.is_dir() {
            copy_tree(&path, &target)?;
        } else {
            fs::copy(&path, &target)?;
        }
    }
    Ok(())
}

/// Drives catalog generation for every variant of one product version.
pub struct CatalogGenerator<'a, S: DocSource> {
    metadata: &'a CatalogMetadata,
    descriptions: &'a RuleDescriptions,
    source: &'a S,
    version: String,
    output_root: PathBuf,
}

impl<'a, S: DocSource> CatalogGenerator<'a, S> {
    pub fn new(
        metadata: &'a CatalogMetadata,
        descriptions: &'a RuleDescriptions,
        source: &'a S,
        version: impl Into<String>,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            metadata,
            descriptions,
            source,
            version: version.into(),
            output_root: output_root.into(),
        }
    }

    pub fn variant_dir(&self, variant: &VariantSpec) -> PathBuf {
        self.output_root
            .join(&self.version)
            .join(variant.directory.trim())
    }

    /// Build every variant, then write their documents. Nothing is written
    /// when any variant fails.
    pub fn run(&self) -> Result<Vec<PathBuf>> {
        let mut documents = Vec::with_capacity(self.metadata.variants.len());
        for variant in &self.metadata.variants {
            let document = self
                .build_variant(variant)
                .with_context(|| format!("building variant '{}'", variant.directory))?;
            documents.push((self.variant_dir(variant).join(CATALOG_FILE), document));
        }

        let mut written = Vec::with_capacity(documents.len());
        for (path, document) in documents {
            write_document(&path, &document)?;
            tracing::info!(path = %path.display(), "catalog written");
            written.push(path);
        }
        Ok(written)
    }

    /// Aggregate one variant. Each call starts from an empty catalog.
    pub fn build_variant(&self, variant: &VariantSpec) -> Result<CatalogDocument> {
        let feature_packs_dir = self.variant_dir(variant).join(FEATURE_PACKS_DIR);
        fs::create_dir_all(&feature_packs_dir)
            .with_context(|| format!("creating {}", feature_packs_dir.display()))?;

        let mut catalog = VariantCatalog::new();
        let mut entries = Vec::with_capacity(variant.feature_packs.len());
        for coordinates in &variant.feature_packs {
            let root = ReferenceRoot::for_package(&feature_packs_dir, coordinates);
            self.source.materialize(coordinates, root.dir())?;
            tracing::info!(feature_pack = %coordinates, dir = %root.dir().display(), "materialized");

            let package = load_feature_pack_metadata(&root.dir().join(METADATA_FILE))?;
            entries.push(feature_pack_entry(coordinates, &package, root.dir()));

            catalog.register_reference_root(root);
            let summary = catalog.aggregate(package, self.descriptions)?;
            tracing::info!(
                feature_pack = %coordinates,
                inserted = summary.inserted,
                merged = summary.merged,
                skipped = summary.skipped,
                addresses_resolved = summary.addresses.resolved,
                addresses_removed = summary.addresses.removed,
                "aggregated"
            );
        }

        Ok(CatalogDocument {
            description: format!(
                "{} {} {}",
                variant.description, self.version, self.metadata.description
            ),
            documentation: self.metadata.documentation.clone(),
            legend: self.metadata.legend.clone(),
            feature_packs: entries,
            categories: catalog.into_categories(),
        })
    }
}

/// Package-level entry; the optional references are set only when the
/// matching files were shipped in the documentation archive.
pub fn feature_pack_entry(
    coordinates: &Coordinates,
    package: &FeaturePackMetadata,
    package_dir: &Path,
) -> FeaturePackEntry {
    let dir_name = coordinates.directory_name();
    let model_reference = package_dir
        .join(MANAGEMENT_API_FILE)
        .exists()
        .then(|| format!("{FEATURE_PACKS_DIR}/{dir_name}/doc/reference/index.html"));
    let log_messages_reference = package_dir
        .join("doc")
        .join(LOG_MESSAGES_FILE)
        .exists()
        .then(|| format!("{FEATURE_PACKS_DIR}/{dir_name}/doc/{LOG_MESSAGES_FILE}"));
    FeaturePackEntry {
        coordinates: coordinates.clone(),
        name: package.name.clone(),
        description: package.description.clone(),
        licenses: package.licenses.clone().filter(|v| !v.is_null()),
        project_url: package.url.clone(),
        scm_url: package.scm_url.clone(),
        layers: package.documented_layer_names(),
        model_reference,
        log_messages_reference,
    }
}

fn write_document(path: &Path, document: &CatalogDocument) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(document)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}
