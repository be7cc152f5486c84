use anyhow::{Context, Result};
use layer_catalog::{CatalogMetadata, Coordinates, MirrorDocSource};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary documentation mirror plus an output directory.
pub struct Fixture {
    tmp: TempDir,
}

impl Fixture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            tmp: TempDir::new().context("failed to allocate fixture dir")?,
        })
    }

    pub fn mirror_root(&self) -> PathBuf {
        self.tmp.path().join("mirror")
    }

    pub fn output_root(&self) -> PathBuf {
        self.tmp.path().join("out")
    }

    pub fn source(&self) -> MirrorDocSource {
        MirrorDocSource::new(self.mirror_root())
    }

    /// Publish a feature pack in the mirror: its `metadata.json` plus empty
    /// reference pages at the given paths under `doc/reference/`.
    pub fn add_pack(&self, coords: &str, name: &str, layers: Value, pages: &[&str]) -> Result<()> {
        let coordinates = Coordinates::parse(coords)?;
        let dir = self.source().package_dir(&coordinates);
        let metadata = json!({
            "groupId": coordinates.group_id,
            "artifactId": coordinates.artifact_id,
            "version": coordinates.version,
            "name": name,
            "description": format!("{name} feature pack"),
            "url": format!("https://example.org/{name}"),
            "scm-url": format!("https://example.org/{name}.git"),
            "licenses": [{"name": "Apache-2.0"}],
            "layers": layers
        });
        write_json(&dir.join("doc/META-INF/metadata.json"), &metadata)?;
        for page in pages {
            write_file(&dir.join("doc/reference").join(page), "<html/>")?;
        }
        Ok(())
    }

    /// Add an arbitrary file to a published pack.
    pub fn add_file(&self, coords: &str, relative: &str, contents: &str) -> Result<()> {
        let coordinates = Coordinates::parse(coords)?;
        write_file(&self.source().package_dir(&coordinates).join(relative), contents)
    }

    /// Write a catalog metadata file listing `variants` and load it back.
    pub fn metadata(&self, variants: Value) -> Result<CatalogMetadata> {
        let path = self.tmp.path().join("catalog-metadata.json");
        write_json(
            &path,
            &json!({
                "description": "Layer Catalog",
                "documentation": {"url": "https://docs.example.org"},
                "legend": {"preview": "Preview stability"},
                "variants": variants
            }),
        )?;
        CatalogMetadata::load(&path)
    }
}

pub fn category<'a>(document: &'a Value, name: &str) -> Option<&'a Value> {
    document["categories"]
        .as_array()?
        .iter()
        .find(|c| c["name"] == name)
}

pub fn layer<'a>(document: &'a Value, category_name: &str, layer_name: &str) -> Option<&'a Value> {
    category(document, category_name)?["functionalities"]
        .as_array()?
        .iter()
        .find(|l| l["name"] == layer_name)
}

pub fn read_json(path: &Path) -> Result<Value> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(serde_json::from_str(&data)?)
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    write_file(path, &serde_json::to_string_pretty(value)?)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
}
