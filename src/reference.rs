//! Rewrites management-model addresses into model reference links.
//!
//! Layers embed fragments of the management model whose nodes carry an
//! `_address` such as `/subsystem=io/worker=*@@@task-max-threads`. Each
//! feature pack ships generated reference pages under `doc/reference/`, one
//! directory per resource. The resolver turns every address into the
//! relative URL of the page documenting it, or drops the address when no
//! materialized feature pack documents that resource.

use crate::catalog::Coordinates;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub const ADDRESS_FIELD: &str = "_address";

const SERVER_ROOT_ADDRESS: &str = "/server-root=/";
const ATTRIBUTE_MARKER: &str = "@@@";
const INDEX_PAGE: &str = "index.html";
const FEATURE_PACKS_DIR: &str = "featurePacks";
const JGROUPS_STACK: [&str; 3] = ["subsystem", "jgroups", "stack"];
// No reference pages are generated for these stack children.
const JGROUPS_UNDOCUMENTED: [&str; 2] = ["transport", "protocol"];

/// Format a raw management address as a reference page URL.
///
/// The result is relative (no leading `/`), ends with `index.html` and carries
/// an `#attribute` fragment when the address names an attribute. Input that is
/// already a page URL is returned unchanged.
pub fn format_address(raw: &str) -> String {
    if is_page_url(raw) {
        return raw.to_string();
    }
    let mut path = if raw == SERVER_ROOT_ADDRESS {
        String::new()
    } else {
        raw.replace("=*", "").replace('=', "/")
    };

    let attribute = match path.rfind(ATTRIBUTE_MARKER) {
        Some(idx) if idx > 0 => {
            let name = path[idx + ATTRIBUTE_MARKER.len()..].to_string();
            path.truncate(idx);
            Some(name)
        }
        _ => None,
    };

    if !path.ends_with('/') {
        path.push('/');
    }
    if is_undocumented_jgroups_child(&path) {
        path = format!("/{}/", JGROUPS_STACK.join("/"));
    }

    let mut url = path.trim_start_matches('/').to_string();
    url.push_str(INDEX_PAGE);
    if let Some(name) = attribute {
        url.push('#');
        url.push_str(&name);
    }
    url
}

fn is_page_url(candidate: &str) -> bool {
    let page = candidate.split('#').next().unwrap_or(candidate);
    page == INDEX_PAGE || page.ends_with(&format!("/{INDEX_PAGE}"))
}

// Matches `subsystem/jgroups/stack/[<stack>/](transport|protocol)[/<name>]` and
// nothing below it; children of a transport keep their own pages.
fn is_undocumented_jgroups_child(path: &str) -> bool {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let Some(rest) = segments.strip_prefix(&JGROUPS_STACK[..]) else {
        return false;
    };
    let undocumented = |idx: usize| {
        rest.get(idx)
            .is_some_and(|segment| JGROUPS_UNDOCUMENTED.contains(segment))
    };
    match rest.len() {
        1 => undocumented(0),
        2 => undocumented(0) || undocumented(1),
        3 => undocumented(1),
        _ => false,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Directory holding one feature pack's extracted documentation.
pub struct ReferenceRoot {
    name: String,
    dir: PathBuf,
}

impl ReferenceRoot {
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
        }
    }

    /// Root for a package materialized under `feature_packs_dir`.
    pub fn for_package(feature_packs_dir: &Path, coordinates: &Coordinates) -> Self {
        let name = coordinates.directory_name();
        let dir = feature_packs_dir.join(&name);
        Self { name, dir }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn reference_dir(&self) -> PathBuf {
        self.dir.join("doc").join("reference")
    }

    /// Look up a page inside this root.
    ///
    /// `Some(None)` means the page exists but is this root's own index page,
    /// which is never linked.
    fn lookup(&self, page: &str, url: &str) -> Option<Option<String>> {
        let reference_dir = self.reference_dir();
        let candidate = reference_dir.join(page);
        if !candidate.exists() {
            return None;
        }
        if candidate.parent() == Some(reference_dir.as_path()) {
            return Some(None);
        }
        Some(Some(format!(
            "{FEATURE_PACKS_DIR}/{}/doc/reference/{url}",
            self.name
        )))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Counts of addresses rewritten and removed during one walk.
pub struct ResolutionStats {
    pub resolved: usize,
    pub removed: usize,
}

impl ResolutionStats {
    pub fn absorb(&mut self, other: ResolutionStats) {
        self.resolved += other.resolved;
        self.removed += other.removed;
    }
}

/// Resolves addresses against an ordered list of reference roots.
pub struct ReferenceResolver<'a> {
    roots: &'a [ReferenceRoot],
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(roots: &'a [ReferenceRoot]) -> Self {
        Self { roots }
    }

    /// Find the documentation URL for a formatted page URL.
    ///
    /// Roots are probed in order; the first one holding the page decides. A
    /// hit on a root's own index page counts as a miss.
    pub fn find_url(&self, url: &str) -> Option<String> {
        let url = url.strip_prefix('/').unwrap_or(url);
        let page = url.split('#').next().unwrap_or(url);
        self.roots
            .iter()
            .find_map(|root| root.lookup(page, url))
            .flatten()
    }

    /// Rewrite every `_address` in `tree`, removing the ones that cannot be
    /// resolved. The whole tree is visited.
    pub fn resolve_tree(&self, tree: &mut Value) -> ResolutionStats {
        let mut stats = ResolutionStats::default();
        self.visit(tree, &mut stats);
        stats
    }

    fn visit(&self, node: &mut Value, stats: &mut ResolutionStats) {
        match node {
            Value::Array(items) => {
                for item in items {
                    self.visit(item, stats);
                }
            }
            Value::Object(fields) => {
                if let Some(raw) = fields.get(ADDRESS_FIELD) {
                    match self.resolve_address(raw) {
                        Some(url) => {
                            fields.insert(ADDRESS_FIELD.to_string(), Value::String(url));
                            stats.resolved += 1;
                        }
                        None => {
                            fields.remove(ADDRESS_FIELD);
                            stats.removed += 1;
                        }
                    }
                }
                for value in fields.values_mut() {
                    self.visit(value, stats);
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
        }
    }

    fn resolve_address(&self, raw: &Value) -> Option<String> {
        let Some(address) = raw.as_str() else {
            tracing::warn!(address = %raw, "non-string address removed");
            return None;
        };
        let url = format_address(address);
        let found = self.find_url(&url);
        if found.is_none() {
            tracing::warn!(%address, %url, "no reference page found, address removed");
        }
        found
    }
}
