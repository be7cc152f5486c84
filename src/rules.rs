//! Human-readable descriptions for discovery rules.
//!
//! The table is a Java-style `.properties` resource published alongside the
//! provisioning tooling. Keys are matched as prefixes of the rule property
//! name in declaration order, so more specific keys must be declared first.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

const VALUE_SUFFIX: &str = ".value";

#[derive(Clone, Debug, Default)]
/// Ordered key → text table.
pub struct RuleDescriptions {
    entries: Vec<(String, String)>,
}

/// Descriptions resolved for one rule key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleDescription {
    pub rule: Option<String>,
    pub value: Option<String>,
}

impl RuleDescriptions {
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Load a `.properties` file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    /// Parse `.properties` text. A later duplicate key replaces the earlier
    /// value but keeps the earlier position.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut entries: Vec<(String, String)> = Vec::new();
        for (line_no, line) in logical_lines(contents) {
            let (key, value) = split_entry(&line);
            let key = unescape(key).with_context(|| format!("line {line_no}: bad key escape"))?;
            let value =
                unescape(value).with_context(|| format!("line {line_no}: bad value escape"))?;
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value,
                None => entries.push((key, value)),
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Describe a rule: the first table key that prefixes `rule_key` wins.
    /// The value description is read from `<table key>.value`.
    pub fn describe(&self, rule_key: &str) -> RuleDescription {
        for (key, text) in &self.entries {
            if rule_key.starts_with(key.as_str()) {
                return RuleDescription {
                    rule: Some(text.clone()),
                    value: self.get(&format!("{key}{VALUE_SUFFIX}")).map(str::to_string),
                };
            }
        }
        RuleDescription::default()
    }
}

/// Join continuation lines and drop blanks and comments. Yields the 1-based
/// number of the first physical line of each entry.
fn logical_lines(contents: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut pending: Option<(usize, String)> = None;
    for (idx, raw) in contents.lines().enumerate() {
        let trimmed = raw.trim_start();
        let Some((start, mut acc)) = pending.take() else {
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }
            let mut line = trimmed.to_string();
            if continues(&line) {
                line.pop();
                pending = Some((idx + 1, line));
            } else {
                out.push((idx + 1, line));
            }
            continue;
        };
        acc.push_str(trimmed);
        if continues(&acc) {
            acc.pop();
            pending = Some((start, acc));
        } else {
            out.push((start, acc));
        }
    }
    if let Some(last) = pending {
        out.push(last);
    }
    out
}

// An odd number of trailing backslashes continues the entry on the next line.
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\u{c}' => {
                key_end = idx;
                break;
            }
            _ => {}
        }
    }
    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start_matches([' ', '\t', '\u{c}']);
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches([' ', '\t', '\u{c}']);
    }
    (key, rest)
}

fn unescape(raw: &str) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                if hex.len() != 4 {
                    bail!("truncated \\u escape");
                }
                let code = u32::from_str_radix(&hex, 16)
                    .with_context(|| format!("invalid \\u escape '{hex}'"))?;
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}
