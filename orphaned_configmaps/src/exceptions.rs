//! Allowlist of ConfigMaps that are unused on purpose.
//!
//! The file is operator-maintained plain text, one entry per line:
//!
//! ```text
//! # configmap,namespace,justification
//! kube-root-ca.crt,default,created by the control plane
//! foo,team-a,approved by ops, see ticket 123
//! ```
//!
//! Only the first two commas separate fields, the justification keeps the
//! rest. Lines with fewer than three fields are skipped.

use std::{collections::BTreeSet, fs, path::Path};

use anyhow::Context;
use log::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionEntry {
    pub config_map_name: String,
    pub namespace: String,
    pub justification: String,
}

impl ExceptionEntry {
    /// Parses a single allowlist line. Returns `None` for blank lines,
    /// comments, and lines without three fields.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let mut fields = line.splitn(3, ',');
        let config_map_name = fields.next()?.trim();
        let namespace = fields.next()?.trim();
        let justification = fields.next()?.trim();

        Some(ExceptionEntry {
            config_map_name: config_map_name.to_owned(),
            namespace: namespace.to_owned(),
            justification: justification.to_owned(),
        })
    }
}

/// Loaded once at startup and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct ExceptionRegistry {
    entries: Vec<ExceptionEntry>,
}

impl ExceptionRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn parse(source: &str) -> Self {
        let mut entries = Vec::new();
        for (idx, line) in source.lines().enumerate() {
            match ExceptionEntry::parse_line(line) {
                Some(entry) => entries.push(entry),
                None => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() && !trimmed.starts_with('#') {
                        debug!("skipping malformed exception on line {}: {:?}", idx + 1, line);
                    }
                }
            }
        }
        ExceptionRegistry { entries }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("when reading exceptions file {}", path.display()))?;
        let registry = Self::parse(&source);
        debug!("loaded {} exceptions from {}", registry.len(), path.display());
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// ConfigMap names excepted in exactly `namespace`.
    pub fn for_namespace(&self, namespace: &str) -> BTreeSet<String> {
        self.entries
            .iter()
            .filter(|e| e.namespace == namespace)
            .map(|e| e.config_map_name.clone())
            .collect()
    }

    pub fn justification(&self, config_map_name: &str, namespace: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.config_map_name == config_map_name && e.namespace == namespace)
            .map(|e| e.justification.as_str())
    }
}
