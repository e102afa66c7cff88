//! Plugin Registry: recursive manifest discovery.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use vpmbench_common::{BenchError, Result};
use walkdir::WalkDir;

use crate::error::ManifestError;
use crate::manifest::{is_manifest, load_plugin};
use crate::plugin::Plugin;

/// A manifest that failed validation and was skipped.
#[derive(Debug)]
pub struct RejectedManifest {
    pub path: PathBuf,
    pub reason: ManifestError,
}

/// Result of a scan: the plugins that validated plus the manifests that did not.
#[derive(Debug, Default)]
pub struct Discovery {
    pub plugins: Vec<Plugin>,
    pub rejected: Vec<RejectedManifest>,
}

/// Builds [`Plugin`] descriptors from a directory tree of manifests.
///
/// Holds no plugins itself; every call rescans the tree.
#[derive(Debug, Clone)]
pub struct PluginRegistry {
    root: PathBuf,
}

impl PluginRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Shorthand for `PluginRegistry::new(root).discover()`.
    pub fn discover_at(root: impl Into<PathBuf>) -> Result<Vec<Plugin>> {
        Self::new(root).discover()
    }

    /// Valid plugins under the root, in manifest path order.
    ///
    /// Broken manifests are logged and skipped. Two plugins sharing a name is a
    /// [`BenchError::RegistryConflict`].
    pub fn discover(&self) -> Result<Vec<Plugin>> {
        Ok(self.scan()?.plugins)
    }

    /// Like [`discover`](Self::discover) but also returns the rejected manifests.
    pub fn scan(&self) -> Result<Discovery> {
        if !self.root.is_dir() {
            return Err(BenchError::Config(format!(
                "plugin directory {} does not exist",
                self.root.display()
            )));
        }

        let mut manifests: Vec<PathBuf> = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable entry in plugin directory");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && is_manifest(entry.path()))
            .map(|entry| entry.into_path())
            .collect();
        manifests.sort();

        let mut discovery = Discovery::default();
        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        for path in manifests {
            match load_plugin(&path) {
                Ok(plugin) => {
                    if let Some(first) = seen.get(&plugin.name) {
                        return Err(BenchError::RegistryConflict {
                            name: plugin.name,
                            first: first.clone(),
                            second: path,
                        });
                    }
                    debug!(plugin = %plugin.name, mode = plugin.entry_point.mode(), path = %path.display(), "Loaded plugin");
                    seen.insert(plugin.name.clone(), path);
                    discovery.plugins.push(plugin);
                }
                Err(reason) => {
                    warn!(path = %path.display(), error = %reason, "Skipping invalid plugin manifest");
                    discovery.rejected.push(RejectedManifest { path, reason });
                }
            }
        }

        info!(
            root = %self.root.display(),
            plugins = discovery.plugins.len(),
            rejected = discovery.rejected.len(),
            "Plugin discovery complete"
        );
        Ok(discovery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_native(root: &Path, dir: &str, name: &str) {
        let dir = root.join(dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("score.sh"), "").unwrap();
        std::fs::write(
            dir.join("manifest.yaml"),
            format!(
                "name: {name}\nsupported-variations: [SNP]\nreference-genomes: [hg19]\n\
                 entry-point: {{mode: Python, file: score.sh}}\n"
            ),
        )
        .unwrap();
    }

    #[test]
    fn test_broken_manifest_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_native(dir.path(), "a", "alpha");
        write_native(dir.path(), "nested/b", "beta");
        std::fs::create_dir_all(dir.path().join("broken")).unwrap();
        std::fs::write(dir.path().join("broken/manifest.yaml"), "version: 1\n").unwrap();

        let discovery = PluginRegistry::new(dir.path()).scan().unwrap();
        let names: Vec<&str> = discovery.plugins.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert_eq!(discovery.rejected.len(), 1);
        assert!(discovery.rejected[0].path.ends_with("broken/manifest.yaml"));
    }

    #[test]
    fn test_duplicate_names_conflict() {
        let dir = tempfile::tempdir().unwrap();
        write_native(dir.path(), "a", "same");
        write_native(dir.path(), "b", "same");
        let err = PluginRegistry::discover_at(dir.path()).unwrap_err();
        assert!(matches!(err, BenchError::RegistryConflict { name, .. } if name == "same"));
    }

    #[test]
    fn test_missing_root_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PluginRegistry::discover_at(dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, BenchError::Config(_)));
    }

    #[test]
    fn test_empty_tree() {
        let dir = tempfile::tempdir().unwrap();
        assert!(PluginRegistry::discover_at(dir.path()).unwrap().is_empty());
    }
}
