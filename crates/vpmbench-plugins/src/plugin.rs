//! Immutable plugin descriptors.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use vpmbench_common::{ReferenceGenome, VariationType};

use crate::cutoff::Cutoff;
use crate::formats::{InputFormat, OutputFormat};

/// One prioritization method, built from a single manifest.
///
/// Plugins are rebuilt on every discovery call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugin {
    pub name: String,
    pub version: Option<String>,
    pub supported_variations: BTreeSet<VariationType>,
    pub reference_genomes: BTreeSet<ReferenceGenome>,
    pub supported_chromosomes: BTreeSet<String>,
    pub cutoff: Cutoff,
    /// Informational only: training databases and their versions.
    pub databases: BTreeMap<String, String>,
    pub entry_point: EntryPoint,
    /// Directory holding the manifest; relative paths resolve against it.
    pub manifest_root: PathBuf,
    pub manifest_path: PathBuf,
}

impl Plugin {
    /// Name of the merged score column for this plugin.
    pub fn score_column(&self) -> String {
        format!("{}_SCORE", self.name)
    }

    /// Name of the merged predicted-class column for this plugin.
    pub fn class_column(&self) -> String {
        format!("{}_CLASS", self.name)
    }

    pub fn is_multiclass(&self) -> bool {
        self.cutoff.is_multiclass()
    }

    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.manifest_root.join(relative)
    }
}

/// How a plugin is run. Resolved once when the manifest is loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode")]
pub enum EntryPoint {
    Native(NativeEntryPoint),
    Container(ContainerEntryPoint),
}

impl EntryPoint {
    /// The literal mode token used in manifests.
    pub fn mode(&self) -> &'static str {
        match self {
            EntryPoint::Native(_) => "Python",
            EntryPoint::Container(_) => "Docker",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NativeEntryPoint {
    /// The `file` value exactly as the manifest declares it.
    pub declared: String,
    /// `declared` resolved against the manifest root.
    pub file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerEntryPoint {
    pub image: String,
    pub input: ContainerFile<InputFormat>,
    pub output: ContainerFile<OutputFormat>,
    /// Host path (absolute, resolved against the manifest root) → container path.
    pub bindings: Vec<(PathBuf, String)>,
    pub run: String,
}

/// A file on the container I/O contract: where it lives inside the container and how it
/// is encoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerFile<F> {
    pub file_path: String,
    pub format: F,
}
