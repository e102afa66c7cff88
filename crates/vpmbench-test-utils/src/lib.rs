//! Shared fixtures for vpmbench tests: the sample dataset, on-disk plugin trees, a fake
//! container runtime and stub scorers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use vpmbench_common::{EvaluationData, EvaluationDataEntry, ReferenceGenome, ScoreTable, VariantRow, VariationType};
use vpmbench_plugins::{ContainerOutcome, ContainerRuntime, ContainerSpec, ExecutionError, Scorer};

// ── Sample dataset ───────────────────────────────────────────────────────────

/// The nine-variant sample: five pathogenic and four benign hg19 SNPs.
pub fn sample_entries() -> Vec<EvaluationDataEntry> {
    let rows = [
        ("1", 865_694, "C", "T", "pathogenic"),
        ("1", 1_014_143, "C", "T", "benign"),
        ("2", 47_630_108, "G", "A", "pathogenic"),
        ("3", 37_035_039, "A", "G", "benign"),
        ("7", 117_199_644, "T", "C", "pathogenic"),
        ("11", 108_098_576, "G", "T", "benign"),
        ("13", 32_890_572, "G", "A", "pathogenic"),
        ("17", 41_197_708, "T", "G", "pathogenic"),
        ("X", 153_296_777, "C", "T", "benign"),
    ];
    rows.iter()
        .map(|(chrom, pos, r, a, class)| {
            EvaluationDataEntry::new(*chrom, *pos, *r, *a, ReferenceGenome::Hg19, VariationType::Snp, *class)
        })
        .collect()
}

pub fn sample_dataset() -> EvaluationData {
    EvaluationData::from_records(sample_entries()).expect("sample dataset is valid")
}

/// A `CHROM,POS,REF,ALT,SCORE` document scoring every row of `data` with `score(row)`.
pub fn variant_score_csv(data: &EvaluationData, score: impl Fn(&VariantRow) -> f64) -> String {
    let mut out = String::from("CHROM,POS,REF,ALT,SCORE\n");
    for row in data.rows() {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            row.chrom,
            row.pos,
            row.ref_allele,
            row.alt_allele,
            score(row)
        ));
    }
    out
}

// ── Plugin trees ─────────────────────────────────────────────────────────────

/// A temporary plugin directory that manifests can be written into.
pub struct PluginTree {
    dir: TempDir,
}

impl PluginTree {
    pub fn new() -> Self {
        Self { dir: TempDir::new().expect("create temp plugin tree") }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `manifest` into `<root>/<dir>/manifest.yaml` and return its path.
    pub fn manifest(&self, dir: &str, manifest: &str) -> PathBuf {
        let dir = self.path().join(dir);
        std::fs::create_dir_all(&dir).expect("create plugin dir");
        let path = dir.join("manifest.yaml");
        std::fs::write(&path, manifest).expect("write manifest");
        path
    }

    /// A native plugin whose entry file is `<name>.py` (an empty placeholder, meant to be
    /// backed by a registered scorer). `extra` is appended to the manifest verbatim.
    pub fn native(&self, name: &str, extra: &str) -> PathBuf {
        let file = format!("{name}.py");
        let path = self.manifest(
            name,
            &format!(
                "name: {name}\nversion: '1.0'\nsupported-variations: [SNP]\nreference-genomes: [hg19]\n\
                 entry-point:\n  mode: Python\n  file: {file}\n{extra}"
            ),
        );
        std::fs::write(self.path().join(name).join(&file), "").expect("write entry file");
        path
    }

    /// A native plugin backed by an executable shell script.
    #[cfg(unix)]
    pub fn native_program(&self, name: &str, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.manifest(
            name,
            &format!(
                "name: {name}\nsupported-variations: [SNP]\nreference-genomes: [hg19]\n\
                 entry-point:\n  mode: Python\n  file: score.sh\n"
            ),
        );
        let script_path = self.path().join(name).join("score.sh");
        std::fs::write(&script_path, format!("#!/bin/sh\n{script}\n")).expect("write script");
        let mut perms = std::fs::metadata(&script_path).expect("stat script").permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script_path, perms).expect("chmod script");
        path
    }

    /// A container plugin using `image`, CSV in and CSV out keyed on the variant columns.
    pub fn container(&self, name: &str, image: &str, extra: &str) -> PathBuf {
        self.manifest(
            name,
            &format!(
                "name: {name}\nsupported-variations: [SNP, INDEL]\nreference-genomes: [hg19]\n\
                 entry-point:\n  mode: Docker\n  image: {image}\n\
                 \x20 input: {{file-path: /data/input.csv, format: CSV}}\n\
                 \x20 output: {{file-path: /data/output.csv, format: CSV}}\n\
                 \x20 run: score /data/input.csv /data/output.csv\n{extra}"
            ),
        )
    }
}

impl Default for PluginTree {
    fn default() -> Self {
        Self::new()
    }
}

// ── Fake container runtime ───────────────────────────────────────────────────

/// What the fake runtime does for one image.
#[derive(Debug, Clone)]
pub enum FakeContainer {
    /// Write `output` into the writable file mount and exit 0.
    Succeed { output: String },
    /// Exit with `status` and `output` without touching the output file.
    Fail { status: i32, output: String },
    /// Behave as if the image could not be found or pulled.
    Missing,
    /// Never finish on its own; only a deadline ends it.
    Hang,
}

/// [`ContainerRuntime`] double that records every spec it is asked to run.
#[derive(Default)]
pub struct FakeContainerRuntime {
    containers: HashMap<String, FakeContainer>,
    calls: Mutex<Vec<ContainerSpec>>,
}

impl FakeContainerRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, image: impl Into<String>, behaviour: FakeContainer) -> Self {
        self.containers.insert(image.into(), behaviour);
        self
    }

    pub fn calls(&self) -> Vec<ContainerSpec> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl ContainerRuntime for FakeContainerRuntime {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn run(&self, spec: &ContainerSpec) -> Result<ContainerOutcome, ExecutionError> {
        self.calls.lock().expect("calls lock").push(spec.clone());
        match self.containers.get(&spec.image).cloned().unwrap_or(FakeContainer::Missing) {
            FakeContainer::Succeed { output } => {
                let target = spec
                    .mounts
                    .iter()
                    .find(|m| !m.read_only && m.source.is_file())
                    .ok_or_else(|| ExecutionError::MalformedOutput("no writable file mount".to_string()))?;
                std::fs::write(&target.source, output)?;
                Ok(ContainerOutcome { exit_code: 0, output: String::new() })
            }
            FakeContainer::Fail { status, output } => Ok(ContainerOutcome { exit_code: status, output }),
            FakeContainer::Missing => Err(ExecutionError::Unavailable(format!("image '{}' not found", spec.image))),
            FakeContainer::Hang => {
                let limit = spec.timeout.unwrap_or(Duration::from_secs(3600));
                tokio::time::sleep(limit).await;
                Err(ExecutionError::Timeout(limit))
            }
        }
    }
}

// ── Scorers ──────────────────────────────────────────────────────────────────

/// Scores every row with the same value, optionally after a delay.
#[derive(Debug, Clone)]
pub struct ConstantScorer {
    pub score: f64,
    pub delay: Duration,
}

impl ConstantScorer {
    pub fn new(score: f64) -> Arc<Self> {
        Arc::new(Self { score, delay: Duration::ZERO })
    }

    pub fn delayed(score: f64, delay: Duration) -> Arc<Self> {
        Arc::new(Self { score, delay })
    }
}

impl Scorer for ConstantScorer {
    fn score(&self, rows: &[VariantRow]) -> anyhow::Result<ScoreTable> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        Ok(rows.iter().map(|r| (r.uid, self.score)).collect())
    }
}

/// Scores each row with `uid / n`, giving a strictly increasing score per row.
#[derive(Debug, Clone, Copy)]
pub struct RampScorer;

impl Scorer for RampScorer {
    fn score(&self, rows: &[VariantRow]) -> anyhow::Result<ScoreTable> {
        let n = rows.len().max(1) as f64;
        Ok(rows.iter().map(|r| (r.uid, r.uid as f64 / n)).collect())
    }
}

/// Panics on every call.
#[derive(Debug, Clone, Copy)]
pub struct PanickingScorer;

impl Scorer for PanickingScorer {
    fn score(&self, _rows: &[VariantRow]) -> anyhow::Result<ScoreTable> {
        panic!("scorer exploded")
    }
}

/// Returns a table that omits the last row.
#[derive(Debug, Clone, Copy)]
pub struct TruncatingScorer;

impl Scorer for TruncatingScorer {
    fn score(&self, rows: &[VariantRow]) -> anyhow::Result<ScoreTable> {
        let keep = rows.len().saturating_sub(1);
        Ok(rows.iter().take(keep).map(|r| (r.uid, 0.5)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_dataset_shape() {
        let data = sample_dataset();
        assert_eq!(data.len(), 9);
        let pathogenic = data.expected_classes().iter().filter(|c| *c == "pathogenic").count();
        assert_eq!(pathogenic, 5);
    }

    #[test]
    fn test_plugin_tree_writes_entry_file() {
        let tree = PluginTree::new();
        let manifest = tree.native("Constant", "cutoff: 0.5\n");
        assert!(manifest.is_file());
        assert!(tree.path().join("Constant/Constant.py").is_file());
    }
}
