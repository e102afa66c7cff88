//! Native strategy.
//!
//! A registered [`Scorer`] runs in-process on the blocking pool, which doubles as the
//! fault boundary: a panicking scorer surfaces as a `JoinError`. Without a registered
//! scorer the entry file is executed as a local program that reads
//! `UID,CHROM,POS,REF,ALT,RG,TYPE` CSV on stdin and prints `UID,SCORE` CSV on stdout.

use std::any::Any;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::task::JoinError;
use tracing::{debug, instrument};
use vpmbench_common::{EvaluationData, ScoreRow, ScoreTable, VariantRow};

use super::InvocationStrategy;
use crate::error::ExecutionError;
use crate::plugin::{EntryPoint, Plugin};
use crate::scorer::{Scorer, ScorerCatalog};

#[derive(Debug, Clone, Default)]
pub struct NativeStrategy {
    catalog: ScorerCatalog,
    timeout: Option<Duration>,
}

impl NativeStrategy {
    pub fn new(catalog: ScorerCatalog) -> Self {
        Self { catalog, timeout: None }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    async fn in_process(&self, scorer: Arc<dyn Scorer>, data: &Arc<EvaluationData>) -> Result<ScoreTable, ExecutionError> {
        let data = Arc::clone(data);
        let handle = tokio::task::spawn_blocking(move || scorer.score(data.rows()));
        // A timed-out scorer thread cannot be stopped; it is left to finish on its own.
        let joined = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, handle)
                .await
                .map_err(|_| ExecutionError::Timeout(limit))?,
            None => handle.await,
        };
        match joined {
            Ok(Ok(table)) => Ok(table),
            Ok(Err(e)) => Err(ExecutionError::ScorerFault(format!("{e:#}"))),
            Err(e) if e.is_panic() => Err(ExecutionError::ScorerFault(format!(
                "scorer panicked: {}",
                panic_message(e.into_panic())
            ))),
            Err(e) => Err(ExecutionError::ScorerFault(e.to_string())),
        }
    }

    async fn program(&self, file: &Path, workdir: &Path, data: &EvaluationData) -> Result<ScoreTable, ExecutionError> {
        let input = rows_to_csv(data.rows())?;
        let mut child = Command::new(file)
            .current_dir(workdir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExecutionError::Unavailable(format!("cannot execute {}: {e}", file.display())))?;

        // Feed stdin concurrently so a program that writes before it has read everything
        // cannot deadlock against us.
        let feeder = child.stdin.take().map(|mut stdin| {
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(&input).await {
                    debug!(error = %e, "Scoring program closed stdin early");
                }
            })
        });

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| ExecutionError::Timeout(limit))?,
            None => child.wait_with_output().await,
        }?;
        if let Some(feeder) = feeder {
            feeder_outcome(feeder.await)?;
        }

        if !output.status.success() {
            return Err(ExecutionError::NonZeroExit {
                status: output.status.code().unwrap_or(-1),
                output: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        parse_score_csv(&output.stdout)
    }
}

#[async_trait]
impl InvocationStrategy for NativeStrategy {
    #[instrument(skip_all, fields(plugin = %plugin.name))]
    async fn invoke(&self, plugin: &Plugin, data: &Arc<EvaluationData>) -> Result<ScoreTable, ExecutionError> {
        let EntryPoint::Native(entry) = &plugin.entry_point else {
            return Err(ExecutionError::Unavailable(format!("'{}' is not a native plugin", plugin.name)));
        };
        match self.catalog.lookup(entry) {
            Some(scorer) => {
                debug!(entry = %entry.declared, "Calling in-process scorer");
                self.in_process(scorer, data).await
            }
            None => {
                debug!(file = %entry.file.display(), "Running scoring program");
                self.program(&entry.file, &plugin.manifest_root, data).await
            }
        }
    }
}

fn rows_to_csv(rows: &[VariantRow]) -> Result<Vec<u8>, ExecutionError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row).map_err(|e| ExecutionError::Io(e.into()))?;
    }
    writer.into_inner().map_err(|e| ExecutionError::Io(e.into_error()))
}

/// Parse a `UID,SCORE` CSV document.
pub fn parse_score_csv(bytes: &[u8]) -> Result<ScoreTable, ExecutionError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(bytes);
    reader
        .deserialize::<ScoreRow>()
        .map(|row| {
            row.map(|r| (r.uid, r.score))
                .map_err(|e| ExecutionError::MalformedOutput(e.to_string()))
        })
        .collect()
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// A write error is already logged by the feeder; only a failed feeder task is fatal.
fn feeder_outcome(joined: Result<(), JoinError>) -> Result<(), ExecutionError> {
    joined.map_err(|e| {
        debug!(error = %e, "Stdin feeder task failed");
        let reason = if e.is_panic() { panic_message(e.into_panic()) } else { e.to_string() };
        ExecutionError::ScorerFault(format!("stdin feeder failed: {reason}"))
    })
}
