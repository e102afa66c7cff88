//! Containerized strategy: convert, mount, run, read back.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};
use uuid::Uuid;
use vpmbench_common::{EvaluationData, ScoreTable};

use super::runtime::{ContainerRuntime, ContainerSpec, Mount};
use super::InvocationStrategy;
use crate::error::ExecutionError;
use crate::plugin::{EntryPoint, Plugin};

pub struct ContainerStrategy {
    runtime: Arc<dyn ContainerRuntime>,
    timeout: Option<Duration>,
}

impl ContainerStrategy {
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { runtime, timeout: None }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Container names only allow `[a-zA-Z0-9_.-]`.
fn container_name(plugin: &str) -> String {
    let slug: String = plugin
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') { c } else { '-' })
        .collect();
    format!("vpmbench-{slug}-{}", Uuid::new_v4())
}

#[async_trait]
impl InvocationStrategy for ContainerStrategy {
    #[instrument(skip_all, fields(plugin = %plugin.name))]
    async fn invoke(&self, plugin: &Plugin, data: &Arc<EvaluationData>) -> Result<ScoreTable, ExecutionError> {
        let EntryPoint::Container(entry) = &plugin.entry_point else {
            return Err(ExecutionError::Unavailable(format!("'{}' is not a container plugin", plugin.name)));
        };

        // Each invocation owns its scratch directory; it is removed when `scratch` drops.
        let scratch = tempfile::Builder::new().prefix("vpmbench-").tempdir()?;
        let input_path = scratch.path().join(format!("input.{}", entry.input.format.extension()));
        let output_path = scratch.path().join("output");
        entry.input.format.write(data.rows(), &input_path)?;
        // Bind-mounting a file requires it to exist on the host.
        tokio::fs::File::create(&output_path).await?;

        let mut mounts = vec![
            Mount::read_only(&input_path, entry.input.file_path.clone()),
            Mount::read_write(&output_path, entry.output.file_path.clone()),
        ];
        mounts.extend(
            entry
                .bindings
                .iter()
                .map(|(host, target)| Mount::read_write(host, target.clone())),
        );

        let spec = ContainerSpec {
            image: entry.image.clone(),
            command: entry.run.clone(),
            mounts,
            name: container_name(&plugin.name),
            timeout: self.timeout,
        };
        debug!(runtime = self.runtime.name(), container = %spec.name, image = %spec.image, "Invoking container plugin");

        let outcome = self.runtime.run(&spec).await?;
        if !outcome.success() {
            warn!(status = outcome.exit_code, "Container exited with a failure status");
            return Err(ExecutionError::NonZeroExit {
                status: outcome.exit_code,
                output: outcome.output.trim().to_string(),
            });
        }

        if tokio::fs::metadata(&output_path).await?.len() == 0 {
            return Err(ExecutionError::MalformedOutput(format!(
                "{} was left empty",
                entry.output.file_path
            )));
        }
        entry.output.format.read(&output_path, data.rows())
    }
}
