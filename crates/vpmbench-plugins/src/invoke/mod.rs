//! Invocation Strategies: run one plugin against a dataset and get its scores back.

pub mod container;
pub mod native;
pub mod runtime;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use vpmbench_common::{EvaluationData, ScoreTable};

use crate::error::ExecutionError;
use crate::plugin::{EntryPoint, Plugin};
use crate::scorer::ScorerCatalog;

pub use container::ContainerStrategy;
pub use native::NativeStrategy;
use runtime::ContainerRuntime;

/// "Run this plugin against this dataset and return its `UID → SCORE` table."
///
/// The returned table is not yet checked against the dataset; the engine does that when
/// merging.
#[async_trait]
pub trait InvocationStrategy: Send + Sync {
    async fn invoke(&self, plugin: &Plugin, data: &Arc<EvaluationData>) -> Result<ScoreTable, ExecutionError>;
}

/// Routes each plugin to the strategy its entry point names.
#[derive(Clone)]
pub struct Invokers {
    native: Arc<dyn InvocationStrategy>,
    container: Arc<dyn InvocationStrategy>,
}

impl std::fmt::Debug for Invokers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invokers").finish_non_exhaustive()
    }
}

impl Invokers {
    /// The standard pair: in-process/local-program for native plugins, `runtime` for
    /// container plugins, both under the same optional deadline.
    pub fn new(catalog: ScorerCatalog, runtime: Arc<dyn ContainerRuntime>, timeout: Option<Duration>) -> Self {
        Self {
            native: Arc::new(NativeStrategy::new(catalog).with_timeout(timeout)),
            container: Arc::new(ContainerStrategy::new(runtime).with_timeout(timeout)),
        }
    }

    pub fn from_strategies(native: Arc<dyn InvocationStrategy>, container: Arc<dyn InvocationStrategy>) -> Self {
        Self { native, container }
    }
}

#[async_trait]
impl InvocationStrategy for Invokers {
    async fn invoke(&self, plugin: &Plugin, data: &Arc<EvaluationData>) -> Result<ScoreTable, ExecutionError> {
        match plugin.entry_point {
            EntryPoint::Native(_) => self.native.invoke(plugin, data).await,
            EntryPoint::Container(_) => self.container.invoke(plugin, data).await,
        }
    }
}
