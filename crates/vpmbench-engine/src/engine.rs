//! Bounded-parallel plugin dispatch.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use vpmbench_common::{BenchConfig, EvaluationData, ScoreTable};
use vpmbench_plugins::{ExecutionError, InvocationStrategy, Plugin};

use crate::state::EngineState;

#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Maximum number of plugins invoked at once (at least 1)
    pub parallelism: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from_config(&BenchConfig::default())
    }
}

impl EngineOptions {
    pub fn from_config(config: &BenchConfig) -> Self {
        Self { parallelism: config.execution.workers() }
    }

    pub fn with_parallelism(parallelism: usize) -> Self {
        Self { parallelism: parallelism.max(1) }
    }
}

/// Result of invoking one plugin.
#[derive(Debug)]
pub struct PluginOutcome {
    pub plugin: Plugin,
    pub result: Result<ScoreTable, ExecutionError>,
}

/// Runs plugins through an [`InvocationStrategy`] and tracks the run state.
pub struct ExecutionEngine {
    invoker: Arc<dyn InvocationStrategy>,
    options: EngineOptions,
    state: EngineState,
}

impl ExecutionEngine {
    pub fn new(invoker: Arc<dyn InvocationStrategy>, options: EngineOptions) -> Self {
        Self { invoker, options, state: EngineState::Idle }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    pub(crate) fn advance(&mut self, next: EngineState) {
        debug_assert!(next > self.state, "engine state may only move forward");
        debug!(from = %self.state, to = %next, "Engine state transition");
        self.state = next;
    }

    /// Invoke every plugin against `data`, at most `parallelism` at a time.
    ///
    /// Each invocation is independent: a failure (or panic) is recorded against that
    /// plugin only. Outcomes are returned in the order of `plugins`, regardless of
    /// completion order.
    pub async fn dispatch(&mut self, plugins: Vec<Plugin>, data: Arc<EvaluationData>) -> Vec<PluginOutcome> {
        self.advance(EngineState::Dispatching);
        let parallelism = self.options.parallelism.max(1);
        info!(plugins = plugins.len(), parallelism, "Dispatching plugins");

        let semaphore = Arc::new(Semaphore::new(parallelism));
        let mut handles = Vec::with_capacity(plugins.len());
        for plugin in plugins {
            let invoker = Arc::clone(&self.invoker);
            let data = Arc::clone(&data);
            let semaphore = Arc::clone(&semaphore);
            let task_plugin = plugin.clone();
            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| ExecutionError::Unavailable("dispatcher shut down".to_string()))?;
                let started = Instant::now();
                let result = invoker.invoke(&task_plugin, &data).await;
                debug!(plugin = %task_plugin.name, elapsed_ms = started.elapsed().as_millis() as u64, ok = result.is_ok(), "Plugin finished");
                result
            });
            handles.push((plugin, handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (plugin, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(ExecutionError::ScorerFault(format!("invocation task failed: {e}"))),
            };
            if let Err(e) = &result {
                warn!(plugin = %plugin.name, kind = e.kind(), error = %e, "Plugin failed");
            }
            outcomes.push(PluginOutcome { plugin, result });
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use vpmbench_test_utils::{sample_dataset, PluginTree};
    use vpmbench_plugins::PluginRegistry;

    use super::*;

    /// Tracks how many invocations run at once.
    #[derive(Default)]
    struct Gauge {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl InvocationStrategy for Gauge {
        async fn invoke(&self, plugin: &Plugin, data: &Arc<EvaluationData>) -> Result<ScoreTable, ExecutionError> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            if plugin.name == "p3" {
                return Err(ExecutionError::NonZeroExit { status: 1, output: "boom".to_string() });
            }
            Ok(data.uids().map(|uid| (uid, 0.5)).collect())
        }
    }

    fn plugins(n: usize) -> (PluginTree, Vec<Plugin>) {
        let tree = PluginTree::new();
        for i in 0..n {
            tree.native(&format!("p{i}"), "");
        }
        let plugins = PluginRegistry::discover_at(tree.path()).unwrap();
        (tree, plugins)
    }

    #[tokio::test]
    async fn test_parallelism_is_bounded() {
        let (_tree, plugins) = plugins(6);
        let gauge = Arc::new(Gauge::default());
        let mut engine = ExecutionEngine::new(gauge.clone(), EngineOptions::with_parallelism(2));
        let outcomes = engine.dispatch(plugins, Arc::new(sample_dataset())).await;

        assert_eq!(outcomes.len(), 6);
        assert!(gauge.peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(engine.state(), EngineState::Dispatching);
    }

    #[tokio::test]
    async fn test_failures_stay_with_their_plugin() {
        let (_tree, plugins) = plugins(5);
        let mut engine = ExecutionEngine::new(Arc::new(Gauge::default()), EngineOptions::with_parallelism(8));
        let outcomes = engine.dispatch(plugins, Arc::new(sample_dataset())).await;

        let failed: Vec<&str> = outcomes
            .iter()
            .filter(|o| o.result.is_err())
            .map(|o| o.plugin.name.as_str())
            .collect();
        assert_eq!(failed, vec!["p3"]);
        let names: Vec<&str> = outcomes.iter().map(|o| o.plugin.name.as_str()).collect();
        assert_eq!(names, vec!["p0", "p1", "p2", "p3", "p4"]);
    }

    #[test]
    fn test_options() {
        assert_eq!(EngineOptions::with_parallelism(0).parallelism, 1);
        assert!(EngineOptions::default().parallelism >= 1);
    }
}
