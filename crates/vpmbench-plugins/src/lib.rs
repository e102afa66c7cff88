//! vpmbench-plugins: Plugin manifests, discovery, cutoffs and invocation strategies.
//!
//! A plugin is one prioritization method described by a `manifest.yaml`. The registry
//! turns manifests into immutable [`Plugin`] descriptors; the invocation strategies run
//! a plugin against an evaluation dataset either in-process / as a local program
//! (native mode) or inside a container (container mode).

pub mod error;
pub mod cutoff;
pub mod formats;
pub mod manifest;
pub mod plugin;
pub mod registry;
pub mod selector;
pub mod scorer;
pub mod invoke;

pub use cutoff::{classify, Boundary, Cutoff};
pub use error::{ExecutionError, ManifestError};
pub use invoke::runtime::{ContainerOutcome, ContainerRuntime, ContainerSpec, DockerCli, Mount};
pub use formats::{Column, InputFormat, OutputFormat};
pub use invoke::{ContainerStrategy, Invokers, InvocationStrategy, NativeStrategy};
pub use manifest::{load_plugin, parse_plugin};
pub use plugin::{ContainerEntryPoint, ContainerFile, EntryPoint, NativeEntryPoint, Plugin};
pub use registry::{Discovery, PluginRegistry, RejectedManifest};
pub use scorer::{Scorer, ScorerCatalog};
pub use selector::{predicates, select, PluginPredicate};
