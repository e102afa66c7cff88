use std::fmt;

use serde::Serialize;

/// Lifecycle of one run. Strictly forward; a plugin failure during dispatch never
/// moves the run to a failure state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum EngineState {
    Idle,
    Extracted,
    PluginsLoaded,
    Dispatching,
    Merged,
    Reported,
    Done,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
