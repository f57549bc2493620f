mod engine;
mod handle;
mod state;
pub mod tolerance;

pub use engine::{
    normalize_url, ApplyOutcome, EngineSnapshot, MetricView, ReconciliationEngine,
    SourcePositions,
};
pub use handle::EngineHandle;
pub use state::{CombinationState, MetricState};
pub use tolerance::{tolerance, values_match};
