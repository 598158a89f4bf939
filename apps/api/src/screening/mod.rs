// Screening pipeline: similarity + per-requirement matching + aggregation,
// fanned out over candidates by the orchestrator.
// All model calls go through `ModelGate` (concurrency cap + timeout).

pub mod aggregator;
pub mod gate;
pub mod handlers;
pub mod matcher;
pub mod orchestrator;
pub mod prompts;
pub mod similarity;
