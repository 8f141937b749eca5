// src/core/mod.rs

/// Data structures shared across the scanner: check kinds, typed payloads,
/// results, score contributions and the final threat assessment.
pub mod models;

/// The single top-level page fetch a scan performs.
pub mod fetch;

/// Check execution and orchestration, grouped by scanner area.
pub mod scanner;

/// The scoring engine: per-check point rules, the per-URL session
/// accumulator and the weighted aggregation.
pub mod scoring;

/// Static table of scoring-eligible check kinds with their aggregation
/// weights and human-readable reasons.
pub mod knowledge_base;
