// src/core/mod.rs

// The `core` module holds everything that is independent of the terminal UI:
// data models, the finding taxonomy, scoring, and the scan engine itself.

/// Findings, grades, signals and the final `ScanResult`.
pub mod models;

/// The probes and the orchestrator that runs them concurrently.
pub mod scanner;

/// Static taxonomy mapping finding titles to a category and compliance codes.
pub mod knowledge_base;

/// Overall, per-category and compliance scoring.
pub mod scoring;

pub mod summary;

/// Network capabilities the probes consume.
pub mod transport;
