// src/ui/widgets/mod.rs

// One module per screen region.
pub mod analysis_view; // Findings list with a detail pane.
pub mod footer;
pub mod input;
pub mod summary; // Grade, category grades, compliance and signals.
