//! # Engine Module
//!
//! Stateful orchestration of template selection for one domain unit.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Iteration limits, loner trimming and structure exclusions
//! - **Data Sources** ([`sources`]) - Domain repository and structure sequence interfaces
//! - **Refinement** ([`refine`]) - The expand/contract boundary loop for one side
//! - **Selection** ([`select`]) - Candidate enumeration, ranking and two-phase selection
//! - **Caching** ([`cache`]) - Explicit memo of completed selections
//! - **Workspaces** ([`workspace`]) - Per-worker directories and artifact staging
//! - **Progress Monitoring** ([`progress`]) - Progress events for the outer driver
//! - **Error Handling** ([`error`]) - Selection errors and their candidate-local classification

pub mod cache;
pub mod config;
pub mod error;
pub mod progress;
pub mod refine;
pub mod select;
pub mod sources;
pub mod workspace;
