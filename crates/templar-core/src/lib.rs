//! # Templar Core Library
//!
//! Selection of structural templates for protein domains and refinement of the domain
//! boundaries against the chosen structure.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`DomainUnit`, `Template`),
//!   the pairwise aligner, gap-pattern analysis, scoring and file formats.
//!
//! - **[`engine`]: The Logic Core.** Configuration, data-source interfaces, the boundary
//!   refinement loop, candidate ranking with two-phase selection, the template cache and
//!   per-worker workspaces.
//!
//! - **[`workflows`]: The Public API.** Entry points that tie the engine together for a
//!   complete selection of one domain unit, including artifact staging.

pub mod core;
pub mod engine;
pub mod workflows;
