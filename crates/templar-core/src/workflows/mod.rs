//! # Workflows Module
//!
//! Top-level entry points of the library.
//!
//! - **Selection Workflow** ([`select`]) - Selects and refines the structural template
//!   for one domain unit, consults the caller's cache and stages alignment artifacts
//!   into the caller's workspace.

pub mod select;
