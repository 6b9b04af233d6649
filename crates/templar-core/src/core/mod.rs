//! # Core Module
//!
//! Stateless building blocks for structural template selection.
//!
//! ## Architecture
//!
//! - **Data Models** ([`models`]) - Query domains, structure candidates, alignments and templates
//! - **Alignment** ([`align`]) - The aligner interface, an in-process global aligner and a bounded pool
//! - **Alignment Shape** ([`analysis`]) - Gap-pattern classification and stranded-residue trimming
//! - **Scoring** ([`scoring`]) - Identity, coverage and the composite ranking score
//! - **File I/O** ([`io`]) - The TOML catalog and aligned FASTA artifacts
//!
//! Nothing in this layer holds state between calls; the [`crate::engine`] layer owns
//! configuration, caching and the refinement loop.

pub mod align;
pub mod analysis;
pub mod io;
pub mod models;
pub mod scoring;
