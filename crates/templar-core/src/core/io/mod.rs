//! File formats read and written by the library.
//!
//! The [`catalog`] is a TOML description of query sequences, classified structure
//! domains, domain contacts and observed chain sequences. [`artifact`] reads and
//! writes pairwise alignments as aligned FASTA.

pub mod artifact;
pub mod catalog;
