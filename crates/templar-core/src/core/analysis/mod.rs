//! Shape analysis of aligned sequences.
//!
//! - [`gaps`] classifies overhangs and internal gaps at both ends of one aligned
//!   sequence and turns them into boundary extension amounts.
//! - [`loners`] detects residue blocks stranded away from the main aligned block and
//!   proposes query trims. It is an optional stage and is off by default.

pub mod gaps;
pub mod loners;
