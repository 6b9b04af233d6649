//! Pairwise sequence alignment.
//!
//! [`SequenceAligner`] is the seam the refinement loop talks to. [`global`] provides
//! an in-process global aligner; [`pool`] bounds how many alignment calls run at the
//! same time across workers.

pub mod global;
pub mod pool;

use crate::core::models::alignment::{AlignmentError, PairwiseAlignment, SequenceRecord};

/// Aligns a query sequence against a target sequence.
///
/// The returned alignment carries the query as its first record and the target as
/// its second, each under its input identifier.
pub trait SequenceAligner: Send + Sync {
    fn align(
        &self,
        query: &SequenceRecord,
        target: &SequenceRecord,
    ) -> Result<PairwiseAlignment, AlignmentError>;
}

impl<A: SequenceAligner + ?Sized> SequenceAligner for &A {
    fn align(
        &self,
        query: &SequenceRecord,
        target: &SequenceRecord,
    ) -> Result<PairwiseAlignment, AlignmentError> {
        (**self).align(query, target)
    }
}

impl<A: SequenceAligner + ?Sized> SequenceAligner for Box<A> {
    fn align(
        &self,
        query: &SequenceRecord,
        target: &SequenceRecord,
    ) -> Result<PairwiseAlignment, AlignmentError> {
        (**self).align(query, target)
    }
}
