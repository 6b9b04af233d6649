//! Trimming of query residues that the aligner strands away from the main block.
//!
//! Aligners occasionally place a handful of residues far from the central aligned
//! block:
//!
//! ```text
//! AA-------TTTT-XXXXXXXX---   structure
//! XXXXXXXXXXXXXXXXXXXX-XXXX   query
//! ```
//!
//! In that shape the query is longer than the structure supports and shortening it
//! gives a cleaner alignment. Only the query is ever trimmed; structure domain
//! boundaries are taken as authoritative.

use crate::core::align::SequenceAligner;
use crate::core::models::alignment::{AlignmentError, GAP, PairwiseAlignment, SequenceRecord};
use tracing::debug;

/// Ratio of loner length to gap length at or below which a block counts as stranded.
const LONER_RATIO: f64 = 0.2;

/// The twenty standard amino-acid codes. Other symbols (`X`, `*`, lowercase) are
/// neither residues nor gaps to the loner scan and are stepped over.
const AMINO_ACIDS: &[u8] = b"RHKDESTNQCGPAVILMFYW";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum End {
    Left,
    Right,
}

/// Which of the two sequences a trim applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimTarget {
    Query,
    Structure,
}

/// Column positions of a stranded block, as seen scanning from one end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loners {
    /// First residue column of the stranded block.
    pub block_start: usize,
    /// First gap column after the block.
    pub gap_start: usize,
    /// First residue column after the gap.
    pub gap_end: usize,
}

impl Loners {
    fn block_len(&self) -> usize {
        self.block_start.abs_diff(self.gap_start)
    }

    fn gap_len(&self) -> usize {
        self.gap_start.abs_diff(self.gap_end)
    }
}

/// Query residues to drop from each end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrimProposal {
    pub left: usize,
    pub right: usize,
}

impl TrimProposal {
    pub fn is_empty(&self) -> bool {
        self.left == 0 && self.right == 0
    }
}

fn columns(len: usize, end: End) -> Box<dyn Iterator<Item = usize>> {
    match end {
        End::Left => Box::new(0..len),
        End::Right => Box::new((0..len).rev()),
    }
}

/// Picks the aligned sequence to inspect at `end`: whichever has the first gap.
///
/// A gap in the query means the structure overhangs, so the structure would be the
/// one to trim, and vice versa. Returns `None` when the alignment has no gaps.
pub fn find_loner_side<'a>(
    query: &'a str,
    structure: &'a str,
    end: End,
) -> Option<(&'a str, TrimTarget)> {
    let q = query.as_bytes();
    let s = structure.as_bytes();
    for i in columns(q.len().min(s.len()), end) {
        if q[i] == GAP {
            return Some((query, TrimTarget::Structure));
        } else if s[i] == GAP {
            return Some((structure, TrimTarget::Query));
        }
    }
    None
}

/// Looks for a residue block separated from the rest of `aligned` by a wide gap.
pub fn check_loners(aligned: &str, end: End) -> Option<Loners> {
    let bytes = aligned.as_bytes();
    let mut block_start = None;
    let mut gap_start = None;

    for i in columns(bytes.len(), end) {
        let is_gap = bytes[i] == GAP;
        let is_residue = AMINO_ACIDS.contains(&bytes[i]);
        match (block_start, gap_start) {
            (None, _) if is_residue => block_start = Some(i),
            (Some(_), None) if is_gap => gap_start = Some(i),
            (Some(block_start), Some(gap_start)) if is_residue => {
                let loners = Loners {
                    block_start,
                    gap_start,
                    gap_end: i,
                };
                return is_stranded(&loners).then_some(loners);
            }
            _ => {}
        }
    }
    None
}

fn is_stranded(loners: &Loners) -> bool {
    let block = loners.block_len() as f64;
    let gap = loners.gap_len() as f64;
    gap > block || block / gap <= LONER_RATIO
}

/// Computes how many query residues to drop so that stranded blocks disappear.
pub fn align_cut(
    alignment: &PairwiseAlignment,
    structure_id: &str,
) -> Result<TrimProposal, AlignmentError> {
    let (query, structure) = alignment.pick(structure_id)?;
    let width = alignment.columns();
    let mut proposal = TrimProposal::default();

    if let Some((aligned, TrimTarget::Query)) =
        find_loner_side(&query.sequence, &structure.sequence, End::Left)
    {
        if let Some(loners) = check_loners(aligned, End::Left) {
            proposal.left = loners.gap_end.saturating_sub(loners.block_len());
        }
    }
    if let Some((aligned, TrimTarget::Query)) =
        find_loner_side(&query.sequence, &structure.sequence, End::Right)
    {
        if let Some(loners) = check_loners(aligned, End::Right) {
            proposal.right = (width - loners.gap_end).saturating_sub(loners.block_len());
        }
    }
    Ok(proposal)
}

/// Repeatedly trims the query and re-aligns until no stranded block remains.
///
/// Returns the final alignment and the accumulated trim. Stops after `max_rounds`
/// or when a trim would leave the query empty.
pub fn shorten(
    aligner: &dyn SequenceAligner,
    alignment: PairwiseAlignment,
    structure_id: &str,
    max_rounds: usize,
) -> Result<(PairwiseAlignment, TrimProposal), AlignmentError> {
    let mut current = alignment;
    let mut total = TrimProposal::default();

    for round in 0..max_rounds {
        let cut = align_cut(&current, structure_id)?;
        if cut.is_empty() {
            break;
        }

        let (query, structure) = current.pick(structure_id)?;
        let query = query.ungapped();
        if cut.left + cut.right >= query.len() {
            debug!(round, "Trim would consume the whole query; keeping alignment.");
            break;
        }

        let trimmed = SequenceRecord::new(
            query.id.clone(),
            &query.sequence[cut.left..query.len() - cut.right],
        );
        let structure = structure.ungapped();
        debug!(round, left = cut.left, right = cut.right, "Trimming stranded query residues.");

        current = aligner.align(&trimmed, &structure)?;
        total.left += cut.left;
        total.right += cut.right;
    }

    Ok((current, total))
}
