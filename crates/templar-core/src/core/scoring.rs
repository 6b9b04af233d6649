//! Identity, coverage and the composite alignment score used to rank templates.

use crate::core::models::alignment::{GAP, PairwiseAlignment};
use tracing::debug;

/// Weight of the identity term in the composite score.
const IDENTITY_WEIGHT: f64 = 0.95;
const IDENTITY_THRESHOLD: f64 = 40.0;
const IDENTITY_REFERENCE: f64 = 0.40;
const SCORE_SCALE: f64 = 10000.0;

/// Percentage of identical residues, relative to the shorter ungapped sequence.
///
/// The shorter sequence is the reference (the first one on equal lengths); a column
/// counts when the reference holds a residue there and the counterpart holds the same
/// symbol in that column.
pub fn identity(alignment: &PairwiseAlignment) -> f64 {
    let first = alignment.first();
    let second = alignment.second();
    let len_first = first.residue_count();
    let len_second = second.residue_count();

    let (reference, counterpart) = if len_first <= len_second {
        (first.sequence.as_bytes(), second.sequence.as_bytes())
    } else {
        (second.sequence.as_bytes(), first.sequence.as_bytes())
    };

    let matches = reference
        .iter()
        .zip(counterpart)
        .filter(|&(&r, &c)| r != GAP && r == c)
        .count();

    100.0 * matches as f64 / len_first.min(len_second) as f64
}

/// Length ratio of the first ungapped sequence against the second, or against
/// `max_domain_length` when given, as a percentage that never exceeds 100.
pub fn coverage(alignment: &PairwiseAlignment, max_domain_length: Option<usize>) -> f64 {
    let len_first = alignment.first().residue_count();
    let len_second = max_domain_length.unwrap_or_else(|| alignment.second().residue_count());
    length_ratio(len_first, len_second)
}

fn length_ratio(a: usize, b: usize) -> f64 {
    let (shorter, longer) = if a <= b { (a, b) } else { (b, a) };
    if longer == 0 {
        return 0.0;
    }
    100.0 * shorter as f64 / longer as f64
}

/// Composite score from identity and coverage percentages.
///
/// The threshold comparison is made on the fractional identity, so the quadratic
/// branch is the one taken for every identity in `[0, 100]`.
pub fn composite(identity_percent: f64, coverage_percent: f64) -> u32 {
    let identity_frac = identity_percent / 100.0;
    let coverage_frac = coverage_percent / 100.0;
    let a = IDENTITY_WEIGHT;

    let score = if identity_frac < IDENTITY_THRESHOLD {
        a * (identity_frac * identity_frac) / IDENTITY_REFERENCE * coverage_frac
            + (1.0 - a) * coverage_frac
    } else {
        a * identity_frac * coverage_frac + (1.0 - a) * coverage_frac
    };

    (score * SCORE_SCALE).floor().max(0.0) as u32
}

pub fn score(alignment: &PairwiseAlignment, max_domain_length: Option<usize>) -> u32 {
    let identity = identity(alignment);
    let coverage = coverage(alignment, max_domain_length);
    let score = composite(identity, coverage);
    debug!(identity, coverage, score, "Scored alignment.");
    score
}
