use super::SequenceAligner;
use crate::core::models::alignment::{AlignmentError, GAP, PairwiseAlignment, SequenceRecord};
use bio::alignment::AlignmentOperation;
use bio::alignment::pairwise::Aligner;
use serde::{Deserialize, Serialize};

/// Scoring parameters for the global aligner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AlignerScoring {
    pub match_score: i32,
    pub mismatch_score: i32,
    pub gap_penalty: i32,
}

impl Default for AlignerScoring {
    fn default() -> Self {
        Self {
            match_score: 2,
            mismatch_score: -1,
            gap_penalty: -2,
        }
    }
}

/// Global (end-to-end) alignment with a linear gap penalty.
///
/// Residues are compared case-insensitively. Every call builds an aligner sized for
/// its inputs, so one instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct GlobalAligner {
    scoring: AlignerScoring,
}

impl GlobalAligner {
    pub fn new(scoring: AlignerScoring) -> Self {
        Self { scoring }
    }

    pub fn scoring(&self) -> &AlignerScoring {
        &self.scoring
    }
}

/// Renders the two gapped rows described by `operations`.
fn render(x: &[u8], y: &[u8], operations: &[AlignmentOperation]) -> (Vec<u8>, Vec<u8>) {
    let mut row_x = Vec::with_capacity(x.len() + y.len());
    let mut row_y = Vec::with_capacity(x.len() + y.len());
    let (mut i, mut j) = (0, 0);
    for op in operations {
        match *op {
            AlignmentOperation::Match | AlignmentOperation::Subst => {
                row_x.push(x[i]);
                row_y.push(y[j]);
                i += 1;
                j += 1;
            }
            AlignmentOperation::Ins => {
                row_x.push(x[i]);
                row_y.push(GAP);
                i += 1;
            }
            AlignmentOperation::Del => {
                row_x.push(GAP);
                row_y.push(y[j]);
                j += 1;
            }
            AlignmentOperation::Xclip(n) => {
                row_x.extend_from_slice(&x[i..i + n]);
                row_y.extend(std::iter::repeat_n(GAP, n));
                i += n;
            }
            AlignmentOperation::Yclip(n) => {
                row_x.extend(std::iter::repeat_n(GAP, n));
                row_y.extend_from_slice(&y[j..j + n]);
                j += n;
            }
        }
    }
    (row_x, row_y)
}

impl SequenceAligner for GlobalAligner {
    fn align(
        &self,
        query: &SequenceRecord,
        target: &SequenceRecord,
    ) -> Result<PairwiseAlignment, AlignmentError> {
        for record in [query, target] {
            if record.residue_count() == 0 {
                return Err(AlignmentError::NoResidues(record.id.clone()));
            }
        }
        let AlignerScoring {
            match_score,
            mismatch_score,
            gap_penalty,
        } = self.scoring;
        if gap_penalty > 0 {
            return Err(AlignmentError::Aligner(format!(
                "gap penalty must not be positive, got {gap_penalty}"
            )));
        }

        let x = query.sequence.as_bytes();
        let y = target.sequence.as_bytes();
        let score = |a: u8, b: u8| -> i32 {
            if a.eq_ignore_ascii_case(&b) {
                match_score
            } else {
                mismatch_score
            }
        };
        let mut aligner = Aligner::with_capacity(x.len(), y.len(), 0, gap_penalty, score);
        let alignment = aligner.global(x, y);
        let (row_x, row_y) = render(x, y, &alignment.operations);

        PairwiseAlignment::new(
            SequenceRecord::new(query.id.clone(), String::from_utf8_lossy(&row_x)),
            SequenceRecord::new(target.id.clone(), String::from_utf8_lossy(&row_y)),
        )
    }
}
