use crate::core::models::alignment::GAP;
use thiserror::Error;

/// Raised when an aligned sequence has a shape the classifier does not model.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum GapPatternError {
    #[error("Unexpected symbol '{symbol}' at alignment column {column}")]
    UnexpectedSymbol { symbol: char, column: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Symbol {
    Gap,
    Residue,
}

impl Symbol {
    fn classify(byte: u8, column: usize) -> Result<Self, GapPatternError> {
        match byte {
            GAP => Ok(Symbol::Gap),
            b if b.is_ascii_alphabetic() || b == b'*' => Ok(Symbol::Residue),
            other => Err(GapPatternError::UnexpectedSymbol {
                symbol: other as char,
                column,
            }),
        }
    }
}

/// The run currently being measured at one end of the alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Run {
    #[default]
    Overhang,
    PrimaryBlock,
    FirstGap,
    Loner,
    SecondGap,
    Closed,
}

/// Run lengths measured from one end of an aligned sequence toward its middle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EndProfile {
    pub overhang: usize,
    pub loner1: usize,
    pub gap1: usize,
    pub loner2: usize,
    pub gap2: usize,
    run: Run,
}

impl EndProfile {
    fn is_closed(&self) -> bool {
        self.run == Run::Closed
    }

    fn step(&mut self, symbol: Symbol) {
        use Run::*;
        use Symbol::*;
        self.run = match (self.run, symbol) {
            (Overhang, Gap) => {
                self.overhang += 1;
                Overhang
            }
            (Overhang | PrimaryBlock, Residue) => {
                self.loner1 += 1;
                PrimaryBlock
            }
            (PrimaryBlock | FirstGap, Gap) => {
                self.gap1 += 1;
                FirstGap
            }
            (FirstGap | Loner, Residue) => {
                self.loner2 += 1;
                Loner
            }
            (Loner | SecondGap, Gap) => {
                self.gap2 += 1;
                SecondGap
            }
            (SecondGap, Residue) | (Closed, _) => Closed,
        };
    }

    /// Residues this end's boundary should move outward.
    pub fn extension(&self) -> usize {
        if 2 * self.gap2 > self.loner1 + self.loner2 {
            self.gap2 + self.gap1 + self.overhang
        } else if 2 * self.gap1 > self.loner1 {
            self.gap1 + self.overhang
        } else {
            self.overhang
        }
    }
}

/// Measures both ends of `aligned` and returns their profiles (left, right).
///
/// Both ends are scanned in lockstep; column `i` from the left and its mirror from
/// the right are consumed together while `i < n - 1 - i`, and scanning stops early
/// once both ends have closed their second gap.
pub fn profile(aligned: &str) -> Result<(EndProfile, EndProfile), GapPatternError> {
    let bytes = aligned.as_bytes();
    let n = bytes.len();
    let mut left = EndProfile::default();
    let mut right = EndProfile::default();

    for i in 0..n {
        let mirror = n - 1 - i;
        if i >= mirror || (left.is_closed() && right.is_closed()) {
            break;
        }
        left.step(Symbol::classify(bytes[i], i)?);
        right.step(Symbol::classify(bytes[mirror], mirror)?);
    }

    Ok((left, right))
}

/// Returns `(extend_left, extend_right)` for one aligned sequence.
pub fn classify(aligned: &str) -> Result<(usize, usize), GapPatternError> {
    let (left, right) = profile(aligned)?;
    Ok((left.extension(), right.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ungapped_sequence_needs_no_extension() {
        assert_eq!(classify("ACDEFGHIKLMNPQ").unwrap(), (0, 0));
        assert_eq!(classify("ACDEFGHIKLMNPQR").unwrap(), (0, 0));
    }

    #[test]
    fn leading_and_trailing_overhangs_are_reported_per_end() {
        assert_eq!(classify("---ACDEFGHIK-").unwrap(), (3, 1));
    }

    #[test]
    fn wide_first_gap_extends_past_the_isolated_block() {
        // left: overhang 2, loner1 2, gap1 5 -> 2*5 > 2
        let (left, right) = profile("--AC-----DEFGHIKLMNPQRSTVW").unwrap();
        assert_eq!((left.overhang, left.loner1, left.gap1), (2, 2, 5));
        assert_eq!(left.extension(), 7);
        assert_eq!(right.extension(), 0);
    }

    #[test]
    fn narrow_first_gap_keeps_only_the_overhang() {
        // left: overhang 1, loner1 6, gap1 2 -> 4 <= 6
        assert_eq!(classify("-ACDEFG--HIKLMNPQRSTVWY").unwrap().0, 1);
    }

    #[test]
    fn wide_second_gap_adds_both_gaps() {
        // left: loner1 1, gap1 1, loner2 1, gap2 4 -> 8 > 2
        let (left, _) = profile("A-C----DEFGHIKLMNPQRSTVWY").unwrap();
        assert_eq!(
            (left.loner1, left.gap1, left.loner2, left.gap2),
            (1, 1, 1, 4)
        );
        assert_eq!(left.extension(), 5);
    }

    #[test]
    fn scanning_stops_at_the_midpoint() {
        let (left, right) = profile("------").unwrap();
        assert_eq!(left.overhang, 3);
        assert_eq!(right.overhang, 3);
        // The middle column of an odd-length sequence belongs to neither end.
        let (left, right) = profile("--A--").unwrap();
        assert_eq!((left.overhang, right.overhang), (2, 2));
        assert_eq!(left.loner1 + right.loner1, 0);
    }

    #[test]
    fn closed_end_ignores_the_rest_of_the_sequence() {
        let (left, _) = profile("A-C-D-E-FFFFFFFFFFFFFFFFFF").unwrap();
        assert_eq!(
            (left.loner1, left.gap1, left.loner2, left.gap2),
            (1, 1, 1, 1)
        );
        assert!(left.is_closed());
    }

    #[test]
    fn unexpected_symbol_is_an_error() {
        assert_eq!(
            classify("AC.DEFG"),
            Err(GapPatternError::UnexpectedSymbol {
                symbol: '.',
                column: 2
            })
        );
    }

    #[test]
    fn empty_and_single_column_sequences_classify_to_zero() {
        assert_eq!(classify("").unwrap(), (0, 0));
        assert_eq!(classify("-").unwrap(), (0, 0));
    }
}
