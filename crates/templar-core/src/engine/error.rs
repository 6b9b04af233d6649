use thiserror::Error;

use crate::core::analysis::gaps::GapPatternError;
use crate::core::models::alignment::AlignmentError;
use crate::core::models::domain::DomainRange;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("No structural templates found for domain '{domain}'")]
    NoStructuralTemplates { domain: String },

    #[error("None of the {attempted} structural template(s) for domain '{domain}' could be aligned")]
    NoViableTemplates { domain: String, attempted: usize },

    #[error("Structure {structure_id} chain {chain_id} has no observed residues in the requested range")]
    EmptyStructureSequence {
        structure_id: String,
        chain_id: String,
    },

    #[error("Cannot map structure {structure_id} chain {chain_id} onto its sequence: {reason}")]
    StructureMapping {
        structure_id: String,
        chain_id: String,
        reason: String,
    },

    #[error("Alignment failed: {source}")]
    Alignment {
        #[from]
        source: AlignmentError,
    },

    #[error("Gap pattern analysis failed: {source}")]
    GapPattern {
        #[from]
        source: GapPatternError,
    },

    #[error("Range {range} does not fit sequence '{sequence_id}' of length {length}")]
    InvalidRange {
        sequence_id: String,
        range: DomainRange,
        length: usize,
    },

    #[error("Query sequence '{0}' not found")]
    SequenceNotFound(String),

    #[error("Query sequence '{0}' contains non-ASCII characters")]
    NonAsciiSequence(String),

    #[error("Failed to write alignment artifact '{path}': {source}")]
    Artifact {
        path: String,
        source: std::io::Error,
    },
}

impl TemplateError {
    /// Whether the failure concerns one candidate only, so selection can move on to
    /// the next candidate.
    pub fn is_candidate_local(&self) -> bool {
        matches!(
            self,
            TemplateError::EmptyStructureSequence { .. }
                | TemplateError::StructureMapping { .. }
                | TemplateError::Alignment { .. }
                | TemplateError::Artifact { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structure_side_failures_are_candidate_local() {
        let mapping = TemplateError::StructureMapping {
            structure_id: "1ABC".to_string(),
            chain_id: "A".to_string(),
            reason: "no residue numbers".to_string(),
        };
        assert!(mapping.is_candidate_local());
        assert!(TemplateError::from(AlignmentError::NoResidues("1ABCA".to_string())).is_candidate_local());
    }

    #[test]
    fn gap_pattern_and_query_failures_are_fatal() {
        let gap = TemplateError::from(GapPatternError::UnexpectedSymbol {
            symbol: '.',
            column: 3,
        });
        assert!(!gap.is_candidate_local());
        assert!(!TemplateError::SequenceNotFound("P1".to_string()).is_candidate_local());
        assert!(!TemplateError::NonAsciiSequence("P1".to_string()).is_candidate_local());
        assert!(
            !TemplateError::NoStructuralTemplates {
                domain: "P1_Ras".to_string()
            }
            .is_candidate_local()
        );
    }
}
