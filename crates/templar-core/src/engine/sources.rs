use super::error::TemplateError;
use crate::core::io::catalog::Catalog;
use crate::core::models::alignment::SequenceRecord;
use crate::core::models::candidate::{DomainContact, StructureDomain};
use crate::core::models::domain::DomainRange;
use tracing::debug;

/// Candidate queries against the classified-domain store.
pub trait DomainRepository: Send + Sync {
    /// Full sequence of a query protein.
    fn query_sequence(&self, sequence_id: &str) -> Result<String, TemplateError>;

    /// Structure domains classified under `family`.
    fn get_candidates(&self, family: &str) -> Result<Vec<StructureDomain>, TemplateError>;

    /// Contacts between a `family_1` domain and a `family_2` domain.
    ///
    /// The first list holds contacts stored as (`family_1`, `family_2`). The second
    /// holds contacts stored as (`family_2`, `family_1`), still in that stored
    /// orientation; callers normalize them.
    fn get_paired_candidates(
        &self,
        family_1: &str,
        family_2: &str,
    ) -> Result<(Vec<DomainContact>, Vec<DomainContact>), TemplateError>;
}

/// Observed residues of a chain together with their author numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainRecord {
    pub sequence: String,
    pub numbering: Vec<isize>,
}

/// The part of a chain covered by a requested structure domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureSequence {
    /// Observed residues inside `range`, under the id `{structure_id}{chain_id}`.
    pub record: SequenceRecord,
    /// Requested range clamped to the observed numbering.
    pub range: DomainRange,
    pub numbering: Vec<isize>,
}

pub trait StructureSequenceProvider: Send + Sync {
    fn chain_record(&self, structure_id: &str, chain_id: &str) -> Result<ChainRecord, TemplateError>;

    /// Clamps `requested` to the chain's observed numbering and returns the residues
    /// that fall inside it.
    fn get_sequence_and_numbering(
        &self,
        structure_id: &str,
        chain_id: &str,
        requested: DomainRange,
    ) -> Result<StructureSequence, TemplateError> {
        let chain = self.chain_record(structure_id, chain_id)?;
        let mapping_error = |reason: String| TemplateError::StructureMapping {
            structure_id: structure_id.to_string(),
            chain_id: chain_id.to_string(),
            reason,
        };

        let (Some(&lowest), Some(&highest)) =
            (chain.numbering.iter().min(), chain.numbering.iter().max())
        else {
            return Err(mapping_error("chain has no residue numbering".to_string()));
        };
        if chain.numbering.len() != chain.sequence.len() {
            return Err(mapping_error(format!(
                "{} residue numbers for {} residues",
                chain.numbering.len(),
                chain.sequence.len()
            )));
        }

        let range = DomainRange::new(requested.start.max(lowest), requested.end.min(highest));
        if range.is_empty() {
            return Err(mapping_error(format!(
                "range {requested} lies outside observed residues {lowest}:{highest}"
            )));
        }
        if range != requested {
            debug!(%requested, clamped = %range, structure_id, chain_id, "Clamped structure range to observed residues.");
        }

        let position = |number: isize| {
            chain
                .numbering
                .iter()
                .position(|&n| n == number)
                .ok_or_else(|| mapping_error(format!("residue {number} is not observed")))
        };
        let first = position(range.start)?;
        let last = position(range.end)?;
        if last < first {
            return Err(mapping_error(format!("numbering is not ascending over {range}")));
        }

        let sequence = chain.sequence.get(first..=last).unwrap_or_default().to_string();
        if sequence.is_empty() {
            return Err(TemplateError::EmptyStructureSequence {
                structure_id: structure_id.to_string(),
                chain_id: chain_id.to_string(),
            });
        }

        Ok(StructureSequence {
            record: SequenceRecord::new(format!("{structure_id}{chain_id}"), sequence),
            range,
            numbering: chain.numbering,
        })
    }
}

impl DomainRepository for Catalog {
    fn query_sequence(&self, sequence_id: &str) -> Result<String, TemplateError> {
        self.sequence(sequence_id)
            .map(str::to_string)
            .ok_or_else(|| TemplateError::SequenceNotFound(sequence_id.to_string()))
    }

    fn get_candidates(&self, family: &str) -> Result<Vec<StructureDomain>, TemplateError> {
        Ok(self.domains_in_family(family).map(|d| d.structure()).collect())
    }

    fn get_paired_candidates(
        &self,
        family_1: &str,
        family_2: &str,
    ) -> Result<(Vec<DomainContact>, Vec<DomainContact>), TemplateError> {
        let forward = self
            .contacts_between(family_1, family_2)
            .map(|c| c.contact())
            .collect();
        let backward = self
            .contacts_between(family_2, family_1)
            .map(|c| c.contact())
            .collect();
        Ok((forward, backward))
    }
}

impl StructureSequenceProvider for Catalog {
    fn chain_record(&self, structure_id: &str, chain_id: &str) -> Result<ChainRecord, TemplateError> {
        let entry = self
            .chain(structure_id, chain_id)
            .ok_or_else(|| TemplateError::StructureMapping {
                structure_id: structure_id.to_string(),
                chain_id: chain_id.to_string(),
                reason: "chain is not in the catalog".to_string(),
            })?;
        if entry.sequence.is_empty() {
            return Err(TemplateError::EmptyStructureSequence {
                structure_id: structure_id.to_string(),
                chain_id: chain_id.to_string(),
            });
        }
        Ok(ChainRecord {
            sequence: entry.sequence.clone(),
            numbering: entry.residue_numbers(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::catalog::ChainEntry;

    fn catalog_with_chain(sequence: &str, numbering: Option<Vec<isize>>) -> Catalog {
        Catalog {
            chains: vec![ChainEntry {
                structure_id: "1ABC".to_string(),
                chain_id: "A".to_string(),
                sequence: sequence.to_string(),
                numbering,
            }],
            ..Catalog::default()
        }
    }

    #[test]
    fn requested_range_is_clamped_and_mapped() {
        let catalog = catalog_with_chain("ACDEFGHIK", Some((-2..=6).collect()));
        let structure = catalog
            .get_sequence_and_numbering("1ABC", "A", DomainRange::new(-10, 2))
            .unwrap();
        assert_eq!(structure.range, DomainRange::new(-2, 2));
        assert_eq!(structure.record.id, "1ABCA");
        assert_eq!(structure.record.sequence, "ACDEF");
    }

    #[test]
    fn full_range_returns_the_whole_chain() {
        let catalog = catalog_with_chain("ACDEFGHIK", None);
        let structure = catalog
            .get_sequence_and_numbering("1ABC", "A", DomainRange::new(1, 9))
            .unwrap();
        assert_eq!(structure.record.sequence, "ACDEFGHIK");
        assert_eq!(structure.range, DomainRange::new(1, 9));
    }

    #[test]
    fn range_outside_observed_residues_is_a_mapping_error() {
        let catalog = catalog_with_chain("ACDEF", None);
        let result = catalog.get_sequence_and_numbering("1ABC", "A", DomainRange::new(20, 30));
        assert!(matches!(result, Err(TemplateError::StructureMapping { .. })));
    }

    #[test]
    fn unobserved_endpoint_is_a_mapping_error() {
        // Residue 3 is missing from the deposited chain.
        let catalog = catalog_with_chain("ACDE", Some(vec![1, 2, 4, 5]));
        let result = catalog.get_sequence_and_numbering("1ABC", "A", DomainRange::new(3, 5));
        assert!(matches!(result, Err(TemplateError::StructureMapping { .. })));
    }

    #[test]
    fn empty_chain_sequence_is_reported() {
        let catalog = catalog_with_chain("", None);
        let result = catalog.get_sequence_and_numbering("1ABC", "A", DomainRange::new(1, 5));
        assert!(matches!(result, Err(TemplateError::EmptyStructureSequence { .. })));
    }

    #[test]
    fn unknown_chain_and_sequence_are_errors() {
        let catalog = Catalog::default();
        assert!(matches!(
            catalog.chain_record("9XYZ", "B"),
            Err(TemplateError::StructureMapping { .. })
        ));
        assert!(matches!(
            catalog.query_sequence("P404"),
            Err(TemplateError::SequenceNotFound(_))
        ));
    }
}
