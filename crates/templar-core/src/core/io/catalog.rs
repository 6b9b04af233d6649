use crate::core::models::candidate::{DomainContact, StructureDomain};
use crate::core::models::domain::{DomainRange, DomainUnit};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Chain {structure_id}{chain_id} has {residues} residues but {numbers} residue numbers")]
    NumberingMismatch {
        structure_id: String,
        chain_id: String,
        residues: usize,
        numbers: usize,
    },
    #[error("Sequence '{id}' contains non-ASCII characters")]
    NonAsciiSequence { id: String },
    #[error("Chain {structure_id}{chain_id} is listed more than once")]
    DuplicateChain {
        structure_id: String,
        chain_id: String,
    },
}

/// A structure domain annotated with the family it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CatalogDomain {
    pub family: String,
    pub cath_id: String,
    pub structure_id: String,
    pub chain_id: String,
    pub resolution: f64,
    pub range: DomainRange,
}

impl CatalogDomain {
    pub fn structure(&self) -> StructureDomain {
        StructureDomain {
            cath_id: self.cath_id.clone(),
            structure_id: self.structure_id.clone(),
            chain_id: self.chain_id.clone(),
            resolution: self.resolution,
            range: self.range,
        }
    }
}

/// An observed contact between a domain of `family-1` and a domain of `family-2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CatalogContact {
    pub family_1: String,
    pub family_2: String,
    pub first: StructureDomain,
    pub second: StructureDomain,
    #[serde(default)]
    pub contact_residues_1: String,
    #[serde(default)]
    pub contact_residues_2: String,
}

impl CatalogContact {
    pub fn contact(&self) -> DomainContact {
        DomainContact {
            first: self.first.clone(),
            second: self.second.clone(),
            contact_residues_1: self.contact_residues_1.clone(),
            contact_residues_2: self.contact_residues_2.clone(),
        }
    }
}

/// Observed residues of one deposited chain and their author numbering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChainEntry {
    pub structure_id: String,
    pub chain_id: String,
    pub sequence: String,
    /// Author residue numbers, one per residue. Defaults to `1..=len`.
    #[serde(default)]
    pub numbering: Option<Vec<isize>>,
}

impl ChainEntry {
    pub fn residue_numbers(&self) -> Vec<isize> {
        match &self.numbering {
            Some(numbers) => numbers.clone(),
            None => (1..=self.sequence.len() as isize).collect(),
        }
    }
}

/// File-backed domain and structure data.
///
/// ```toml
/// [sequences]
/// P01112 = "MTEYKLVVVG..."
///
/// [[domains]]
/// family = "Ras"
/// cath-id = "5p21A00"
/// structure-id = "5P21"
/// chain-id = "A"
/// resolution = 1.35
/// range = "1:166"
///
/// [[chains]]
/// structure-id = "5P21"
/// chain-id = "A"
/// sequence = "MTEYKLVVVG..."
///
/// [[queries]]
/// kind = "single"
/// identity = "P01112_Ras"
/// family = "Ras"
/// range = "1:166"
/// sequence-id = "P01112"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Catalog {
    #[serde(default)]
    pub sequences: BTreeMap<String, String>,
    #[serde(default)]
    pub domains: Vec<CatalogDomain>,
    #[serde(default)]
    pub contacts: Vec<CatalogContact>,
    #[serde(default)]
    pub chains: Vec<ChainEntry>,
    #[serde(default)]
    pub queries: Vec<DomainUnit>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let catalog: Catalog = toml::from_str(&content).map_err(|e| CatalogError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Residue positions index sequences by byte, so every sequence must be ASCII.
    fn validate(&self) -> Result<(), CatalogError> {
        if let Some(id) = self.sequences.iter().find(|(_, s)| !s.is_ascii()).map(|(id, _)| id) {
            return Err(CatalogError::NonAsciiSequence { id: id.clone() });
        }
        let mut seen = std::collections::HashSet::new();
        for chain in &self.chains {
            if !chain.sequence.is_ascii() {
                return Err(CatalogError::NonAsciiSequence {
                    id: format!("{}{}", chain.structure_id, chain.chain_id),
                });
            }
            if !seen.insert((chain.structure_id.as_str(), chain.chain_id.as_str())) {
                return Err(CatalogError::DuplicateChain {
                    structure_id: chain.structure_id.clone(),
                    chain_id: chain.chain_id.clone(),
                });
            }
            if let Some(numbers) = &chain.numbering {
                if numbers.len() != chain.sequence.len() {
                    return Err(CatalogError::NumberingMismatch {
                        structure_id: chain.structure_id.clone(),
                        chain_id: chain.chain_id.clone(),
                        residues: chain.sequence.len(),
                        numbers: numbers.len(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn sequence(&self, sequence_id: &str) -> Option<&str> {
        self.sequences.get(sequence_id).map(String::as_str)
    }

    pub fn domains_in_family<'a>(&'a self, family: &'a str) -> impl Iterator<Item = &'a CatalogDomain> {
        self.domains.iter().filter(move |d| d.family == family)
    }

    pub fn contacts_between<'a>(
        &'a self,
        family_1: &'a str,
        family_2: &'a str,
    ) -> impl Iterator<Item = &'a CatalogContact> {
        self.contacts
            .iter()
            .filter(move |c| c.family_1 == family_1 && c.family_2 == family_2)
    }

    pub fn chain(&self, structure_id: &str, chain_id: &str) -> Option<&ChainEntry> {
        self.chains
            .iter()
            .find(|c| c.structure_id == structure_id && c.chain_id == chain_id)
    }
}
