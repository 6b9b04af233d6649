use super::domain::DomainRange;
use serde::{Deserialize, Serialize};

/// A classified domain observed in a deposited structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StructureDomain {
    pub cath_id: String,
    pub structure_id: String,
    pub chain_id: String,
    pub resolution: f64,
    pub range: DomainRange,
}

impl StructureDomain {
    /// Identifier of the observed chain sequence, e.g. `1FOEB`.
    pub fn sequence_id(&self) -> String {
        format!("{}{}", self.structure_id, self.chain_id)
    }
}

/// Two structure domains found in contact with each other.
///
/// `first` and `second` follow the orientation of the query pair once the
/// contact has been normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DomainContact {
    pub first: StructureDomain,
    pub second: StructureDomain,
    #[serde(default)]
    pub contact_residues_1: String,
    #[serde(default)]
    pub contact_residues_2: String,
}

impl DomainContact {
    /// The same contact seen from the other side.
    pub fn reversed(&self) -> Self {
        Self {
            first: self.second.clone(),
            second: self.first.clone(),
            contact_residues_1: self.contact_residues_2.clone(),
            contact_residues_2: self.contact_residues_1.clone(),
        }
    }

    pub fn cath_key(&self) -> (&str, &str) {
        (&self.first.cath_id, &self.second.cath_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum TemplateCandidate {
    Single(StructureDomain),
    Pair(DomainContact),
}

impl TemplateCandidate {
    /// The structure whose id is checked against the deny list.
    pub fn primary(&self) -> &StructureDomain {
        match self {
            TemplateCandidate::Single(domain) => domain,
            TemplateCandidate::Pair(contact) => &contact.first,
        }
    }

    pub fn resolution(&self) -> f64 {
        self.primary().resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structure(cath_id: &str, structure_id: &str, chain: &str) -> StructureDomain {
        StructureDomain {
            cath_id: cath_id.to_string(),
            structure_id: structure_id.to_string(),
            chain_id: chain.to_string(),
            resolution: 2.0,
            range: DomainRange::new(1, 100),
        }
    }

    #[test]
    fn reversed_swaps_every_sided_field_without_touching_the_input() {
        let contact = DomainContact {
            first: structure("1abcA01", "1ABC", "A"),
            second: structure("1abcB02", "1ABC", "B"),
            contact_residues_1: "10,11".to_string(),
            contact_residues_2: "55".to_string(),
        };
        let reversed = contact.reversed();

        assert_eq!(reversed.first.cath_id, "1abcB02");
        assert_eq!(reversed.second.cath_id, "1abcA01");
        assert_eq!(reversed.contact_residues_1, "55");
        assert_eq!(reversed.contact_residues_2, "10,11");
        assert_eq!(contact.first.cath_id, "1abcA01");
        assert_eq!(reversed.reversed(), contact);
    }

    #[test]
    fn sequence_id_concatenates_structure_and_chain() {
        assert_eq!(structure("c", "1FOE", "B").sequence_id(), "1FOEB");
    }
}
