use super::candidate::{DomainContact, StructureDomain, TemplateCandidate};
use super::domain::DomainRange;
use serde::{Deserialize, Serialize};

/// The refined alignment of one query domain against one structure domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TemplateSide {
    pub sequence_range: DomainRange,
    pub alignment_reference_id: String,
    pub alignment_score: u32,
    pub alignment_artifact_name: String,
}

/// The selected structural template for a domain unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum Template {
    Single {
        candidate: StructureDomain,
        alignment: TemplateSide,
    },
    Pair {
        candidate: DomainContact,
        first: TemplateSide,
        second: TemplateSide,
    },
}

impl Template {
    /// Ranking score: the side score, or the sum of both sides for pairs.
    pub fn total_score(&self) -> u64 {
        match self {
            Template::Single { alignment, .. } => u64::from(alignment.alignment_score),
            Template::Pair { first, second, .. } => {
                u64::from(first.alignment_score) + u64::from(second.alignment_score)
            }
        }
    }

    pub fn resolution(&self) -> f64 {
        match self {
            Template::Single { candidate, .. } => candidate.resolution,
            Template::Pair { candidate, .. } => candidate.first.resolution,
        }
    }

    pub fn candidate(&self) -> TemplateCandidate {
        match self {
            Template::Single { candidate, .. } => TemplateCandidate::Single(candidate.clone()),
            Template::Pair { candidate, .. } => TemplateCandidate::Pair(candidate.clone()),
        }
    }

    pub fn sides(&self) -> Vec<&TemplateSide> {
        match self {
            Template::Single { alignment, .. } => vec![alignment],
            Template::Pair { first, second, .. } => vec![first, second],
        }
    }

    pub fn artifact_names(&self) -> Vec<&str> {
        self.sides()
            .into_iter()
            .map(|side| side.alignment_artifact_name.as_str())
            .collect()
    }
}
