use super::config::RefinementConfig;
use super::error::TemplateError;
use super::sources::StructureSequenceProvider;
use crate::core::align::SequenceAligner;
use crate::core::analysis::{gaps, loners};
use crate::core::io::artifact;
use crate::core::models::alignment::{PairwiseAlignment, SequenceRecord};
use crate::core::models::candidate::StructureDomain;
use crate::core::models::domain::{DomainRange, SingleDomain};
use crate::core::models::template::TemplateSide;
use crate::core::scoring;
use std::path::Path;
use tracing::{debug, instrument};

/// Result of refining one query domain against one structure domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefinementOutcome {
    pub side: TemplateSide,
    /// Expand/contract rounds executed.
    pub iterations: usize,
}

/// Moves a query domain's boundaries until its alignment to a structure domain
/// neither overhangs nor strands residues at either end.
pub struct AlignmentRefiner<'a> {
    aligner: &'a dyn SequenceAligner,
    structures: &'a dyn StructureSequenceProvider,
    config: &'a RefinementConfig,
    artifact_dir: Option<&'a Path>,
}

impl<'a> AlignmentRefiner<'a> {
    pub fn new(
        aligner: &'a dyn SequenceAligner,
        structures: &'a dyn StructureSequenceProvider,
        config: &'a RefinementConfig,
    ) -> Self {
        Self {
            aligner,
            structures,
            config,
            artifact_dir: None,
        }
    }

    /// Writes every final alignment into `dir`.
    pub fn with_artifact_dir(mut self, dir: Option<&'a Path>) -> Self {
        self.artifact_dir = dir;
        self
    }

    #[instrument(skip_all, name = "refine", fields(domain = %domain.identity, structure = %structure.sequence_id()))]
    pub fn refine(
        &self,
        domain: &SingleDomain,
        full_sequence: &str,
        structure: &StructureDomain,
        max_domain_length: usize,
        refine_mode: bool,
    ) -> Result<RefinementOutcome, TemplateError> {
        if !full_sequence.is_ascii() {
            return Err(TemplateError::NonAsciiSequence(domain.sequence_id.clone()));
        }
        let length = full_sequence.len();
        if !domain.range.fits_sequence(length) {
            return Err(TemplateError::InvalidRange {
                sequence_id: domain.sequence_id.clone(),
                range: domain.range,
                length,
            });
        }

        let target = self
            .structures
            .get_sequence_and_numbering(&structure.structure_id, &structure.chain_id, structure.range)?
            .record;

        let align = |range: DomainRange| -> Result<PairwiseAlignment, TemplateError> {
            let query = SequenceRecord::new(domain.sequence_id.clone(), range.slice(full_sequence));
            Ok(self.aligner.align(&query, &target)?)
        };
        let query_extension = |alignment: &PairwiseAlignment| -> Result<(usize, usize), TemplateError> {
            let (query, _) = alignment.pick(&target.id)?;
            let (left, right) = gaps::classify(&query.sequence)?;
            Ok((2 * left, 2 * right))
        };

        let mut range = domain.range;
        let mut alignment = align(range)?;
        let (mut left, mut right) = query_extension(&alignment)?;
        debug!(left, right, "Initial extension amounts.");

        let mut iterations = 0;
        while iterations < self.config.max_iterations
            && left + right > 0
            && !(range.start == 1 && range.end as usize == length)
        {
            iterations += 1;

            range = widen(range, left, right, length);
            alignment = align(range)?;

            let (_, structure_side) = alignment.pick(&target.id)?;
            let (cut_left, cut_right) = gaps::classify(&structure_side.sequence)?;
            range = contract(range, cut_left, cut_right);
            alignment = align(range)?;

            (left, right) = query_extension(&alignment)?;
            debug!(iteration = iterations, %range, left, right, "Refined domain boundaries.");
        }

        if refine_mode && self.config.trim_loners {
            let (trimmed, cut) =
                loners::shorten(self.aligner, alignment, &target.id, self.config.max_trim_rounds)?;
            if !cut.is_empty() {
                debug!(left = cut.left, right = cut.right, "Trimmed stranded query residues.");
                range = DomainRange::new(
                    range.start + cut.left as isize,
                    range.end - cut.right as isize,
                );
            }
            alignment = trimmed;
        }

        let score = scoring::score(&alignment, Some(max_domain_length));
        let artifact_name = alignment.artifact_name();
        if let Some(dir) = self.artifact_dir {
            let path = dir.join(&artifact_name);
            artifact::write_alignment_to_path(&alignment, &path).map_err(|e| {
                TemplateError::Artifact {
                    path: path.to_string_lossy().to_string(),
                    source: e,
                }
            })?;
        }

        debug!(%range, score, iterations, "Finished refinement.");
        Ok(RefinementOutcome {
            side: TemplateSide {
                sequence_range: range,
                alignment_reference_id: target.id.clone(),
                alignment_score: score,
                alignment_artifact_name: artifact_name,
            },
            iterations,
        })
    }
}

/// Moves both boundaries outward, stopping at the ends of the sequence.
fn widen(range: DomainRange, left: usize, right: usize, length: usize) -> DomainRange {
    let start = (range.start - left as isize).max(1);
    let end = (range.end + right as isize).min(length as isize);
    DomainRange::new(start, end)
}

/// Moves both boundaries inward without letting them cross.
fn contract(range: DomainRange, left: usize, right: usize) -> DomainRange {
    let start = (range.start + left as isize).min(range.end);
    let end = (range.end - right as isize).max(start);
    DomainRange::new(start, end)
}
