use super::config::SelectionConfig;
use super::error::TemplateError;
use super::progress::{Phase, Progress, ProgressReporter};
use super::refine::AlignmentRefiner;
use super::sources::{DomainRepository, StructureSequenceProvider};
use crate::core::align::SequenceAligner;
use crate::core::models::candidate::{DomainContact, StructureDomain};
use crate::core::models::domain::{DomainPair, DomainUnit, SingleDomain};
use crate::core::models::template::Template;
use phf::{Set, phf_set};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Obsolete entries and structures whose chains cannot be modelled.
static DENIED_STRUCTURES: Set<&'static str> = phf_set! {
    "3C4D", "3LB7", "3NSV", "2NP8", "2WN0",
};

pub fn is_denied_structure(structure_id: &str) -> bool {
    DENIED_STRUCTURES.contains(structure_id.trim().to_ascii_uppercase().as_str())
}

/// Ranks templates and returns the best one.
///
/// Highest score wins (pairs: the sum of both sides). Among equal scores the lowest
/// resolution wins (pairs: the first side's structure). Remaining ties keep input order.
pub fn choose_best(mut templates: Vec<Template>) -> Option<Template> {
    templates.sort_by(|a, b| b.total_score().cmp(&a.total_score()));
    let max_score = templates.first()?.total_score();
    let mut best: Vec<Template> = templates
        .into_iter()
        .take_while(|t| t.total_score() == max_score)
        .collect();
    best.sort_by(|a, b| a.resolution().total_cmp(&b.resolution()));
    best.into_iter().next()
}

/// Merges the two contact lists of a paired query into one candidate list.
///
/// Contacts from `backward` are stored in the opposite orientation and are reversed
/// first. Duplicates by (cath id 1, cath id 2) keep their first occurrence.
pub fn merge_contacts(forward: Vec<DomainContact>, backward: Vec<DomainContact>) -> Vec<DomainContact> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    forward
        .into_iter()
        .chain(backward.iter().map(DomainContact::reversed))
        .filter(|contact| {
            let (a, b) = contact.cath_key();
            seen.insert((a.to_string(), b.to_string()))
        })
        .collect()
}

fn max_length<'d>(domains: impl Iterator<Item = &'d StructureDomain>) -> usize {
    domains.map(|d| d.range.len()).max().unwrap_or(0)
}

/// Enumerates structural templates for a domain unit, refines each and picks the best.
pub struct TemplateSelector<'a> {
    repository: &'a dyn DomainRepository,
    structures: &'a dyn StructureSequenceProvider,
    aligner: &'a dyn SequenceAligner,
    config: &'a SelectionConfig,
    reporter: &'a ProgressReporter<'a>,
    artifact_dir: Option<&'a Path>,
}

impl<'a> TemplateSelector<'a> {
    pub fn new(
        repository: &'a dyn DomainRepository,
        structures: &'a dyn StructureSequenceProvider,
        aligner: &'a dyn SequenceAligner,
        config: &'a SelectionConfig,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            repository,
            structures,
            aligner,
            config,
            reporter,
            artifact_dir: config.artifact_dir.as_deref(),
        }
    }

    /// Overrides the configured artifact directory.
    pub fn with_artifact_dir(mut self, dir: &'a Path) -> Self {
        self.artifact_dir = Some(dir);
        self
    }

    pub fn artifact_dir(&self) -> Option<&Path> {
        self.artifact_dir
    }

    fn refiner(&self) -> AlignmentRefiner<'_> {
        AlignmentRefiner::new(self.aligner, self.structures, &self.config.refinement)
            .with_artifact_dir(self.artifact_dir)
    }

    fn is_excluded(&self, structure: &StructureDomain) -> bool {
        is_denied_structure(&structure.structure_id)
            || self
                .config
                .excluded_structures
                .iter()
                .any(|id| id.eq_ignore_ascii_case(&structure.structure_id))
    }

    /// Runs the two-phase selection: survey every candidate, choose the best, then
    /// refine again bound to that candidate.
    #[instrument(skip_all, name = "select", fields(domain = %unit.label()))]
    pub fn select(&self, unit: &DomainUnit) -> Result<Template, TemplateError> {
        let (survey, attempted) = self
            .reporter
            .phase(Phase::Survey, || self.collect_templates(unit, None))?;

        let best = choose_best(survey).ok_or_else(|| TemplateError::NoViableTemplates {
            domain: unit.label(),
            attempted,
        })?;
        info!(
            structure = %best.candidate().primary().sequence_id(),
            score = best.total_score(),
            "Chose best template from survey."
        );

        let (refined, attempted) = self
            .reporter
            .phase(Phase::Refinement, || self.collect_templates(unit, Some(&best)))?;

        refined
            .into_iter()
            .next()
            .ok_or(TemplateError::NoViableTemplates {
                domain: unit.label(),
                attempted,
            })
    }

    /// Evaluates every usable candidate for `unit`.
    ///
    /// With `bound` set, only the candidate matching that template is evaluated and
    /// the refinement runs in refine mode. Returns the surviving templates together
    /// with the number of candidates attempted.
    pub fn collect_templates(
        &self,
        unit: &DomainUnit,
        bound: Option<&Template>,
    ) -> Result<(Vec<Template>, usize), TemplateError> {
        match unit {
            DomainUnit::Single(domain) => self.collect_single(unit, domain, bound),
            DomainUnit::Pair(pair) => self.collect_pair(unit, pair, bound),
        }
    }

    fn collect_single(
        &self,
        unit: &DomainUnit,
        domain: &SingleDomain,
        bound: Option<&Template>,
    ) -> Result<(Vec<Template>, usize), TemplateError> {
        let candidates = self.repository.get_candidates(&domain.family)?;
        if candidates.is_empty() {
            return Err(TemplateError::NoStructuralTemplates {
                domain: unit.label(),
            });
        }
        let max_domain_length = max_length(candidates.iter());
        let sequence = self.repository.query_sequence(&domain.sequence_id)?;
        debug!(count = candidates.len(), max_domain_length, "Collected single-domain candidates.");
        self.reporter.report(Progress::CandidatesFound {
            total: candidates.len() as u64,
        });

        let refiner = self.refiner();
        let mut templates = Vec::new();
        let mut attempted = 0;
        for candidate in candidates {
            self.reporter.report(Progress::CandidateEvaluated);
            if self.is_excluded(&candidate) {
                debug!(structure = %candidate.structure_id, "Skipping denied structure.");
                continue;
            }
            if let Some(bound) = bound {
                let same = matches!(bound, Template::Single { candidate: b, .. } if b.cath_id == candidate.cath_id);
                if !same {
                    continue;
                }
            }

            attempted += 1;
            let result = refiner
                .refine(domain, &sequence, &candidate, max_domain_length, bound.is_some())
                .map(|outcome| Template::Single {
                    candidate: candidate.clone(),
                    alignment: outcome.side,
                });
            if let Some(template) = self.settle(unit, &candidate, result)? {
                templates.push(template);
            }
        }
        Ok((templates, attempted))
    }

    fn collect_pair(
        &self,
        unit: &DomainUnit,
        pair: &DomainPair,
        bound: Option<&Template>,
    ) -> Result<(Vec<Template>, usize), TemplateError> {
        let (forward, backward) = self
            .repository
            .get_paired_candidates(&pair.first.family, &pair.second.family)?;
        let candidates = merge_contacts(forward, backward);
        if candidates.is_empty() {
            return Err(TemplateError::NoStructuralTemplates {
                domain: unit.label(),
            });
        }
        let max_length_1 = max_length(candidates.iter().map(|c| &c.first));
        let max_length_2 = max_length(candidates.iter().map(|c| &c.second));
        let sequence_1 = self.repository.query_sequence(&pair.first.sequence_id)?;
        let sequence_2 = self.repository.query_sequence(&pair.second.sequence_id)?;
        debug!(count = candidates.len(), max_length_1, max_length_2, "Collected domain-pair candidates.");
        self.reporter.report(Progress::CandidatesFound {
            total: candidates.len() as u64,
        });

        let refiner = self.refiner();
        let refine_mode = bound.is_some();
        let mut templates = Vec::new();
        let mut attempted = 0;
        for contact in candidates {
            self.reporter.report(Progress::CandidateEvaluated);
            if self.is_excluded(&contact.first) {
                debug!(structure = %contact.first.structure_id, "Skipping denied structure.");
                continue;
            }
            if let Some(bound) = bound {
                let same = matches!(bound, Template::Pair { candidate: b, .. } if b.cath_key() == contact.cath_key());
                if !same {
                    continue;
                }
            }

            attempted += 1;
            let result = refiner
                .refine(&pair.first, &sequence_1, &contact.first, max_length_1, refine_mode)
                .and_then(|first| {
                    let second = refiner.refine(
                        &pair.second,
                        &sequence_2,
                        &contact.second,
                        max_length_2,
                        refine_mode,
                    )?;
                    Ok(Template::Pair {
                        candidate: contact.clone(),
                        first: first.side,
                        second: second.side,
                    })
                });
            if let Some(template) = self.settle(unit, &contact.first, result)? {
                templates.push(template);
            }
        }
        Ok((templates, attempted))
    }

    /// Keeps a successful evaluation, skips a candidate-local failure and propagates
    /// anything else.
    fn settle(
        &self,
        unit: &DomainUnit,
        structure: &StructureDomain,
        result: Result<Template, TemplateError>,
    ) -> Result<Option<Template>, TemplateError> {
        match result {
            Ok(template) => Ok(Some(template)),
            Err(e) if e.is_candidate_local() => {
                warn!(
                    domain = %unit.label(),
                    structure = %structure.structure_id,
                    chain = %structure.chain_id,
                    error = %e,
                    "Skipping template candidate."
                );
                self.reporter.report(Progress::CandidateSkipped {
                    structure: structure.sequence_id(),
                    reason: e.to_string(),
                });
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
