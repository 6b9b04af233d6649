use crate::core::models::domain::DomainUnit;
use crate::core::models::template::Template;
use crate::engine::cache::TemplateCache;
use crate::engine::error::TemplateError;
use crate::engine::select::TemplateSelector;
use crate::engine::workspace::Workspace;
use std::path::PathBuf;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct SelectionResult {
    pub template: Template,
    /// Directory holding the template's staged alignments, if any.
    ///
    /// A cache hit reports the directory only when an earlier run already staged the
    /// unit in the same workspace. The shared alignment directory may have been
    /// overwritten since, so cached templates are never re-staged from it.
    pub staged_dir: Option<PathBuf>,
    /// Whether the template came from the cache instead of a fresh selection.
    pub from_cache: bool,
}

/// Selects the template for one domain unit.
///
/// A unit already present in `cache` is answered from it. Otherwise the two-phase
/// selection runs, and when both a workspace and an artifact directory are available
/// the chosen alignments are staged under the unit's storage key.
#[instrument(skip_all, name = "selection_workflow", fields(domain = %unit.label()))]
pub fn run(
    unit: &DomainUnit,
    selector: &TemplateSelector,
    cache: &mut TemplateCache,
    workspace: Option<&Workspace>,
) -> Result<SelectionResult, TemplateError> {
    if let Some(template) = cache.get(unit) {
        info!("Template found in cache.");
        return Ok(SelectionResult {
            template: template.clone(),
            staged_dir: workspace.and_then(|w| w.staged_dir(unit, template)),
            from_cache: true,
        });
    }

    let template = selector.select(unit)?;

    let staged_dir = match (workspace, selector.artifact_dir()) {
        (Some(workspace), Some(source_dir)) => {
            Some(workspace.stage_artifacts(unit, &template, source_dir)?)
        }
        _ => None,
    };

    info!(
        score = template.total_score(),
        structure = %template.candidate().primary().sequence_id(),
        "Template selected."
    );
    cache.insert(unit, template.clone());
    Ok(SelectionResult {
        template,
        staged_dir,
        from_cache: false,
    })
}
