use crate::cli::SelectArgs;
use crate::config::{PartialSelectConfig, RunConfig};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use templar::core::align::global::GlobalAligner;
use templar::core::align::pool::{AlignerPool, PooledAligner};
use templar::core::io::catalog::Catalog;
use templar::core::models::domain::DomainUnit;
use templar::core::models::template::Template;
use templar::engine::cache::TemplateCache;
use templar::engine::progress::ProgressReporter;
use templar::engine::select::TemplateSelector;
use templar::engine::workspace::Workspace;
use templar::workflows;
use tracing::{debug, error, info, instrument, warn};

/// What gets written to `<output>/<storage_key>.toml` for every selected unit.
#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct TemplateRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    staged_dir: Option<&'a Path>,
    unit: &'a DomainUnit,
    template: &'a Template,
}

struct UnitReport {
    record_path: PathBuf,
    score: u64,
    from_cache: bool,
}

/// Shared, read-only state handed to every worker.
struct RunContext<'a> {
    catalog: &'a Catalog,
    config: &'a RunConfig,
    pool: &'a Arc<AlignerPool>,
    reporter: &'a ProgressReporter<'a>,
    output: &'a Path,
}

#[instrument(skip_all, name = "select_command")]
pub fn run(args: SelectArgs) -> Result<()> {
    info!("Starting template selection.");

    let partial_config = match &args.config {
        Some(path) => PartialSelectConfig::from_file(path)?,
        None => PartialSelectConfig::default(),
    };
    let config = partial_config.merge_with_cli(&args)?;
    debug!(?config, "Resolved selection configuration.");

    let catalog = Catalog::load(&args.catalog).map_err(|e| CliError::FileParsing {
        path: args.catalog.clone(),
        source: e.into(),
    })?;
    if catalog.queries.is_empty() {
        warn!("Catalog {:?} lists no queries; nothing to do.", args.catalog);
        return Ok(());
    }
    info!(
        queries = catalog.queries.len(),
        domains = catalog.domains.len(),
        contacts = catalog.contacts.len(),
        "Catalog loaded."
    );

    fs::create_dir_all(&args.output)?;
    let pool = Arc::new(AlignerPool::new(config.max_concurrent));
    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let context = RunContext {
        catalog: &catalog,
        config: &config,
        pool: &pool,
        reporter: &reporter,
        output: &args.output,
    };

    let outcomes: Vec<(String, Result<UnitReport>)> = catalog
        .queries
        .par_iter()
        .map_init(TemplateCache::new, |cache, unit| {
            (unit.label(), process_unit(unit, &context, cache))
        })
        .collect();

    progress_handler.finish("Done");

    let total = outcomes.len();
    let mut failed = 0;
    for (label, outcome) in outcomes {
        match outcome {
            Ok(report) => {
                let origin = if report.from_cache { " (cached)" } else { "" };
                println!(
                    "✓ {} -> {} [score {}]{}",
                    label,
                    report.record_path.display(),
                    report.score,
                    origin
                );
            }
            Err(e) => {
                failed += 1;
                error!(domain = %label, "Template selection failed: {}", e);
                println!("✗ {}: {}", label, e);
            }
        }
    }

    info!(total, failed, "Template selection finished.");
    if failed > 0 {
        return Err(CliError::Selection { failed, total });
    }
    Ok(())
}

/// Selects one unit inside a fresh workspace, removing the workspace if anything fails.
fn process_unit(
    unit: &DomainUnit,
    context: &RunContext,
    cache: &mut TemplateCache,
) -> Result<UnitReport> {
    let workspace = Workspace::new(&context.config.workspace_root, Workspace::unique_token());
    let outcome = select_in_workspace(unit, context, cache, &workspace);
    if outcome.is_err() {
        if let Err(e) = workspace.cleanup() {
            warn!(token = workspace.token(), "Failed to clean up workspace: {}", e);
        }
    }
    outcome
}

fn select_in_workspace(
    unit: &DomainUnit,
    context: &RunContext,
    cache: &mut TemplateCache,
    workspace: &Workspace,
) -> Result<UnitReport> {
    workspace.prepare()?;
    let alignments_dir = workspace.alignments_dir();

    let aligner = PooledAligner::new(
        GlobalAligner::new(context.config.scoring),
        Arc::clone(context.pool),
        workspace.token(),
    );
    let selector = TemplateSelector::new(
        context.catalog,
        context.catalog,
        &aligner,
        &context.config.selection,
        context.reporter,
    )
    .with_artifact_dir(&alignments_dir);

    let result = workflows::select::run(unit, &selector, cache, Some(workspace))?;

    let record_path = context
        .output
        .join(format!("{}.toml", unit.storage_key()));
    if let Some(parent) = record_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let record = TemplateRecord {
        staged_dir: result.staged_dir.as_deref(),
        unit,
        template: &result.template,
    };
    let text = toml::to_string(&record).map_err(|e| CliError::Other(e.into()))?;
    fs::write(&record_path, text)?;
    debug!(path = %record_path.display(), "Template record written.");

    Ok(UnitReport {
        record_path,
        score: result.template.total_score(),
        from_cache: result.from_cache,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use tempfile::tempdir;

    const QUERY: &str = "ACDEFGHIKLMNPQRSTVWYCEGIKMPRTWADFHLNQSVYDGKNRVAEHMQTYCFILPSWAFKPTCGLRWDHNSYEIMQVDILQWCKSAGTMVNEPYRFH";

    fn catalog_text(family: &str) -> String {
        format!(
            r#"
[sequences]
P1 = "{query}"

[[domains]]
family = "Alpha"
cath-id = "1abcA01"
structure-id = "1ABC"
chain-id = "A"
resolution = 2.4
range = "1:41"

[[chains]]
structure-id = "1ABC"
chain-id = "A"
sequence = "{chain}"

[[queries]]
kind = "single"
identity = "P1_{family}"
family = "{family}"
range = "10:50"
sequence-id = "P1"
"#,
            query = QUERY,
            chain = &QUERY[9..50],
            family = family,
        )
    }

    fn select_args(dir: &Path, family: &str) -> SelectArgs {
        let catalog = dir.join("catalog.toml");
        fs::write(&catalog, catalog_text(family)).unwrap();
        let output = dir.join("out");
        let cli = Cli::parse_from([
            "templar",
            "select",
            "--catalog",
            catalog.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--max-concurrent",
            "1",
        ]);
        match cli.command {
            Commands::Select(args) => args,
            _ => panic!("Expected 'select' subcommand"),
        }
    }

    #[test]
    fn select_writes_one_record_per_query() {
        let dir = tempdir().unwrap();
        let args = select_args(dir.path(), "Alpha");
        let output = args.output.clone();

        run(args).unwrap();

        let record = fs::read_to_string(output.join("P1").join("P1_Alpha.toml")).unwrap();
        assert!(record.contains("P1_1ABCA.aln"));
        assert!(record.contains("24250"));
    }

    #[test]
    fn failed_units_are_reported_and_their_workspace_removed() {
        let dir = tempdir().unwrap();
        let args = select_args(dir.path(), "Gamma");
        let output = args.output.clone();

        let result = run(args);
        assert!(matches!(
            result,
            Err(CliError::Selection {
                failed: 1,
                total: 1
            })
        ));

        let workspace_root = output.join("workspace");
        let leftovers = fs::read_dir(&workspace_root)
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert_eq!(leftovers, 0);
        assert!(!output.join("P1").join("P1_Gamma.toml").exists());
    }
}
