use crate::cli::ScoreArgs;
use crate::error::{CliError, Result};
use templar::core::analysis::gaps;
use templar::core::io::artifact;
use templar::core::models::alignment::PairwiseAlignment;
use templar::core::scoring;
use tracing::{info, instrument};

/// Quality figures for one alignment, as `templar score` prints them.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSummary {
    pub identity: f64,
    pub coverage: f64,
    pub score: u32,
    /// Boundary extensions (left, right) suggested by each aligned sequence.
    pub first_extension: (usize, usize),
    pub second_extension: (usize, usize),
}

pub fn summarize(
    alignment: &PairwiseAlignment,
    max_domain_length: Option<usize>,
) -> Result<ScoreSummary> {
    let identity = scoring::identity(alignment);
    let coverage = scoring::coverage(alignment, max_domain_length);
    let to_cli = |e: gaps::GapPatternError| CliError::Other(e.into());
    Ok(ScoreSummary {
        identity,
        coverage,
        score: scoring::composite(identity, coverage),
        first_extension: gaps::classify(&alignment.first().sequence).map_err(to_cli)?,
        second_extension: gaps::classify(&alignment.second().sequence).map_err(to_cli)?,
    })
}

#[instrument(skip_all, name = "score_command")]
pub fn run(args: ScoreArgs) -> Result<()> {
    let alignment =
        artifact::read_alignment_from_path(&args.alignment).map_err(|e| CliError::FileParsing {
            path: args.alignment.clone(),
            source: e.into(),
        })?;
    let summary = summarize(&alignment, args.max_domain_length)?;
    info!(score = summary.score, "Alignment scored.");

    println!("{} vs {}", alignment.first().id, alignment.second().id);
    println!("  identity:  {:.2}%", summary.identity);
    println!("  coverage:  {:.2}%", summary.coverage);
    println!("  score:     {}", summary.score);
    println!(
        "  extend {}: left {}, right {}",
        alignment.first().id,
        summary.first_extension.0,
        summary.first_extension.1
    );
    println!(
        "  extend {}: left {}, right {}",
        alignment.second().id,
        summary.second_extension.0,
        summary.second_extension.1
    );
    Ok(())
}
