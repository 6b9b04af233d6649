use crate::cli::{SelectArgs, TrimLoners};
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use templar::core::align::global::AlignerScoring;
use templar::engine::config as core_config;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialRefinementConfig {
    #[serde(rename = "max-iterations")]
    max_iterations: Option<usize>,
    #[serde(rename = "trim-loners")]
    trim_loners: Option<bool>,
    #[serde(rename = "max-trim-rounds")]
    max_trim_rounds: Option<usize>,
    #[serde(rename = "exclude-structures")]
    exclude_structures: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialAlignerConfig {
    #[serde(rename = "match-score")]
    match_score: Option<i32>,
    #[serde(rename = "mismatch-score")]
    mismatch_score: Option<i32>,
    #[serde(rename = "gap-penalty")]
    gap_penalty: Option<i32>,
    #[serde(rename = "max-concurrent")]
    max_concurrent: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialWorkspaceConfig {
    root: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialSelectConfig {
    refinement: Option<PartialRefinementConfig>,
    aligner: Option<PartialAlignerConfig>,
    workspace: Option<PartialWorkspaceConfig>,
}

/// Fully resolved settings for one `select` run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub selection: core_config::SelectionConfig,
    pub scoring: AlignerScoring,
    pub max_concurrent: usize,
    pub workspace_root: PathBuf,
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

impl PartialSelectConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn merge_with_cli(mut self, args: &SelectArgs) -> Result<RunConfig> {
        self.apply_set_values(&args.set_values)?;

        let refinement = self.refinement.take().unwrap_or_default();
        let aligner = self.aligner.take().unwrap_or_default();
        let workspace = self.workspace.take().unwrap_or_default();

        let mut builder = core_config::SelectionConfigBuilder::new()
            .max_iterations(
                args.max_iterations
                    .or(refinement.max_iterations)
                    .unwrap_or(core_config::DEFAULT_MAX_ITERATIONS),
            )
            .trim_loners(Self::merge_trim_loners(
                args.trim_loners,
                refinement.trim_loners,
            ))
            .excluded_structures(refinement.exclude_structures.unwrap_or_default());
        if let Some(rounds) = refinement.max_trim_rounds {
            builder = builder.max_trim_rounds(rounds);
        }
        let selection = builder.build().map_err(|e| CliError::Config(e.to_string()))?;

        let defaults = AlignerScoring::default();
        let scoring = AlignerScoring {
            match_score: aligner.match_score.unwrap_or(defaults.match_score),
            mismatch_score: aligner.mismatch_score.unwrap_or(defaults.mismatch_score),
            gap_penalty: aligner.gap_penalty.unwrap_or(defaults.gap_penalty),
        };

        let max_concurrent = args
            .max_concurrent
            .or(aligner.max_concurrent)
            .unwrap_or_else(default_concurrency);
        if max_concurrent == 0 {
            return Err(CliError::Config(
                "`aligner.max-concurrent` must be at least 1.".to_string(),
            ));
        }

        let workspace_root = args
            .workspace
            .clone()
            .or(workspace.root)
            .unwrap_or_else(|| args.output.join("workspace"));

        Ok(RunConfig {
            selection,
            scoring,
            max_concurrent,
            workspace_root,
        })
    }

    fn merge_trim_loners(cli_flags: TrimLoners, file_val: Option<bool>) -> bool {
        if cli_flags.trim_loners {
            true
        } else if cli_flags.no_trim_loners {
            false
        } else {
            file_val.unwrap_or(false)
        }
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "refinement.max-iterations" => {
                    self.refinement
                        .get_or_insert_with(Default::default)
                        .max_iterations = Some(parse_value(key, value_str, "integer")?);
                }
                "refinement.trim-loners" => {
                    self.refinement
                        .get_or_insert_with(Default::default)
                        .trim_loners = Some(parse_value(key, value_str, "boolean")?);
                }
                "refinement.max-trim-rounds" => {
                    self.refinement
                        .get_or_insert_with(Default::default)
                        .max_trim_rounds = Some(parse_value(key, value_str, "integer")?);
                }
                "aligner.match-score" => {
                    self.aligner.get_or_insert_with(Default::default).match_score =
                        Some(parse_value(key, value_str, "integer")?);
                }
                "aligner.mismatch-score" => {
                    self.aligner
                        .get_or_insert_with(Default::default)
                        .mismatch_score = Some(parse_value(key, value_str, "integer")?);
                }
                "aligner.gap-penalty" => {
                    self.aligner.get_or_insert_with(Default::default).gap_penalty =
                        Some(parse_value(key, value_str, "integer")?);
                }
                "aligner.max-concurrent" => {
                    self.aligner
                        .get_or_insert_with(Default::default)
                        .max_concurrent = Some(parse_value(key, value_str, "integer")?);
                }
                "workspace.root" => {
                    self.workspace.get_or_insert_with(Default::default).root =
                        Some(PathBuf::from(value_str));
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
