use std::path::PathBuf;
use thiserror::Error;

/// Default and upper bound for expand/contract rounds per side.
pub const DEFAULT_MAX_ITERATIONS: usize = 5;
pub const DEFAULT_MAX_TRIM_ROUNDS: usize = 10;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefinementConfig {
    /// Upper bound on expand/contract rounds per side.
    pub max_iterations: usize,
    /// Run the stranded-residue trimming stage when refining the bound template.
    pub trim_loners: bool,
    pub max_trim_rounds: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionConfig {
    pub refinement: RefinementConfig,
    /// Structure ids skipped in addition to the built-in deny list.
    pub excluded_structures: Vec<String>,
    /// Directory that receives every final alignment as aligned FASTA.
    pub artifact_dir: Option<PathBuf>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            refinement: RefinementConfig {
                max_iterations: DEFAULT_MAX_ITERATIONS,
                trim_loners: false,
                max_trim_rounds: DEFAULT_MAX_TRIM_ROUNDS,
            },
            excluded_structures: Vec::new(),
            artifact_dir: None,
        }
    }
}

#[derive(Default)]
pub struct SelectionConfigBuilder {
    max_iterations: Option<usize>,
    trim_loners: Option<bool>,
    max_trim_rounds: Option<usize>,
    excluded_structures: Vec<String>,
    artifact_dir: Option<PathBuf>,
}

impl SelectionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = Some(iterations);
        self
    }
    pub fn trim_loners(mut self, enabled: bool) -> Self {
        self.trim_loners = Some(enabled);
        self
    }
    pub fn max_trim_rounds(mut self, rounds: usize) -> Self {
        self.max_trim_rounds = Some(rounds);
        self
    }
    pub fn exclude_structure(mut self, structure_id: impl Into<String>) -> Self {
        self.excluded_structures.push(structure_id.into());
        self
    }
    pub fn excluded_structures(mut self, structure_ids: Vec<String>) -> Self {
        self.excluded_structures = structure_ids;
        self
    }
    pub fn artifact_dir(mut self, dir: PathBuf) -> Self {
        self.artifact_dir = Some(dir);
        self
    }

    pub fn build(self) -> Result<SelectionConfig, ConfigError> {
        let max_iterations = self.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS);
        if max_iterations > DEFAULT_MAX_ITERATIONS {
            return Err(ConfigError::InvalidParameter {
                name: "max_iterations",
                reason: format!("must be at most {DEFAULT_MAX_ITERATIONS}, got {max_iterations}"),
            });
        }
        let trim_loners = self.trim_loners.unwrap_or(false);
        let max_trim_rounds = self.max_trim_rounds.unwrap_or(DEFAULT_MAX_TRIM_ROUNDS);
        if trim_loners && max_trim_rounds == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "max_trim_rounds",
                reason: "must be at least 1 when loner trimming is enabled".to_string(),
            });
        }

        let excluded_structures = self
            .excluded_structures
            .into_iter()
            .map(|id| id.trim().to_ascii_uppercase())
            .filter(|id| !id.is_empty())
            .collect();

        Ok(SelectionConfig {
            refinement: RefinementConfig {
                max_iterations,
                trim_loners,
                max_trim_rounds,
            },
            excluded_structures,
            artifact_dir: self.artifact_dir,
        })
    }
}
