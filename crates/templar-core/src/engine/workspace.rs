use super::error::TemplateError;
use crate::core::models::domain::DomainUnit;
use crate::core::models::template::Template;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

static NEXT_TOKEN: AtomicUsize = AtomicUsize::new(0);

fn io_error(path: &Path, source: std::io::Error) -> TemplateError {
    TemplateError::Artifact {
        path: path.to_string_lossy().to_string(),
        source,
    }
}

/// A worker's private directory under a shared root, named by a unique token.
///
/// ```text
/// <root>/<token>/alignments/          every alignment written while refining
/// <root>/<token>/<storage_key>/       artifacts of the selected template
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
    token: String,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, token: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            token: token.into(),
        }
    }

    /// A token unique within this process and distinct from other processes.
    pub fn unique_token() -> String {
        format!(
            "{}-{}",
            std::process::id(),
            NEXT_TOKEN.fetch_add(1, Ordering::Relaxed)
        )
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn scoped_dir(&self) -> PathBuf {
        self.root.join(&self.token)
    }

    pub fn alignments_dir(&self) -> PathBuf {
        self.scoped_dir().join("alignments")
    }

    pub fn unit_dir(&self, unit: &DomainUnit) -> PathBuf {
        self.scoped_dir().join(unit.storage_key())
    }

    /// Creates the scoped and alignment directories.
    pub fn prepare(&self) -> Result<(), TemplateError> {
        let dir = self.alignments_dir();
        fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))
    }

    /// Copies the artifacts of `template` from `source_dir` into the unit's directory.
    pub fn stage_artifacts(
        &self,
        unit: &DomainUnit,
        template: &Template,
        source_dir: &Path,
    ) -> Result<PathBuf, TemplateError> {
        let target_dir = self.unit_dir(unit);
        fs::create_dir_all(&target_dir).map_err(|e| io_error(&target_dir, e))?;
        for name in template.artifact_names() {
            let source = source_dir.join(name);
            let target = target_dir.join(name);
            fs::copy(&source, &target).map_err(|e| io_error(&source, e))?;
            debug!(artifact = name, target = %target.display(), "Staged alignment artifact.");
        }
        Ok(target_dir)
    }

    /// The unit's directory if every artifact of `template` is already staged there.
    pub fn staged_dir(&self, unit: &DomainUnit, template: &Template) -> Option<PathBuf> {
        let dir = self.unit_dir(unit);
        template
            .artifact_names()
            .into_iter()
            .all(|name| dir.join(name).is_file())
            .then_some(dir)
    }

    /// Removes the scoped directory and everything in it.
    pub fn cleanup(&self) -> Result<(), TemplateError> {
        let dir = self.scoped_dir();
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&dir, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::candidate::StructureDomain;
    use crate::core::models::domain::{DomainRange, SingleDomain};
    use crate::core::models::template::TemplateSide;
    use tempfile::tempdir;

    fn unit() -> DomainUnit {
        DomainUnit::Single(SingleDomain {
            identity: "P1_Ras".to_string(),
            family: "Ras".to_string(),
            range: DomainRange::new(1, 10),
            sequence_id: "P1".to_string(),
        })
    }

    fn template() -> Template {
        Template::Single {
            candidate: StructureDomain {
                cath_id: "1abcA00".to_string(),
                structure_id: "1ABC".to_string(),
                chain_id: "A".to_string(),
                resolution: 2.0,
                range: DomainRange::new(1, 10),
            },
            alignment: TemplateSide {
                sequence_range: DomainRange::new(1, 10),
                alignment_reference_id: "1ABCA".to_string(),
                alignment_score: 1,
                alignment_artifact_name: "P1_1ABCA.aln".to_string(),
            },
        }
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(Workspace::unique_token(), Workspace::unique_token());
    }

    #[test]
    fn artifacts_are_staged_under_the_storage_key() {
        let root = tempdir().unwrap();
        let workspace = Workspace::new(root.path(), "w1");
        workspace.prepare().unwrap();
        fs::write(workspace.alignments_dir().join("P1_1ABCA.aln"), ">P1\nA\n>1ABCA\nA\n").unwrap();

        let staged = workspace
            .stage_artifacts(&unit(), &template(), &workspace.alignments_dir())
            .unwrap();
        assert_eq!(staged, root.path().join("w1").join("P1").join("P1_Ras"));
        assert!(staged.join("P1_1ABCA.aln").is_file());
    }

    #[test]
    fn staged_dir_requires_every_artifact() {
        let root = tempdir().unwrap();
        let workspace = Workspace::new(root.path(), "w1");
        workspace.prepare().unwrap();
        assert_eq!(workspace.staged_dir(&unit(), &template()), None);

        fs::write(workspace.alignments_dir().join("P1_1ABCA.aln"), ">P1\nA\n>1ABCA\nA\n").unwrap();
        let staged = workspace
            .stage_artifacts(&unit(), &template(), &workspace.alignments_dir())
            .unwrap();
        assert_eq!(workspace.staged_dir(&unit(), &template()), Some(staged));

        let other = Workspace::new(root.path(), "w2");
        assert_eq!(other.staged_dir(&unit(), &template()), None);
    }

    #[test]
    fn staging_a_missing_artifact_fails() {
        let root = tempdir().unwrap();
        let workspace = Workspace::new(root.path(), "w1");
        workspace.prepare().unwrap();
        let result = workspace.stage_artifacts(&unit(), &template(), &workspace.alignments_dir());
        assert!(matches!(result, Err(TemplateError::Artifact { .. })));
    }

    #[test]
    fn cleanup_removes_the_scoped_directory_and_is_idempotent() {
        let root = tempdir().unwrap();
        let workspace = Workspace::new(root.path(), "w1");
        workspace.prepare().unwrap();
        workspace.cleanup().unwrap();
        assert!(!workspace.scoped_dir().exists());
        workspace.cleanup().unwrap();
    }
}
