use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::entities::{record_from_path, sidecar_path_for};
use super::LayoutQuery;
use crate::error::CombineError;
use crate::model::{Category, FileRecord};

/// Layout adapter over a BIDS directory tree:
/// `<root>/sub-<label>/ses-<label>/{anat,func,fmap}/`.
///
/// Every list is ordered by file name, which is what `ls` shows.
#[derive(Debug, Clone)]
pub struct FsLayout {
    root: PathBuf,
}

impl FsLayout {
    /// Open a dataset root. The root is canonicalized so every record path
    /// is absolute regardless of the working directory.
    pub fn open(root: &Path) -> Result<Self, CombineError> {
        let root = root.canonicalize().map_err(|e| {
            CombineError::Discovery(format!("Cannot open {}: {e}", root.display()))
        })?;
        if !root.is_dir() {
            return Err(CombineError::Discovery(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    /// Canonical dataset root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn subject_dir(&self, subject: &str) -> PathBuf {
        self.root.join(format!("sub-{subject}"))
    }

    /// Labels of the immediate subdirectories of `dir` named `<prefix><label>`.
    fn prefixed_dirs(dir: &Path, prefix: &str) -> Result<Vec<String>, CombineError> {
        let mut labels = Vec::new();
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(|e| {
                CombineError::Discovery(format!("Cannot read {}: {e}", dir.display()))
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }
            if let Some(label) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_prefix(prefix))
            {
                if !label.is_empty() {
                    labels.push(label.to_string());
                }
            }
        }
        Ok(labels)
    }
}

impl LayoutQuery for FsLayout {
    fn subjects(&self) -> Result<Vec<String>, CombineError> {
        Self::prefixed_dirs(&self.root, "sub-")
    }

    fn sessions(&self, subject: &str) -> Result<Vec<String>, CombineError> {
        let dir = self.subject_dir(subject);
        if !dir.is_dir() {
            return Err(CombineError::Discovery(format!(
                "subject {subject} is not in the layout of {}",
                self.root.display()
            )));
        }
        Self::prefixed_dirs(&dir, "ses-")
    }

    fn files_for(
        &self,
        subject: &str,
        session: &str,
        category: Category,
    ) -> Result<Vec<FileRecord>, CombineError> {
        let dir = self
            .subject_dir(subject)
            .join(format!("ses-{session}"))
            .join(category.dir_name());
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        let walker = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(|e| {
                CombineError::Discovery(format!("Cannot read {}: {e}", dir.display()))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let Some(mut record) = record_from_path(path, category) else {
                tracing::debug!("Skipping {}", path.display());
                continue;
            };
            if record.subject != subject || record.session != session {
                tracing::debug!(
                    "Skipping {}: entities do not match its directory",
                    path.display()
                );
                continue;
            }
            record.sidecar = sidecar_path_for(path).filter(|p| p.is_file());
            records.push(record);
        }
        Ok(records)
    }
}
