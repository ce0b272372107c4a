use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::record::{Category, FileRecord};
use crate::error::CombineError;
use crate::output::sidecar::Sidecar;

/// A file paired with its new run number and resolved output location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenumberedFile {
    pub record: FileRecord,
    pub run: u32,
    /// Zero-padding width of the run label.
    pub width: usize,
    pub destination: PathBuf,
    pub sidecar_destination: PathBuf,
}

impl RenumberedFile {
    pub fn destination_file_name(&self) -> String {
        self.destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Destination relative to the output subject directory, e.g.
    /// `func/sub-01_task-rest_run-01_bold.nii.gz`.
    pub fn subject_relative_destination(&self) -> String {
        format!(
            "{}/{}",
            self.record.category.dir_name(),
            self.destination_file_name()
        )
    }
}

/// A renumbered file together with the sidecar document that will be written
/// next to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedFile {
    #[serde(flatten)]
    pub file: RenumberedFile,
    pub metadata: Sidecar,
}

/// Everything a combine run will write, computed without touching the output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CombinePlan {
    pub subject: String,
    pub sessions: Vec<String>,
    pub output_root: PathBuf,
    pub anat: Vec<PlannedFile>,
    pub func: Vec<PlannedFile>,
    pub fmap: Vec<PlannedFile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl CombinePlan {
    /// `<output_root>/sub-<label>`
    pub fn subject_dir(&self) -> PathBuf {
        self.output_root.join(format!("sub-{}", self.subject))
    }

    pub fn category(&self, category: Category) -> &[PlannedFile] {
        match category {
            Category::Anat => &self.anat,
            Category::Func => &self.func,
            Category::Fmap => &self.fmap,
        }
    }

    /// All planned files in execution order: anat, func, fmap.
    pub fn files(&self) -> impl Iterator<Item = &PlannedFile> {
        Category::ALL
            .into_iter()
            .flat_map(move |category| self.category(category).iter())
    }

    pub fn len(&self) -> usize {
        self.anat.len() + self.func.len() + self.fmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fail if two planned files map to the same destination.
    pub fn check_destinations(&self) -> Result<(), CombineError> {
        let mut seen: HashSet<&Path> = HashSet::new();
        for planned in self.files() {
            let file = &planned.file;
            for dest in [&file.destination, &file.sidecar_destination] {
                if !seen.insert(dest.as_path()) {
                    return Err(CombineError::Collision {
                        origin: file.record.path.clone(),
                        destination: dest.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// One copied file: original location and where it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRecord {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl fmt::Display for TransferRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}",
            self.source.display(),
            self.destination.display()
        )
    }
}
