use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// BIDS datatype directories handled by the combiner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Anat,
    Func,
    Fmap,
}

impl Category {
    /// Processing order of a combine run.
    pub const ALL: [Category; 3] = [Category::Anat, Category::Func, Category::Fmap];

    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Anat => "anat",
            Self::Func => "func",
            Self::Fmap => "fmap",
        }
    }

    pub fn from_dir_name(name: &str) -> Option<Self> {
        match name {
            "anat" => Some(Self::Anat),
            "func" => Some(Self::Func),
            "fmap" => Some(Self::Fmap),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// One discovered data file. Produced by a layout adapter and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub subject: String,
    pub session: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    pub suffix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<u32>,
    /// Remaining filename entities (`acq`, `dir`, `echo`, ...) in original order.
    /// Never contains `sub`, `ses`, `task` or `run`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<(String, String)>,
    /// Includes the leading dot, e.g. `.nii.gz`.
    pub extension: String,
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidecar: Option<PathBuf>,
}

impl FileRecord {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Location relative to the subject directory, e.g.
    /// `ses-A/func/sub-01_ses-A_task-rest_run-1_bold.nii.gz`. This is the form
    /// field-map `IntendedFor` entries use.
    pub fn subject_relative_path(&self) -> String {
        format!(
            "ses-{}/{}/{}",
            self.session,
            self.category.dir_name(),
            self.file_name()
        )
    }
}
