use std::collections::HashMap;
use std::path::Path;

use super::inventory::Inventory;
use super::renumber::renumber;
use crate::model::{Category, FileRecord, RenumberedFile};
use crate::output::path::place;

/// Where each combined functional file went, keyed by its location relative
/// to the input subject directory (`ses-A/func/...`) and giving the location
/// relative to the output subject directory (`func/...`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetMap(HashMap<String, String>);

impl TargetMap {
    pub fn from_files(files: &[RenumberedFile]) -> Self {
        Self(
            files
                .iter()
                .map(|f| (f.record.subject_relative_path(), f.subject_relative_destination()))
                .collect(),
        )
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        self.0.get(source).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Renumber every functional file per task, ordered by session then
/// discovery. All images of a task (`bold`, `sbref`, ...) share one sequence.
pub fn plan_func(
    inventory: &Inventory,
    root: &Path,
    warnings: &mut Vec<String>,
) -> Vec<RenumberedFile> {
    let files = inventory.files(Category::Func).to_vec();
    if files.is_empty() {
        let message = format!("Subject sub-{} has only anatomical data.", inventory.subject);
        tracing::warn!("{message}");
        warnings.push(message);
    }

    renumber(files, |r: &FileRecord| r.task.clone().unwrap_or_default())
        .into_iter()
        .map(|n| place(n.item, n.run, n.width, root))
        .collect()
}
