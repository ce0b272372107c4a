use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

use super::inventory::Inventory;
use super::sessions::resolve_session_order;
use crate::config::CombineConfig;
use crate::layout::{LayoutQuery, MemoryLayout};

pub const ROOT: &str = "/in/niftis";

/// `ses-A/func/sub-01_ses-A_task-rest_run-1_bold.nii.gz` -> full path under [`ROOT`].
pub fn input_path(relative: &str) -> String {
    format!("{ROOT}/sub-01/{relative}")
}

pub fn memory_layout(relative_paths: &[&str]) -> MemoryLayout {
    let mut layout = MemoryLayout::new();
    for relative in relative_paths {
        layout.add_path(input_path(relative)).unwrap();
    }
    layout
}

pub fn inventory(relative_paths: &[&str], order: &[&str]) -> Inventory {
    let layout = memory_layout(relative_paths);
    let requested: Vec<String> = order.iter().map(|s| s.to_string()).collect();
    let discovered = layout.sessions("01").unwrap();
    let order = resolve_session_order("01", &requested, &discovered).unwrap();
    Inventory::collect(&layout, "01", order).unwrap()
}

/// A BIDS dataset on disk at `<tmp>/niftis`.
pub struct Dataset {
    pub tmp: TempDir,
    pub root: PathBuf,
}

impl Dataset {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("niftis");
        fs::create_dir_all(&root).unwrap();
        Self { tmp, root }
    }

    /// Write a data file (content = its own name) and, if given, its sidecar.
    pub fn add(&self, relative: &str, sidecar: Option<Value>) -> PathBuf {
        let path = self.root.join("sub-01").join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, relative.as_bytes()).unwrap();
        if let Some(doc) = sidecar {
            let json = crate::layout::entities::sidecar_path_for(&path).unwrap();
            fs::write(json, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
        }
        path
    }

    pub fn config(&self) -> CombineConfig {
        CombineConfig::new(&self.root, "01")
    }

    pub fn output_subject_dir(&self) -> PathBuf {
        self.tmp.path().join("niftis_desc-combined").join("sub-01")
    }
}

/// Every file below `dir`, relative to it, sorted.
pub fn tree(dir: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(dir)
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    files.sort();
    files
}

