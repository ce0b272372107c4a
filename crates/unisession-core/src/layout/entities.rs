use std::path::{Path, PathBuf};

use crate::model::{Category, FileRecord};

/// Image extensions treated as data files; everything else is ignored.
pub const DATA_EXTENSIONS: &[&str] = &[".nii.gz", ".nii"];

/// BIDS entity order used when building file names. Keys not listed here go
/// last, in the order they were found.
pub const ENTITY_ORDER: &[&str] = &[
    "sub", "ses", "sample", "task", "tracksys", "acq", "nuc", "voi", "ce", "trc", "stain", "rec",
    "dir", "run", "mod", "echo", "flip", "inv", "mt", "part", "proc", "hemi", "space", "split",
    "recording", "chunk", "seg", "res", "den", "label", "desc",
];

/// The pieces of a BIDS file name: `<key>-<value>_..._<suffix><extension>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub entities: Vec<(String, String)>,
    pub suffix: String,
    pub extension: String,
}

impl ParsedName {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entities
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Split a file name into entities, suffix and extension. Returns `None`
/// unless the name starts with a `sub-` entity and ends with a bare suffix.
pub fn parse_file_name(name: &str) -> Option<ParsedName> {
    let (stem, extension) = match name.find('.') {
        Some(i) => (&name[..i], &name[i..]),
        None => (name, ""),
    };

    let mut parts: Vec<&str> = stem.split('_').collect();
    let suffix = parts.pop()?;
    if suffix.is_empty() || suffix.contains('-') || parts.is_empty() {
        return None;
    }

    let mut entities = Vec::with_capacity(parts.len());
    for part in parts {
        let (key, value) = part.split_once('-')?;
        if key.is_empty() || value.is_empty() {
            return None;
        }
        entities.push((key.to_string(), value.to_string()));
    }

    if entities.first().map(|(k, _)| k.as_str()) != Some("sub") {
        return None;
    }

    Some(ParsedName {
        entities,
        suffix: suffix.to_string(),
        extension: extension.to_string(),
    })
}

pub fn is_data_file(name: &str) -> bool {
    DATA_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Build a [`FileRecord`] from a data file path. Functional files without a
/// `task` entity and files without a `ses` entity are rejected.
pub fn record_from_path(path: &Path, category: Category) -> Option<FileRecord> {
    let name = path.file_name()?.to_str()?;
    if !is_data_file(name) {
        return None;
    }
    let parsed = parse_file_name(name)?;

    let subject = parsed.get("sub")?.to_string();
    let session = parsed.get("ses")?.to_string();
    let task = parsed.get("task").map(String::from);
    if category == Category::Func && task.is_none() {
        return None;
    }
    let run = parsed.get("run").and_then(|r| r.parse::<u32>().ok());

    let entities = parsed
        .entities
        .into_iter()
        .filter(|(k, _)| !matches!(k.as_str(), "sub" | "ses" | "task" | "run"))
        .collect();

    Some(FileRecord {
        subject,
        session,
        category,
        task,
        suffix: parsed.suffix,
        run,
        entities,
        extension: parsed.extension,
        path: path.to_path_buf(),
        sidecar: None,
    })
}

/// Path of the JSON sidecar that shares the data file's base name.
pub fn sidecar_path_for(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let stem = DATA_EXTENSIONS
        .iter()
        .find_map(|ext| name.strip_suffix(ext))?;
    Some(path.with_file_name(format!("{stem}.json")))
}
