use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CombineError;
use crate::model::FileRecord;

/// Points a combined file back at the data file it was copied from.
pub const PROVENANCE_FIELD: &str = "SourceFile";

/// Field-map targets: the functional files a field map corrects.
pub const INTENDED_FOR_FIELD: &str = "IntendedFor";

/// A JSON sidecar document. Keys other than the provenance and intended-for
/// fields pass through untouched, in their original order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Sidecar {
    fields: Map<String, Value>,
}

impl Sidecar {
    pub fn load(path: &Path) -> Result<Self, CombineError> {
        let content = std::fs::read_to_string(path).map_err(CombineError::io(path))?;
        let value: Value = serde_json::from_str(&content).map_err(|e| CombineError::Sidecar {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(CombineError::Sidecar {
                path: path.to_path_buf(),
                reason: format!("expected a JSON object, found {other}"),
            }),
        }
    }

    /// The record's own sidecar, or an empty document when it has none.
    pub fn for_record(record: &FileRecord) -> Result<Self, CombineError> {
        match &record.sidecar {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn set_provenance(&mut self, source: &Path) {
        self.fields.insert(
            PROVENANCE_FIELD.to_string(),
            Value::String(source.to_string_lossy().into_owned()),
        );
    }

    pub fn provenance(&self) -> Option<&str> {
        self.fields.get(PROVENANCE_FIELD).and_then(Value::as_str)
    }

    /// Rewrite each `IntendedFor` entry through `resolve`. Entries it cannot
    /// resolve are removed and returned. A single resolved string stays a
    /// string; anything else becomes a list.
    pub fn rewrite_intended_for<F>(&mut self, resolve: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(current) = self.fields.get_mut(INTENDED_FOR_FIELD) else {
            return Vec::new();
        };

        let mut dropped = Vec::new();
        let rewritten = match &mut *current {
            Value::String(target) => match resolve(target.as_str()) {
                Some(new_target) => Value::String(new_target),
                None => {
                    dropped.push(target.clone());
                    Value::Array(Vec::new())
                }
            },
            Value::Array(items) => {
                let mut kept = Vec::with_capacity(items.len());
                for item in items.iter() {
                    match item.as_str().and_then(&resolve) {
                        Some(new_target) => kept.push(Value::String(new_target)),
                        None => dropped.push(
                            item.as_str()
                                .map(String::from)
                                .unwrap_or_else(|| item.to_string()),
                        ),
                    }
                }
                Value::Array(kept)
            }
            other => {
                dropped.push(other.to_string());
                Value::Array(Vec::new())
            }
        };
        *current = rewritten;
        dropped
    }

    pub fn to_pretty_string(&self) -> String {
        let mut out = serde_json::to_string_pretty(&self.fields).unwrap_or_default();
        out.push('\n');
        out
    }

    /// Write to `dest`, failing with `AlreadyExists` instead of overwriting.
    pub fn write_new(&self, dest: &Path) -> std::io::Result<()> {
        let mut file = File::create_new(dest)?;
        file.write_all(self.to_pretty_string().as_bytes())?;
        file.sync_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn sidecar(value: Value) -> Sidecar {
        match value {
            Value::Object(fields) => Sidecar { fields },
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_provenance_and_passthrough() {
        let mut doc = sidecar(json!({"RepetitionTime": 0.8, "TaskName": "rest"}));
        doc.set_provenance(Path::new("/in/sub-01/ses-B/func/x_bold.nii.gz"));
        assert_eq!(doc.provenance(), Some("/in/sub-01/ses-B/func/x_bold.nii.gz"));
        assert_eq!(doc.get("RepetitionTime"), Some(&json!(0.8)));
        assert_eq!(doc.len(), 3);

        let text = doc.to_pretty_string();
        let keys: Vec<_> = text
            .lines()
            .filter_map(|l| l.trim().strip_prefix('"'))
            .map(|l| l.split('"').next().unwrap())
            .collect();
        assert_eq!(keys, vec!["RepetitionTime", "TaskName", "SourceFile"]);
    }

    #[test]
    fn test_rewrite_intended_for_list_drops_unresolved() {
        let mut doc = sidecar(json!({
            "IntendedFor": ["ses-A/func/a.nii.gz", "ses-A/func/b.nii.gz", 7]
        }));
        let dropped = doc.rewrite_intended_for(|t| {
            (t == "ses-A/func/a.nii.gz").then(|| "func/new.nii.gz".to_string())
        });
        assert_eq!(dropped, vec!["ses-A/func/b.nii.gz", "7"]);
        assert_eq!(doc.get("IntendedFor"), Some(&json!(["func/new.nii.gz"])));
    }

    #[test]
    fn test_rewrite_intended_for_single_string() {
        let mut doc = sidecar(json!({"IntendedFor": "ses-A/func/a.nii.gz"}));
        assert!(doc
            .rewrite_intended_for(|_| Some("func/x.nii.gz".into()))
            .is_empty());
        assert_eq!(doc.get("IntendedFor"), Some(&json!("func/x.nii.gz")));

        let dropped = doc.rewrite_intended_for(|_| None);
        assert_eq!(dropped, vec!["func/x.nii.gz"]);
        assert_eq!(doc.get("IntendedFor"), Some(&json!([])));
    }

    #[test]
    fn test_rewrite_without_field_is_noop() {
        let mut doc = sidecar(json!({"EchoTime": 0.03}));
        assert!(doc.rewrite_intended_for(|_| None).is_empty());
        assert!(doc.get("IntendedFor").is_none());
    }

    #[test]
    fn test_load_rejects_non_object() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            Sidecar::load(&path).unwrap_err(),
            CombineError::Sidecar { .. }
        ));
    }

    #[test]
    fn test_write_new_refuses_to_overwrite() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.json");
        let doc = sidecar(json!({"a": 1}));
        doc.write_new(&path).unwrap();
        let err = doc.write_new(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);
        let reloaded = Sidecar::load(&path).unwrap();
        assert_eq!(reloaded, doc);
    }
}
