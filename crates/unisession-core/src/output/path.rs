use std::path::Path;

use crate::layout::entities::ENTITY_ORDER;
use crate::model::{FileRecord, RenumberedFile};

fn entity_rank(key: &str) -> usize {
    ENTITY_ORDER
        .iter()
        .position(|k| *k == key)
        .unwrap_or(ENTITY_ORDER.len())
}

/// File name of a combined file: subject, task, the record's other entities
/// and the new run, in BIDS entity order. Never contains a session.
pub fn output_file_name(record: &FileRecord, run: u32, width: usize) -> String {
    let mut entities: Vec<(&str, String)> = Vec::with_capacity(record.entities.len() + 3);
    entities.push(("sub", record.subject.clone()));
    if let Some(task) = &record.task {
        entities.push(("task", task.clone()));
    }
    entities.extend(
        record
            .entities
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone())),
    );
    entities.push(("run", format!("{run:0width$}")));
    // Stable: unknown keys keep their relative order at the end.
    entities.sort_by_key(|(k, _)| entity_rank(k));

    let mut name = entities
        .iter()
        .map(|(k, v)| format!("{k}-{v}"))
        .collect::<Vec<_>>()
        .join("_");
    name.push('_');
    name.push_str(&record.suffix);
    name.push_str(&record.extension);
    name
}

/// Resolve where a renumbered record lands:
/// `<root>/sub-<label>/<datatype>/<name>` plus its `.json` sidecar.
pub fn place(record: FileRecord, run: u32, width: usize, root: &Path) -> RenumberedFile {
    let name = output_file_name(&record, run, width);
    let stem = name.strip_suffix(record.extension.as_str()).unwrap_or(&name);
    let dir = root
        .join(format!("sub-{}", record.subject))
        .join(record.category.dir_name());
    let sidecar_destination = dir.join(format!("{stem}.json"));
    let destination = dir.join(&name);

    RenumberedFile {
        record,
        run,
        width,
        destination,
        sidecar_destination,
    }
}
