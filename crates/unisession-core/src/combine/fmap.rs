use std::path::{Component, Path, PathBuf};

use super::func::TargetMap;
use super::inventory::Inventory;
use super::renumber::renumber;
use crate::error::CombineError;
use crate::model::{Category, PlannedFile};
use crate::output::path::place;
use crate::output::sidecar::Sidecar;

/// Resolves field-map `IntendedFor` entries to the combined functional files.
///
/// Entries may be subject-relative (`ses-A/func/x.nii.gz`), BIDS URIs
/// (`bids::sub-01/ses-A/func/x.nii.gz`) or absolute paths inside the input
/// subject directory. The rewritten entry keeps the same spelling.
pub struct TargetResolver<'a> {
    subject_dir_name: String,
    input_subject_dir: PathBuf,
    output_subject_dir: PathBuf,
    targets: &'a TargetMap,
}

impl<'a> TargetResolver<'a> {
    pub fn new(
        subject: &str,
        input_subject_dir: &Path,
        output_root: &Path,
        targets: &'a TargetMap,
    ) -> Self {
        let subject_dir_name = format!("sub-{subject}");
        Self {
            input_subject_dir: input_subject_dir.to_path_buf(),
            output_subject_dir: output_root.join(&subject_dir_name),
            subject_dir_name,
            targets,
        }
    }

    pub fn resolve(&self, entry: &str) -> Option<String> {
        if let Some(uri) = entry.strip_prefix("bids:") {
            let (dataset, path) = uri.split_once(':')?;
            let relative = path.strip_prefix(&self.subject_dir_name)?.strip_prefix('/')?;
            let new = self.targets.get(relative)?;
            return Some(format!("bids:{dataset}:{}/{new}", self.subject_dir_name));
        }

        let path = Path::new(entry);
        if path.is_absolute() {
            let relative = self.relative_to_subject(path)?;
            let new = self.targets.get(&relative)?;
            return Some(self.output_subject_dir.join(new).to_string_lossy().into_owned());
        }

        self.targets
            .get(entry.trim_start_matches("./"))
            .map(String::from)
    }

    /// `<input subject dir>/ses-A/func/x.nii.gz` -> `ses-A/func/x.nii.gz`.
    /// Paths spelled through a symlink are matched by their canonical form.
    fn relative_to_subject(&self, path: &Path) -> Option<String> {
        let relative = match path.strip_prefix(&self.input_subject_dir) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => path
                .canonicalize()
                .ok()?
                .strip_prefix(&self.input_subject_dir)
                .ok()?
                .to_path_buf(),
        };
        let parts: Vec<String> = relative
            .components()
            .map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Option<_>>()?;
        (!parts.is_empty()).then(|| parts.join("/"))
    }
}

/// Input subject directory of a field map: `<subject dir>/ses-X/fmap/<file>`.
fn input_subject_dir(path: &Path) -> Option<&Path> {
    path.ancestors().nth(3)
}

/// Renumber all field maps as one sequence across sessions and point their
/// `IntendedFor` entries at the combined functional files. Entries whose
/// target was not combined are dropped with a warning.
pub fn plan_fmap(
    inventory: &Inventory,
    root: &Path,
    targets: &TargetMap,
    warnings: &mut Vec<String>,
) -> Result<Vec<PlannedFile>, CombineError> {
    let files = inventory.files(Category::Fmap).to_vec();
    if files.is_empty() {
        let message = format!("No fmap data were found for subject sub-{}.", inventory.subject);
        tracing::warn!("{message}");
        warnings.push(message);
    }

    renumber(files, |_| ())
        .into_iter()
        .map(|n| {
            let file = place(n.item, n.run, n.width, root);
            let mut metadata = Sidecar::for_record(&file.record)?;
            metadata.set_provenance(&file.record.path);
            let subject_dir = input_subject_dir(&file.record.path).unwrap_or(Path::new(""));
            let resolver = TargetResolver::new(&inventory.subject, subject_dir, root, targets);
            for target in metadata.rewrite_intended_for(|t| resolver.resolve(t)) {
                let message = format!(
                    "Dropping IntendedFor target {target} of {}: it is not part of the combined functional data",
                    file.record.path.display()
                );
                tracing::warn!("{message}");
                warnings.push(message);
            }
            Ok(PlannedFile { file, metadata })
        })
        .collect()
}
