use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use super::log::TransferLog;
use super::owner::GroupId;
use crate::error::CombineError;
use crate::model::{PlannedFile, TransferRecord};

/// Create `dir` and any missing parents. The owner group, when given, is
/// applied once to each directory this call created. Returns those
/// directories, outermost first.
pub fn ensure_dir(dir: &Path, group: Option<GroupId>) -> Result<Vec<PathBuf>, CombineError> {
    let missing: Vec<PathBuf> = dir
        .ancestors()
        .take_while(|p| !p.as_os_str().is_empty() && !p.exists())
        .map(Path::to_path_buf)
        .collect();

    let mut created = Vec::with_capacity(missing.len());
    for path in missing.into_iter().rev() {
        match fs::create_dir(&path) {
            Ok(()) => {
                if let Some(group) = group {
                    group.apply(&path)?;
                }
                created.push(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(CombineError::io(&path)(e)),
        }
    }
    Ok(created)
}

/// Copies planned files into the output tree and logs every transfer.
/// Never overwrites: an existing destination is a [`CombineError::Collision`].
pub struct CopyExecutor {
    group: Option<GroupId>,
    log: TransferLog,
}

impl CopyExecutor {
    pub fn new(group: Option<GroupId>, log: TransferLog) -> Self {
        Self { group, log }
    }

    pub fn log_mut(&mut self) -> &mut TransferLog {
        &mut self.log
    }

    pub fn finish(self) -> Vec<TransferRecord> {
        self.log.into_records()
    }

    /// Copy the data file byte for byte and write its rewritten sidecar.
    pub fn transfer(&mut self, planned: &PlannedFile) -> Result<(), CombineError> {
        let file = &planned.file;
        let source = &file.record.path;
        // The sidecar is logged against the file it came from; a generated
        // sidecar is logged against the data file.
        let sidecar_source = file.record.sidecar.as_ref().unwrap_or(source);

        for (origin, dest) in [
            (source, &file.destination),
            (sidecar_source, &file.sidecar_destination),
        ] {
            if dest.exists() {
                return Err(CombineError::Collision {
                    origin: origin.clone(),
                    destination: dest.clone(),
                });
            }
        }

        if let Some(parent) = file.destination.parent() {
            ensure_dir(parent, self.group)?;
        }

        copy_new(source, &file.destination)
            .map_err(|e| collision_or_io(e, source, &file.destination))?;
        self.apply_group(&file.destination)?;
        self.log.record(source, &file.destination)?;

        planned
            .metadata
            .write_new(&file.sidecar_destination)
            .map_err(|e| collision_or_io(e, sidecar_source, &file.sidecar_destination))?;
        self.apply_group(&file.sidecar_destination)?;
        self.log.record(sidecar_source, &file.sidecar_destination)?;

        Ok(())
    }

    fn apply_group(&self, path: &Path) -> Result<(), CombineError> {
        match self.group {
            Some(group) => group.apply(path),
            None => Ok(()),
        }
    }
}

fn copy_new(source: &Path, dest: &Path) -> io::Result<u64> {
    let mut reader = File::open(source)?;
    let permissions = reader.metadata()?.permissions();
    let mut writer = File::create_new(dest)?;
    let copied = io::copy(&mut reader, &mut writer)?;
    writer.sync_all()?;
    fs::set_permissions(dest, permissions)?;
    Ok(copied)
}

fn collision_or_io(e: io::Error, origin: &Path, dest: &Path) -> CombineError {
    if e.kind() == ErrorKind::AlreadyExists {
        CombineError::Collision {
            origin: origin.to_path_buf(),
            destination: dest.to_path_buf(),
        }
    } else {
        CombineError::io(dest)(e)
    }
}
