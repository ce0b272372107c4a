use std::path::Path;

use super::inventory::Inventory;
use super::renumber::{renumber, Ordered};
use crate::error::CombineError;
use crate::model::{Category, FileRecord, RenumberedFile};
use crate::output::path::place;

pub const T1W: &str = "T1w";
pub const T2W: &str = "T2w";

/// Select the images of one anatomical suffix, optionally from a single
/// session. Naming a session that is not combined, or that has no images of
/// the suffix, is a configuration error.
fn select(
    inventory: &Inventory,
    suffix: &str,
    session: Option<&str>,
    warnings: &mut Vec<String>,
) -> Result<Vec<Ordered<FileRecord>>, CombineError> {
    if let Some(label) = session {
        if !inventory.order.contains(label) {
            return Err(CombineError::Config(format!(
                "session for {suffix} data ({label}) is not in the list of sessions to be combined ({})",
                inventory.sessions_label()
            )));
        }
    }

    let selected: Vec<Ordered<FileRecord>> = inventory
        .files(Category::Anat)
        .iter()
        .filter(|o| o.item.suffix == suffix)
        .filter(|o| session.map_or(true, |label| o.item.session == label))
        .cloned()
        .collect();

    if selected.is_empty() {
        match session {
            Some(label) => {
                return Err(CombineError::Config(format!(
                    "No {suffix} data were found for sub-{} in session {label}",
                    inventory.subject
                )));
            }
            None => {
                let message = format!(
                    "No {suffix} data were found for sub-{} in session(s) {}",
                    inventory.subject,
                    inventory.sessions_label()
                );
                tracing::warn!("{message}");
                warnings.push(message);
            }
        }
    }
    Ok(selected)
}

/// Renumber T1w and T2w images independently; the session entity is
/// replaced by the new run.
pub fn plan_anat(
    inventory: &Inventory,
    t1_session: Option<&str>,
    t2_session: Option<&str>,
    root: &Path,
    warnings: &mut Vec<String>,
) -> Result<Vec<RenumberedFile>, CombineError> {
    let mut selected = select(inventory, T1W, t1_session, warnings)?;
    selected.extend(select(inventory, T2W, t2_session, warnings)?);

    Ok(renumber(selected, |r: &FileRecord| r.suffix.clone())
        .into_iter()
        .map(|n| place(n.item, n.run, n.width, root))
        .collect())
}
