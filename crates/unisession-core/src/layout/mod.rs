pub mod entities;
pub mod fs;
pub mod memory;

pub use fs::FsLayout;
pub use memory::MemoryLayout;

use crate::error::CombineError;
use crate::model::{Category, FileRecord};

/// Read-only view of a dataset's subjects, sessions and files.
///
/// Implementations must return every list in a deterministic order; the order
/// of `files_for` is used directly as the within-session discovery order.
pub trait LayoutQuery {
    /// Subject labels, without the `sub-` prefix.
    fn subjects(&self) -> Result<Vec<String>, CombineError>;

    /// Session labels of a subject in discovery order, without `ses-`.
    fn sessions(&self, subject: &str) -> Result<Vec<String>, CombineError>;

    /// Data files of one category in one session, in discovery order.
    fn files_for(
        &self,
        subject: &str,
        session: &str,
        category: Category,
    ) -> Result<Vec<FileRecord>, CombineError>;
}
