pub mod plan;
pub mod record;

pub use plan::{CombinePlan, PlannedFile, RenumberedFile, TransferRecord};
pub use record::{Category, FileRecord};
