//! Combine the imaging sessions of one BIDS subject into a single session.
//!
//! Files are discovered through a [`LayoutQuery`], renumbered per group across
//! the resolved session order, and copied into a sibling dataset that has no
//! session level. Planning never writes; [`execute`] performs the copies.
//!
//! Running two instances for the same subject against the same output dataset
//! at the same time is unsupported and may corrupt the destination.

pub mod combine;
pub mod config;
pub mod error;
pub mod layout;
pub mod model;
pub mod output;

pub use combine::{combine, execute, plan, Combiner, CombineReport};
pub use config::CombineConfig;
pub use error::CombineError;
pub use layout::{FsLayout, LayoutQuery, MemoryLayout};
pub use model::{Category, CombinePlan, FileRecord, PlannedFile, RenumberedFile, TransferRecord};
