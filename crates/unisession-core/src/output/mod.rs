pub mod copy;
pub mod log;
pub mod owner;
pub mod path;
pub mod sidecar;

pub use copy::CopyExecutor;
pub use log::{RunHeader, TransferLog};
pub use owner::GroupId;
pub use path::{output_file_name, place};
pub use sidecar::Sidecar;
