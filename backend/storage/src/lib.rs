pub mod append;
pub mod drive;
pub mod memory;
pub mod resolver;
pub mod store;

pub use append::AppendEngine;
pub use drive::{DriveConfig, GoogleDriveStore};
pub use memory::MemoryStore;
pub use resolver::{DatedPath, PathResolver};
pub use store::{FileId, FolderId, ObjectStore};
