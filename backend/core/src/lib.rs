pub mod error;
pub mod format;
pub mod types;

pub use error::VaultError;
pub use format::{
    daily_log_name, date_segment, entry_timestamp, file_timestamp, log_header, render_entry,
    JST_OFFSET_SECS,
};
pub use types::{Entry, PartitionKey, SourceInfo, SourceKind};
