//! Attachment naming and MIME handling for stored binaries.

pub mod mime_infer;
pub mod naming;

pub use mime_infer::{default_mime_for_kind, infer_extension};
pub use naming::attachment_name;
