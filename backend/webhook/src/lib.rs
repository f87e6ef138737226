//! Inbound webhook surface.
//!
//! Receives LINE Messaging API webhooks, verifies their signature, classifies
//! each event's origin, and archives message content into the object store.

pub mod archive;
pub mod classify;
pub mod line;
pub mod server;
pub mod signature;
pub mod wire;

pub use archive::{Archiver, Outcome};
pub use classify::classify;
pub use line::{LineClient, PlatformClient};
pub use server::{process_batch, webhook_router, BatchSummary, WebhookConfig, WebhookState};
pub use signature::{sign, verify};
