use thiserror::Error;

/// Top-level error type for the chatvault pipeline.
///
/// Every variant maps to a per-event failure mode; errors are caught at the
/// event boundary and never fail the webhook response as a whole.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("invalid webhook signature")]
    SignatureInvalid,

    #[error("malformed webhook body: {0}")]
    MalformedBody(String),

    #[error("container resolution failed for '{name}': {cause}")]
    ContainerResolution { name: String, cause: anyhow::Error },

    #[error("could not read existing log '{file_name}' before append: {cause}")]
    AppendRead {
        file_name: String,
        cause: anyhow::Error,
    },

    #[error("upload failed for '{file_name}': {cause}")]
    Upload {
        file_name: String,
        cause: anyhow::Error,
    },

    #[error("transcription failed: {0}")]
    Transcription(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
