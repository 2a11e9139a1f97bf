use thiserror::Error;

/// Everything that can go wrong on the client side of an OCR session.
///
/// Validation and precondition variants are produced before any network
/// traffic; `Api` carries the server's `detail` field verbatim; `Transport`
/// wraps connection-level failures with a generic retryable message.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Unsupported file type: {0}. Use JPG, PNG, WEBP or PDF.")]
    UnsupportedType(String),

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("The model is still downloading/loading. Wait and check the progress in the status line.")]
    ModelStillLoading,

    #[error("Model error: {0}")]
    ModelFailed(String),

    #[error("The model is not loaded. Download it first with `download`, or use demo mode.")]
    ModelNotDownloaded,

    #[error("Server error ({status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("Could not reach the OCR server. Check the connection and try again.")]
    Transport(#[from] reqwest::Error),

    #[error("Clipboard copy failed: {0}")]
    Clipboard(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
