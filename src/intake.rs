use crate::error::ClientError;
use std::path::{Path, PathBuf};

/// Accepted input formats, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Jpeg,
    Png,
    Webp,
    Pdf,
}

impl MediaType {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Pdf => "application/pdf",
        }
    }

    pub fn is_image(&self) -> bool {
        !matches!(self, Self::Pdf)
    }
}

/// The currently selected input file. At most one is active per session;
/// selecting another file replaces it wholesale.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub media_type: MediaType,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    /// Whether the bytes carry the `%PDF-` magic. Used only to decide how
    /// to preview; a mismatch never changes acceptance.
    pub fn looks_like_pdf(&self) -> bool {
        self.bytes.starts_with(b"%PDF-")
    }
}

/// Validate and load a file for submission.
///
/// Checks run in the same order the upload form applied them: media type
/// first, then the size cap. A rejected file leaves the caller's selection
/// untouched because nothing is returned.
pub async fn open(path: &Path, max_file_size: u64) -> Result<SelectedFile, ClientError> {
    let media_type = MediaType::from_path(path).ok_or_else(|| {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)");
        ClientError::UnsupportedType(ext.to_string())
    })?;

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > max_file_size {
        return Err(ClientError::FileTooLarge {
            size: metadata.len(),
            max: max_file_size,
        });
    }

    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    Ok(SelectedFile {
        path: path.to_path_buf(),
        name,
        size: metadata.len(),
        media_type,
        bytes,
    })
}
