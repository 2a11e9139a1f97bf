use crate::error::ClientError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// OSC 52 has no hard limit, but terminals commonly cap the sequence;
/// past this we fail loudly instead of letting the terminal truncate.
const MAX_CLIPBOARD_B64: usize = 100 * 1024;

/// Default file name for a saved result: `ocr_result_<unix_ms>.txt`.
pub fn default_file_name() -> String {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("ocr_result_{}.txt", now_ms)
}

/// Write the result text to `path`, or to `output_dir/ocr_result_<unix_ms>.txt`
/// when no path is given. The write is staged through a temp file in the
/// destination directory and persisted atomically, so a failed save never
/// leaves a partial result file. Returns the final path.
pub fn save(text: &str, explicit_path: Option<&Path>, output_dir: &Path) -> Result<PathBuf, ClientError> {
    let path = match explicit_path {
        Some(path) => path.to_path_buf(),
        None => output_dir.join(default_file_name()),
    };
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());

    let mut tmp = tempfile::NamedTempFile::new_in(dir.unwrap_or(Path::new(".")))?;
    tmp.write_all(text.as_bytes())?;
    tmp.persist(&path).map_err(|e| ClientError::Io(e.error))?;

    Ok(path)
}

/// Copy text to the terminal's clipboard via an OSC 52 escape sequence.
/// Works through SSH; oversized payloads are rejected rather than silently
/// truncated by the terminal.
pub fn copy(text: &str) -> Result<(), ClientError> {
    let encoded = STANDARD.encode(text.as_bytes());
    if encoded.len() > MAX_CLIPBOARD_B64 {
        return Err(ClientError::Clipboard(format!(
            "result too large for the terminal clipboard ({} bytes)",
            text.len()
        )));
    }

    let mut stdout = std::io::stdout().lock();
    write!(stdout, "\x1b]52;c;{}\x07", encoded)?;
    stdout.flush()?;
    Ok(())
}
