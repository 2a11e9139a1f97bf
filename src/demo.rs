use crate::api::{OcrMode, OcrResult};
use crate::session::SessionEvent;
use std::time::Duration;
use tokio::sync::mpsc;

/// Fabricate the canned demo result for a selected file.
pub fn demo_result(file_name: &str, file_size: u64, mode: OcrMode) -> OcrResult {
    let text = format!(
        "DEMO MODE - Simulated result\n\
         \n\
         This is a simulated OCR run. The real text would be extracted from\n\
         your file by the DeepSeek-OCR model.\n\
         \n\
         File: {file_name}\n\
         Selected mode: {mode}\n\
         \n\
         To get real results:\n\
         1. Download the model with `download`\n\
         2. Wait for the download to complete\n\
         3. Process your file again",
        mode = mode.as_str(),
    );

    OcrResult {
        success: true,
        text,
        processing_time: 2.5,
        mode: mode.as_str().to_string(),
        image_size: (800, 600),
        file_size,
    }
}

/// Run a demo submission: wait out the simulated processing delay, then
/// deliver the canned result tagged with the submission's sequence number.
/// Never touches the network.
pub fn spawn(
    seq: u64,
    file_name: String,
    file_size: u64,
    mode: OcrMode,
    delay: Duration,
    events: mpsc::Sender<SessionEvent>,
) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let result = demo_result(&file_name, file_size, mode);
        let _ = events
            .send(SessionEvent::OcrFinished {
                seq,
                outcome: Ok(result),
            })
            .await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_result_echoes_file_and_mode() {
        let result = demo_result("photo.jpg", 2_000_000, OcrMode::Grounding);
        assert!(result.success);
        assert!(result.text.contains("photo.jpg"));
        assert!(result.text.contains("grounding"));
        assert_eq!(result.mode, "grounding");
        assert_eq!(result.image_size, (800, 600));
        assert_eq!(result.file_size, 2_000_000);
    }
}
