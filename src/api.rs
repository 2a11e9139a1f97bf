use crate::error::ClientError;
use crate::intake::SelectedFile;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

/// OCR processing modes offered by the server.
///
/// The list is fixed client-side, matching the server's prompt table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OcrMode {
    FreeOcr,
    #[default]
    Markdown,
    Grounding,
    ParseFigure,
    Detailed,
}

impl OcrMode {
    pub const ALL: [OcrMode; 5] = [
        Self::FreeOcr,
        Self::Markdown,
        Self::Grounding,
        Self::ParseFigure,
        Self::Detailed,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "free_ocr" => Some(Self::FreeOcr),
            "markdown" => Some(Self::Markdown),
            "grounding" => Some(Self::Grounding),
            "parse_figure" => Some(Self::ParseFigure),
            "detailed" => Some(Self::Detailed),
            _ => None,
        }
    }

    /// Wire name, sent as the `mode` form field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FreeOcr => "free_ocr",
            Self::Markdown => "markdown",
            Self::Grounding => "grounding",
            Self::ParseFigure => "parse_figure",
            Self::Detailed => "detailed",
        }
    }

    /// Short description shown by the `modes` command.
    pub fn describe(&self) -> (&'static str, &'static str) {
        match self {
            Self::FreeOcr => ("Fast OCR without structure", "general text extraction"),
            Self::Markdown => ("Convert the document to structured Markdown", "formatted documents"),
            Self::Grounding => ("OCR with bounding-box coordinates", "layout analysis"),
            Self::ParseFigure => ("Extract information from figures and diagrams", "charts, tables, diagrams"),
            Self::Detailed => ("Detailed description of the image", "visual content analysis"),
        }
    }
}

/// `GET /health` body. Extra server fields (device, timestamps) are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthReport {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub model_loading: bool,
    #[serde(default)]
    pub model_error: Option<String>,
    #[serde(default)]
    pub download_progress: Option<DownloadProgress>,
}

/// Model-download progress as reported by the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DownloadProgress {
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// `POST /api/download-model` acknowledgement.
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadAck {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET /api/download-progress` body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgressReport {
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub model_loading: bool,
    pub progress: Option<DownloadProgress>,
}

/// A completed OCR run. Immutable once received; only ever displayed,
/// copied, or saved.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OcrResult {
    pub success: bool,
    pub text: String,
    pub processing_time: f64,
    pub mode: String,
    pub image_size: (u32, u32),
    pub file_size: u64,
}

/// FastAPI error body for non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Thin typed client over the server's JSON API.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthReport, ClientError> {
        let report = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?
            .json()
            .await?;
        Ok(report)
    }

    pub async fn download_model(&self) -> Result<DownloadAck, ClientError> {
        let ack = self
            .http
            .post(format!("{}/api/download-model", self.base_url))
            .send()
            .await?
            .json()
            .await?;
        Ok(ack)
    }

    pub async fn download_progress(&self) -> Result<ProgressReport, ClientError> {
        let report = self
            .http
            .get(format!("{}/api/download-progress", self.base_url))
            .send()
            .await?
            .json()
            .await?;
        Ok(report)
    }

    /// Submit a file for OCR as multipart form-data.
    ///
    /// Non-2xx responses surface the server's `detail` verbatim; a body
    /// that isn't the expected error shape falls back to the raw status.
    pub async fn submit_ocr(
        &self,
        file: &SelectedFile,
        mode: OcrMode,
        custom_prompt: Option<&str>,
    ) -> Result<OcrResult, ClientError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(file.media_type.mime())
            .map_err(ClientError::Transport)?;

        let mut form = Form::new()
            .part("file", part)
            .text("mode", mode.as_str());
        if let Some(prompt) = custom_prompt {
            form = form.text("custom_prompt", prompt.to_string());
        }

        let response = self
            .http
            .post(format!("{}/api/ocr", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<ErrorBody>().await {
                Ok(body) => body.detail,
                Err(_) => format!("request failed with status {}", status),
            };
            return Err(ClientError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_round_trips_through_wire_names() {
        for mode in OcrMode::ALL {
            assert_eq!(OcrMode::parse(mode.as_str()), Some(mode));
        }
    }

    #[test]
    fn mode_parse_rejects_unknown_names() {
        assert_eq!(OcrMode::parse("ocr"), None);
        assert_eq!(OcrMode::parse(""), None);
    }

    #[test]
    fn health_report_tolerates_extra_fields() {
        let report: HealthReport = serde_json::from_str(
            r#"{"status":"healthy","model_loaded":true,"model_loading":false,
                "model_error":null,"device":"cuda","cuda_available":true,
                "timestamp":"2026-01-01T00:00:00"}"#,
        )
        .unwrap();
        assert!(report.model_loaded);
        assert!(report.download_progress.is_none());
    }

    #[test]
    fn ocr_result_parses_image_size_pair() {
        let result: OcrResult = serde_json::from_str(
            r#"{"success":true,"text":"Hello","processing_time":1.2,
                "mode":"markdown","image_size":[800,600],"file_size":2000000}"#,
        )
        .unwrap();
        assert_eq!(result.image_size, (800, 600));
        assert_eq!(result.file_size, 2_000_000);
    }
}
