//! Pure screen renderers. Every function returns a `String` so the session
//! loop owns all printing and tests can assert on the exact output.

use crate::api::{DownloadProgress, OcrMode, OcrResult};
use crate::health::HealthStatus;
use crate::intake::SelectedFile;
use crate::session::Screen;

const PREVIEW_COLS: u32 = 48;
const PREVIEW_ROWS: u32 = 36;

pub fn banner(server_url: &str) -> String {
    format!(
        "ocr-console v{} — connected endpoint: {}\nType `help` for commands.",
        env!("CARGO_PKG_VERSION"),
        server_url
    )
}

pub fn help() -> String {
    "Commands:\n\
     \x20 open <path>     select an image (jpg/png/webp) or PDF\n\
     \x20 clear           drop the current selection\n\
     \x20 mode <name>     choose the OCR mode (see `modes`)\n\
     \x20 prompt [text]   set a custom prompt; bare `prompt` clears it\n\
     \x20 process         run OCR on the selected file\n\
     \x20 retry           re-run after an error\n\
     \x20 new             reset for a new session\n\
     \x20 copy            copy the result text to the clipboard\n\
     \x20 save [path]     save the result text to a file\n\
     \x20 download        ask the server to download its model\n\
     \x20 demo            enable demo mode (no server needed)\n\
     \x20 status          re-check server health and show the session\n\
     \x20 modes           list the available OCR modes\n\
     \x20 quit            exit"
        .to_string()
}

pub fn modes() -> String {
    let mut out = String::from("Available modes:\n");
    for mode in OcrMode::ALL {
        let (description, use_case) = mode.describe();
        out.push_str(&format!(
            "  {:<13} {} (for {})\n",
            mode.as_str(),
            description,
            use_case
        ));
    }
    out.pop();
    out
}

/// The one-line status indicator, rendered on every health change.
pub fn status_line(health: &HealthStatus, demo_mode: bool) -> String {
    if demo_mode {
        return "[status] demo mode active — results are simulated".to_string();
    }
    match health {
        HealthStatus::Offline => "[status] server offline".to_string(),
        HealthStatus::ModelLoaded => "[status] model loaded ✓".to_string(),
        HealthStatus::ModelLoading { progress } => match progress {
            Some(p) => format!("[status] loading model… {}", progress_bar(p)),
            None => "[status] downloading/loading model…".to_string(),
        },
        HealthStatus::ModelError(detail) => {
            let mut short: String = detail.chars().take(50).collect();
            if short.len() < detail.len() {
                short.push('…');
            }
            format!("[status] model error: {} (demo mode available: `demo`)", short)
        }
        HealthStatus::ModelMissing => {
            "[status] model not downloaded — run `download`, or `demo` to try the interface"
                .to_string()
        }
    }
}

pub fn progress_bar(progress: &DownloadProgress) -> String {
    let filled = (progress.progress.min(100) as usize * 20) / 100;
    let message = if progress.message.is_empty() {
        "downloading…"
    } else {
        &progress.message
    };
    format!(
        "[{}{}] {}% - {}",
        "#".repeat(filled),
        "-".repeat(20 - filled),
        progress.progress,
        message
    )
}

/// One renderer per screen, so no two panels can be visible at once. The
/// selection lives in the session, not the screen tag, so `Preview` takes
/// it as context.
pub fn screen(screen: &Screen, selected: Option<&SelectedFile>) -> String {
    match screen {
        Screen::Idle => idle(),
        Screen::Preview => match selected {
            Some(file) => preview(file),
            None => idle(),
        },
        Screen::Loading => loading(),
        Screen::Results(result) => results(result),
        Screen::Error(message) => error(message),
    }
}

fn idle() -> String {
    "No file selected. `open <path>` to choose an image or PDF (max 10 MB).".to_string()
}

fn loading() -> String {
    "Processing… this can take a moment.".to_string()
}

pub fn preview(file: &SelectedFile) -> String {
    let mut out = format!(
        "Selected: {} ({}, {})\n",
        file.name,
        file.media_type.mime(),
        human_size(file.size)
    );
    if file.media_type.is_image() {
        match image_thumbnail(&file.bytes) {
            Some(thumb) => out.push_str(&thumb),
            // A corrupt image still stays selected; the server is the
            // authority on whether it can be processed.
            None => out.push_str("(preview unavailable)"),
        }
    } else if file.looks_like_pdf() {
        out.push_str("(PDF document — no preview)");
    } else {
        out.push_str("(file does not look like a PDF — no preview)");
    }
    out.push_str("\nReady: `process` to run OCR.");
    out
}

pub fn results(result: &OcrResult) -> String {
    format!(
        "── Results ─────────────────────────\n\
         Time: {}s    Mode: {}    Size: {} × {}\n\
         ────────────────────────────────────\n\
         {}\n\
         ────────────────────────────────────\n\
         `copy` / `save [path]` / `new`",
        result.processing_time,
        result.mode,
        result.image_size.0,
        result.image_size.1,
        if result.text.is_empty() {
            "(no text found)"
        } else {
            result.text.as_str()
        }
    )
}

fn error(message: &str) -> String {
    format!("Error: {}\n`retry` to try again, or `new` to start over.", message)
}

pub fn human_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

/// Decode the selected image and render a small ANSI thumbnail, two pixel
/// rows per text row using the upper-half-block glyph.
fn image_thumbnail(bytes: &[u8]) -> Option<String> {
    let img = image::load_from_memory(bytes).ok()?;
    let thumb = img.thumbnail(PREVIEW_COLS, PREVIEW_ROWS).to_rgb8();
    let (width, height) = thumb.dimensions();

    let mut out = String::new();
    let mut y = 0;
    while y < height {
        for x in 0..width {
            let top = thumb.get_pixel(x, y);
            let bottom = if y + 1 < height {
                *thumb.get_pixel(x, y + 1)
            } else {
                *top
            };
            out.push_str(&format!(
                "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m▀",
                top[0], top[1], top[2], bottom[0], bottom[1], bottom[2]
            ));
        }
        out.push_str("\x1b[0m\n");
        y += 2;
    }
    out.pop();
    Some(out)
}
