//! Terminal client for a DeepSeek-OCR server: select an image or PDF,
//! submit it for OCR, follow server health and model-download progress in
//! the background, and copy or save the extracted text.

pub mod api;
pub mod command;
pub mod config;
pub mod demo;
pub mod error;
pub mod export;
pub mod health;
pub mod intake;
pub mod poller;
pub mod render;
pub mod session;

pub use config::{Args, Config};
pub use error::ClientError;
pub use session::{Screen, SessionController, SessionEvent};
