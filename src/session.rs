use crate::api::{ApiClient, OcrMode, OcrResult, ProgressReport};
use crate::command::Command;
use crate::config::Config;
use crate::demo;
use crate::error::ClientError;
use crate::health::HealthStatus;
use crate::intake::{self, SelectedFile};
use crate::poller::{self, PollerHandle};
use crate::render;
use std::path::PathBuf;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;

/// The visible screen, as a tagged state instead of a pile of show/hide
/// flags. Exactly one screen is active at any time.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Idle,
    Preview,
    Loading,
    Results(OcrResult),
    Error(String),
}

/// Messages delivered to the session loop by background tasks. All state
/// mutation happens on the loop; tasks only ever send these.
#[derive(Debug)]
pub enum SessionEvent {
    Health(HealthStatus),
    DownloadProgress(ProgressReport),
    OcrFinished {
        seq: u64,
        outcome: Result<OcrResult, ClientError>,
    },
}

/// The client session controller: owns the selected file, demo flag,
/// poller handles and current screen, and reacts to commands and events.
pub struct SessionController {
    config: Config,
    api: ApiClient,
    events_tx: mpsc::Sender<SessionEvent>,

    selected: Option<SelectedFile>,
    demo_mode: bool,
    mode: OcrMode,
    custom_prompt: Option<String>,
    screen: Screen,
    health: HealthStatus,

    /// Sequence number of the submission whose outcome we still want.
    /// Outcomes with any other sequence are stale and dropped.
    next_seq: u64,
    in_flight: Option<u64>,

    health_poller: Option<PollerHandle>,
    download_poller: Option<PollerHandle>,
    should_quit: bool,
}

impl SessionController {
    pub fn new(config: Config) -> (Self, mpsc::Receiver<SessionEvent>) {
        let (events_tx, events_rx) = mpsc::channel(32);
        let api = ApiClient::new(&config.server_url);
        let controller = Self {
            demo_mode: config.demo,
            mode: config.default_mode,
            config,
            api,
            events_tx,
            selected: None,
            custom_prompt: None,
            screen: Screen::Idle,
            health: HealthStatus::Offline,
            next_seq: 1,
            in_flight: None,
            health_poller: None,
            download_poller: None,
            should_quit: false,
        };
        (controller, events_rx)
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn health(&self) -> &HealthStatus {
        &self.health
    }

    pub fn demo_mode(&self) -> bool {
        self.demo_mode
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn download_in_progress(&self) -> bool {
        self.download_poller.is_some()
    }

    /// Main loop: read commands from stdin and events from the background
    /// tasks until `quit` or end of input. Starts the session-long health
    /// poller on entry.
    pub async fn run(mut self, mut events: mpsc::Receiver<SessionEvent>) -> anyhow::Result<()> {
        println!("{}", render::banner(self.api.base_url()));
        if self.demo_mode {
            println!("{}", render::status_line(&self.health, true));
        }
        println!("{}", render::screen(&self.screen, self.selected.as_ref()));

        self.health_poller = Some(poller::spawn_health_poller(
            self.api.clone(),
            self.config.health_interval,
            self.events_tx.clone(),
        ));

        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                line = lines.next_line() => match line? {
                    Some(line) => {
                        self.handle_command(Command::parse(&line)).await;
                        if self.should_quit {
                            break;
                        }
                    }
                    None => break,
                },
                Some(event) = events.recv() => self.handle_event(event),
            }
        }

        tracing::info!("session ended");
        Ok(())
    }

    pub async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Open(path) => self.open(path).await,
            Command::Clear => self.clear(),
            Command::Mode(name) => self.set_mode(&name),
            Command::Prompt(text) => self.set_prompt(text),
            Command::Process | Command::Retry => self.submit().await,
            Command::New => self.reset(),
            Command::Copy => self.copy(),
            Command::Save(path) => self.save(path),
            Command::Download => self.start_download().await,
            Command::Demo => self.enable_demo(),
            Command::Status => self.status().await,
            Command::Modes => println!("{}", render::modes()),
            Command::Help => println!("{}", render::help()),
            Command::Quit => self.should_quit = true,
            Command::Unknown(word) => {
                println!("Unknown command `{}`. Type `help` for the list.", word)
            }
            Command::Empty => {}
        }
    }

    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Health(status) => self.apply_health(status),
            SessionEvent::DownloadProgress(report) => self.apply_progress(report),
            SessionEvent::OcrFinished { seq, outcome } => self.finish_submission(seq, outcome),
        }
    }

    async fn open(&mut self, path: PathBuf) {
        if self.in_flight.is_some() {
            println!("A submission is running; wait for it or start over with `new`.");
            return;
        }
        match intake::open(&path, self.config.max_file_size).await {
            Ok(file) => {
                tracing::debug!("selected {} ({} bytes)", file.name, file.size);
                self.selected = Some(file);
                self.set_screen(Screen::Preview);
            }
            // Rejection is inline; the previous selection and screen stay.
            Err(err) => println!("{}", err),
        }
    }

    fn clear(&mut self) {
        if self.in_flight.is_some() {
            println!("A submission is running; wait for it or start over with `new`.");
            return;
        }
        self.selected = None;
        self.set_screen(Screen::Idle);
    }

    fn set_mode(&mut self, name: &str) {
        match OcrMode::parse(name) {
            Some(mode) => {
                self.mode = mode;
                println!("Mode set to {}.", mode.as_str());
            }
            None => println!("Unknown mode `{}`. See `modes` for the list.", name),
        }
    }

    fn set_prompt(&mut self, text: Option<String>) {
        match &text {
            Some(prompt) => println!("Custom prompt set ({} chars).", prompt.len()),
            None => println!("Custom prompt cleared."),
        }
        self.custom_prompt = text;
    }

    /// Submit the selected file. Demo mode bypasses the network entirely;
    /// otherwise readiness is re-checked against a fresh `/health` fetch
    /// before anything is sent to the OCR endpoint.
    async fn submit(&mut self) {
        if self.in_flight.is_some() {
            println!("A submission is already running.");
            return;
        }
        let Some(file) = self.selected.clone() else {
            println!("No file selected. `open <path>` first.");
            return;
        };

        let seq = self.next_seq;
        self.next_seq += 1;

        if self.demo_mode {
            self.in_flight = Some(seq);
            self.set_screen(Screen::Loading);
            demo::spawn(
                seq,
                file.name,
                file.size,
                self.mode,
                self.config.demo_delay,
                self.events_tx.clone(),
            );
            return;
        }

        // Readiness gate: only a server that answers and reports not-ready
        // blocks; a transport failure here falls through to the submission,
        // which will surface its own error.
        match self.api.health().await {
            Ok(report) => {
                if let Some(block) = HealthStatus::classify(&report).submission_block() {
                    self.set_screen(Screen::Error(block.to_string()));
                    return;
                }
            }
            Err(err) => tracing::warn!("pre-submission health check failed: {}", err),
        }

        self.in_flight = Some(seq);
        self.set_screen(Screen::Loading);

        let api = self.api.clone();
        let mode = self.mode;
        let prompt = self.custom_prompt.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let started = std::time::Instant::now();
            let outcome = api.submit_ocr(&file, mode, prompt.as_deref()).await;
            tracing::info!(
                "submission {} finished in {:?} ({})",
                seq,
                started.elapsed(),
                if outcome.is_ok() { "ok" } else { "error" }
            );
            let _ = events.send(SessionEvent::OcrFinished { seq, outcome }).await;
        });
    }

    fn finish_submission(&mut self, seq: u64, outcome: Result<OcrResult, ClientError>) {
        if self.in_flight != Some(seq) {
            tracing::debug!("dropping stale submission outcome (seq {})", seq);
            return;
        }
        self.in_flight = None;
        match outcome {
            Ok(result) => self.set_screen(Screen::Results(result)),
            Err(err) => self.set_screen(Screen::Error(err.to_string())),
        }
    }

    /// Start over: abandon any in-flight submission (its outcome will be
    /// stale), drop the selection and custom prompt, back to Idle.
    fn reset(&mut self) {
        self.in_flight = None;
        self.selected = None;
        self.custom_prompt = None;
        self.set_screen(Screen::Idle);
    }

    fn copy(&mut self) {
        let Screen::Results(result) = &self.screen else {
            println!("Nothing to copy yet.");
            return;
        };
        match crate::export::copy(&result.text) {
            Ok(()) => println!("✓ Copied to clipboard."),
            Err(err) => println!("{}", err),
        }
    }

    fn save(&mut self, path: Option<PathBuf>) {
        let Screen::Results(result) = &self.screen else {
            println!("Nothing to save yet.");
            return;
        };
        match crate::export::save(&result.text, path.as_deref(), &self.config.output_dir) {
            Ok(saved) => println!("✓ Saved to {}.", saved.display()),
            Err(err) => println!("{}", err),
        }
    }

    /// Kick off the server-side model download and start the 2s progress
    /// poll. `already_loaded` is a notice, not an error, and starts no
    /// poller. Replacing an existing poller aborts it first.
    async fn start_download(&mut self) {
        match self.api.download_model().await {
            Ok(ack) => match ack.status.as_str() {
                "started" | "downloading" => {
                    println!(
                        "{}",
                        ack.message.as_deref().unwrap_or("Model download started.")
                    );
                    self.download_poller = Some(poller::spawn_download_poller(
                        self.api.clone(),
                        self.config.progress_interval,
                        self.events_tx.clone(),
                    ));
                }
                "already_loaded" => {
                    println!("The model is already loaded.");
                }
                other => println!("Unexpected download status `{}`.", other),
            },
            Err(err) => println!("Could not start the model download: {}", err),
        }
    }

    fn enable_demo(&mut self) {
        self.demo_mode = true;
        println!(
            "Demo mode enabled. Processing will simulate an OCR result\n\
             without contacting the server. To run real OCR, download the\n\
             model with `download` and turn demo off by restarting."
        );
        println!("{}", render::status_line(&self.health, true));
    }

    async fn status(&mut self) {
        let status = crate::health::fetch(&self.api).await;
        if status != self.health {
            tracing::info!("health: {:?} -> {:?}", self.health, status);
        }
        self.health = status;
        println!("{}", render::status_line(&self.health, self.demo_mode));
        match &self.selected {
            Some(file) => println!(
                "Selected: {} ({}), mode {}{}",
                file.name,
                render::human_size(file.size),
                self.mode.as_str(),
                if self.custom_prompt.is_some() {
                    ", custom prompt set"
                } else {
                    ""
                }
            ),
            None => println!("No file selected."),
        }
    }

    fn apply_health(&mut self, status: HealthStatus) {
        if status == self.health {
            return;
        }
        tracing::info!("health: {:?} -> {:?}", self.health, status);
        self.health = status;
        println!("{}", render::status_line(&self.health, self.demo_mode));
    }

    fn apply_progress(&mut self, report: ProgressReport) {
        if let Some(progress) = &report.progress {
            println!("{}", render::progress_bar(progress));
        }
        if report.model_loaded {
            // Stop polling exactly once, then re-check health once.
            if self.download_poller.take().is_some() {
                println!("Model download complete.");
                poller::spawn_health_refresh(self.api.clone(), self.events_tx.clone());
            }
        }
    }

    fn set_screen(&mut self, screen: Screen) {
        self.screen = screen;
        println!("{}", render::screen(&self.screen, self.selected.as_ref()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::MediaType;
    use std::time::Duration;

    fn test_config() -> Config {
        Config {
            server_url: "http://127.0.0.1:1".to_string(),
            default_mode: OcrMode::Markdown,
            output_dir: PathBuf::from("."),
            max_file_size: 10 * 1024 * 1024,
            health_interval: Duration::from_secs(10),
            progress_interval: Duration::from_millis(20),
            demo_delay: Duration::from_millis(10),
            demo: false,
        }
    }

    fn fake_file(name: &str, size: u64) -> SelectedFile {
        SelectedFile {
            path: PathBuf::from(name),
            name: name.to_string(),
            size,
            media_type: MediaType::Jpeg,
            bytes: vec![0; size as usize],
        }
    }

    fn result(text: &str) -> OcrResult {
        OcrResult {
            success: true,
            text: text.to_string(),
            processing_time: 1.0,
            mode: "markdown".to_string(),
            image_size: (1, 1),
            file_size: 1,
        }
    }

    #[tokio::test]
    async fn demo_submission_reaches_results_without_a_server() {
        let mut config = test_config();
        config.demo = true;
        let (mut session, mut events) = SessionController::new(config);
        session.selected = Some(fake_file("photo.jpg", 100));

        session.handle_command(Command::Process).await;
        assert_eq!(session.screen, Screen::Loading);
        assert!(session.is_submitting());

        let event = tokio::time::timeout(Duration::from_secs(1), events.recv())
            .await
            .expect("demo outcome within the delay")
            .expect("channel open");
        session.handle_event(event);

        assert!(!session.is_submitting());
        match &session.screen {
            Screen::Results(r) => assert!(r.text.contains("photo.jpg")),
            other => panic!("unexpected screen: {:?}", other),
        }
    }

    #[tokio::test]
    async fn stale_outcome_is_discarded_after_reset() {
        let mut config = test_config();
        config.demo = true;
        let (mut session, _events) = SessionController::new(config);
        session.selected = Some(fake_file("photo.jpg", 100));

        session.handle_command(Command::Process).await;
        let abandoned_seq = session.in_flight.unwrap();

        session.handle_command(Command::New).await;
        assert_eq!(session.screen, Screen::Idle);

        session.handle_event(SessionEvent::OcrFinished {
            seq: abandoned_seq,
            outcome: Ok(result("late")),
        });
        assert_eq!(session.screen, Screen::Idle);
    }

    #[tokio::test]
    async fn only_the_current_sequence_lands() {
        let (mut session, _events) = SessionController::new(test_config());
        session.in_flight = Some(7);
        session.screen = Screen::Loading;

        session.handle_event(SessionEvent::OcrFinished {
            seq: 3,
            outcome: Ok(result("stale")),
        });
        assert_eq!(session.screen, Screen::Loading);

        session.handle_event(SessionEvent::OcrFinished {
            seq: 7,
            outcome: Ok(result("current")),
        });
        assert_eq!(session.screen, Screen::Results(result("current")));
    }

    #[tokio::test]
    async fn second_submission_is_refused_while_one_runs() {
        let mut config = test_config();
        config.demo = true;
        config.demo_delay = Duration::from_secs(5);
        let (mut session, _events) = SessionController::new(config);
        session.selected = Some(fake_file("photo.jpg", 100));

        session.handle_command(Command::Process).await;
        let first = session.in_flight;
        session.handle_command(Command::Process).await;
        assert_eq!(session.in_flight, first);
    }

    #[tokio::test]
    async fn open_is_refused_while_submitting() {
        let (mut session, _events) = SessionController::new(test_config());
        session.in_flight = Some(1);
        session.selected = Some(fake_file("photo.jpg", 100));

        session.handle_command(Command::Open(PathBuf::from("other.png"))).await;
        assert_eq!(session.selected.as_ref().unwrap().name, "photo.jpg");
    }

    #[tokio::test]
    async fn health_application_is_idempotent() {
        let (mut session, _events) = SessionController::new(test_config());
        session.handle_event(SessionEvent::Health(HealthStatus::ModelLoaded));
        session.handle_event(SessionEvent::Health(HealthStatus::ModelLoaded));
        assert_eq!(session.health, HealthStatus::ModelLoaded);
    }

    #[tokio::test]
    async fn model_loaded_progress_event_triggers_exactly_one_refresh() {
        let (mut session, mut events) = SessionController::new(test_config());
        session.download_poller = Some(poller::spawn_download_poller(
            ApiClient::new("http://127.0.0.1:1"),
            Duration::from_secs(60),
            session.events_tx.clone(),
        ));

        let loaded = ProgressReport {
            model_loaded: true,
            model_loading: false,
            progress: None,
        };
        session.handle_event(SessionEvent::DownloadProgress(loaded.clone()));
        assert!(!session.download_in_progress());

        // A duplicate loaded report after the poller is gone is a no-op.
        session.handle_event(SessionEvent::DownloadProgress(loaded));

        // Exactly one health refresh was spawned; it classifies the dead
        // address as Offline.
        let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("one refresh event")
            .expect("channel open");
        assert!(matches!(event, SessionEvent::Health(HealthStatus::Offline)));
        assert!(
            tokio::time::timeout(Duration::from_millis(100), events.recv())
                .await
                .is_err(),
            "no second refresh"
        );
    }

    #[tokio::test]
    async fn rejected_open_keeps_previous_selection() {
        let (mut session, _events) = SessionController::new(test_config());
        session.selected = Some(fake_file("photo.jpg", 100));
        session.screen = Screen::Preview;

        session.handle_command(Command::Open(PathBuf::from("doc.exe"))).await;

        assert_eq!(session.selected.as_ref().unwrap().name, "photo.jpg");
        assert_eq!(session.screen, Screen::Preview);
    }
}
