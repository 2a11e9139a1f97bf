use std::path::PathBuf;

/// One line of user input, parsed. The console analogue of the upload
/// form's buttons and inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Select a file for OCR.
    Open(PathBuf),
    /// Drop the current selection.
    Clear,
    /// Choose the OCR mode by wire name.
    Mode(String),
    /// Set (or with no argument, clear) the custom prompt.
    Prompt(Option<String>),
    /// Submit the selected file.
    Process,
    /// Re-run the last submission after an error.
    Retry,
    /// Reset for a new OCR session.
    New,
    /// Copy the displayed result to the clipboard.
    Copy,
    /// Save the displayed result to a file.
    Save(Option<PathBuf>),
    /// Ask the server to download its model.
    Download,
    /// Enable demo mode.
    Demo,
    /// On-demand health refresh plus session summary.
    Status,
    /// List the available OCR modes.
    Modes,
    Help,
    Quit,
    /// Anything that didn't parse; carries the offending word.
    Unknown(String),
    /// Blank line.
    Empty,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }

        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        let arg = (!rest.is_empty()).then(|| rest.to_string());

        match head.to_lowercase().as_str() {
            "open" => match arg {
                Some(path) => Self::Open(PathBuf::from(path)),
                None => Self::Unknown("open".to_string()),
            },
            "clear" => Self::Clear,
            "mode" => match arg {
                Some(name) => Self::Mode(name),
                None => Self::Unknown("mode".to_string()),
            },
            "prompt" => Self::Prompt(arg),
            "process" => Self::Process,
            "retry" => Self::Retry,
            "new" => Self::New,
            "copy" => Self::Copy,
            "save" => Self::Save(arg.map(PathBuf::from)),
            "download" => Self::Download,
            "demo" => Self::Demo,
            "status" => Self::Status,
            "modes" => Self::Modes,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_open_with_spaces_in_the_path() {
        assert_eq!(
            Command::parse("open /tmp/my scans/page 1.png"),
            Command::Open(PathBuf::from("/tmp/my scans/page 1.png"))
        );
    }

    #[test]
    fn bare_prompt_clears_and_bare_save_uses_default_name() {
        assert_eq!(Command::parse("prompt"), Command::Prompt(None));
        assert_eq!(
            Command::parse("prompt read the table"),
            Command::Prompt(Some("read the table".to_string()))
        );
        assert_eq!(Command::parse("save"), Command::Save(None));
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(Command::parse("PROCESS"), Command::Process);
        assert_eq!(Command::parse("  Quit "), Command::Quit);
    }

    #[test]
    fn open_and_mode_require_an_argument() {
        assert_eq!(Command::parse("open"), Command::Unknown("open".to_string()));
        assert_eq!(Command::parse("mode"), Command::Unknown("mode".to_string()));
    }

    #[test]
    fn garbage_never_panics() {
        assert_eq!(Command::parse(""), Command::Empty);
        assert_eq!(
            Command::parse("frobnicate now"),
            Command::Unknown("frobnicate".to_string())
        );
    }
}
