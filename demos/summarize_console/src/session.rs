use summarize::summarization::{
    MAX_LENGTH_RANGE, MIN_LENGTH_RANGE, Summarization, SummarizationParameters,
    SummarizationRequest,
};
use tokio_util::sync::CancellationToken;

use crate::slider::{Slider, SliderError};

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    SetMaxLength(u32),
    SetMinLength(u32),
    Show,
    Help,
    Exit,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("{0} expects a whole number")]
    InvalidNumber(String),

    #[error(transparent)]
    Slider(#[from] SliderError),
}

/// Parses a console command. Returns `None` for ordinary text, including text
/// that starts with `/` but does not name a known command.
pub fn parse_command(line: &str) -> Option<Result<Command, CommandError>> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("exit") {
        return Some(Ok(Command::Exit));
    }
    let rest = line.strip_prefix('/')?;

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let number = |name: &str, arg: Option<&str>| {
        arg.and_then(|a| a.parse::<u32>().ok())
            .ok_or_else(|| CommandError::InvalidNumber(format!("/{name}")))
    };

    let command = match name {
        "max" => number(name, parts.next()).map(Command::SetMaxLength),
        "min" => number(name, parts.next()).map(Command::SetMinLength),
        "show" => Ok(Command::Show),
        "help" => Ok(Command::Help),
        "exit" | "quit" => Ok(Command::Exit),
        _ => return None,
    };
    Some(command)
}

/// Current state of the two length controls.
#[derive(Debug, Clone)]
pub struct Session {
    max_length: Slider,
    min_length: Slider,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            max_length: Slider::new("Max Summary Length", MAX_LENGTH_RANGE),
            min_length: Slider::new("Min Summary Length", MIN_LENGTH_RANGE),
        }
    }
}

impl Session {
    pub fn new(max_length: u32, min_length: u32) -> Result<Self, SliderError> {
        let mut session = Self::default();
        session.max_length.set(max_length)?;
        session.min_length.set(min_length)?;
        Ok(session)
    }

    pub fn max_length(&self) -> u32 {
        self.max_length.value()
    }

    pub fn min_length(&self) -> u32 {
        self.min_length.value()
    }

    /// Applies a settings command. Returns `false` when the console should stop.
    pub fn apply(&mut self, command: &Command) -> Result<bool, CommandError> {
        match command {
            Command::SetMaxLength(value) => self.max_length.set(*value)?,
            Command::SetMinLength(value) => self.min_length.set(*value)?,
            Command::Show | Command::Help => {}
            Command::Exit => return Ok(false),
        }
        Ok(true)
    }

    pub fn describe(&self) -> String {
        let line = |slider: &Slider| {
            let range = slider.range();
            format!(
                "{}: {} ({}..={}, step {})",
                slider.label(),
                slider.value(),
                range.min,
                range.max,
                range.step
            )
        };
        format!("{}\n{}", line(&self.max_length), line(&self.min_length))
    }

    /// The lengths are submitted as is, even when min exceeds max.
    pub fn request(
        &self,
        text: &str,
        cancellation_token: Option<CancellationToken>,
    ) -> SummarizationRequest {
        SummarizationRequest {
            inputs: text.to_string(),
            parameters: SummarizationParameters {
                max_length: self.max_length(),
                min_length: self.min_length(),
            },
            cancellation_token,
        }
    }
}

/// Runs one summarization with the current settings.
pub async fn run_summary<T: Summarization + ?Sized>(
    client: &T,
    session: &Session,
    text: &str,
    cancellation_token: Option<CancellationToken>,
) -> summarize::Result<String> {
    let request = session.request(text, cancellation_token);
    let response = client.summarize(&request).await?;
    Ok(response.into_summary_text())
}
