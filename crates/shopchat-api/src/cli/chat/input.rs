//! Async readline input for the chat loop.
//!
//! Wraps `rustyline_async::Readline` and folds its results into
//! [`InputEvent`], treating read errors as end of input.

use rustyline_async::{Readline, ReadlineError, ReadlineEvent, SharedWriter};

/// What the user did at the prompt.
#[derive(Debug)]
pub enum InputEvent {
    /// A submitted line, trimmed.
    Message(String),
    /// Ctrl+D.
    Eof,
    /// Ctrl+C.
    Interrupted,
}

pub struct ChatInput {
    rl: Readline,
}

impl ChatInput {
    /// Create the input handler.
    ///
    /// The returned `SharedWriter` prints above the prompt without
    /// corrupting the line being edited.
    pub fn new(prompt: String) -> Result<(Self, SharedWriter), ReadlineError> {
        let (rl, stdout) = Readline::new(prompt)?;
        Ok((Self { rl }, stdout))
    }

    pub async fn read_line(&mut self) -> InputEvent {
        match self.rl.readline().await {
            Ok(ReadlineEvent::Line(line)) => {
                let trimmed = line.trim().to_string();
                if !trimmed.is_empty() {
                    self.rl.add_history_entry(trimmed.clone());
                }
                InputEvent::Message(trimmed)
            }
            Ok(ReadlineEvent::Eof) => InputEvent::Eof,
            Ok(ReadlineEvent::Interrupted) => InputEvent::Interrupted,
            Err(_) => InputEvent::Eof,
        }
    }

    /// Restore the terminal; call before printing after the loop ends.
    pub fn flush(&mut self) {
        let _ = self.rl.flush();
    }
}
