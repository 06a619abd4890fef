//! Line input for the console: rustyline for terminals, a script for tests.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::collections::VecDeque;
use std::path::PathBuf;

/// One read from the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// Ctrl-C: abandon the current prompt
    Interrupted,
    /// Ctrl-D or end of input: leave the console
    Eof,
}

/// Source of operator input
pub trait Prompter {
    fn read_line(&mut self, prompt: &str) -> Input;
}

/// Interactive prompter with optional persistent history
pub struct LinePrompter {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
}

impl LinePrompter {
    pub fn new(history: bool) -> anyhow::Result<Self> {
        let mut editor = DefaultEditor::new()?;
        let history_path = if history {
            Some(
                dirs::cache_dir()
                    .map(|d| d.join("campus-console").join("history"))
                    .unwrap_or_else(|| PathBuf::from(".campus_console_history")),
            )
        } else {
            None
        };
        if let Some(ref path) = history_path {
            let _ = editor.load_history(path);
        }
        Ok(Self {
            editor,
            history_path,
        })
    }
}

impl Prompter for LinePrompter {
    fn read_line(&mut self, prompt: &str) -> Input {
        match self.editor.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    let _ = self.editor.add_history_entry(trimmed);
                }
                Input::Line(line)
            }
            Err(ReadlineError::Interrupted) => Input::Interrupted,
            Err(ReadlineError::Eof) => Input::Eof,
            Err(err) => {
                log::warn!("reading input failed: {}", err);
                Input::Eof
            }
        }
    }
}

impl Drop for LinePrompter {
    fn drop(&mut self) {
        if let Some(ref path) = self.history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = self.editor.save_history(path);
        }
    }
}

/// Replays a fixed list of lines; `^C` stands for an interrupt. Input ends
/// with EOF once the script is exhausted.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    lines: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Every prompt shown so far
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, prompt: &str) -> Input {
        self.prompts.push(prompt.to_string());
        match self.lines.pop_front() {
            Some(line) if line == "^C" => Input::Interrupted,
            Some(line) => Input::Line(line),
            None => Input::Eof,
        }
    }
}
