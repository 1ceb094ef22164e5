//! Terminal front end: line commands and the interactive loop.

pub mod chat;

use std::path::PathBuf;

pub const HELP: &str = "\
Type a question to ask about the active document.
  /upload PATH   upload a pdf, docx, txt or md file and make it active
  /export        save the conversation to a dated text file
  /reset         clear the conversation and forget the document
  /state         show the session state
  /help          show this help
  /quit          leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    Upload(PathBuf),
    Export,
    Reset,
    State,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Command> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Some(Command::Ask(line.to_string()));
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        let command = match name.to_lowercase().as_str() {
            "upload" | "u" if !arg.is_empty() => Command::Upload(PathBuf::from(arg)),
            "export" | "save" => Command::Export,
            "reset" | "clear" => Command::Reset,
            "state" | "status" => Command::State,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        };
        Some(command)
    }
}
