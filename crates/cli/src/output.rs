//! CLI output formatting utilities.
//!
//! Colored status messages and the framing used when showing release notes.

use std::time::Duration;

use owo_colors::{OwoColorize, Stream};

pub const ERROR_PREFIX: &str = "*** Error ***";

const NOTE_SEPARATOR: &str = "==============================";
const WARNING_SEPARATOR: &str = "##############################";

/// Which of a release's notes files is being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotesKind {
  ReadMe,
  Warning,
}

impl NotesKind {
  fn header(self) -> &'static str {
    match self {
      NotesKind::ReadMe => "Note",
      NotesKind::Warning => "Warning",
    }
  }

  fn separator(self) -> &'static str {
    match self {
      NotesKind::ReadMe => NOTE_SEPARATOR,
      NotesKind::Warning => WARNING_SEPARATOR,
    }
  }
}

/// Frame notes text between a header and a separator line.
pub fn format_notes(kind: NotesKind, text: &str) -> String {
  let mut out = String::new();
  out.push_str(kind.header());
  out.push('\n');
  out.push_str(kind.separator());
  out.push('\n');
  out.push_str(text);
  if !text.ends_with('\n') {
    out.push('\n');
  }
  out.push_str(kind.separator());
  out.push('\n');
  out
}

/// An error and its causes on one line, skipping causes already quoted by
/// the message above them.
pub fn format_error(err: &anyhow::Error) -> String {
  let mut msg = err.to_string();
  for cause in err.chain().skip(1) {
    let text = cause.to_string();
    if !msg.contains(&text) {
      msg.push_str(": ");
      msg.push_str(&text);
    }
  }
  msg
}

pub fn format_duration(duration: Duration) -> String {
  let ms = Duration::from_millis(duration.as_millis() as u64);
  humantime::format_duration(ms).to_string()
}

pub fn print_notes(kind: NotesKind, text: &str) {
  let framed = format_notes(kind, text);
  match kind {
    NotesKind::ReadMe => print!("{}", framed),
    NotesKind::Warning => print!("{}", framed.if_supports_color(Stream::Stdout, |s| s.yellow())),
  }
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    ERROR_PREFIX.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

/// An error line without the prefix, for follow-up details.
pub fn print_error_detail(message: &str) {
  eprintln!("    {}", message);
}

pub fn print_info(message: &str) {
  println!("{}", message.if_supports_color(Stream::Stdout, |s| s.blue()));
}

pub fn print_success(message: &str) {
  println!("{}", message.if_supports_color(Stream::Stdout, |s| s.green()));
}
