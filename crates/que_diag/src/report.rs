//! One-line diagnostic reports.
//!
//! Que's diagnostics are deliberately terse: a single line per error, in one
//! of two shapes mandated by the host-visible diagnostics contract:
//!
//! - compile-time: `<filename>:<line>:<col>: <message>`
//! - runtime: `[!] <message>`

use std::fmt;
use std::fmt::Display;

use que_span::{line_col, Span};

use crate::style::Style;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
  Compile,
  Runtime,
}

pub struct Report<'a> {
  level: Level,
  filename: &'a str,
  source: &'a str,
  span: Span,
  message: String,
  color: bool,
}

impl<'a> Report<'a> {
  pub fn compile(filename: &'a str, source: &'a str, span: impl Into<Span>, message: impl Into<String>) -> Self {
    Report {
      level: Level::Compile,
      filename,
      source,
      span: span.into(),
      message: message.into(),
      color: false,
    }
  }

  pub fn runtime(message: impl Into<String>) -> Self {
    Report {
      level: Level::Runtime,
      filename: "",
      source: "",
      span: Span::default(),
      message: message.into(),
      color: false,
    }
  }

  pub fn color(mut self, enabled: bool) -> Self {
    self.color = enabled;
    self
  }

  pub fn level(&self) -> Level {
    self.level
  }
}

fn style(enabled: bool) -> Style {
  use owo_colors::AnsiColors::*;
  Style {
    enabled,
    span: owo_colors::Style::new().fg(Cyan),
    level: owo_colors::Style::new().fg(Red).bold(),
    symbol: owo_colors::Style::new().fg(Yellow),
  }
}

impl<'a> Display for Report<'a> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let style = style(self.color);
    match self.level {
      Level::Compile => {
        let pos = line_col(self.source, self.span);
        write!(
          f,
          "{}:{}: {}",
          self.filename,
          style.span(pos),
          style.level(&self.message)
        )
      }
      Level::Runtime => write!(f, "{} {}", style.symbol("[!]"), style.level(&self.message)),
    }
  }
}
