//! Terminal capability detection and output styling

use owo_colors::{OwoColorize, colors::css};

/// Whether stdout accepts colour codes.
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Width of the attached terminal in columns, if there is one.
pub fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(w, _)| w.0)
}

/// Whether the terminal is too narrow for the wide table layouts.
pub fn is_narrow() -> bool {
    terminal_width().is_some_and(|w| w < 80)
}

/// The roles a piece of output can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Success,
    Warning,
    Info,
    Muted,
}

impl Style {
    fn paint(self, text: &str) -> String {
        if !supports_color() {
            return text.to_string();
        }
        match self {
            Self::Success => text.fg::<css::Green>().to_string(),
            Self::Warning => text.fg::<css::Orange>().to_string(),
            Self::Info => text.fg::<css::LightBlue>().to_string(),
            Self::Muted => text.dimmed().to_string(),
        }
    }
}

/// Styles text for the terminal, leaving it plain when colour is off.
pub trait Colorize {
    /// Green, for completed actions and non-zero shares.
    fn success(&self) -> String;
    /// Amber, for issues and warnings.
    fn warning(&self) -> String;
    /// Blue, for headings such as the deceased's name.
    fn info(&self) -> String;
    /// Dimmed, for hints and zero shares.
    fn dim(&self) -> String;
}

impl<T: AsRef<str> + ?Sized> Colorize for T {
    fn success(&self) -> String {
        Style::Success.paint(self.as_ref())
    }

    fn warning(&self) -> String {
        Style::Warning.paint(self.as_ref())
    }

    fn info(&self) -> String {
        Style::Info.paint(self.as_ref())
    }

    fn dim(&self) -> String {
        Style::Muted.paint(self.as_ref())
    }
}

/// Prints rows as a left-aligned table with a dashed rule under the header.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            rows.iter()
                .map(|row| row.get(idx).map_or(0, |cell| cell.chars().count()))
                .max()
                .unwrap_or(0)
                .max(header.chars().count())
        })
        .collect();

    for (header, width) in headers.iter().zip(&widths) {
        print!("{header:<width$}  ");
    }
    println!();
    for width in &widths {
        print!("{:-<width$}  ", "");
    }
    println!();

    for row in rows {
        for (value, width) in row.iter().zip(&widths) {
            print!("{value:<width$}  ");
        }
        println!();
    }
}
