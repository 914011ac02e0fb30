//! Color and width detection for command output.

use basevisit::RequestStatus;
use owo_colors::{OwoColorize, colors::css};

/// Terminals narrower than this get the compact list layout.
const NARROW_WIDTH: u16 = 60;

/// Whether stdout accepts ANSI colors.
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Width of the attached terminal, if there is one.
pub fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(width, _)| width.0)
}

pub fn is_narrow() -> bool {
    terminal_width().is_some_and(|width| width < NARROW_WIDTH)
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Success,
    Warning,
    Error,
    Dim,
}

fn paint(text: &str, tone: Tone) -> String {
    if !supports_color() {
        return text.to_string();
    }
    match tone {
        Tone::Success => text.fg::<css::Green>().to_string(),
        Tone::Warning => text.fg::<css::Orange>().to_string(),
        Tone::Error => text.fg::<css::Red>().to_string(),
        Tone::Dim => text.dimmed().to_string(),
    }
}

/// Highlighting for anything that reads as text. Falls back to plain text
/// when colors are unsupported.
pub trait Colorize: AsRef<str> {
    fn success(&self) -> String {
        paint(self.as_ref(), Tone::Success)
    }

    fn dim(&self) -> String {
        paint(self.as_ref(), Tone::Dim)
    }
}

impl<T: AsRef<str> + ?Sized> Colorize for T {}

/// The Hebrew status label: pending in amber, approved in green, rejected in
/// red.
pub fn status_badge(status: RequestStatus) -> String {
    let tone = match status {
        RequestStatus::Pending => Tone::Warning,
        RequestStatus::Approved => Tone::Success,
        RequestStatus::Rejected => Tone::Error,
    };
    paint(status.label(), tone)
}
