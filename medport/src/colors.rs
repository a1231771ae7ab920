//! Terminal colors for log lines. Colors are only used when logging to a terminal.
use colored::{Color, Colorize};
use once_cell::sync::OnceCell;
use std::io::IsTerminal;

static TTY: OnceCell<bool> = OnceCell::new();

/// Set whether logs go to a terminal. Only the first call has an effect.
pub fn set_tty(tty: bool) {
    let _ = TTY.set(tty);
}

fn tty() -> bool {
    *TTY.get_or_init(|| std::io::stderr().is_terminal())
}

fn paint(text: &str, color: Color) -> String {
    if tty() {
        text.color(color).to_string()
    } else {
        text.to_string()
    }
}

pub trait MaybeColorize {
    fn green(&self) -> String;
    fn red(&self) -> String;
    fn purple(&self) -> String;
    fn yellow(&self) -> String;
}

impl MaybeColorize for &str {
    fn green(&self) -> String {
        paint(self, Color::Green)
    }

    fn red(&self) -> String {
        paint(self, Color::Red)
    }

    fn purple(&self) -> String {
        paint(self, Color::Magenta)
    }

    fn yellow(&self) -> String {
        paint(self, Color::Yellow)
    }
}

impl MaybeColorize for String {
    fn green(&self) -> String {
        MaybeColorize::green(&self.as_str())
    }

    fn red(&self) -> String {
        MaybeColorize::red(&self.as_str())
    }

    fn purple(&self) -> String {
        MaybeColorize::purple(&self.as_str())
    }

    fn yellow(&self) -> String {
        MaybeColorize::yellow(&self.as_str())
    }
}
