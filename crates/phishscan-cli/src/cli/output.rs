//! Terminal output for the CLI: status marks, aligned check rows, and JSON.

use std::io::IsTerminal;

/// Colour is off under `NO_COLOR`, `--no-color`, or when stderr is not a terminal.
pub fn color_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
        && std::env::var_os("PHISHSCAN_NO_COLOR").is_none()
        && std::io::stderr().is_terminal()
}

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Status marks as (coloured glyph, plain fallback).
const MARK_OK: (&str, &str) = ("\x1b[32m\u{2713}\x1b[0m", "OK");
const MARK_FAIL: (&str, &str) = ("\x1b[31m\u{2717}\x1b[0m", "!!");
const MARK_WARN: (&str, &str) = ("\x1b[33m\u{26a0}\x1b[0m", "??");
const MARK_INFO: (&str, &str) = ("\x1b[34m\u{25cb}\x1b[0m", "--");

/// Width of the label column in check rows.
const LABEL_WIDTH: usize = 16;

pub struct Styled {
    use_color: bool,
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}

impl Styled {
    pub fn new() -> Self {
        Self {
            use_color: color_enabled(),
        }
    }

    /// Colour forced off.
    pub fn plain() -> Self {
        Self { use_color: false }
    }

    fn mark(&self, (colored, plain): (&'static str, &'static str)) -> &'static str {
        if self.use_color {
            colored
        } else {
            plain
        }
    }

    pub fn ok_sym(&self) -> &'static str {
        self.mark(MARK_OK)
    }

    pub fn fail_sym(&self) -> &'static str {
        self.mark(MARK_FAIL)
    }

    pub fn warn_sym(&self) -> &'static str {
        self.mark(MARK_WARN)
    }

    pub fn info_sym(&self) -> &'static str {
        self.mark(MARK_INFO)
    }

    fn paint(&self, code: &str, s: &str) -> String {
        if self.use_color {
            format!("{code}{s}{RESET}")
        } else {
            s.to_string()
        }
    }

    pub fn green(&self, s: &str) -> String {
        self.paint(GREEN, s)
    }

    pub fn red(&self, s: &str) -> String {
        self.paint(RED, s)
    }

    pub fn yellow(&self, s: &str) -> String {
        self.paint(YELLOW, s)
    }

    pub fn bold(&self, s: &str) -> String {
        self.paint(BOLD, s)
    }

    pub fn dim(&self, s: &str) -> String {
        self.paint(DIM, s)
    }
}

pub fn print_header(s: &Styled) {
    let version = format!("v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("  {} {}\n", s.bold("Phishscan"), s.dim(&version));
}

pub fn print_section(s: &Styled, title: &str) {
    eprintln!("  {}", s.bold(title));
}

/// `    <mark> <label>  <value>` with the label padded to a fixed column.
pub fn check_row(symbol: &str, label: &str, value: &str) -> String {
    format!("    {symbol} {label:<LABEL_WIDTH$} {value}")
}

pub fn print_check(symbol: &str, label: &str, value: &str) {
    eprintln!("{}", check_row(symbol, label, value));
}

/// A note aligned under the value column of the row above.
pub fn print_detail(msg: &str) {
    eprintln!("{:indent$}{msg}", "", indent = LABEL_WIDTH + 8);
}

/// Final verdict line, e.g. `Status: PHISHING (http://...)`.
pub fn print_status(s: &Styled, status: &str, target: &str) {
    eprintln!("\n  {}: {status} ({target})", s.bold("Status"));
}

/// Horizontal bar for a score in [0, 1].
pub fn score_bar(score: f64, width: usize) -> String {
    let score = if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (score * width as f64).round() as usize;
    let empty = width - filled;
    format!(
        "[{}{}] {:>3}%",
        "\u{2588}".repeat(filled),
        "\u{2591}".repeat(empty),
        (score * 100.0).round() as u32
    )
}

// Global flags reach subcommands through these variables, set in main.

pub fn is_quiet() -> bool {
    std::env::var("PHISHSCAN_QUIET").is_ok()
}

pub fn is_verbose() -> bool {
    std::env::var("PHISHSCAN_VERBOSE").is_ok()
}

pub fn is_json() -> bool {
    std::env::var("PHISHSCAN_JSON").is_ok()
}

/// Pretty JSON on stdout. Everything else goes to stderr.
pub fn print_json(value: &serde_json::Value) {
    if let Ok(s) = serde_json::to_string_pretty(value) {
        println!("{s}");
    }
}
