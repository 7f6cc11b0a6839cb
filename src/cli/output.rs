//! Terminal output for envi commands.
//!
//! Results go to stdout, everything else (errors, warnings, hints) to
//! stderr so `envi run` never mixes its own chatter into a child's output.
//! `NO_COLOR` turns styling off.

use console::{style, StyledObject};

/// Whether styling is on for this process.
fn styled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// A leading marker, colored when styling is on.
fn mark<'a>(
    symbol: &'a str,
    paint: impl FnOnce(StyledObject<&'a str>) -> StyledObject<&'a str>,
) -> String {
    if styled() {
        paint(style(symbol)).to_string()
    } else {
        symbol.to_string()
    }
}

/// `✓ initialized envi.yaml`
pub fn success(msg: &str) {
    println!("{} {}", mark("✓", |s| s.green()), msg);
}

/// `✗ envi file not found: envi.yaml`
pub fn error(msg: &str) {
    eprintln!("{} {}", mark("✗", |s| s.red()), msg);
}

pub fn warn(msg: &str) {
    eprintln!("{} {}", mark("⚠", |s| s.yellow()), msg);
}

/// `→ run: envi init`, the whole line in cyan.
pub fn hint(msg: &str) {
    if styled() {
        eprintln!("{}", style(format!("→ {}", msg)).cyan());
    } else {
        eprintln!("→ {}", msg);
    }
}

/// A file path inside a message.
pub fn path(p: &str) -> String {
    if styled() {
        style(p).cyan().to_string()
    } else {
        p.to_string()
    }
}

/// A command the user can copy.
pub fn cmd(c: &str) -> String {
    if styled() {
        style(c).green().bold().to_string()
    } else {
        c.to_string()
    }
}
