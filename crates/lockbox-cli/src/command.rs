//! Parsing of simulator input lines.

use anyhow::{Context, bail};
use lockbox_core::{LockPosition, RawKey};

/// One line of simulator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Keys to press in order.
    Keys(Vec<RawKey>),
    /// Move the simulated lock.
    Lock(LockPosition),
    Quit,
}

/// Parse a non-empty input line.
///
/// `open`, `close` and `quit` are keywords; anything else is read as a run of
/// keypad characters, with whitespace ignored (`A 123456 #`).
pub fn parse_line(line: &str) -> anyhow::Result<Command> {
    let line = line.trim();

    match line.to_ascii_lowercase().as_str() {
        "" => bail!("empty input"),
        "open" => return Ok(Command::Lock(LockPosition::Open)),
        "close" | "closed" => return Ok(Command::Lock(LockPosition::Closed)),
        "quit" | "exit" => return Ok(Command::Quit),
        _ => {}
    }

    let keys = line
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| RawKey::from_char(c).with_context(|| format!("in input {line:?}")))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Command::Keys(keys))
}
