//! # Replay Shell
//!
//! The text adapter used by the binary. Reads a script of navigation
//! commands, feeds them to a `Navigator`, and prints the active scene after
//! each one.
//!
//! This is the only module that does stream I/O. The core stays pure; the
//! shell plays the rendering collaborator through `TextRenderer`.
//!
//! ```text
//! script line ──► parse_line() ──► Command ──► Navigator ──► TextRenderer ──► out
//! ```
//!
//! Navigation errors and bad lines are reported inline and counted; the
//! replay keeps going so one typo doesn't hide the rest of a session.

pub mod command;
pub mod render;

use std::io::{self, BufRead, Write};

use log::{debug, warn};

use crate::core::error::RouterError;
use crate::core::navigator::Navigator;

pub use command::{Command, CommandError, parse_line};
pub use render::TextRenderer;

/// Counts from one replay.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Commands that changed the state.
    pub applied: usize,
    /// Commands nothing could handle (`false` from the navigator).
    pub ignored: usize,
    /// Unparseable lines and navigation errors.
    pub errors: usize,
}

/// Replays `input` against `navigator`, writing a transcript to `out`.
pub fn replay<R: BufRead, W: Write>(
    navigator: &mut Navigator,
    input: R,
    out: &mut W,
    renderer: &mut TextRenderer,
) -> io::Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();

    if let Some(view) = navigator.render(renderer) {
        write!(out, "{view}")?;
    }

    for (number, line) in input.lines().enumerate() {
        let line = line?;
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                warn!("Line {}: {}", number + 1, e);
                writeln!(out, "! line {}: {}", number + 1, e)?;
                summary.errors += 1;
                continue;
            }
        };

        writeln!(out, "> {}", line.trim())?;
        if let Command::State = command {
            match navigator.state() {
                Some(state) => {
                    let json = serde_json::to_string_pretty(state)
                        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                    writeln!(out, "{json}")?;
                }
                None => writeln!(out, "! {}", RouterError::NoCurrentRouter)?,
            }
            continue;
        }

        match execute(navigator, command) {
            Ok(true) => {
                summary.applied += 1;
                if let Some(view) = navigator.render(renderer) {
                    write!(out, "{view}")?;
                }
            }
            Ok(false) => {
                summary.ignored += 1;
                writeln!(out, "(no change)")?;
            }
            Err(e) => {
                warn!("Line {}: {}", number + 1, e);
                writeln!(out, "! {e}")?;
                summary.errors += 1;
            }
        }
    }

    debug!("Replay finished: {:?}", summary);
    Ok(summary)
}

/// Runs one command. `State` is handled by the caller.
pub fn execute(navigator: &mut Navigator, command: Command) -> Result<bool, RouterError> {
    match command {
        Command::Route { name, props } => navigator.dispatch(&name, props),
        Command::Apply(action) => navigator.apply(action),
        Command::Pop(count) => navigator.pop(count),
        Command::Refresh(props) => navigator.refresh(props),
        Command::Focus(key) => navigator.focus(&key),
        Command::Undo => navigator.undo(),
        Command::State => Ok(false),
    }
}
