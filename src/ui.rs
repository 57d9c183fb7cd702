//! Line-oriented console output and the exit gate
//!
//! Every print is flushed immediately so output stays visible even when
//! the process later blocks waiting for a key. The sink is generic over
//! `Write` so tests can capture walker output verbatim.

use crate::error::DumpError;
use console::{style, Term};
use std::error::Error as _;
use std::io::{self, Write};

/// Immediate-flush text sink for all user-facing output
pub struct Console<W: Write> {
    out: W,
}

impl Console<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Print without a trailing newline (status prefixes like `Mounting...`)
    pub fn print(&mut self, text: &str) {
        let _ = write!(self.out, "{text}");
        let _ = self.out.flush();
    }

    /// Print one full line
    pub fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }

    pub fn blank(&mut self) {
        self.line("");
    }

    /// Report one scoped failure and its cause chain, then keep going
    pub fn report_error(&mut self, err: &DumpError) {
        let _ = writeln!(self.out, "{} {}", style("[FAIL]").red(), err);
        let mut cause = err.source();
        while let Some(src) = cause {
            let _ = writeln!(self.out, "   caused by: {src}");
            cause = src.source();
        }
        let _ = self.out.flush();
    }

    /// Recover the underlying sink (used by tests to inspect output)
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Block until any key is pressed.
///
/// Only gates exit when stdout is an interactive terminal; otherwise
/// (pipes, CI) it returns immediately so the process can finish.
pub fn wait_for_button() {
    let term = Term::stdout();
    if !term.is_term() {
        return;
    }
    let _ = term.read_key();
}
