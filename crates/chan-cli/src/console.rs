//! Terminal output and confirmation prompts
//!
//! Commands print through a [`Console`] so tests can capture output and
//! script the answers to prompts.

use std::io::{self, BufRead, Write};

/// Borrowed input and output streams
pub struct Console<'a> {
    input: &'a mut dyn BufRead,
    out: &'a mut dyn Write,
}

impl<'a> Console<'a> {
    /// Read answers from `input` and write to `out`
    pub fn new(input: &'a mut dyn BufRead, out: &'a mut dyn Write) -> Self {
        Self { input, out }
    }

    /// Print one line
    ///
    /// # Errors
    /// Write failures.
    pub fn line(&mut self, text: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.out, "{}", text.as_ref())
    }

    /// Print without a trailing newline
    ///
    /// # Errors
    /// Write failures.
    pub fn text(&mut self, text: impl AsRef<str>) -> io::Result<()> {
        write!(self.out, "{}", text.as_ref())?;
        self.out.flush()
    }

    /// Print an empty line
    ///
    /// # Errors
    /// Write failures.
    pub fn blank(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    /// Ask a yes/no question; only `y` or `Y` confirms
    ///
    /// End of input counts as no.
    ///
    /// # Errors
    /// Read or write failures.
    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        write!(self.out, "{question} [y/N] ")?;
        self.out.flush()?;
        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(matches!(answer.trim(), "y" | "Y"))
    }
}

impl std::fmt::Debug for Console<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}
