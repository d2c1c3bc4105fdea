//! Serialized terminal output shared by the event loop and the input thread.
//!
//! Every write goes through one mutex so lines produced by event handlers and
//! prompt redraws from the input thread never interleave mid-line. When stdin
//! is an interactive terminal the console also owns the prompt: printing a
//! line first clears the partially typed input and redraws the prompt after.

use std::fmt;
use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Clears the current terminal line and returns the cursor to column zero.
const CLEAR_LINE: &str = "\x1b[2K\r";

/// Output stream selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stream {
    Stdout,
    Stderr,
}

struct ConsoleState {
    stdout: Box<dyn Write + Send>,
    stderr: Box<dyn Write + Send>,
    interactive: bool,
    prompt: Option<String>,
}

impl ConsoleState {
    fn sink(&mut self, stream: Stream) -> &mut dyn Write {
        match stream {
            Stream::Stdout => &mut *self.stdout,
            Stream::Stderr => &mut *self.stderr,
        }
    }

    fn prompt_visible(&self) -> bool {
        self.interactive && self.prompt.is_some()
    }

    fn clear_line(&mut self) -> io::Result<()> {
        if self.prompt_visible() {
            self.stdout.write_all(CLEAR_LINE.as_bytes())?;
        }
        Ok(())
    }

    fn draw_prompt(&mut self) -> io::Result<()> {
        if !self.interactive {
            return Ok(());
        }
        if let Some(prompt) = self.prompt.as_deref() {
            self.stdout.write_all(prompt.as_bytes())?;
            self.stdout.flush()?;
        }
        Ok(())
    }
}

/// Cloneable handle onto the process output streams.
#[derive(Clone)]
pub struct Console {
    inner: Arc<Mutex<ConsoleState>>,
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Console")
            .field("interactive", &state.interactive)
            .field("prompt", &state.prompt)
            .finish_non_exhaustive()
    }
}

impl Console {
    /// Wraps the given writers.
    ///
    /// `interactive` states whether input comes from a terminal; prompts and
    /// line clearing are suppressed otherwise.
    pub fn new<W, E>(stdout: W, stderr: E, interactive: bool) -> Self
    where
        W: Write + Send + 'static,
        E: Write + Send + 'static,
    {
        Self {
            inner: Arc::new(Mutex::new(ConsoleState {
                stdout: Box::new(stdout),
                stderr: Box::new(stderr),
                interactive,
                prompt: None,
            })),
        }
    }

    /// Console bound to the process streams.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr(), io::stdin().is_terminal())
    }

    fn lock(&self) -> MutexGuard<'_, ConsoleState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set_prompt(&self, prompt: impl Into<String>) {
        self.lock().prompt = Some(prompt.into());
    }

    /// Writes one line, keeping the prompt intact on interactive terminals.
    pub(crate) fn line(&self, stream: Stream, args: fmt::Arguments<'_>) -> io::Result<()> {
        let mut state = self.lock();
        state.clear_line()?;
        let sink = state.sink(stream);
        sink.write_fmt(args)?;
        sink.write_all(b"\n")?;
        sink.flush()?;
        state.draw_prompt()
    }

    /// Writes `text` verbatim and flushes.
    pub(crate) fn chunk(&self, stream: Stream, text: &str) -> io::Result<()> {
        let mut state = self.lock();
        let sink = state.sink(stream);
        sink.write_all(text.as_bytes())?;
        sink.flush()
    }

    /// Clears the input line and draws the prompt again.
    pub(crate) fn redraw_prompt(&self) -> io::Result<()> {
        let mut state = self.lock();
        state.clear_line()?;
        state.draw_prompt()
    }

    #[cfg(test)]
    pub(crate) fn is_interactive(&self) -> bool {
        self.lock().interactive
    }
}
