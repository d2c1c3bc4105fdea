//! Blocking line reader feeding the session loop.
//!
//! Reading stdin blocks, so it happens on a dedicated thread. The thread never
//! touches session state: it only redraws the prompt through the shared
//! console and forwards what it read over a channel.

use std::io::{self, BufRead};
use std::thread::{self, JoinHandle};

use tokio::sync::mpsc::UnboundedSender;

use crate::console::Console;
use crate::reactor::ShutdownCoordinator;

const THREAD_NAME: &str = "cobble-input";

/// Message from the input thread to the session loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InputEvent {
    Line(String),
    Closed,
}

pub(crate) struct InputReader {
    source: Box<dyn BufRead + Send>,
    console: Console,
    shutdown: ShutdownCoordinator,
    events: UnboundedSender<InputEvent>,
}

impl InputReader {
    pub(crate) fn new(
        source: Box<dyn BufRead + Send>,
        console: Console,
        shutdown: ShutdownCoordinator,
        events: UnboundedSender<InputEvent>,
    ) -> Self {
        Self {
            source,
            console,
            shutdown,
            events,
        }
    }

    /// Starts the detached reader thread.
    pub(crate) fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(THREAD_NAME.to_owned())
            .spawn(move || self.run())
    }

    fn run(mut self) {
        let mut buffer = String::new();
        while !self.shutdown.is_requested() {
            if let Err(error) = self.console.redraw_prompt() {
                tracing::warn!(%error, "failed to draw prompt");
            }
            buffer.clear();
            match self.source.read_line(&mut buffer) {
                Ok(0) => break,
                Ok(_) => {
                    let line = buffer.trim_end_matches(['\n', '\r']);
                    if line.is_empty() {
                        continue;
                    }
                    if self.events.send(InputEvent::Line(line.to_owned())).is_err() {
                        return;
                    }
                }
                Err(error) => {
                    tracing::warn!(%error, "failed to read input");
                    break;
                }
            }
        }
        if self.events.send(InputEvent::Closed).is_err() {
            tracing::debug!("session ended before input closed");
        }
    }
}
