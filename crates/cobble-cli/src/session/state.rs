//! Bookkeeping for an attach session.
//!
//! The state machine is owned by the session loop task alone. It tracks how
//! many calls are in flight and whether input has ended, and reports the one
//! moment the session may drain.

/// Lifecycle of an attach session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Idle,
    Running,
    Draining,
    Terminated,
}

/// What the loop must do after a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    Continue,
    /// Input ended with calls still in flight.
    AwaitResults { outstanding: usize },
    /// Input ended and nothing is in flight; shut down now.
    Drain,
}

#[derive(Debug)]
pub(crate) struct SessionState {
    phase: Phase,
    outstanding: usize,
    input_closed: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub(crate) const fn new() -> Self {
        Self {
            phase: Phase::Idle,
            outstanding: 0,
            input_closed: false,
        }
    }

    pub(crate) const fn phase(&self) -> Phase {
        self.phase
    }

    #[cfg(test)]
    pub(crate) const fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub(crate) fn start(&mut self) {
        if self.phase == Phase::Idle {
            self.phase = Phase::Running;
        }
    }

    /// Counts a call about to be issued.
    ///
    /// Returns `false` when the session no longer accepts input.
    pub(crate) fn submit(&mut self) -> bool {
        if self.phase != Phase::Running || self.input_closed {
            tracing::warn!(phase = ?self.phase, "line submitted after input closed");
            return false;
        }
        self.outstanding += 1;
        true
    }

    /// Records the terminal resolution of one call.
    pub(crate) fn complete(&mut self) -> Transition {
        match self.outstanding.checked_sub(1) {
            Some(remaining) => self.outstanding = remaining,
            None => {
                tracing::warn!("completion without an outstanding call");
                return Transition::Continue;
            }
        }
        self.settle()
    }

    /// Records end of input.
    pub(crate) fn close_input(&mut self) -> Transition {
        if self.input_closed {
            return Transition::Continue;
        }
        self.input_closed = true;
        match self.settle() {
            Transition::Continue => Transition::AwaitResults {
                outstanding: self.outstanding,
            },
            other => other,
        }
    }

    pub(crate) fn terminate(&mut self) {
        self.phase = Phase::Terminated;
    }

    fn settle(&mut self) -> Transition {
        if self.phase == Phase::Running && self.input_closed && self.outstanding == 0 {
            self.phase = Phase::Draining;
            Transition::Drain
        } else {
            Transition::Continue
        }
    }
}
