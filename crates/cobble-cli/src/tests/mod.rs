//! Crate-level tests: workflow runs against the fake daemon, attach sessions
//! and behavioural scenarios for the whole CLI.

pub(crate) mod support;
