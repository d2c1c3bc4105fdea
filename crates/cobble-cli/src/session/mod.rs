//! `attach`: interactive bridge to a running service instance.
//!
//! The instance's log and chat events are printed above the prompt while a
//! reader thread forwards typed lines. Lines beginning with `/` run as
//! server commands; anything else is sent as chat. The session ends once
//! input is exhausted and every issued call has settled.

mod input;
mod state;

use std::io::BufRead;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::command::AttachRequest;
use crate::console::Stream;
use crate::context::AppContext;
use crate::errors::AppError;
use crate::rpc::{RpcClient, RpcError};
use crate::service::ServiceName;

use input::{InputEvent, InputReader};
use state::{SessionState, Transition};

const COMMAND_PREFIX: char = '/';

#[derive(Debug, Deserialize)]
struct LogEvent {
    level: i64,
    tag: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatEvent {
    sender: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct CommandParams<'a> {
    name: &'a str,
    command: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatParams<'a> {
    sender: &'a str,
    content: &'a str,
}

/// Settled outcome of one dispatched line.
#[derive(Debug)]
enum Reply {
    Command(Value),
    Chat,
}

fn level_marker(level: i64) -> char {
    match level {
        0 => 'T',
        1 => 'D',
        2 => 'I',
        3 => 'W',
        4 => 'E',
        _ => '?',
    }
}

fn prompt(sender: Option<&str>, service: &ServiceName) -> String {
    match sender {
        Some(sender) if !sender.is_empty() => format!("{sender}@{service}> "),
        _ => format!("{service}> "),
    }
}

pub(crate) async fn attach(
    context: &AppContext,
    request: AttachRequest,
    input: Box<dyn BufRead + Send>,
) -> Result<(), AppError> {
    let AttachRequest {
        service,
        sender,
        wait,
    } = request;
    if wait {
        tracing::warn!("attach --wait is deprecated and has no effect");
    }
    let instance = context.service(&service);
    instance.start().await?;

    let mut state = SessionState::new();
    state.start();
    context
        .console()
        .set_prompt(prompt(sender.as_deref(), &service));
    forward_events(context, &instance);

    let (events, mut lines) = mpsc::unbounded_channel();
    InputReader::new(
        input,
        context.console().clone(),
        context.shutdown().clone(),
        events,
    )
    .spawn()
    .map_err(AppError::InputThread)?;

    let sender = sender.unwrap_or_default();
    let mut in_flight = FuturesUnordered::new();
    let mut input_open = true;
    loop {
        let transition = tokio::select! {
            event = lines.recv(), if input_open => match event {
                Some(InputEvent::Line(line)) => {
                    if state.submit() {
                        in_flight.push(dispatch(&instance, &sender, line));
                    }
                    Transition::Continue
                }
                Some(InputEvent::Closed) | None => {
                    input_open = false;
                    state.close_input()
                }
            },
            Some(outcome) = in_flight.next(), if !in_flight.is_empty() => {
                report(context, outcome);
                state.complete()
            }
            else => Transition::Drain,
        };
        match transition {
            Transition::Continue => {}
            Transition::AwaitResults { outstanding } => {
                tracing::debug!(outstanding, "input closed with calls in flight");
                context.emit(Stream::Stderr, format_args!("waiting for command result..."));
            }
            Transition::Drain => break,
        }
    }
    state.terminate();
    tracing::debug!(phase = ?state.phase(), "attach session finished");
    context.shutdown().request_shutdown();
    Ok(())
}

fn forward_events(context: &AppContext, instance: &RpcClient) {
    let log_context = context.clone();
    instance.subscribe_as("core.log", move |event: LogEvent| {
        log_context.emit(
            Stream::Stderr,
            format_args!(
                "{} [{}] {}",
                level_marker(event.level),
                event.tag,
                event.content
            ),
        );
    });
    let chat_context = context.clone();
    instance.subscribe_as("chat.recv", move |event: ChatEvent| {
        chat_context.emit(
            Stream::Stderr,
            format_args!("<{}> {}", event.sender, event.content),
        );
    });
}

async fn dispatch(instance: &RpcClient, sender: &str, line: String) -> Result<Reply, RpcError> {
    if line.starts_with(COMMAND_PREFIX) {
        let params = CommandParams {
            name: sender,
            command: &line,
        };
        instance
            .call("command.execute", params)
            .await
            .map(Reply::Command)
    } else {
        let params = ChatParams {
            sender,
            content: &line,
        };
        instance.call("chat.send", params).await.map(|_| Reply::Chat)
    }
}

fn report(context: &AppContext, outcome: Result<Reply, RpcError>) {
    match outcome {
        Ok(Reply::Command(result)) => match result.get("statusMessage") {
            Some(Value::String(message)) => context.emit(Stream::Stdout, format_args!("{message}")),
            _ => {
                if let Err(error) = context.console().redraw_prompt() {
                    tracing::warn!(%error, "failed to draw prompt");
                }
            }
        },
        Ok(Reply::Chat) => context.emit(Stream::Stdout, format_args!("sent")),
        Err(error) => {
            context.emit(Stream::Stderr, format_args!("{error}"));
            context.shutdown().mark_failed();
        }
    }
}
