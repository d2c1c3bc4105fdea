//! Standing event subscriptions of one proxy.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;

use super::frame;

/// Callback invoked on the loop thread for every matching event.
pub(crate) type EventHandler = Arc<dyn Fn(&Value) + Send + Sync>;

struct Entry {
    id: u64,
    event: String,
    handler: EventHandler,
}

/// Registration-ordered handlers plus the announcement state of the link.
#[derive(Default)]
pub(crate) struct SubscriptionTable {
    next_id: u64,
    entries: Vec<Entry>,
    announced: HashSet<String>,
    outbound: Option<UnboundedSender<String>>,
}

pub(crate) type SharedSubscriptions = Arc<Mutex<SubscriptionTable>>;

pub(crate) fn lock(table: &Mutex<SubscriptionTable>) -> MutexGuard<'_, SubscriptionTable> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SubscriptionTable {
    pub(crate) fn insert(&mut self, event: &str, handler: EventHandler) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            event: event.to_owned(),
            handler,
        });
        self.announce(event);
        id
    }

    pub(crate) fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Handlers registered for `event`, in registration order.
    pub(crate) fn handlers_for(&self, event: &str) -> Vec<EventHandler> {
        self.entries
            .iter()
            .filter(|entry| entry.event == event)
            .map(|entry| Arc::clone(&entry.handler))
            .collect()
    }

    /// Binds the table to a live link and announces every pending name.
    pub(crate) fn attach(&mut self, outbound: UnboundedSender<String>) {
        self.outbound = Some(outbound);
        let events: Vec<String> = self.entries.iter().map(|entry| entry.event.clone()).collect();
        for event in events {
            self.announce(&event);
        }
    }

    pub(crate) fn detach(&mut self) {
        self.outbound = None;
    }

    fn announce(&mut self, event: &str) {
        let Some(outbound) = self.outbound.as_ref() else {
            return;
        };
        if self.announced.contains(event) {
            return;
        }
        match frame::encode_subscription(event) {
            Ok(notification) => {
                if outbound.send(notification).is_ok() {
                    self.announced.insert(event.to_owned());
                }
            }
            Err(error) => tracing::warn!(event, %error, "failed to encode subscription"),
        }
    }
}

/// Handle allowing a subscription to be withdrawn.
///
/// Dropping the handle leaves the subscription in place for the lifetime of
/// the proxy.
#[derive(Debug)]
pub(crate) struct SubscriptionHandle {
    id: u64,
    table: Weak<Mutex<SubscriptionTable>>,
}

impl SubscriptionHandle {
    pub(crate) fn new(id: u64, table: &SharedSubscriptions) -> Self {
        Self {
            id,
            table: Arc::downgrade(table),
        }
    }

    /// Removes the handler; returns whether it was still registered.
    pub(crate) fn cancel(self) -> bool {
        self.table
            .upgrade()
            .is_some_and(|table| lock(&table).remove(self.id))
    }
}
