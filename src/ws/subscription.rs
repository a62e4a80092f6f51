//! Feed filtering for one WebSocket client.

use std::collections::HashSet;

use crate::domain::{EventId, FeedEvent};

/// Parsed argument of a `subscribe` / `unsubscribe` command.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Targets {
    /// Well-formed event IDs, in request order.
    pub event_ids: Vec<EventId>,
    /// `"*"` was among the entries.
    pub wildcard: bool,
    /// Entries that are neither `"*"` nor a UUID, echoed back to the client.
    pub invalid: Vec<String>,
}

impl Targets {
    /// Sorts raw entries into IDs, the wildcard, and rejects.
    #[must_use]
    pub fn parse(raw: &[String]) -> Self {
        raw.iter().fold(Self::default(), |mut targets, entry| {
            if entry.trim() == "*" {
                targets.wildcard = true;
            } else if let Ok(id) = entry.parse::<EventId>() {
                targets.event_ids.push(id);
            } else {
                targets.invalid.push(entry.clone());
            }
            targets
        })
    }

    /// The accepted IDs as strings, for replies.
    #[must_use]
    pub fn id_strings(&self) -> Vec<String> {
        self.event_ids.iter().map(ToString::to_string).collect()
    }
}

/// What a connection wants to hear about: every public event, or a chosen
/// set. The two are independent, so dropping `"*"` keeps explicit IDs.
#[derive(Debug, Default)]
pub struct Subscriptions {
    everything: bool,
    event_ids: HashSet<EventId>,
}

impl Subscriptions {
    /// Starts with nothing selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects `targets`.
    pub fn add(&mut self, targets: &Targets) {
        self.everything |= targets.wildcard;
        self.event_ids.extend(targets.event_ids.iter().copied());
    }

    /// Deselects `targets`.
    pub fn remove(&mut self, targets: &Targets) {
        if targets.wildcard {
            self.everything = false;
        }
        for id in &targets.event_ids {
            self.event_ids.remove(id);
        }
    }

    /// Returns `true` if `feed_event` should be forwarded.
    #[must_use]
    pub fn wants(&self, feed_event: &FeedEvent) -> bool {
        self.everything || self.event_ids.contains(&feed_event.event_id())
    }

    /// Number of explicitly selected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.event_ids.len()
    }

    /// Returns `true` if no explicit event is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.event_ids.is_empty()
    }

    /// Returns `true` while `"*"` is active.
    #[must_use]
    pub const fn is_wildcard(&self) -> bool {
        self.everything
    }
}
