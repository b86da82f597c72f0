//! Last-edit-wins ordering for interactive hosts.
//!
//! An editor starts a transformation on every edit. Results can come back
//! after a newer edit was made; only the result of the latest edit is used.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Identifies one edit. Later edits have larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticket(u32);

impl Ticket {
    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn from_value(value: u32) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EditSession {
    latest: Option<Ticket>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new edit. Every earlier ticket becomes stale.
    pub fn begin_edit(&mut self) -> Ticket {
        let next = self
            .latest
            .map_or(Ticket(1), |Ticket(value)| Ticket(value.saturating_add(1)));
        self.latest = Some(next);
        next
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest == Some(ticket)
    }

    /// Hands `result` back if `ticket` is still the latest edit, and drops
    /// it otherwise.
    pub fn settle<T>(&self, ticket: Ticket, result: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(result)
        } else {
            debug!(ticket = ticket.value(), "dropping stale result");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tickets_increase() {
        let mut session = EditSession::new();
        let first = session.begin_edit();
        let second = session.begin_edit();
        assert!(second > first);
        assert_eq!(first.value(), 1);
    }

    #[test]
    fn test_latest_edit_wins() {
        let mut session = EditSession::new();
        let stale = session.begin_edit();
        let latest = session.begin_edit();

        assert!(!session.is_current(stale));
        assert!(session.is_current(latest));
        assert_eq!(session.settle(stale, "old"), None);
        assert_eq!(session.settle(latest, "new"), Some("new"));
    }

    #[test]
    fn test_unknown_ticket_is_stale() {
        let session = EditSession::new();
        assert!(!session.is_current(Ticket::from_value(1)));
    }
}
