//! Per-family request tagging.
//!
//! Every poll request takes a [`Ticket`] carrying a monotonically increasing
//! sequence number. A response may only be applied if its ticket is newer
//! than the last applied one, which makes the display last-applied-wins no
//! matter in which order responses complete.

use std::fmt;

/// How a poll was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTrigger {
    /// Timer tick: skipped while another poll of the family is in flight.
    Scheduled,
    /// Explicit refresh: always issues a request.
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct PollGate {
    issued: u64,
    applied: u64,
    in_flight: usize,
}

impl PollGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket, unless a scheduled tick would overlap a poll that has
    /// not settled yet.
    pub fn begin(&mut self, trigger: PollTrigger) -> Option<Ticket> {
        if trigger == PollTrigger::Scheduled && self.in_flight > 0 {
            return None;
        }
        self.issued += 1;
        self.in_flight += 1;
        Some(Ticket(self.issued))
    }

    /// Mark a request as settled, whatever its outcome.
    pub fn settle(&mut self, _ticket: Ticket) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Claim the display for a successful response. Returns `false` when an
    /// equal or newer response has already been applied.
    pub fn accept(&mut self, ticket: Ticket) -> bool {
        if ticket.0 > self.applied {
            self.applied = ticket.0;
            true
        } else {
            false
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn last_applied(&self) -> u64 {
        self.applied
    }
}
