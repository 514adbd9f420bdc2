use tracing::{debug, warn};

/// Counts loads that have started but not yet settled.
///
/// Every load takes a [`LoadTicket`] before its request goes out and hands
/// it back on success or failure alike. A ticket can only be settled once,
/// so the counter cannot drift below zero through double settlement.
#[derive(Debug, Default)]
pub struct LoadTracker {
    pending: usize,
}

/// Proof that a load is in flight
#[derive(Debug)]
#[must_use = "a started load must be settled"]
pub struct LoadTicket {
    label: &'static str,
}

impl LoadTicket {
    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, label: &'static str) -> LoadTicket {
        self.pending += 1;
        debug!("Loading {} ({} pending)", label, self.pending);
        LoadTicket { label }
    }

    /// Settle a load. Returns `true` when this was the last pending one.
    pub fn settle(&mut self, ticket: LoadTicket) -> bool {
        match self.pending.checked_sub(1) {
            Some(pending) => {
                self.pending = pending;
                debug!("Loaded {} ({} pending)", ticket.label, pending);
                pending == 0
            }
            None => {
                warn!("Settled {} with no pending loads", ticket.label);
                false
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn is_idle(&self) -> bool {
        self.pending == 0
    }
}
