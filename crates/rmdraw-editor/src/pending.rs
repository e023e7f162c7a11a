//! Single-slot deferred task.
//!
//! Scheduling replaces whatever was pending (last writer wins). A ticket
//! names one scheduled request; running a ticket from another session or
//! a superseded request does nothing.

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingTask {
    /// Commit the active undo transaction.
    CommitUndo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunLaterTicket {
    pub session: Uuid,
    pub generation: u64,
}

#[derive(Debug)]
pub struct PendingSlot {
    session: Uuid,
    generation: u64,
    task: Option<PendingTask>,
}

impl PendingSlot {
    pub fn new(session: Uuid) -> Self {
        Self {
            session,
            generation: 0,
            task: None,
        }
    }

    /// Replace the pending task.
    pub fn schedule(&mut self, task: PendingTask) -> RunLaterTicket {
        self.generation += 1;
        self.task = Some(task);
        self.ticket()
    }

    /// Ticket of the most recent request.
    pub fn ticket(&self) -> RunLaterTicket {
        RunLaterTicket {
            session: self.session,
            generation: self.generation,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.task.is_some()
    }

    pub fn take(&mut self) -> Option<PendingTask> {
        self.task.take()
    }

    /// Take the task only if `ticket` names the current request.
    pub fn take_for(&mut self, ticket: RunLaterTicket) -> Option<PendingTask> {
        if ticket.session != self.session || ticket.generation != self.generation {
            tracing::debug!(generation = ticket.generation, "Ignoring stale run-later ticket");
            return None;
        }
        self.task.take()
    }

    pub fn clear(&mut self) {
        self.task = None;
    }
}
