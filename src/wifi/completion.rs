//! Per-command completion tokens.
//!
//! Each submitted radio command arms a single-shot token for its kind. The
//! callback for that kind resolves whichever token is armed at the time; if
//! none is, the completion is stale (its waiter already gave up) and is
//! dropped. A waiter that times out disarms its token, so a late completion
//! can never satisfy a later, unrelated wait.

use crossbeam::channel::{self, Receiver, Sender};
use log::debug;
use parking_lot::Mutex;
use std::time::Duration;

/// Kinds of asynchronous radio commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Join,
    Disconnect,
    Scan,
    StartAp,
    StopAp,
}

impl CommandKind {
    const COUNT: usize = 5;

    fn index(self) -> usize {
        match self {
            Self::Join => 0,
            Self::Disconnect => 1,
            Self::Scan => 2,
            Self::StartAp => 3,
            Self::StopAp => 4,
        }
    }
}

/// Result delivered through a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Completed with a non-success firmware status.
    Failed(u32),
}

/// Armed completion tokens, one slot per command kind.
#[derive(Default)]
pub struct PendingCommands {
    slots: Mutex<[Option<Sender<Outcome>>; CommandKind::COUNT]>,
}

/// Receiving half of an armed token.
#[must_use = "an armed ticket must be waited on or disarmed"]
pub struct Ticket {
    kind: CommandKind,
    rx: Receiver<Outcome>,
}

impl PendingCommands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a fresh token for `kind`, replacing any previous one.
    pub fn arm(&self, kind: CommandKind) -> Ticket {
        let (tx, rx) = channel::bounded(1);
        if self.slots.lock()[kind.index()].replace(tx).is_some() {
            debug!("Replacing armed {:?} token", kind);
        }
        Ticket { kind, rx }
    }

    pub fn disarm(&self, kind: CommandKind) {
        self.slots.lock()[kind.index()] = None;
    }

    pub fn is_armed(&self, kind: CommandKind) -> bool {
        self.slots.lock()[kind.index()].is_some()
    }

    /// Deliver `outcome` to the armed token of `kind`.
    ///
    /// Never blocks. Returns `false` if no token was armed.
    pub fn resolve(&self, kind: CommandKind, outcome: Outcome) -> bool {
        let sender = self.slots.lock()[kind.index()].take();
        match sender {
            Some(tx) => {
                // Capacity 1 and a single resolve per arm: cannot be full.
                let _ = tx.try_send(outcome);
                true
            }
            None => {
                debug!("Dropping stale {:?} completion: {:?}", kind, outcome);
                false
            }
        }
    }
}

impl Ticket {
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    /// Block until the token is resolved or `timeout` elapses.
    ///
    /// On timeout the token is disarmed. A completion that raced in between
    /// the timeout and the disarm is still returned.
    pub fn wait(self, pending: &PendingCommands, timeout: Duration) -> Option<Outcome> {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(_) => {
                pending.disarm(self.kind);
                self.rx.try_recv().ok()
            }
        }
    }
}
