//! Turn sequencing for response audio
//!
//! The session stamps every inbound audio chunk with the turn id that was
//! current when it arrived. Whenever the user ends a turn (or the duel
//! machine advances a phase) the counter increments, and anything still
//! carrying an older id is dropped instead of played.

/// Monotonically increasing turn counter owned by the session.
#[derive(Debug, Default)]
pub struct TurnSequencer {
    current: u64,
}

impl TurnSequencer {
    pub fn new() -> Self {
        Self { current: 0 }
    }

    /// Increment the turn id and return the new value.
    pub fn begin_new_turn(&mut self) -> u64 {
        self.current += 1;
        self.current
    }

    /// Whether a previously stamped id still matches the current turn.
    pub fn is_current(&self, id: u64) -> bool {
        id == self.current
    }

    /// The id chunks arriving right now should be stamped with.
    pub fn current(&self) -> u64 {
        self.current
    }
}
