//! Two-player duel phase machine
//!
//! Drives the `waiting -> player1 -> player2 -> verdict` sequence in front
//! of a silent AI judge. The machine is pure: it reports transitions and
//! timer events, and the session performs the side effects (flushing
//! playback, beginning a new turn, sending the trigger phrase) in that
//! order so no stale audio bleeds across speakers.

use tracing::debug;

use crate::prompts::{TRANSITION_TRIGGER, VERDICT_TRIGGER};

/// Phase of a duel session. Transitions are strictly linear; `Verdict` is
/// terminal until the session is reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuelPhase {
    Waiting,
    Player1,
    Player2,
    Verdict,
}

impl DuelPhase {
    pub fn label(&self) -> &'static str {
        match self {
            DuelPhase::Waiting => "waiting",
            DuelPhase::Player1 => "player1",
            DuelPhase::Player2 => "player2",
            DuelPhase::Verdict => "verdict",
        }
    }
}

/// What advanced the machine out of a speaking phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdvanceReason {
    TimerExpired,
    DoneSignal,
}

/// A committed phase change plus the trigger phrase to send, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: DuelPhase,
    pub to: DuelPhase,
    pub trigger: Option<&'static str>,
}

/// Timer-driven events reported by [`DuelMachine::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuelTick {
    /// The settle delay elapsed and the speaking countdown (re)started
    CountdownStarted,

    /// The speaking countdown ran out; the caller should advance the phase
    TimerExpired,
}

/// State for one duel: current phase, the speaking-countdown deadline and
/// the pending countdown start after a phase hand-over.
pub struct DuelMachine {
    phase: DuelPhase,
    turn_secs: f64,
    settle_secs: f64,
    deadline: Option<f64>,
    countdown_starts_at: Option<f64>,
}

impl DuelMachine {
    pub fn new(turn_secs: u64, settle_secs: f64) -> Self {
        Self {
            phase: DuelPhase::Waiting,
            turn_secs: turn_secs as f64,
            settle_secs,
            deadline: None,
            countdown_starts_at: None,
        }
    }

    pub fn phase(&self) -> DuelPhase {
        self.phase
    }

    /// Begin the duel: `waiting -> player1` with an immediate countdown.
    /// Returns `None` if the duel already started.
    pub fn start(&mut self, now: f64) -> Option<Transition> {
        if self.phase != DuelPhase::Waiting {
            return None;
        }
        self.phase = DuelPhase::Player1;
        self.deadline = Some(now + self.turn_secs);
        debug!(phase = self.phase.label(), "duel started");
        Some(Transition {
            from: DuelPhase::Waiting,
            to: DuelPhase::Player1,
            trigger: None,
        })
    }

    /// Poll timers. At most one event is reported per call.
    pub fn tick(&mut self, now: f64) -> Option<DuelTick> {
        if let Some(at) = self.countdown_starts_at {
            if now >= at {
                self.countdown_starts_at = None;
                self.deadline = Some(now + self.turn_secs);
                debug!(phase = self.phase.label(), "countdown started");
                return Some(DuelTick::CountdownStarted);
            }
        }
        if let Some(deadline) = self.deadline {
            if now >= deadline {
                self.deadline = None;
                debug!(phase = self.phase.label(), "speaking timer expired");
                return Some(DuelTick::TimerExpired);
            }
        }
        None
    }

    /// Advance out of the current speaking phase.
    ///
    /// `player1 -> player2` arms the next countdown after the settle delay
    /// so the judge can announce the hand-over first; `player2 -> verdict`
    /// has no further timer. Any other phase ignores the request.
    pub fn advance(&mut self, now: f64, reason: AdvanceReason) -> Option<Transition> {
        let from = self.phase;
        let transition = match self.phase {
            DuelPhase::Player1 => {
                self.phase = DuelPhase::Player2;
                self.deadline = None;
                self.countdown_starts_at = Some(now + self.settle_secs);
                Some(Transition {
                    from,
                    to: DuelPhase::Player2,
                    trigger: Some(TRANSITION_TRIGGER),
                })
            }
            DuelPhase::Player2 => {
                self.phase = DuelPhase::Verdict;
                self.deadline = None;
                self.countdown_starts_at = None;
                Some(Transition {
                    from,
                    to: DuelPhase::Verdict,
                    trigger: Some(VERDICT_TRIGGER),
                })
            }
            DuelPhase::Waiting | DuelPhase::Verdict => None,
        };

        if let Some(t) = &transition {
            debug!(
                from = t.from.label(),
                to = t.to.label(),
                ?reason,
                "duel phase advanced"
            );
        }
        transition
    }

    /// Whole seconds left on the speaking countdown, if one is running.
    pub fn remaining(&self, now: f64) -> Option<u64> {
        self.deadline
            .map(|deadline| (deadline - now).max(0.0).ceil() as u64)
    }
}
