//! Cancellable delayed transitions.
//!
//! Each kind has one slot. Every start or cancel bumps a generation counter,
//! and a fired token is only honoured while its generation still matches the
//! slot, so a firing that was invalidated earlier in the same frame does
//! nothing.

use itertools::Itertools;
use std::cmp::Ordering;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum TimerKind {
    /// Instruction video finished, waiting to open the selection step
    InstructionAdvance,
    /// Dalgona result on screen, waiting to show the result panel
    ResultShow,
    /// Result panel on screen, waiting to hand over to the next flow
    AutoTransition,
    /// Next flow on screen, waiting to reset back to the intro
    AutoReset,
}

impl TimerKind {
    pub const ALL: [TimerKind; 4] = [
        TimerKind::InstructionAdvance,
        TimerKind::ResultShow,
        TimerKind::AutoTransition,
        TimerKind::AutoReset,
    ];

    fn slot(self) -> usize {
        self as usize
    }

    /// Result-chain timers share one transition point: only one of them may
    /// be pending at a time.
    pub fn is_result_chain(self) -> bool {
        !matches!(self, TimerKind::InstructionAdvance)
    }
}

/// Handle for one started timer instance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerToken {
    pub kind: TimerKind,
    generation: u64,
}

#[derive(Clone, Copy, Debug, Default)]
struct Slot {
    generation: u64,
    remaining: Option<f64>,
}

#[derive(Debug, Default)]
pub struct PendingTimers {
    slots: [Slot; 4],
    generation: u64,
}

impl PendingTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `kind`, superseding a pending instance of the same kind and
    /// cancelling the other result-chain timers.
    pub fn start(&mut self, kind: TimerKind, delay_secs: f64) -> TimerToken {
        if kind.is_result_chain() {
            for other in TimerKind::ALL {
                if other != kind && other.is_result_chain() {
                    self.cancel(other);
                }
            }
        }
        if self.is_pending(kind) {
            log::debug!("{kind} timer restarted, previous instance superseded");
        }

        self.generation += 1;
        self.slots[kind.slot()] = Slot {
            generation: self.generation,
            remaining: Some(delay_secs.max(0.0)),
        };
        log::debug!("{kind} timer started: {delay_secs:.2}s");

        TimerToken {
            kind,
            generation: self.generation,
        }
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        self.generation += 1;
        let slot = &mut self.slots[kind.slot()];
        if slot.remaining.take().is_some() {
            log::debug!("{kind} timer cancelled");
        }
        slot.generation = self.generation;
    }

    pub fn cancel_all(&mut self) {
        for kind in TimerKind::ALL {
            self.cancel(kind);
        }
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.slots[kind.slot()].remaining.is_some()
    }

    pub fn remaining(&self, kind: TimerKind) -> Option<f64> {
        self.slots[kind.slot()].remaining
    }

    pub fn any_pending(&self) -> bool {
        TimerKind::ALL.iter().any(|&kind| self.is_pending(kind))
    }

    /// Advances every pending timer by `dt` and returns the ones that came
    /// due, earliest deadline first.
    pub fn advance(&mut self, dt: f64) -> Vec<TimerToken> {
        let mut due = Vec::new();

        for kind in TimerKind::ALL {
            let slot = &mut self.slots[kind.slot()];
            if let Some(remaining) = slot.remaining {
                let left = remaining - dt;
                if left <= 0.0 {
                    slot.remaining = None;
                    due.push((
                        left,
                        TimerToken {
                            kind,
                            generation: slot.generation,
                        },
                    ));
                } else {
                    slot.remaining = Some(left);
                }
            }
        }

        due.into_iter()
            .sorted_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal))
            .map(|(_, token)| token)
            .collect()
    }

    /// Whether a fired token still belongs to the live instance of its kind
    pub fn is_current(&self, token: TimerToken) -> bool {
        self.slots[token.kind.slot()].generation == token.generation
    }
}
