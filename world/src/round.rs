use std::collections::BTreeSet;

use number_rush_core::NextTarget;
use number_rush_system_sequence::LevelDraw;

/// Outcome of checking a clicked value against the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MatchOutcome {
    /// The value was the expected target and has been consumed.
    Matched,
    /// The value was matched earlier in the round.
    AlreadyConsumed,
    /// The value is not the number the board expects next.
    Mismatch,
}

/// Board of a single level and the player's progress through it.
#[derive(Clone, Debug)]
pub(crate) struct LevelRound {
    target_sequence: Vec<u32>,
    display_order: Vec<u32>,
    cursor: usize,
    consumed: BTreeSet<u32>,
}

impl LevelRound {
    pub(crate) fn from_draw(draw: LevelDraw) -> Self {
        let (target_sequence, display_order) = draw.into_parts();
        Self {
            target_sequence,
            display_order,
            cursor: 0,
            consumed: BTreeSet::new(),
        }
    }

    pub(crate) fn try_match(&mut self, value: u32) -> MatchOutcome {
        if self.consumed.contains(&value) {
            return MatchOutcome::AlreadyConsumed;
        }
        match self.target_sequence.get(self.cursor) {
            Some(expected) if *expected == value => {
                let _ = self.consumed.insert(value);
                self.cursor += 1;
                MatchOutcome::Matched
            }
            _ => MatchOutcome::Mismatch,
        }
    }

    pub(crate) fn next_target(&self) -> NextTarget {
        self.target_sequence
            .get(self.cursor)
            .map_or(NextTarget::Done, |value| NextTarget::Value(*value))
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.cursor >= self.target_sequence.len()
    }

    pub(crate) fn is_consumed(&self, value: u32) -> bool {
        self.consumed.contains(&value)
    }

    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn target_sequence(&self) -> &[u32] {
        &self.target_sequence
    }

    pub(crate) fn display_order(&self) -> &[u32] {
        &self.display_order
    }
}
