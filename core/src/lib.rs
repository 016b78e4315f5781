#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Number Rush engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the supporting systems. Adapters submit
//! [`Command`] values describing player intent or elapsed time, the world
//! executes those commands via its `apply` entry point, and then reports
//! [`Event`] values that adapters translate into presentation calls and
//! persistence requests.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Number Rush.";

/// Highest level of a run. Completing it wins the game.
pub const MAX_LEVEL: u32 = 10;
/// Amount of numbers placed on the board for every level.
pub const NUMBERS_PER_LEVEL: u32 = 40;
/// Board numbers are drawn from `1..=POOL_SIZE`.
pub const POOL_SIZE: u32 = 99;
/// Seconds granted for every move.
pub const TIME_LIMIT: u32 = 30;
/// Gold credited for a completed level before the time bonus.
pub const BASE_REWARD: u32 = 10;
/// Price of revealing the next target.
pub const HINT_COST: u32 = 20;
/// Price of extending the running timer.
pub const TIME_COST: u32 = 15;
/// Seconds added by the extend-timer power-up.
pub const TIME_EXTENSION: u32 = 10;
/// How long a revealed target stays highlighted.
pub const HINT_HIGHLIGHT: Duration = Duration::from_millis(1_500);
/// Number of distinct level backgrounds the presentation cycles through.
pub const BACKGROUND_COUNT: u32 = 5;

const _: () = assert!(NUMBERS_PER_LEVEL >= 1 && NUMBERS_PER_LEVEL <= POOL_SIZE);
const _: () = assert!(MAX_LEVEL >= 1);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Reports that the player clicked the board cell showing `value`.
    ClickCell {
        /// Number printed on the clicked cell.
        value: u32,
    },
    /// One fixed real-time interval (one second) elapsed.
    Tick,
    /// Moves from a completed level to the next one.
    AdvanceLevel,
    /// Restarts the run from the first level.
    ResetGame,
    /// Spends gold on the provided power-up.
    UsePowerUp {
        /// Power-up the player requested.
        kind: PowerUp,
    },
    /// Replaces session progress with a previously saved snapshot.
    RestoreProgress {
        /// Snapshot recovered from local or remote storage.
        snapshot: SaveSnapshot,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A fresh board was generated for the provided level.
    RoundStarted {
        /// Level the round belongs to.
        level: Level,
        /// Order in which the numbers should be laid out on the board.
        display_order: Vec<u32>,
        /// First number the player must click.
        next_target: NextTarget,
    },
    /// A correctly clicked cell was consumed and can no longer be matched.
    CellConsumed {
        /// Number printed on the consumed cell.
        value: u32,
    },
    /// The number the player must click next changed.
    NextTargetChanged {
        /// Number expected next, or [`NextTarget::Done`] once the board is cleared.
        next: NextTarget,
    },
    /// The countdown (re)started from a full allowance.
    TimerStarted {
        /// Seconds left on the countdown.
        remaining: u32,
    },
    /// One second elapsed on the running countdown.
    TimerTicked {
        /// Seconds left on the countdown.
        remaining: u32,
    },
    /// The running countdown received bonus seconds.
    TimerExtended {
        /// Seconds left on the countdown after the extension.
        remaining: u32,
    },
    /// The countdown stopped without expiring.
    TimerStopped {
        /// Seconds left when the countdown stopped.
        remaining: u32,
    },
    /// The countdown reached zero.
    TimerExpired,
    /// The gold balance changed.
    GoldChanged {
        /// Balance after the change.
        gold: Gold,
    },
    /// A non-final level was cleared.
    LevelCompleted {
        /// Level that was cleared.
        level: Level,
        /// Gold credited for clearing the level.
        reward: Gold,
    },
    /// The final level was cleared.
    GameWon {
        /// Balance after the final reward.
        gold: Gold,
    },
    /// The countdown expired before the level was cleared.
    GameOver {
        /// Level that was being played.
        level: Level,
        /// Balance at the moment the run was lost.
        gold: Gold,
    },
    /// The run restarted from the first level.
    GameReset {
        /// Balance after any reset penalty.
        gold: Gold,
    },
    /// The next target was revealed by the hint power-up.
    HintRevealed {
        /// Number the player must click next.
        value: u32,
        /// How long the presentation should keep the cell highlighted.
        duration: Duration,
    },
    /// A power-up request was refused and nothing was charged.
    PowerUpRejected {
        /// Power-up that was requested.
        kind: PowerUp,
        /// Specific reason the request failed.
        reason: PowerUpRejection,
    },
    /// Progress was replaced from a saved snapshot.
    ProgressRestored {
        /// Level restored from the snapshot.
        level: Level,
        /// Balance restored from the snapshot.
        gold: Gold,
    },
    /// Level or gold changed and the session should be saved.
    PersistRequested,
}

/// Lifecycle of the current level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GamePhase {
    /// The board accepts clicks and the countdown may be running.
    LevelInProgress,
    /// A non-final level was cleared and waits for the player to advance.
    LevelComplete,
    /// The final level was cleared; only a reset leaves this phase.
    GameWon,
    /// The countdown expired; only a reset leaves this phase.
    GameOver,
}

/// Number the player must click next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NextTarget {
    /// The board still expects the contained number.
    Value(u32),
    /// Every number on the board has been matched.
    Done,
}

impl fmt::Display for NextTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{value}"),
            Self::Done => write!(f, "Done"),
        }
    }
}

/// Gold-gated actions available while a level is in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUp {
    /// Highlights the next target on the board.
    Hint,
    /// Adds [`TIME_EXTENSION`] seconds to the running countdown.
    ExtendTime,
}

/// Reasons a power-up request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PowerUpRejection {
    /// The balance does not cover the power-up's price.
    Unaffordable,
    /// The countdown is not running, so there is nothing to extend.
    TimerNotRunning,
    /// Power-ups are only usable while a level is in progress.
    NotInProgress,
}

/// Decides when the per-move countdown begins on a fresh board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimerStartPolicy {
    /// The countdown starts as soon as the board is generated.
    Immediate,
    /// The countdown starts with the first correct click.
    #[default]
    OnFirstMatch,
}

/// One-based index of a level within a run.
///
/// Deserialized values are clamped into `1..=MAX_LEVEL` like [`Level::clamped`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Level(u32);

impl Level {
    /// Level every run starts from.
    pub const FIRST: Self = Self(1);
    /// Level whose completion wins the game.
    pub const FINAL: Self = Self(MAX_LEVEL);

    /// Creates a level, clamping the value into `1..=MAX_LEVEL`.
    #[must_use]
    pub fn clamped(value: u32) -> Self {
        Self(value.clamp(1, MAX_LEVEL))
    }

    /// Retrieves the numeric representation of the level.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether completing this level wins the game.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        self.0 >= MAX_LEVEL
    }

    /// Level that follows this one, saturating at the final level.
    #[must_use]
    pub fn next(self) -> Self {
        Self::clamped(self.0.saturating_add(1))
    }

    /// Zero-based background slot used by the presentation for this level.
    #[must_use]
    pub const fn background_index(&self) -> u32 {
        self.0.saturating_sub(1) % BACKGROUND_COUNT
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::FIRST
    }
}

impl From<u32> for Level {
    fn from(value: u32) -> Self {
        Self::clamped(value)
    }
}

impl From<Level> for u32 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Amount of in-game currency.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Gold(u32);

impl Gold {
    /// An empty balance.
    pub const ZERO: Self = Self(0);

    /// Creates a gold amount from a raw value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the amount.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Adds two amounts, saturating at the numeric bound.
    #[must_use]
    pub const fn saturating_add(self, other: Gold) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts `other`, returning `None` when the balance would go negative.
    #[must_use]
    pub fn checked_sub(self, other: Gold) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Half of the amount, rounded down.
    #[must_use]
    pub const fn halved(self) -> Self {
        Self(self.0 / 2)
    }
}

impl fmt::Display for Gold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Serialisable progress snapshot shared by every storage backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveSnapshot {
    /// Level the session was on.
    pub level: Level,
    /// Gold balance of the session.
    pub gold: Gold,
    /// Best balance reached after a reward. Older saves may omit it.
    #[serde(rename = "highScore", default)]
    pub high_score: Gold,
}

impl SaveSnapshot {
    /// Creates a snapshot from explicit values.
    #[must_use]
    pub const fn new(level: Level, gold: Gold, high_score: Gold) -> Self {
        Self {
            level,
            gold,
            high_score,
        }
    }
}

/// Maximum amount of characters accepted in a save code.
pub const SAVE_CODE_MAX_LEN: usize = 32;

/// Player-chosen key that names a progress snapshot in shared storage.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SaveCode(String);

impl SaveCode {
    /// Validates and trims a raw save code.
    ///
    /// Codes are used verbatim as storage keys, so only ASCII alphanumerics,
    /// `-` and `_` are accepted, up to [`SAVE_CODE_MAX_LEN`] characters.
    pub fn parse(raw: &str) -> Result<Self, SaveCodeError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SaveCodeError::Empty);
        }
        if let Some(invalid) = trimmed
            .chars()
            .find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_'))
        {
            return Err(SaveCodeError::InvalidCharacter(invalid));
        }
        if trimmed.len() > SAVE_CODE_MAX_LEN {
            return Err(SaveCodeError::TooLong {
                length: trimmed.len(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrows the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SaveCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors that can occur while validating a save code.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SaveCodeError {
    /// The code was empty or contained only whitespace.
    #[error("save code must not be empty")]
    Empty,
    /// The code exceeded [`SAVE_CODE_MAX_LEN`] characters.
    #[error(
        "save code is {length} characters long; at most {max} are allowed",
        max = SAVE_CODE_MAX_LEN
    )]
    TooLong {
        /// Length of the rejected code.
        length: usize,
    },
    /// The code contained a character outside the accepted set.
    #[error("save code may not contain '{0}'")]
    InvalidCharacter(char),
}
