#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Sequence generation system that draws the numbers of a level board.
//!
//! A draw shuffles the whole pool `1..=max` uniformly and keeps the first
//! `count` values. The sorted copy of the draw is the order the player must
//! click in; an independently shuffled copy is the order the board is laid
//! out in.

use number_rush_core::{NUMBERS_PER_LEVEL, POOL_SIZE};
use rand::{seq::SliceRandom, Rng};
use thiserror::Error;

/// Validated dimensions of a level draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RoundShape {
    count: u32,
    max: u32,
}

impl RoundShape {
    /// Board used by regular play: [`NUMBERS_PER_LEVEL`] numbers out of `1..=POOL_SIZE`.
    pub const STANDARD: Self = Self {
        count: NUMBERS_PER_LEVEL,
        max: POOL_SIZE,
    };

    /// Creates a shape drawing `count` distinct numbers from `1..=max`.
    pub fn new(count: u32, max: u32) -> Result<Self, SequenceError> {
        if count == 0 || count > max {
            return Err(SequenceError::InvalidInput { count, max });
        }
        Ok(Self { count, max })
    }

    /// Amount of numbers placed on the board.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Largest number that may appear on the board.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }
}

/// Errors raised while describing a draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// The board cannot hold more distinct numbers than the pool provides.
    #[error("cannot draw {count} distinct numbers from 1..={max}")]
    InvalidInput {
        /// Requested amount of numbers.
        count: u32,
        /// Upper bound of the pool.
        max: u32,
    },
}

/// Numbers drawn for a single level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelDraw {
    target_sequence: Vec<u32>,
    display_order: Vec<u32>,
}

impl LevelDraw {
    /// Drawn numbers in strictly ascending order.
    #[must_use]
    pub fn target_sequence(&self) -> &[u32] {
        &self.target_sequence
    }

    /// Drawn numbers in board layout order.
    #[must_use]
    pub fn display_order(&self) -> &[u32] {
        &self.display_order
    }

    /// Consumes the draw, yielding `(target_sequence, display_order)`.
    #[must_use]
    pub fn into_parts(self) -> (Vec<u32>, Vec<u32>) {
        (self.target_sequence, self.display_order)
    }
}

/// Draws a fresh board for the provided shape.
pub fn generate<R>(shape: RoundShape, rng: &mut R) -> LevelDraw
where
    R: Rng + ?Sized,
{
    let mut pool: Vec<u32> = (1..=shape.max).collect();
    pool.shuffle(rng);
    pool.truncate(shape.count as usize);

    let mut target_sequence = pool.clone();
    target_sequence.sort_unstable();

    let mut display_order = pool;
    display_order.shuffle(rng);

    LevelDraw {
        target_sequence,
        display_order,
    }
}
