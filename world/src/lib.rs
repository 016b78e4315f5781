#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Number Rush.
//!
//! The [`World`] owns the session aggregate (level, gold, high score), the
//! board of the current level, and the single per-move countdown. Nothing
//! outside this crate can mutate them: adapters submit commands through
//! [`apply`] and observe the results through [`query`] and the emitted events.

mod round;

use number_rush_core::{
    Command, Event, GamePhase, Gold, Level, NextTarget, PowerUp, PowerUpRejection, SaveSnapshot,
    TimerStartPolicy, HINT_HIGHLIGHT, TIME_EXTENSION, TIME_LIMIT, WELCOME_BANNER,
};
use number_rush_system_economy::{compute_reward, cost_of, spend};
use number_rush_system_sequence::{generate, RoundShape};
use number_rush_system_timer::{TickOutcome, Timer};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use round::{LevelRound, MatchOutcome};

/// Configuration parameters required to construct the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    timer_start: TimerStartPolicy,
    rng_seed: u64,
    shape: RoundShape,
    time_limit: u32,
}

impl Config {
    /// Creates a configuration for the standard board using the provided
    /// countdown policy and board seed.
    #[must_use]
    pub const fn new(timer_start: TimerStartPolicy, rng_seed: u64) -> Self {
        Self {
            timer_start,
            rng_seed,
            shape: RoundShape::STANDARD,
            time_limit: TIME_LIMIT,
        }
    }

    /// Replaces the board dimensions.
    #[must_use]
    pub const fn with_shape(self, shape: RoundShape) -> Self {
        Self { shape, ..self }
    }

    /// Replaces the per-move allowance in seconds.
    #[must_use]
    pub const fn with_time_limit(self, time_limit: u32) -> Self {
        Self { time_limit, ..self }
    }
}

/// Session aggregate that survives level transitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct SessionState {
    level: Level,
    gold: Gold,
    high_score: Gold,
}

/// Represents the authoritative Number Rush session.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: Config,
    session: SessionState,
    round: LevelRound,
    timer: Timer,
    phase: GamePhase,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a world on the first level with an empty balance.
    ///
    /// The first board is generated silently and its countdown is stopped.
    /// Adapters announce the session by applying [`Command::RestoreProgress`],
    /// which regenerates the board and reports it.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        let round = LevelRound::from_draw(generate(config.shape, &mut rng));
        Self {
            banner: WELCOME_BANNER,
            session: SessionState::default(),
            timer: Timer::new(config.time_limit),
            phase: GamePhase::LevelInProgress,
            round,
            rng,
            config,
        }
    }

    fn begin_round(&mut self, out_events: &mut Vec<Event>) {
        self.round = LevelRound::from_draw(generate(self.config.shape, &mut self.rng));
        self.timer = Timer::new(self.config.time_limit);
        self.phase = GamePhase::LevelInProgress;
        debug!(level = self.session.level.get(), "round started");

        out_events.push(Event::RoundStarted {
            level: self.session.level,
            display_order: self.round.display_order().to_vec(),
            next_target: self.round.next_target(),
        });

        match self.config.timer_start {
            TimerStartPolicy::Immediate => {
                self.timer.start();
                out_events.push(Event::TimerStarted {
                    remaining: self.timer.remaining(),
                });
            }
            TimerStartPolicy::OnFirstMatch => out_events.push(Event::TimerStopped {
                remaining: self.timer.remaining(),
            }),
        }
    }

    fn click_cell(&mut self, value: u32, out_events: &mut Vec<Event>) {
        if self.phase != GamePhase::LevelInProgress {
            debug!(value, phase = ?self.phase, "click ignored outside of a running level");
            return;
        }

        match self.round.try_match(value) {
            MatchOutcome::Matched => {}
            MatchOutcome::AlreadyConsumed | MatchOutcome::Mismatch => return,
        }

        out_events.push(Event::CellConsumed { value });
        out_events.push(Event::NextTargetChanged {
            next: self.round.next_target(),
        });

        if self.round.is_complete() {
            self.timer.stop();
            let remaining = self.timer.remaining();
            out_events.push(Event::TimerStopped { remaining });
            self.complete_level(remaining, out_events);
            return;
        }

        if !self.timer.reset() {
            self.timer.start();
        }
        out_events.push(Event::TimerStarted {
            remaining: self.timer.remaining(),
        });
    }

    fn complete_level(&mut self, remaining: u32, out_events: &mut Vec<Event>) {
        let reward = compute_reward(remaining);
        self.session.gold = self.session.gold.saturating_add(reward);
        self.session.high_score = self.session.high_score.max(self.session.gold);
        out_events.push(Event::GoldChanged {
            gold: self.session.gold,
        });

        let level = self.session.level;
        if level.is_final() {
            self.phase = GamePhase::GameWon;
            info!(gold = self.session.gold.get(), "final level cleared");
            out_events.push(Event::GameWon {
                gold: self.session.gold,
            });
        } else {
            self.phase = GamePhase::LevelComplete;
            debug!(level = level.get(), reward = reward.get(), "level cleared");
            out_events.push(Event::LevelCompleted { level, reward });
        }
        out_events.push(Event::PersistRequested);
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != GamePhase::LevelInProgress {
            return;
        }

        match self.timer.tick() {
            TickOutcome::Idle => {}
            TickOutcome::Counting { remaining } => {
                out_events.push(Event::TimerTicked { remaining });
            }
            TickOutcome::Expired => {
                self.phase = GamePhase::GameOver;
                info!(level = self.session.level.get(), "countdown expired");
                out_events.push(Event::TimerTicked { remaining: 0 });
                out_events.push(Event::TimerExpired);
                out_events.push(Event::GameOver {
                    level: self.session.level,
                    gold: self.session.gold,
                });
            }
        }
    }

    fn advance_level(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != GamePhase::LevelComplete {
            debug!(phase = ?self.phase, "advance ignored before the level is cleared");
            return;
        }
        self.session.level = self.session.level.next();
        self.begin_round(out_events);
        out_events.push(Event::PersistRequested);
    }

    fn reset_game(&mut self, out_events: &mut Vec<Event>) {
        if !matches!(self.phase, GamePhase::GameOver | GamePhase::GameWon) {
            debug!(phase = ?self.phase, "reset ignored while the run is still going");
            return;
        }
        let penalised = self.phase == GamePhase::GameOver;
        if penalised {
            self.session.gold = self.session.gold.halved();
        }
        self.session.level = Level::FIRST;
        info!(gold = self.session.gold.get(), penalised, "run reset");

        out_events.push(Event::GameReset {
            gold: self.session.gold,
        });
        if penalised {
            out_events.push(Event::GoldChanged {
                gold: self.session.gold,
            });
        }
        self.begin_round(out_events);
        out_events.push(Event::PersistRequested);
    }

    fn use_power_up(&mut self, kind: PowerUp, out_events: &mut Vec<Event>) {
        let reject = |reason: PowerUpRejection, out_events: &mut Vec<Event>| {
            debug!(?kind, ?reason, "power-up rejected");
            out_events.push(Event::PowerUpRejected { kind, reason });
        };

        if self.phase != GamePhase::LevelInProgress {
            reject(PowerUpRejection::NotInProgress, out_events);
            return;
        }
        let NextTarget::Value(target) = self.round.next_target() else {
            reject(PowerUpRejection::NotInProgress, out_events);
            return;
        };
        if kind == PowerUp::ExtendTime && !self.timer.is_running() {
            reject(PowerUpRejection::TimerNotRunning, out_events);
            return;
        }
        let Ok(balance) = spend(self.session.gold, cost_of(kind)) else {
            reject(PowerUpRejection::Unaffordable, out_events);
            return;
        };

        match kind {
            PowerUp::Hint => {
                self.session.gold = balance;
                out_events.push(Event::GoldChanged { gold: balance });
                out_events.push(Event::HintRevealed {
                    value: target,
                    duration: HINT_HIGHLIGHT,
                });
            }
            PowerUp::ExtendTime => {
                let Ok(remaining) = self.timer.extend(TIME_EXTENSION) else {
                    reject(PowerUpRejection::TimerNotRunning, out_events);
                    return;
                };
                self.session.gold = balance;
                out_events.push(Event::GoldChanged { gold: balance });
                out_events.push(Event::TimerExtended { remaining });
            }
        }
        out_events.push(Event::PersistRequested);
    }

    fn restore(&mut self, snapshot: SaveSnapshot, out_events: &mut Vec<Event>) {
        self.session = SessionState {
            level: Level::clamped(snapshot.level.get()),
            gold: snapshot.gold,
            high_score: self.session.high_score.max(snapshot.high_score),
        };
        info!(
            level = self.session.level.get(),
            gold = self.session.gold.get(),
            "progress restored"
        );

        out_events.push(Event::ProgressRestored {
            level: self.session.level,
            gold: self.session.gold,
        });
        out_events.push(Event::GoldChanged {
            gold: self.session.gold,
        });
        self.begin_round(out_events);
        out_events.push(Event::PersistRequested);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ClickCell { value } => world.click_cell(value, out_events),
        Command::Tick => world.tick(out_events),
        Command::AdvanceLevel => world.advance_level(out_events),
        Command::ResetGame => world.reset_game(out_events),
        Command::UsePowerUp { kind } => world.use_power_up(kind, out_events),
        Command::RestoreProgress { snapshot } => world.restore(snapshot, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use number_rush_core::{GamePhase, Gold, Level, NextTarget, SaveSnapshot};
    use number_rush_system_timer::TimerState;

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Lifecycle phase of the current level.
    #[must_use]
    pub fn phase(world: &World) -> GamePhase {
        world.phase
    }

    /// Level currently being played.
    #[must_use]
    pub fn level(world: &World) -> Level {
        world.session.level
    }

    /// Current gold balance.
    #[must_use]
    pub fn gold(world: &World) -> Gold {
        world.session.gold
    }

    /// Best balance reached after a reward.
    #[must_use]
    pub fn high_score(world: &World) -> Gold {
        world.session.high_score
    }

    /// Captures the session in the shape used by every storage backend.
    #[must_use]
    pub fn snapshot(world: &World) -> SaveSnapshot {
        SaveSnapshot::new(
            world.session.level,
            world.session.gold,
            world.session.high_score,
        )
    }

    /// Numbers of the current board in the order they must be clicked.
    #[must_use]
    pub fn target_sequence(world: &World) -> &[u32] {
        world.round.target_sequence()
    }

    /// Numbers of the current board in layout order.
    #[must_use]
    pub fn display_order(world: &World) -> &[u32] {
        world.round.display_order()
    }

    /// Index of the next expected number within the target sequence.
    #[must_use]
    pub fn cursor(world: &World) -> usize {
        world.round.cursor()
    }

    /// Number the board expects next.
    #[must_use]
    pub fn next_target(world: &World) -> NextTarget {
        world.round.next_target()
    }

    /// Reports whether `value` was already matched on the current board.
    #[must_use]
    pub fn is_consumed(world: &World, value: u32) -> bool {
        world.round.is_consumed(value)
    }

    /// Seconds left on the countdown.
    #[must_use]
    pub fn remaining_seconds(world: &World) -> u32 {
        world.timer.remaining()
    }

    /// Lifecycle state of the countdown.
    #[must_use]
    pub fn timer_state(world: &World) -> TimerState {
        world.timer.state()
    }
}
