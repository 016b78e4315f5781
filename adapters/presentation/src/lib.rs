#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared presentation contracts for Number Rush adapters.
//!
//! Adapters implement [`Presentation`] for their output surface and feed the
//! events reported by the world through [`present`]. The single reusable
//! [`Modal`] remembers which [`Command`] its action button submits.

use std::{fmt, time::Duration};

use number_rush_core::{
    Command, Event, Gold, Level, NextTarget, PowerUp, PowerUpRejection, MAX_LEVEL,
};
use tracing::debug;

/// Flourish played on notable moments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CelebrationKind {
    /// A correct number was clicked.
    Match,
    /// A level other than the final one was cleared.
    LevelComplete,
    /// The final level was cleared.
    GameWon,
}

/// Text and action currently held by the modal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModalContent {
    /// Heading of the dialog.
    pub title: String,
    /// Body text of the dialog.
    pub message: String,
    /// Label of the single action button.
    pub action_label: String,
    /// Command submitted when the action is triggered.
    pub action: Command,
}

/// The one dialog shared by every prompt.
///
/// Showing the modal overwrites its previous content, so at most one action is
/// ever pending.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Modal {
    content: Option<ModalContent>,
}

impl Modal {
    /// Creates a hidden modal.
    #[must_use]
    pub const fn new() -> Self {
        Self { content: None }
    }

    /// Replaces the content and opens the modal.
    pub fn show<T, M, A>(
        &mut self,
        title: T,
        message: M,
        action_label: A,
        action: Command,
    ) -> &ModalContent
    where
        T: Into<String>,
        M: Into<String>,
        A: Into<String>,
    {
        self.content.insert(ModalContent {
            title: title.into(),
            message: message.into(),
            action_label: action_label.into(),
            action,
        })
    }

    /// Content of the open modal.
    #[must_use]
    pub fn content(&self) -> Option<&ModalContent> {
        self.content.as_ref()
    }

    /// Reports whether the modal is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.content.is_some()
    }

    /// Closes the modal and yields the command its action submits.
    pub fn take_action(&mut self) -> Option<Command> {
        self.content.take().map(|content| content.action)
    }

    /// Closes the modal without triggering it. Returns whether it was open.
    pub fn close(&mut self) -> bool {
        self.content.take().is_some()
    }
}

/// Output surface driven by [`present`].
pub trait Presentation {
    /// Lays out a fresh board in the provided order.
    fn render_board(&mut self, display_order: &[u32]);

    /// Marks a number as found.
    fn mark_cell_consumed(&mut self, value: u32);

    /// Emphasises a number for the provided duration.
    fn highlight_cell(&mut self, value: u32, duration: Duration);

    /// Displays the number the board expects next.
    fn show_next_target(&mut self, next: NextTarget);

    /// Displays the seconds left on the countdown.
    fn show_timer(&mut self, seconds: u32);

    /// Displays the current level.
    fn show_level(&mut self, level: Level);

    /// Displays the current balance.
    fn show_gold(&mut self, gold: Gold);

    /// Opens the modal with the provided content.
    fn show_modal(&mut self, content: &ModalContent);

    /// Hides the modal.
    fn hide_modal(&mut self);

    /// Switches to the background with the provided zero-based index.
    fn set_background(&mut self, index: u32);

    /// Plays a celebration.
    fn celebrate(&mut self, kind: CelebrationKind);

    /// Shows a short informational message.
    fn notify(&mut self, message: &str);
}

/// Translates world events into presentation calls, opening the modal where
/// the player has to confirm the next step.
pub fn present<P>(events: &[Event], presentation: &mut P, modal: &mut Modal)
where
    P: Presentation + ?Sized,
{
    for event in events {
        present_event(event, presentation, modal);
    }
}

fn present_event<P>(event: &Event, presentation: &mut P, modal: &mut Modal)
where
    P: Presentation + ?Sized,
{
    match event {
        Event::RoundStarted {
            level,
            display_order,
            next_target,
        } => {
            if modal.close() {
                presentation.hide_modal();
            }
            presentation.set_background(level.background_index());
            presentation.show_level(*level);
            presentation.render_board(display_order);
            presentation.show_next_target(*next_target);
        }
        Event::CellConsumed { value } => {
            presentation.mark_cell_consumed(*value);
            presentation.celebrate(CelebrationKind::Match);
        }
        Event::NextTargetChanged { next } => presentation.show_next_target(*next),
        Event::TimerStarted { remaining }
        | Event::TimerTicked { remaining }
        | Event::TimerExtended { remaining }
        | Event::TimerStopped { remaining } => presentation.show_timer(*remaining),
        Event::GoldChanged { gold } => presentation.show_gold(*gold),
        Event::LevelCompleted { level, reward } => {
            presentation.celebrate(CelebrationKind::LevelComplete);
            presentation.notify(&format!("Level {level} cleared: +{reward} gold"));
            let content = modal.show(
                "Level Complete!",
                format!("Ready for Level {}?", level.next()),
                "Start Next Level",
                Command::AdvanceLevel,
            );
            presentation.show_modal(content);
        }
        Event::GameWon { gold } => {
            presentation.celebrate(CelebrationKind::GameWon);
            let content = modal.show(
                "You Win!",
                format!("All {MAX_LEVEL} levels cleared with {gold} gold."),
                "Play Again",
                Command::ResetGame,
            );
            presentation.show_modal(content);
        }
        Event::GameOver { .. } => {
            let content = modal.show(
                "Time's Up!",
                "You ran out of time! Game Over.",
                "Restart Level 1",
                Command::ResetGame,
            );
            presentation.show_modal(content);
        }
        Event::HintRevealed { value, duration } => presentation.highlight_cell(*value, *duration),
        Event::PowerUpRejected { kind, reason } => {
            presentation.notify(&RejectionNotice(*kind, *reason).to_string());
        }
        Event::ProgressRestored { level, gold } => {
            debug!(level = level.get(), gold = gold.get(), "presenting restored progress");
        }
        Event::TimerExpired | Event::GameReset { .. } | Event::PersistRequested => {}
    }
}

struct RejectionNotice(PowerUp, PowerUpRejection);

impl fmt::Display for RejectionNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.0 {
            PowerUp::Hint => "Hint",
            PowerUp::ExtendTime => "Extra time",
        };
        match self.1 {
            PowerUpRejection::Unaffordable => write!(f, "{name} unavailable: not enough gold"),
            PowerUpRejection::TimerNotRunning => {
                write!(f, "{name} unavailable: the timer is not running")
            }
            PowerUpRejection::NotInProgress => {
                write!(f, "{name} unavailable: no level in progress")
            }
        }
    }
}
