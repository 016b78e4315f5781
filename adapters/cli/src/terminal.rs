//! Line-oriented rendition of the board on a text stream.

use std::{
    collections::BTreeSet,
    fmt,
    io::Write,
    time::{Duration, Instant},
};

use number_rush_core::{Gold, Level, NextTarget};
use number_rush_presentation::{CelebrationKind, ModalContent, Presentation};
use tracing::debug;

const COLUMNS: usize = 8;
const BACKGROUNDS: [&str; 5] = ["dawn", "meadow", "harbor", "dusk", "aurora"];

/// Presentation that prints to any writer, typically stdout.
#[derive(Debug)]
pub(crate) struct TerminalPresentation<W> {
    out: W,
    board: Vec<u32>,
    consumed: BTreeSet<u32>,
    highlight: Option<(u32, Instant)>,
}

impl<W: Write> TerminalPresentation<W> {
    pub(crate) fn new(out: W) -> Self {
        Self {
            out,
            board: Vec::new(),
            consumed: BTreeSet::new(),
            highlight: None,
        }
    }

    fn draw_board(&mut self) {
        let highlighted = self
            .highlight
            .filter(|(_, until)| Instant::now() < *until)
            .map(|(value, _)| value);

        let mut rows = Vec::with_capacity(self.board.len() / COLUMNS + 1);
        for chunk in self.board.chunks(COLUMNS) {
            let row: Vec<String> = chunk
                .iter()
                .map(|value| {
                    if self.consumed.contains(value) {
                        " .. ".to_owned()
                    } else if highlighted == Some(*value) {
                        format!("[{value:>2}]")
                    } else {
                        format!(" {value:>2} ")
                    }
                })
                .collect();
            rows.push(row.join(""));
        }
        for row in rows {
            self.line(format_args!("{row}"));
        }
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        if let Err(error) = writeln!(self.out, "{args}") {
            debug!(%error, "failed to write to terminal");
        }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presentation for TerminalPresentation<W> {
    fn render_board(&mut self, display_order: &[u32]) {
        self.board = display_order.to_vec();
        self.consumed.clear();
        self.highlight = None;
        self.draw_board();
    }

    fn mark_cell_consumed(&mut self, value: u32) {
        let _ = self.consumed.insert(value);
    }

    fn highlight_cell(&mut self, value: u32, duration: Duration) {
        self.highlight = Some((value, Instant::now() + duration));
        self.draw_board();
        self.line(format_args!("Hint: look for {value}"));
    }

    fn show_next_target(&mut self, next: NextTarget) {
        self.line(format_args!("Next: {next}"));
    }

    fn show_timer(&mut self, seconds: u32) {
        if seconds <= 5 || seconds % 10 == 0 {
            self.line(format_args!("Time: {seconds}s"));
        }
    }

    fn show_level(&mut self, level: Level) {
        self.line(format_args!("== Level {level} =="));
    }

    fn show_gold(&mut self, gold: Gold) {
        self.line(format_args!("Gold: {gold}"));
    }

    fn show_modal(&mut self, content: &ModalContent) {
        self.line(format_args!("*** {} ***", content.title));
        self.line(format_args!("{}", content.message));
        self.line(format_args!("Type `ok` to {}.", content.action_label));
    }

    fn hide_modal(&mut self) {}

    fn set_background(&mut self, index: u32) {
        let name = BACKGROUNDS
            .get(index as usize % BACKGROUNDS.len())
            .copied()
            .unwrap_or_default();
        debug!(index, name, "background changed");
    }

    fn celebrate(&mut self, kind: CelebrationKind) {
        match kind {
            CelebrationKind::Match => {}
            CelebrationKind::LevelComplete => self.line(format_args!("Level cleared!")),
            CelebrationKind::GameWon => self.line(format_args!("*** Every level cleared! ***")),
        }
    }

    fn notify(&mut self, message: &str) {
        self.line(format_args!("{message}"));
    }
}
