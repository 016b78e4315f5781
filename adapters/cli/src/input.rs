//! Parsing of the commands typed on stdin.

use number_rush_core::{SaveCode, SaveCodeError};
use thiserror::Error;

/// Help text printed by `help` and after unrecognised input.
pub(crate) const USAGE: &str = "Commands: <number> | hint | time | ok | reset | save CODE | load CODE | status | help | quit";

/// One line of player input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Input {
    /// Click the cell showing the number.
    Click(u32),
    /// Buy a hint.
    Hint,
    /// Buy extra time.
    Time,
    /// Trigger the open modal's action.
    Confirm,
    /// Restart from the first level.
    Reset,
    /// Save under a code in shared storage.
    Save(SaveCode),
    /// Load a code from shared storage.
    Load(SaveCode),
    /// Print a summary of the session.
    Status,
    /// Print the command list.
    Help,
    /// Leave the game.
    Quit,
}

/// Errors that can occur while reading a command.
#[derive(Debug, PartialEq, Eq, Error)]
pub(crate) enum InputError {
    /// The first word is not a command.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    /// `save` or `load` was typed without a code.
    #[error("'{0}' needs a save code")]
    MissingCode(&'static str),
    /// The code after `save` or `load` is not valid.
    #[error("invalid save code: {0}")]
    InvalidCode(#[source] SaveCodeError),
    /// A command received more words than it accepts.
    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),
}

/// Parses a line. Blank lines yield `None`.
pub(crate) fn parse_input(line: &str) -> Result<Option<Input>, InputError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let argument = words.next();
    if let Some(extra) = words.next() {
        return Err(InputError::UnexpectedArgument(extra.to_owned()));
    }

    let input = match command.to_ascii_lowercase().as_str() {
        "save" => Input::Save(save_code("save", argument)?),
        "load" => Input::Load(save_code("load", argument)?),
        other => {
            if let Some(argument) = argument {
                return Err(InputError::UnexpectedArgument(argument.to_owned()));
            }
            match other {
                "hint" | "h" => Input::Hint,
                "time" | "t" => Input::Time,
                "ok" => Input::Confirm,
                "reset" => Input::Reset,
                "status" => Input::Status,
                "help" | "?" => Input::Help,
                "quit" | "exit" | "q" => Input::Quit,
                _ => match command.parse::<u32>() {
                    Ok(value) => Input::Click(value),
                    Err(_) => return Err(InputError::UnknownCommand(command.to_owned())),
                },
            }
        }
    };
    Ok(Some(input))
}

fn save_code(command: &'static str, argument: Option<&str>) -> Result<SaveCode, InputError> {
    let raw = argument.ok_or(InputError::MissingCode(command))?;
    SaveCode::parse(raw).map_err(InputError::InvalidCode)
}
