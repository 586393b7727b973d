mod game;

use serde::{Deserialize, Serialize};
use strum::Display;

pub use crate::action::game::GameAction;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Display, Deserialize, Default)]
pub enum ActionState {
    #[default]
    Start,
    Repeat,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq, Display, Deserialize)]
pub enum Command {
    Render,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,
    Error(String),
    ToggleShowHelp,
    // Page commands
    Game(GameAction),
}

impl Command {
    /// Name shown in the help overlay. Page commands drop their page prefix.
    pub fn string(&self) -> String {
        match self {
            Command::Game(action) => action.to_string(),
            command => command.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub command: Command,
    pub state: ActionState,
}

macro_rules! act {
    ($command:expr) => {
        $crate::action::Action { command: $command, state: $crate::action::ActionState::default() }
    };
}

pub(crate) use act;
