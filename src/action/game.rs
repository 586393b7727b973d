use serde::{Deserialize, Serialize};
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, Deserialize)]
pub enum GameAction {
    /// The tap: flap while playing, restart after game over.
    Flap,
    /// Restart command, only honoured after game over.
    Restart,
}
