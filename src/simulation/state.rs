use serde::Serialize;
use strum::Display;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Display)]
pub enum Phase {
    #[default]
    Playing,
    GameOver,
}

/// Score and phase. Fields are private so the only way to change them is
/// through the transitions below.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameState {
    score: u32,
    phase: Phase,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn is_running(&self) -> bool {
        !self.is_game_over()
    }

    /// `Playing --(pipe passed)--> Playing` with one more point. Returns
    /// whether the point was awarded.
    pub fn record_pass(&mut self) -> bool {
        if self.is_game_over() {
            return false;
        }
        self.score = self.score.saturating_add(1);
        true
    }

    /// `Playing --(collision)--> GameOver`. Returns false when already over.
    pub fn collide(&mut self) -> bool {
        if self.is_game_over() {
            return false;
        }
        self.phase = Phase::GameOver;
        true
    }

    /// `GameOver --(restart)--> Playing` with the score cleared. Returns false
    /// while still playing.
    pub fn restart(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        *self = Self::default();
        true
    }
}
