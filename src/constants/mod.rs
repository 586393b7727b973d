pub mod game;

// Outer frame in terminal cells, border included.
pub const WIDTH: u16 = 52;
pub const HEIGHT: u16 = 42;
