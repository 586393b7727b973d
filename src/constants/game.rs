use ratatui::style::Color;

pub const VIEWPORT_WIDTH: f32 = 400.0;
pub const VIEWPORT_HEIGHT: f32 = 800.0;

pub const GRAVITY: f32 = 1000.0;
pub const JUMP_VELOCITY: f32 = -500.0;

pub const BASE_HEIGHT: f32 = 150.0;
pub const PIPE_WIDTH: f32 = 103.0;
pub const PIPE_HEIGHT: f32 = 640.0;
pub const BIRD_WIDTH: f32 = 64.0;
pub const BIRD_HEIGHT: f32 = 48.0;
pub const GROUND_MARGIN: f32 = 24.0;

pub const SCROLL_DURATION_MS: u64 = 3000;
pub const SCROLL_END_X: f32 = -150.0;
pub const RESPAWN_X: f32 = -100.0;
pub const GAP_RANGE: f32 = 200.0;

pub const SPEED_SCALING_MAX_SCORE: u32 = 20;
pub const SPEED_SCALING_MAX_MULTIPLIER: f32 = 2.0;

pub const TILT_VELOCITY_RANGE: (f32, f32) = (-500.0, 500.0);
pub const TILT_ANGLE_RANGE: (f32, f32) = (-0.5, 0.5);

// Sprites are picked by tilt: rising, level, diving.
pub const BIRD_RISING: &str = "^o>";
pub const BIRD_LEVEL: &str = "=o>";
pub const BIRD_DIVING: &str = "vo>";
pub const BIRD_CRASHED: &str = "xo<";
pub const BIRD_TILT_THRESHOLD: f32 = 0.15;
pub const BIRD_COLOR: Color = Color::Yellow;
pub const BIRD_CRASHED_COLOR: Color = Color::Red;

pub const PIPE_GLYPH: &str = "█";
pub const PIPE_COLOR: Color = Color::LightGreen;
pub const PIPE_CAP_COLOR: Color = Color::Green;

pub const GRASS_GLYPH: &str = "▀";
pub const GRASS_COLOR: Color = Color::Green;
pub const GROUND_GLYPH: &str = "░";
pub const GROUND_COLOR: Color = Color::Rgb(222, 216, 149);

pub const SKY_COLOR: Color = Color::Rgb(78, 192, 202);

pub const GAME_OVER_TEXT: &str = "GAME OVER";
pub const RESTART_HINT: &str = "tap to fly again";
