use serde::Serialize;

use super::{config::SimulationConfig, obstacle::PipePair, physics::BirdState};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Axis-aligned rectangle, `y` is the top edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Closed on every edge: a point on the border is inside.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Collision {
    Ground,
    Ceiling,
    Pipe { slot: usize },
}

pub fn bird_center(bird: &BirdState, config: &SimulationConfig) -> Point {
    Point { x: config.bird_x() + config.bird_width / 2.0, y: bird.y + config.bird_height / 2.0 }
}

/// Tests the bird against the ground band, the top of the viewport and every
/// pipe pair. Ground and ceiling use the sprite's top edge, pipes its center.
pub fn check_collision(bird: &BirdState, pipes: &[PipePair], config: &SimulationConfig) -> Option<Collision> {
    if bird.y > config.ground_limit() {
        return Some(Collision::Ground);
    }
    if bird.y < 0.0 {
        return Some(Collision::Ceiling);
    }

    let center = bird_center(bird, config);
    pipes
        .iter()
        .position(|pipe| pipe.rects(config).iter().any(|rect| rect.contains(center)))
        .map(|slot| Collision::Pipe { slot })
}
