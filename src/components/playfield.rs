use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::{
    constants::game,
    simulation::{
        collision::{Point, Rect as WorldRect},
        SimulationConfig, Snapshot,
    },
};

/// Scales the simulation's world onto a grid of terminal cells. A cell shows
/// whatever lies under its center point.
#[derive(Debug, Clone, Copy)]
pub struct CellGrid {
    area: Rect,
    cell_width: f32,
    cell_height: f32,
}

impl CellGrid {
    pub fn new(area: Rect, config: &SimulationConfig) -> Self {
        Self {
            area,
            cell_width: config.viewport_width / area.width.max(1) as f32,
            cell_height: config.viewport_height / area.height.max(1) as f32,
        }
    }

    /// World coordinates of the center of the cell at (`col`, `row`) relative to the area.
    pub fn cell_center(&self, col: u16, row: u16) -> (f32, f32) {
        ((col as f32 + 0.5) * self.cell_width, (row as f32 + 0.5) * self.cell_height)
    }

    /// Cell containing a world point, `None` when it falls outside the area.
    pub fn cell_at(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if !(x.is_finite() && y.is_finite()) || x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x / self.cell_width).floor() as u16;
        let row = (y / self.cell_height).floor() as u16;
        (col < self.area.width && row < self.area.height).then_some((col, row))
    }
}

pub struct Playfield<'a> {
    snapshot: &'a Snapshot,
    config: &'a SimulationConfig,
}

impl<'a> Playfield<'a> {
    pub fn new(snapshot: &'a Snapshot, config: &'a SimulationConfig) -> Self {
        Self { snapshot, config }
    }

    fn bird_sprite(&self) -> (&'static str, Color) {
        if self.snapshot.game_over {
            (game::BIRD_CRASHED, game::BIRD_CRASHED_COLOR)
        } else if self.snapshot.tilt < -game::BIRD_TILT_THRESHOLD {
            (game::BIRD_RISING, game::BIRD_COLOR)
        } else if self.snapshot.tilt > game::BIRD_TILT_THRESHOLD {
            (game::BIRD_DIVING, game::BIRD_COLOR)
        } else {
            (game::BIRD_LEVEL, game::BIRD_COLOR)
        }
    }

    fn render_scenery(&self, grid: &CellGrid, area: Rect, buf: &mut Buffer) {
        let ground_top = self.config.viewport_height - self.config.base_height;
        let pipes: Vec<[WorldRect; 2]> = self.snapshot.pipes.iter().map(|pipe| pipe.rects(self.config)).collect();

        let mut grass_row = None;
        for row in 0..area.height {
            for col in 0..area.width {
                let (x, y) = grid.cell_center(col, row);
                let cell = &mut buf[(area.x + col, area.y + row)];

                if y >= ground_top {
                    if *grass_row.get_or_insert(row) == row {
                        let style = Style::new().fg(game::GRASS_COLOR).bg(game::GROUND_COLOR);
                        cell.set_symbol(game::GRASS_GLYPH).set_style(style);
                    } else {
                        cell.set_symbol(game::GROUND_GLYPH).set_style(Style::new().fg(game::GROUND_COLOR));
                    }
                    continue;
                }

                cell.set_symbol(" ").set_style(Style::new().bg(game::SKY_COLOR));
                for [top, bottom] in &pipes {
                    let point = Point { x, y };
                    let color = if top.contains(point) {
                        // the lip is the last cell above the gap
                        if y + grid.cell_height > top.y + top.height { game::PIPE_CAP_COLOR } else { game::PIPE_COLOR }
                    } else if bottom.contains(point) {
                        if y - grid.cell_height < bottom.y { game::PIPE_CAP_COLOR } else { game::PIPE_COLOR }
                    } else {
                        continue;
                    };
                    cell.set_symbol(game::PIPE_GLYPH).set_style(Style::new().fg(color).bg(game::SKY_COLOR));
                    break;
                }
            }
        }
    }

    fn render_bird(&self, grid: &CellGrid, area: Rect, buf: &mut Buffer) {
        let center_x = self.snapshot.bird_x + self.config.bird_width / 2.0;
        let center_y = self.snapshot.bird_y + self.config.bird_height / 2.0;
        let Some((col, row)) = grid.cell_at(center_x, center_y) else {
            return;
        };

        let (sprite, color) = self.bird_sprite();
        let start = col.saturating_sub(1);
        for (offset, symbol) in sprite.chars().enumerate() {
            let col = start + offset as u16;
            if col >= area.width {
                break;
            }
            let cell = &mut buf[(area.x + col, area.y + row)];
            cell.set_char(symbol).set_fg(color);
        }
    }
}

impl Widget for Playfield<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let grid = CellGrid::new(area, self.config);
        self.render_scenery(&grid, area, buf);
        self.render_bird(&grid, area, buf);
    }
}
