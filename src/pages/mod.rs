use color_eyre::eyre::Result;
use crossterm::event::MouseEvent;
use ratatui::{layout::Rect, Frame};
use serde::Deserialize;
use strum::Display;

use crate::{action::Action, config::Config, tui::Event};

pub mod game;

#[derive(Debug, Deserialize, Hash, Eq, PartialEq, Clone, Display)]
pub enum PageId {
    #[serde(alias = "game")]
    Game,
}

/// A full-screen view. Key bindings are resolved by the app, so pages only
/// see raw mouse input and the actions those bindings produce.
pub trait Page {
    fn id(&self) -> PageId;

    #[allow(unused_variables)]
    fn register_config_handler(&mut self, config: Config) -> Result<()> {
        Ok(())
    }
    fn init(&mut self) -> Result<()> {
        Ok(())
    }
    fn handle_events(&mut self, event: Option<Event>) -> Result<Option<Action>> {
        let r = match event {
            Some(Event::Mouse(mouse_event)) => self.handle_mouse_events(mouse_event)?,
            _ => None,
        };
        Ok(r)
    }

    #[allow(unused_variables)]
    fn handle_mouse_events(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    #[allow(unused_variables)]
    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        Ok(None)
    }

    fn draw(&mut self, f: &mut Frame<'_>, rect: Rect) -> Result<()>;
}
