use color_eyre::eyre::{eyre, Result};
use ratatui::{
    layout::{Constraint, Layout, Margin},
    prelude::Rect,
    style::{Color, Style},
    widgets::{Block, BorderType, Borders},
    Frame,
};
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::{
    action::{act, Action, Command},
    components::help::Help,
    config::Config,
    constants::{HEIGHT, WIDTH},
    pages::{game::GamePage, Page},
    tui,
};

pub struct App {
    config: Config,
    frame_rate: f64,
    should_quit: bool,
    should_suspend: bool,
    show_help: bool,
    pages: Vec<Box<dyn Page>>,
    active_page_index: usize,
}

impl App {
    pub fn new(frame_rate: f64, seed: Option<u64>) -> Result<Self> {
        let config = Config::new()?;
        let game_page = GamePage::new(seed);

        Ok(Self {
            frame_rate,
            should_quit: false,
            should_suspend: false,
            show_help: false,
            config,
            pages: vec![Box::new(game_page)],
            active_page_index: 0,
        })
    }

    fn get_active_page(&mut self) -> Result<&mut Box<dyn Page>> {
        let index = self.active_page_index;
        self.pages.get_mut(index).ok_or_else(|| eyre!("no page at index {index}"))
    }

    fn new_tui(&self) -> Result<tui::Tui> {
        let mut tui = tui::Tui::new()?.mouse(true);
        tui.frame_rate(self.frame_rate);
        tui.enter()?;
        Ok(tui)
    }

    pub async fn run(&mut self) -> Result<()> {
        let (action_tx, mut action_rx) = mpsc::unbounded_channel();

        let mut tui = self.new_tui()?;

        for page in self.pages.iter_mut() {
            page.register_config_handler(self.config.clone())?;
        }

        for page in self.pages.iter_mut() {
            page.init()?;
        }

        loop {
            if let Some(e) = tui.next().await {
                match e {
                    tui::Event::Closed => action_tx.send(act!(Command::Quit))?,
                    tui::Event::Error => action_tx.send(act!(Command::Error("terminal input failed".to_string())))?,
                    tui::Event::Render => action_tx.send(act!(Command::Render))?,
                    tui::Event::Resize(x, y) => action_tx.send(act!(Command::Resize(x, y)))?,
                    tui::Event::Key(key) => {
                        let page_id = self.get_active_page()?.id();
                        if let Some(action) = self.config.keybindings.lookup(&page_id, key) {
                            log::info!("Got action: {action:?}");
                            action_tx.send(action.clone())?;
                        }
                    },
                    _ => {},
                }
                if let Some(action) = self.get_active_page()?.handle_events(Some(e))? {
                    action_tx.send(action)?;
                }
            }

            while let Ok(action) = action_rx.try_recv() {
                let Action { command, .. } = &action;
                if *command != Command::Render {
                    log::debug!("{command:?}");
                }
                match command {
                    Command::Quit => self.should_quit = true,
                    Command::Suspend => self.should_suspend = true,
                    Command::Resume => self.should_suspend = false,
                    Command::ToggleShowHelp => self.show_help = !self.show_help,
                    Command::Error(message) => log::error!("{message}"),
                    Command::Resize(w, h) => {
                        tui.resize(Rect::new(0, 0, *w, *h))?;
                        self.render(&mut tui, &action_tx)?;
                    },
                    Command::Render => {
                        self.render(&mut tui, &action_tx)?;
                    },
                    _ => {},
                }
                if !self.show_help {
                    if let Some(action) = self.get_active_page()?.update(action)? {
                        action_tx.send(action)?
                    }
                }
            }
            if self.should_suspend {
                tui.suspend()?;
                action_tx.send(act!(Command::Resume))?;
                // the old terminal must be released before the new one takes raw mode
                drop(tui);
                tui = self.new_tui()?;
            } else if self.should_quit {
                tui.stop()?;
                break;
            }
        }
        tui.exit()?;
        Ok(())
    }

    fn render(&mut self, tui: &mut tui::Tui, action_tx: &UnboundedSender<Action>) -> Result<()> {
        tui.draw(|f| {
            let area = f.area();

            let [_, area, _] =
                Layout::vertical([Constraint::Fill(1), Constraint::Length(HEIGHT), Constraint::Fill(1)]).areas(area);
            let [_, area, _] =
                Layout::horizontal([Constraint::Fill(1), Constraint::Length(WIDTH), Constraint::Fill(1)]).areas(area);

            let border = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" flappy-rs ")
                .style(Style::default().bg(Color::Black));
            f.render_widget(border, area);

            let area = area.inner(Margin { horizontal: 1, vertical: 1 });

            if let Some(page) = self.pages.get_mut(self.active_page_index) {
                if let Err(e) = page.draw(f, area) {
                    action_tx.send(act!(Command::Error(format!("Failed to draw: {:?}", e)))).unwrap_or_default();
                }
            }

            if self.show_help {
                self.draw_help(f, area);
            };
        })?;

        Ok(())
    }

    fn draw_help(&self, f: &mut Frame<'_>, rect: Rect) {
        let mut groups = vec![("System".to_string(), self.config.keybindings.global.clone())];
        if let Some(page) = self.pages.get(self.active_page_index) {
            let page_id = page.id();
            if let Some(bindings) = self.config.keybindings.pages.get(&page_id) {
                groups.push((page_id.to_string(), bindings.clone()));
            }
        }

        f.render_widget(Help::new(groups), rect);
    }
}
