mod clock;

use color_eyre::eyre::Result;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::{layout::Flex, prelude::*, widgets::*};
use tracing::{debug, info, warn};

use self::clock::FrameClock;
use super::{Frame, Page, PageId};
use crate::{
    action::{act, Action, ActionState, Command, GameAction},
    components::playfield::Playfield,
    config::Config,
    constants::game,
    simulation::{
        driver::{self, SimulationHandle},
        Simulation, SimulationConfig, Snapshot,
    },
};

/// Hosts one simulation: forwards taps to it, advances it by the measured
/// frame time on every render and draws its latest snapshot.
pub struct GamePage {
    config: SimulationConfig,
    seed: Option<u64>,
    simulation: Option<SimulationHandle>,
    /// Drawn until `init` starts the simulation.
    placeholder: Snapshot,
    clock: FrameClock,
    last_score: u32,
}

impl GamePage {
    pub fn new(seed: Option<u64>) -> Self {
        let config = SimulationConfig::default();
        GamePage {
            placeholder: Simulation::new(config.clone(), seed).snapshot(),
            config,
            seed,
            simulation: None,
            clock: FrameClock::new(),
            last_score: 0,
        }
    }

    fn snapshot(&self) -> Snapshot {
        match &self.simulation {
            Some(handle) => handle.latest(),
            None => self.placeholder.clone(),
        }
    }

    fn draw_score(&self, f: &mut Frame<'_>, area: Rect, score: u32) {
        let [area, _] =
            Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area.inner(Margin::new(0, 1)));
        let score = Paragraph::new(score.to_string())
            .alignment(Alignment::Center)
            .style(Style::new().bold().fg(Color::White).bg(game::SKY_COLOR));
        f.render_widget(score, area);
    }

    fn draw_game_over(&self, f: &mut Frame<'_>, area: Rect, score: u32) {
        let lines = vec![
            Line::from(game::GAME_OVER_TEXT).bold().fg(Color::Red),
            Line::from(format!("score {score}")),
            Line::from(game::RESTART_HINT).italic(),
        ];
        let width = lines.iter().map(|line| line.width()).max().unwrap_or(0) as u16 + 4;
        let [area] = Layout::horizontal([Constraint::Length(width)]).flex(Flex::Center).areas(area);
        let [area] =
            Layout::vertical([Constraint::Length(lines.len() as u16 + 2)]).flex(Flex::Center).areas(area);

        let banner = Paragraph::new(lines).alignment(Alignment::Center).block(
            Block::default().borders(Borders::ALL).border_type(BorderType::Rounded).style(Style::new().bg(Color::Black)),
        );
        f.render_widget(Clear, area);
        f.render_widget(banner, area);
    }
}

impl Page for GamePage {
    fn id(&self) -> PageId {
        PageId::Game
    }

    fn register_config_handler(&mut self, config: Config) -> Result<()> {
        self.config = config.game;
        self.placeholder = Simulation::new(self.config.clone(), self.seed).snapshot();
        Ok(())
    }

    fn init(&mut self) -> Result<()> {
        info!(seed = ?self.seed, slots = self.config.pipe_slots, "starting simulation");
        self.simulation = Some(driver::spawn(Simulation::new(self.config.clone(), self.seed)));
        self.clock.reset();
        Ok(())
    }

    fn handle_mouse_events(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => Ok(Some(act!(Command::Game(GameAction::Flap)))),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action.command {
            Command::Render => {
                let dt = self.clock.lap();
                if let Some(simulation) = &self.simulation {
                    simulation.tick(dt)?;
                }
            },
            // frames missed while suspended or behind the help overlay are not simulated
            Command::Resume | Command::ToggleShowHelp => self.clock.reset(),
            Command::Game(command) if action.state == ActionState::Start => {
                let Some(simulation) = &self.simulation else {
                    warn!("{command} before the simulation started, ignored");
                    return Ok(None);
                };
                debug!("{command}");
                match command {
                    GameAction::Flap => simulation.tap()?,
                    GameAction::Restart => simulation.restart()?,
                }
            },
            _ => {},
        }
        Ok(None)
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        let snapshot = self.snapshot();
        if snapshot.score != self.last_score {
            debug!(score = snapshot.score, "score changed");
            self.last_score = snapshot.score;
        }

        f.render_widget(Playfield::new(&snapshot, &self.config), area);
        self.draw_score(f, area, snapshot.score);
        if snapshot.game_over {
            self.draw_game_over(f, area, snapshot.score);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::simulation::config::SimulationConfigBuilder;

    fn started_page(seed: u64) -> GamePage {
        let mut page = GamePage::new(Some(seed));
        page.init().unwrap();
        page
    }

    fn sim(page: &GamePage) -> &SimulationHandle {
        page.simulation.as_ref().unwrap()
    }

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent { kind, column: 3, row: 4, modifiers: KeyModifiers::NONE }
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_left_click_flaps() {
        let mut page = GamePage::new(None);
        assert_eq!(
            page.handle_mouse_events(mouse(MouseEventKind::Down(MouseButton::Left))).unwrap(),
            Some(act!(Command::Game(GameAction::Flap)))
        );
        assert_eq!(page.handle_mouse_events(mouse(MouseEventKind::Down(MouseButton::Right))).unwrap(), None);
        assert_eq!(page.handle_mouse_events(mouse(MouseEventKind::Moved)).unwrap(), None);
    }

    #[test]
    fn test_keys_are_left_to_the_app() {
        use crossterm::event::{KeyCode, KeyEvent};

        use crate::tui::Event;

        let mut page = GamePage::new(None);
        let key = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(page.handle_events(Some(Event::Key(key))).unwrap(), None);
        assert_eq!(
            page.handle_events(Some(Event::Mouse(mouse(MouseEventKind::Down(MouseButton::Left))))).unwrap(),
            Some(act!(Command::Game(GameAction::Flap)))
        );
    }

    #[test]
    fn test_input_before_init_is_ignored() {
        let mut page = GamePage::new(None);
        assert_eq!(page.update(act!(Command::Game(GameAction::Flap))).unwrap(), None);
        assert_eq!(page.update(act!(Command::Render)).unwrap(), None);
    }

    #[test]
    fn test_draws_before_init_show_one_layout() -> Result<()> {
        let config = SimulationConfigBuilder::default().pipe_slots(3).build()?;
        let mut page = GamePage::new(None);
        page.register_config_handler(Config { game: config, ..Config::default() })?;
        let mut terminal = Terminal::new(TestBackend::new(40, 40))?;

        terminal.draw(|f| page.draw(f, f.area()).unwrap())?;
        let first = terminal.backend().buffer().clone();
        for _ in 0..5 {
            terminal.draw(|f| page.draw(f, f.area()).unwrap())?;
            assert_eq!(terminal.backend().buffer(), &first);
        }
        assert_eq!(page.snapshot(), page.placeholder);
        Ok(())
    }

    #[tokio::test]
    async fn test_flap_reaches_simulation() -> Result<()> {
        let mut page = started_page(4);
        page.update(act!(Command::Game(GameAction::Flap)))?;

        let snapshot = sim(&page).sync().await?;
        assert_eq!(snapshot.bird_velocity, SimulationConfig::default().jump_velocity);
        Ok(())
    }

    #[tokio::test]
    async fn test_released_flap_is_ignored() -> Result<()> {
        let mut page = started_page(4);
        page.update(Action { command: Command::Game(GameAction::Flap), state: ActionState::End })?;

        let snapshot = sim(&page).sync().await?;
        assert_eq!(snapshot.bird_velocity, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_first_render_after_resume_does_not_advance() -> Result<()> {
        let mut page = started_page(5);
        page.update(act!(Command::Render))?;
        tokio::time::sleep(Duration::from_millis(20)).await;
        page.update(act!(Command::Resume))?;
        page.update(act!(Command::Render))?;

        let snapshot = sim(&page).sync().await?;
        assert_eq!(snapshot.bird_velocity, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_renders_advance_by_elapsed_time() -> Result<()> {
        let mut page = started_page(6);
        page.update(act!(Command::Render))?;
        tokio::time::sleep(Duration::from_millis(20)).await;
        page.update(act!(Command::Render))?;

        let snapshot = sim(&page).sync().await?;
        // at least 20ms of gravity
        assert!(snapshot.bird_velocity > 19.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_draw_shows_score_and_game_over() -> Result<()> {
        let mut page = started_page(7);
        let mut terminal = Terminal::new(TestBackend::new(40, 40))?;

        terminal.draw(|f| page.draw(f, f.area()).unwrap())?;
        let text = screen_text(&terminal);
        assert!(text.contains(game::BIRD_LEVEL));
        assert!(!text.contains(game::GAME_OVER_TEXT));

        for _ in 0..200 {
            sim(&page).tick(Duration::from_millis(16))?;
        }
        sim(&page).sync().await?;

        terminal.draw(|f| page.draw(f, f.area()).unwrap())?;
        let text = screen_text(&terminal);
        assert!(text.contains(game::GAME_OVER_TEXT));
        assert!(text.contains(game::RESTART_HINT));
        Ok(())
    }
}
