use std::{collections::HashMap, fmt::Debug};

use color_eyre::eyre::{eyre, Report, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use derive_deref::{Deref, DerefMut};
use serde::{
    de::{self, Deserializer},
    Deserialize,
};

use crate::{
    action::{Action, ActionState, Command, GameAction},
    pages::PageId,
    simulation::SimulationConfig,
};

const CONFIG: &str = include_str!("../.config/config.yaml");

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub keybindings: KeyBindings,
    #[serde(default)]
    pub game: SimulationConfig,
}

impl Config {
    pub fn new() -> Result<Self> {
        let default_config: Config = serde_yaml::from_str(CONFIG)?;
        let config_dir = crate::utils::get_config_dir();
        let mut builder = config::Config::builder();

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.yaml", config::FileFormat::Yaml),
            ("config.toml", config::FileFormat::Toml),
        ];
        let mut found_config = false;
        for (file, format) in &config_files {
            builder = builder.add_source(config::File::from(config_dir.join(file)).format(*format).required(false));
            if config_dir.join(file).exists() {
                found_config = true
            }
        }
        if !found_config {
            log::info!("No configuration file found in {}, using defaults", config_dir.display());
        }

        let mut cfg: Self = builder.build()?.try_deserialize()?;
        cfg.keybindings.merge_defaults(default_config.keybindings);
        cfg.game = cfg.game.sanitized();

        Ok(cfg)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawPageKeyBindings {
    pub click: Option<HashMap<String, String>>,
    pub hold: Option<HashMap<String, String>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawKeyBindings {
    #[serde(default)]
    pub global: RawPageKeyBindings,
    #[serde(default)]
    pub pages: HashMap<String, RawPageKeyBindings>,
}

#[derive(Clone, Debug, Default, Deref, DerefMut)]
pub struct PageKeyBindings(pub HashMap<KeyEvent, Action>);

#[derive(Clone, Debug, Default)]
pub struct KeyBindings {
    pub global: PageKeyBindings,
    pub pages: HashMap<PageId, PageKeyBindings>,
}

impl KeyBindings {
    /// Fills in every default binding the user did not bind themselves.
    pub fn merge_defaults(&mut self, defaults: KeyBindings) {
        for (page, default_bindings) in defaults.pages {
            let user_bindings = self.pages.entry(page).or_default();
            for (key, action) in default_bindings.0 {
                user_bindings.entry(key).or_insert(action);
            }
        }
        for (key, action) in defaults.global.0 {
            self.global.entry(key).or_insert(action);
        }
    }

    /// Page bindings take precedence over global ones.
    pub fn lookup(&self, page: &PageId, key: KeyEvent) -> Option<&Action> {
        let key = normalize_key_event(key);
        self.pages.get(page).and_then(|bindings| bindings.get(&key)).or_else(|| self.global.get(&key))
    }
}

impl<'de> Deserialize<'de> for KeyBindings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawKeyBindings::deserialize(deserializer)?;

        let global = parse_page_keybindings::<Command>(&raw.global)
            .map_err(de::Error::custom)?
            .into_iter()
            .map(|(event, (command, state))| (event, Action { command, state }))
            .collect();

        let mut pages = HashMap::new();
        for (page, bindings) in raw.pages {
            let page_id: PageId = serde_yaml::from_str(&page).map_err(de::Error::custom)?;
            let map = match page_id {
                PageId::Game => parse_page_keybindings::<GameAction>(&bindings)
                    .map_err(de::Error::custom)?
                    .into_iter()
                    .map(|(event, (action, state))| (event, Action { command: Command::Game(action), state }))
                    .collect(),
            };
            pages.insert(page_id, PageKeyBindings(map));
        }

        Ok(KeyBindings { global: PageKeyBindings(global), pages })
    }
}

fn parse_binding_pairs<T>(map: &Option<HashMap<String, String>>) -> Result<HashMap<KeyEvent, T>>
where
    T: for<'de> Deserialize<'de>,
{
    let Some(map) = map else {
        return Ok(HashMap::new());
    };
    map.iter()
        .map(|(key_str, action_str)| {
            let action: T =
                serde_yaml::from_str(action_str).map_err(|e| eyre!("Unknown command `{action_str}`: {e}"))?;
            let key = parse_key_event(key_str).map_err(|e| eyre!(e))?;
            Ok::<_, Report>((key, action))
        })
        .collect()
}

fn parse_page_keybindings<T>(raw: &RawPageKeyBindings) -> Result<HashMap<KeyEvent, (T, ActionState)>>
where
    T: for<'de> Deserialize<'de> + Clone + Debug,
{
    let click = parse_binding_pairs::<T>(&raw.click)?;
    let hold = parse_binding_pairs::<T>(&raw.hold)?;
    Ok(merge_keybinding_maps(click, hold))
}

/// Click bindings fire once on press. Hold bindings expand into one entry per
/// key event kind so press, repeat and release map to Start, Repeat and End.
fn merge_keybinding_maps<A: Clone>(
    click: HashMap<KeyEvent, A>,
    hold: HashMap<KeyEvent, A>,
) -> HashMap<KeyEvent, (A, ActionState)> {
    let mut merged: HashMap<KeyEvent, (A, ActionState)> =
        click.into_iter().map(|(event, command)| (event, (command, ActionState::default()))).collect();
    for (mut key_event, action) in hold {
        merged.insert(key_event, (action.clone(), ActionState::Start));
        key_event.kind = KeyEventKind::Repeat;
        merged.insert(key_event, (action.clone(), ActionState::Repeat));
        key_event.kind = KeyEventKind::Release;
        merged.insert(key_event, (action, ActionState::End));
    }

    merged
}

/// Strips what a terminal adds on top of a configured binding: the key event
/// state, and the shift modifier on symbols such as `?` that need shift to type.
pub fn normalize_key_event(key: KeyEvent) -> KeyEvent {
    let mut modifiers = key.modifiers;
    if let KeyCode::Char(c) = key.code {
        if !c.is_ascii_alphabetic() {
            modifiers.remove(KeyModifiers::SHIFT);
        }
    }
    KeyEvent { code: key.code, modifiers, kind: key.kind, state: KeyEventState::NONE }
}

fn parse_key_event(raw: &str) -> Result<KeyEvent, String> {
    if raw.chars().filter(|c| *c == '>').count() != raw.chars().filter(|c| *c == '<').count() {
        return Err(format!("Unable to parse `{}`", raw));
    }
    let raw = if !raw.contains("><") {
        let raw = raw.strip_prefix('<').unwrap_or(raw);
        let raw = raw.strip_suffix('>').unwrap_or(raw);
        raw
    } else {
        raw
    };

    let raw_lower = raw.to_ascii_lowercase();
    let (remaining, modifiers) = extract_modifiers(&raw_lower);
    parse_key_code_with_modifiers(remaining, modifiers)
}

fn extract_modifiers(raw: &str) -> (&str, KeyModifiers) {
    let mut modifiers = KeyModifiers::empty();
    let mut current = raw;

    loop {
        match current {
            rest if rest.starts_with("ctrl-") => {
                modifiers.insert(KeyModifiers::CONTROL);
                current = &rest[5..];
            },
            rest if rest.starts_with("alt-") => {
                modifiers.insert(KeyModifiers::ALT);
                current = &rest[4..];
            },
            rest if rest.starts_with("shift-") => {
                modifiers.insert(KeyModifiers::SHIFT);
                current = &rest[6..];
            },
            _ => break,
        };
    }

    (current, modifiers)
}

fn parse_key_code_with_modifiers(raw: &str, mut modifiers: KeyModifiers) -> Result<KeyEvent, String> {
    let c = match raw {
        "esc" => KeyCode::Esc,
        "enter" => KeyCode::Enter,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "backtab" => {
            modifiers.insert(KeyModifiers::SHIFT);
            KeyCode::BackTab
        },
        "backspace" => KeyCode::Backspace,
        "delete" => KeyCode::Delete,
        "insert" => KeyCode::Insert,
        "space" => KeyCode::Char(' '),
        "hyphen" | "minus" => KeyCode::Char('-'),
        "tab" => KeyCode::Tab,
        f if f.len() > 1 && f.starts_with('f') => match f[1..].parse::<u8>() {
            Ok(n @ 1..=12) => KeyCode::F(n),
            _ => return Err(format!("Unable to parse {raw}")),
        },
        c if c.chars().count() == 1 => {
            let mut c = c.chars().next().unwrap_or_default();
            if modifiers.contains(KeyModifiers::SHIFT) {
                c = c.to_ascii_uppercase();
            }
            KeyCode::Char(c)
        },
        _ => return Err(format!("Unable to parse {raw}")),
    };
    Ok(KeyEvent::new(c, modifiers))
}

pub fn key_event_to_string(key_event: &KeyEvent) -> String {
    let char;
    let key_code = match key_event.code {
        KeyCode::Backspace => "Backspace",
        KeyCode::Enter => "Enter",
        KeyCode::Left => "Left",
        KeyCode::Right => "Right",
        KeyCode::Up => "Up",
        KeyCode::Down => "Down",
        KeyCode::Home => "Home",
        KeyCode::End => "End",
        KeyCode::PageUp => "PageUp",
        KeyCode::PageDown => "PageDown",
        KeyCode::Tab => "Tab",
        KeyCode::BackTab => "BackTab",
        KeyCode::Delete => "Delete",
        KeyCode::Insert => "Insert",
        KeyCode::F(c) => {
            char = format!("F{c}");
            &char
        },
        KeyCode::Char(' ') => "Space",
        KeyCode::Char(c) => {
            char = c.to_string();
            &char
        },
        KeyCode::Esc => "Esc",
        _ => "",
    };

    let mut modifiers = Vec::with_capacity(3);

    if key_event.modifiers.intersects(KeyModifiers::CONTROL) {
        modifiers.push("Ctrl");
    }

    if key_event.modifiers.intersects(KeyModifiers::SHIFT) {
        modifiers.push("Shift");
    }

    if key_event.modifiers.intersects(KeyModifiers::ALT) {
        modifiers.push("Alt");
    }

    let mut key = modifiers.join("-");

    if !key.is_empty() {
        key.push('-');
    }
    key.push_str(key_code);

    key
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::action::act;

    fn defaults() -> Config {
        serde_yaml::from_str(CONFIG).unwrap()
    }

    #[test]
    fn test_default_config_binds_flap() {
        let c = defaults();
        let game = c.keybindings.pages.get(&PageId::Game).unwrap();
        for key in ["<space>", "<up>", "<enter>"] {
            assert_eq!(game.get(&parse_key_event(key).unwrap()), Some(&act!(Command::Game(GameAction::Flap))));
        }
        assert_eq!(
            game.get(&parse_key_event("<r>").unwrap()),
            Some(&act!(Command::Game(GameAction::Restart)))
        );
        assert_eq!(c.keybindings.global.get(&parse_key_event("<q>").unwrap()), Some(&act!(Command::Quit)));
    }

    #[test]
    fn test_default_config_game_section_matches_defaults() {
        assert_eq!(defaults().game, SimulationConfig::default());
    }

    #[test]
    fn test_lowercase_page_name() {
        let bindings: KeyBindings = serde_yaml::from_str("pages:\n  game:\n    click:\n      \"<x>\": Flap\n").unwrap();
        assert!(bindings.pages.contains_key(&PageId::Game));
    }

    #[test]
    fn test_unknown_command_is_an_error() {
        let result: Result<KeyBindings, _> = serde_yaml::from_str("global:\n  click:\n    \"<x>\": Explode\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_user_bindings_win_over_defaults() {
        let mut user: KeyBindings = serde_yaml::from_str("pages:\n  Game:\n    click:\n      \"<space>\": Restart\n").unwrap();
        user.merge_defaults(defaults().keybindings);

        let game = user.pages.get(&PageId::Game).unwrap();
        assert_eq!(
            game.get(&parse_key_event("<space>").unwrap()),
            Some(&act!(Command::Game(GameAction::Restart)))
        );
        assert_eq!(game.get(&parse_key_event("<up>").unwrap()), Some(&act!(Command::Game(GameAction::Flap))));
    }

    #[test]
    fn test_hold_bindings_expand_to_states() {
        let bindings: KeyBindings = serde_yaml::from_str("pages:\n  Game:\n    hold:\n      \"<f>\": Flap\n").unwrap();
        let game = bindings.pages.get(&PageId::Game).unwrap();

        let mut key = parse_key_event("<f>").unwrap();
        assert_eq!(game.get(&key).map(|a| &a.state), Some(&ActionState::Start));
        key.kind = KeyEventKind::Repeat;
        assert_eq!(game.get(&key).map(|a| &a.state), Some(&ActionState::Repeat));
        key.kind = KeyEventKind::Release;
        assert_eq!(game.get(&key).map(|a| &a.state), Some(&ActionState::End));
    }

    #[test]
    fn test_lookup_ignores_shift_on_symbols() {
        let c = defaults();
        let typed = KeyEvent::new(KeyCode::Char('?'), KeyModifiers::SHIFT);
        assert_eq!(c.keybindings.lookup(&PageId::Game, typed), Some(&act!(Command::ToggleShowHelp)));
    }

    #[test]
    fn test_lookup_ignores_key_repeat_for_click_bindings() {
        let c = defaults();
        let mut key = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        key.kind = KeyEventKind::Repeat;
        assert_eq!(c.keybindings.lookup(&PageId::Game, key), None);
    }

    #[test]
    fn test_simple_keys() {
        assert_eq!(parse_key_event("a").unwrap(), KeyEvent::new(KeyCode::Char('a'), KeyModifiers::empty()));
        assert_eq!(parse_key_event("enter").unwrap(), KeyEvent::new(KeyCode::Enter, KeyModifiers::empty()));
        assert_eq!(parse_key_event("<esc>").unwrap(), KeyEvent::new(KeyCode::Esc, KeyModifiers::empty()));
        assert_eq!(parse_key_event("<f5>").unwrap(), KeyEvent::new(KeyCode::F(5), KeyModifiers::empty()));
        assert_eq!(parse_key_event("<?>").unwrap(), KeyEvent::new(KeyCode::Char('?'), KeyModifiers::empty()));
    }

    #[test]
    fn test_with_modifiers() {
        assert_eq!(parse_key_event("ctrl-a").unwrap(), KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL));
        assert_eq!(parse_key_event("alt-enter").unwrap(), KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT));
        assert_eq!(parse_key_event("shift-esc").unwrap(), KeyEvent::new(KeyCode::Esc, KeyModifiers::SHIFT));
    }

    #[test]
    fn test_multiple_modifiers() {
        assert_eq!(
            parse_key_event("ctrl-alt-a").unwrap(),
            KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL | KeyModifiers::ALT)
        );
        assert_eq!(
            parse_key_event("ctrl-shift-enter").unwrap(),
            KeyEvent::new(KeyCode::Enter, KeyModifiers::CONTROL | KeyModifiers::SHIFT)
        );
    }

    #[test]
    fn test_key_event_to_string() {
        assert_eq!(
            key_event_to_string(&KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL | KeyModifiers::ALT)),
            "Ctrl-Alt-a".to_string()
        );
        assert_eq!(key_event_to_string(&KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE)), "Space");
    }

    #[test]
    fn test_invalid_keys() {
        assert!(parse_key_event("invalid-key").is_err());
        assert!(parse_key_event("ctrl-invalid-key").is_err());
        assert!(parse_key_event("<f13>").is_err());
        assert!(parse_key_event("<<a>").is_err());
    }

    #[test]
    fn test_case_insensitivity() {
        assert_eq!(parse_key_event("CTRL-a").unwrap(), KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL));
        assert_eq!(parse_key_event("AlT-eNtEr").unwrap(), KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT));
    }
}
