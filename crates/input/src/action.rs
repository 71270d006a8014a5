use glam::Vec2;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

/// A high-level action bound to one or more keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Sprint,
    Interact,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::MoveUp,
        Action::MoveDown,
        Action::MoveLeft,
        Action::MoveRight,
        Action::Sprint,
        Action::Interact,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::MoveUp => "move_up",
            Action::MoveDown => "move_down",
            Action::MoveLeft => "move_left",
            Action::MoveRight => "move_right",
            Action::Sprint => "sprint",
            Action::Interact => "interact",
        }
    }

    /// Unit step in screen space (y grows downwards), zero for non-movement.
    pub fn direction(self) -> Vec2 {
        match self {
            Action::MoveUp => Vec2::NEG_Y,
            Action::MoveDown => Vec2::Y,
            Action::MoveLeft => Vec2::NEG_X,
            Action::MoveRight => Vec2::X,
            Action::Sprint | Action::Interact => Vec2::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action `{0}`")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// Lowercase single characters; `" "` becomes `Space`. Named keys pass through.
fn normalize_key(key: &str) -> String {
    if key == " " {
        return "Space".to_string();
    }
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_lowercase().collect(),
        _ => key.to_string(),
    }
}

/// Which keys trigger which action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    bindings: HashMap<Action, Vec<String>>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut b = Self {
            bindings: HashMap::new(),
        };
        b.bind(Action::MoveUp, ["w", "ArrowUp"]);
        b.bind(Action::MoveDown, ["s", "ArrowDown"]);
        b.bind(Action::MoveLeft, ["a", "ArrowLeft"]);
        b.bind(Action::MoveRight, ["d", "ArrowRight"]);
        b.bind(Action::Sprint, ["Shift"]);
        b.bind(Action::Interact, ["e"]);
        b
    }
}

impl KeyBindings {
    /// Replace the keys bound to `action`.
    pub fn bind<'a>(&mut self, action: Action, keys: impl IntoIterator<Item = &'a str>) {
        let keys = keys.into_iter().map(normalize_key).collect();
        self.bindings.insert(action, keys);
    }

    pub fn keys(&self, action: Action) -> &[String] {
        self.bindings.get(&action).map(Vec::as_slice).unwrap_or_default()
    }

    /// First action bound to `key`, if any.
    pub fn action_for(&self, key: &str) -> Option<Action> {
        let key = normalize_key(key);
        Action::ALL
            .into_iter()
            .find(|a| self.keys(*a).iter().any(|k| *k == key))
    }
}

/// Currently held keys, queried through bindings.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    bindings: KeyBindings,
    held: HashSet<String>,
}

impl InputState {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            held: HashSet::new(),
        }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn key_down(&mut self, key: &str) {
        let key = normalize_key(key);
        tracing::trace!(%key, "key down");
        self.held.insert(key);
    }

    pub fn key_up(&mut self, key: &str) {
        self.held.remove(&normalize_key(key));
    }

    pub fn release_all(&mut self) {
        self.held.clear();
    }

    pub fn is_key_down(&self, key: &str) -> bool {
        self.held.contains(&normalize_key(key))
    }

    pub fn is_action_pressed(&self, action: Action) -> bool {
        self.bindings
            .keys(action)
            .iter()
            .any(|k| self.held.contains(k))
    }

    /// Sum of held movement directions, normalised to unit length.
    ///
    /// Opposite keys cancel out; no movement gives `Vec2::ZERO`.
    pub fn movement_vector(&self) -> Vec2 {
        Action::ALL
            .into_iter()
            .filter(|a| self.is_action_pressed(*a))
            .map(Action::direction)
            .sum::<Vec2>()
            .normalize_or_zero()
    }
}
