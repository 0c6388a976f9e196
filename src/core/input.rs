use rustc_hash::FxHashMap;
use std::sync::{LazyLock, Mutex};
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/* ------------------------ Virtual Keymap system ------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VirtualAction {
    Up,
    Down,
    Start,
    Back,
    /// Held to run the credits at high speed.
    FastForward,
}

/// Stable order used when writing `[Keymaps]`.
pub const ALL_VIRTUAL_ACTIONS: [VirtualAction; 5] = [
    VirtualAction::Up,
    VirtualAction::Down,
    VirtualAction::Start,
    VirtualAction::Back,
    VirtualAction::FastForward,
];

impl VirtualAction {
    pub const fn ini_key(self) -> &'static str {
        match self {
            Self::Up => "Up",
            Self::Down => "Down",
            Self::Start => "Start",
            Self::Back => "Back",
            Self::FastForward => "FastForward",
        }
    }

    pub fn from_ini_key(key: &str) -> Option<Self> {
        ALL_VIRTUAL_ACTIONS
            .into_iter()
            .find(|a| a.ini_key().eq_ignore_ascii_case(key.trim()))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Keymap {
    map: FxHashMap<VirtualAction, Vec<KeyCode>>,
}

static KEYMAP: LazyLock<Mutex<Keymap>> = LazyLock::new(|| Mutex::new(default_keymap()));

#[inline(always)]
pub fn get_keymap() -> Keymap {
    KEYMAP.lock().unwrap().clone()
}

#[inline(always)]
pub fn set_keymap(new_map: Keymap) {
    *KEYMAP.lock().unwrap() = new_map;
}

pub fn default_keymap() -> Keymap {
    let mut km = Keymap::default();
    use VirtualAction as A;
    km.bind(A::Up, &[KeyCode::ArrowUp, KeyCode::KeyW]);
    km.bind(A::Down, &[KeyCode::ArrowDown, KeyCode::KeyS]);
    km.bind(A::Start, &[KeyCode::Enter]);
    km.bind(A::Back, &[KeyCode::Escape]);
    km.bind(A::FastForward, &[KeyCode::Space]);
    km
}

impl Keymap {
    #[inline(always)]
    pub fn bind(&mut self, action: VirtualAction, keys: &[KeyCode]) {
        self.map.insert(action, keys.to_vec());
    }

    #[inline(always)]
    pub fn bindings(&self, action: VirtualAction) -> &[KeyCode] {
        self.map.get(&action).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every action bound to `code`, in stable action order.
    pub fn actions_for_key(&self, code: KeyCode) -> Vec<VirtualAction> {
        ALL_VIRTUAL_ACTIONS
            .into_iter()
            .filter(|a| self.bindings(*a).contains(&code))
            .collect()
    }

    /// Builds a keymap from `(action, comma separated tokens)` pairs.
    /// Actions that never appear keep their default bindings.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut km = default_keymap();
        for (k, v) in entries {
            let Some(action) = VirtualAction::from_ini_key(k) else {
                log::warn!("Unknown keymap action '{k}' ignored.");
                continue;
            };
            let mut keys = Vec::new();
            for tok in v.split(',').filter(|t| !t.trim().is_empty()) {
                match parse_binding_token(tok) {
                    Some(code) => keys.push(code),
                    None => log::warn!("Unrecognized key '{}' for {k}.", tok.trim()),
                }
            }
            km.bind(action, &keys);
        }
        km
    }

    /// One `Action=KeyCode::A,KeyCode::B` line per action.
    pub fn to_ini_lines(&self) -> Vec<(&'static str, String)> {
        ALL_VIRTUAL_ACTIONS
            .into_iter()
            .map(|a| {
                let value = self
                    .bindings(a)
                    .iter()
                    .filter_map(|c| binding_to_token(*c))
                    .collect::<Vec<_>>()
                    .join(",");
                (a.ini_key(), value)
            })
            .collect()
    }
}

/* ------------------------- Binding tokens ------------------------- */

const NAMED_KEYS: &[(&str, KeyCode)] = &[
    ("Enter", KeyCode::Enter),
    ("Escape", KeyCode::Escape),
    ("Space", KeyCode::Space),
    ("Backspace", KeyCode::Backspace),
    ("Tab", KeyCode::Tab),
    ("ArrowUp", KeyCode::ArrowUp),
    ("ArrowDown", KeyCode::ArrowDown),
    ("ArrowLeft", KeyCode::ArrowLeft),
    ("ArrowRight", KeyCode::ArrowRight),
    ("ShiftLeft", KeyCode::ShiftLeft),
    ("ShiftRight", KeyCode::ShiftRight),
    ("NumpadEnter", KeyCode::NumpadEnter),
    ("Numpad2", KeyCode::Numpad2),
    ("Numpad8", KeyCode::Numpad8),
    ("KeyA", KeyCode::KeyA),
    ("KeyD", KeyCode::KeyD),
    ("KeyE", KeyCode::KeyE),
    ("KeyF", KeyCode::KeyF),
    ("KeyJ", KeyCode::KeyJ),
    ("KeyK", KeyCode::KeyK),
    ("KeyQ", KeyCode::KeyQ),
    ("KeyS", KeyCode::KeyS),
    ("KeyW", KeyCode::KeyW),
    ("KeyX", KeyCode::KeyX),
    ("KeyZ", KeyCode::KeyZ),
];

pub fn parse_binding_token(tok: &str) -> Option<KeyCode> {
    let rest = tok.trim().strip_prefix("KeyCode::")?;
    NAMED_KEYS
        .iter()
        .find(|(name, _)| *name == rest)
        .map(|(_, code)| *code)
}

pub fn binding_to_token(code: KeyCode) -> Option<String> {
    NAMED_KEYS
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(name, _)| format!("KeyCode::{name}"))
}

/* ------------------------- Normalized input events ------------------------- */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputEvent {
    pub action: VirtualAction,
    pub pressed: bool,
}

impl InputEvent {
    #[inline(always)]
    pub fn new(action: VirtualAction, pressed: bool) -> Self {
        Self { action, pressed }
    }
}

#[inline(always)]
pub fn map_key_event(ev: &KeyEvent) -> Vec<InputEvent> {
    // OS auto-repeat would re-trigger menu moves and credit skips.
    if ev.state == ElementState::Pressed && ev.repeat {
        return Vec::new();
    }
    let PhysicalKey::Code(code) = ev.physical_key else {
        return Vec::new();
    };
    map_key_code(&get_keymap(), code, ev.state == ElementState::Pressed)
}

pub fn map_key_code(km: &Keymap, code: KeyCode, pressed: bool) -> Vec<InputEvent> {
    km.actions_for_key(code)
        .into_iter()
        .map(|action| InputEvent::new(action, pressed))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_action() {
        let km = default_keymap();
        for a in ALL_VIRTUAL_ACTIONS {
            assert!(!km.bindings(a).is_empty(), "{a:?} unbound");
        }
        assert_eq!(km.actions_for_key(KeyCode::KeyW), vec![VirtualAction::Up]);
        assert_eq!(km.actions_for_key(KeyCode::Space), vec![VirtualAction::FastForward]);
        assert!(km.actions_for_key(KeyCode::KeyZ).is_empty());
    }

    #[test]
    fn tokens_parse_and_print() {
        assert_eq!(parse_binding_token(" KeyCode::Escape "), Some(KeyCode::Escape));
        assert_eq!(parse_binding_token("Escape"), None);
        assert_eq!(parse_binding_token("KeyCode::Nope"), None);
        assert_eq!(binding_to_token(KeyCode::Space).as_deref(), Some("KeyCode::Space"));
    }

    #[test]
    fn entries_override_only_named_actions() {
        let km = Keymap::from_entries([
            ("back", "KeyCode::Backspace, KeyCode::Escape"),
            ("Start", "KeyCode::Bogus,KeyCode::Space"),
            ("Jump", "KeyCode::KeyJ"),
        ]);
        assert_eq!(
            km.bindings(VirtualAction::Back),
            &[KeyCode::Backspace, KeyCode::Escape]
        );
        assert_eq!(km.bindings(VirtualAction::Start), &[KeyCode::Space]);
        assert_eq!(km.bindings(VirtualAction::Up), &[KeyCode::ArrowUp, KeyCode::KeyW]);
        // Space is now shared by Start and FastForward.
        assert_eq!(
            km.actions_for_key(KeyCode::Space),
            vec![VirtualAction::Start, VirtualAction::FastForward]
        );
    }

    #[test]
    fn ini_lines_read_back_to_the_same_map() {
        let km = default_keymap();
        let lines = km.to_ini_lines();
        assert_eq!(lines[0], ("Up", "KeyCode::ArrowUp,KeyCode::KeyW".to_string()));
        let back = Keymap::from_entries(lines.iter().map(|(k, v)| (*k, v.as_str())));
        assert_eq!(back, km);
    }

    #[test]
    fn key_codes_become_events() {
        let km = default_keymap();
        let evs = map_key_code(&km, KeyCode::Escape, false);
        assert_eq!(evs.len(), 1);
        assert_eq!(evs[0].action, VirtualAction::Back);
        assert!(!evs[0].pressed);
    }

    #[test]
    fn shared_key_emits_one_event_per_action() {
        let mut km = default_keymap();
        km.bind(VirtualAction::Start, &[KeyCode::Enter, KeyCode::Space]);
        let mut evs = map_key_code(&km, KeyCode::Space, true);
        evs.sort_by_key(|e| e.action as u8);
        let mut want = vec![
            InputEvent::new(VirtualAction::Start, true),
            InputEvent::new(VirtualAction::FastForward, true),
        ];
        want.sort_by_key(|e| e.action as u8);
        assert_eq!(evs, want);
    }
}
