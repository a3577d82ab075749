use crate::config::{Config, Keybinding};
use crate::model::document::EditorMode;
use crate::model::selection::CursorDirection;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Format a keybinding as a user-friendly string
pub fn format_keybinding(keycode: &KeyCode, modifiers: &KeyModifiers) -> String {
    let mut result = String::new();

    if modifiers.contains(KeyModifiers::CONTROL) {
        result.push_str("Ctrl+");
    }
    if modifiers.contains(KeyModifiers::ALT) {
        result.push_str("Alt+");
    }
    if modifiers.contains(KeyModifiers::SHIFT) {
        result.push_str("Shift+");
    }

    match keycode {
        KeyCode::Enter => result.push_str("Enter"),
        KeyCode::Backspace => result.push_str("Backspace"),
        KeyCode::Delete => result.push_str("Del"),
        KeyCode::Tab => result.push_str("Tab"),
        KeyCode::Esc => result.push_str("Esc"),
        KeyCode::Left => result.push_str("←"),
        KeyCode::Right => result.push_str("→"),
        KeyCode::Up => result.push_str("↑"),
        KeyCode::Down => result.push_str("↓"),
        KeyCode::Home => result.push_str("Home"),
        KeyCode::End => result.push_str("End"),
        KeyCode::Char(' ') => result.push_str("Space"),
        KeyCode::Char(c) => result.push_str(&c.to_uppercase().to_string()),
        KeyCode::F(n) => result.push_str(&format!("F{}", n)),
        _ => return String::new(),
    }

    result
}

/// Context in which a keybinding is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyContext {
    /// Bindings that work in both modes (checked first)
    Global,
    /// Plain-text editing
    Plain,
    /// Rich (HTML) editing
    Rich,
}

impl KeyContext {
    /// Parse context from a "when" string
    pub fn from_when_clause(when: &str) -> Option<Self> {
        match when.trim() {
            "global" => Some(KeyContext::Global),
            "plain" => Some(KeyContext::Plain),
            "rich" => Some(KeyContext::Rich),
            _ => None,
        }
    }

    pub fn for_mode(mode: EditorMode) -> Self {
        match mode {
            EditorMode::Plain => KeyContext::Plain,
            EditorMode::Rich => KeyContext::Rich,
        }
    }
}

/// High-level actions that can be performed in the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // Text input
    InsertChar(char),
    InsertNewline,
    InsertTab,
    DeleteBackward,
    DeleteForward,

    // Cursor and selection
    Move(CursorDirection),
    Select(CursorDirection),
    SelectAll,

    // Clipboard
    Copy,
    Cut,
    Paste,
    PastePlainText,

    // History
    Undo,
    Redo,

    // File lifecycle
    New,
    Open,
    Save,
    SaveAs,

    // Mode and output
    ToggleMode,
    SetMode(EditorMode),
    Preview,

    /// Rich-text formatting command with an optional value
    Format {
        command: String,
        value: Option<String>,
    },
    /// Ask for a URL, then run `createLink`
    InsertLink,

    Quit,

    // No-op
    None,
}

impl Action {
    /// Parse action from string (used when loading from config)
    pub fn from_str(s: &str, args: &HashMap<String, serde_json::Value>) -> Option<Action> {
        let string_arg = |name: &str| match args.get(name) {
            Some(serde_json::Value::String(v)) => Some(v.clone()),
            _ => None,
        };

        match s {
            "insert_char" => string_arg("char")
                .and_then(|c| c.chars().next())
                .map(Action::InsertChar),
            "insert_newline" => Some(Action::InsertNewline),
            "insert_tab" => Some(Action::InsertTab),
            "delete_backward" => Some(Action::DeleteBackward),
            "delete_forward" => Some(Action::DeleteForward),

            "move_left" => Some(Action::Move(CursorDirection::Left)),
            "move_right" => Some(Action::Move(CursorDirection::Right)),
            "move_up" => Some(Action::Move(CursorDirection::Up)),
            "move_down" => Some(Action::Move(CursorDirection::Down)),
            "move_document_start" => Some(Action::Move(CursorDirection::Start)),
            "move_document_end" => Some(Action::Move(CursorDirection::End)),

            "select_left" => Some(Action::Select(CursorDirection::Left)),
            "select_right" => Some(Action::Select(CursorDirection::Right)),
            "select_up" => Some(Action::Select(CursorDirection::Up)),
            "select_down" => Some(Action::Select(CursorDirection::Down)),
            "select_document_start" => Some(Action::Select(CursorDirection::Start)),
            "select_document_end" => Some(Action::Select(CursorDirection::End)),
            "select_all" => Some(Action::SelectAll),

            "copy" => Some(Action::Copy),
            "cut" => Some(Action::Cut),
            "paste" => Some(Action::Paste),
            "paste_plain_text" => Some(Action::PastePlainText),

            "undo" => Some(Action::Undo),
            "redo" => Some(Action::Redo),

            "new" => Some(Action::New),
            "open" => Some(Action::Open),
            "save" => Some(Action::Save),
            "save_as" => Some(Action::SaveAs),

            "toggle_mode" => Some(Action::ToggleMode),
            "set_mode" => string_arg("mode")
                .and_then(|m| EditorMode::parse(&m))
                .map(Action::SetMode),
            "preview" => Some(Action::Preview),

            "format" => string_arg("command").map(|command| Action::Format {
                command,
                value: string_arg("value"),
            }),
            "insert_link" => Some(Action::InsertLink),

            "quit" => Some(Action::Quit),
            "none" => Some(Action::None),

            _ => None,
        }
    }

    /// Short label for the status line
    pub fn describe(&self) -> String {
        match self {
            Action::InsertChar(c) => format!("insert {:?}", c),
            Action::Move(dir) => format!("move {:?}", dir).to_lowercase(),
            Action::Select(dir) => format!("select {:?}", dir).to_lowercase(),
            Action::SetMode(mode) => format!("{} mode", mode),
            Action::Format { command, value } => match value {
                Some(v) => format!("{} {}", command, v),
                None => command.clone(),
            },
            other => format!("{:?}", other).to_lowercase(),
        }
    }
}

/// Resolves key events to actions based on configuration
#[derive(Clone)]
pub struct KeybindingResolver {
    /// Custom bindings from the config file, by context
    bindings: HashMap<KeyContext, HashMap<(KeyCode, KeyModifiers), Action>>,

    /// Built-in bindings, by context
    default_bindings: HashMap<KeyContext, HashMap<(KeyCode, KeyModifiers), Action>>,
}

impl KeybindingResolver {
    /// Create a new resolver from configuration
    pub fn new(config: &Config) -> Self {
        let mut resolver = Self {
            bindings: HashMap::new(),
            default_bindings: HashMap::new(),
        };

        let defaults = default_keybindings();
        Self::load_into(&mut resolver.default_bindings, &defaults);

        // Custom keybindings override the defaults
        Self::load_into(&mut resolver.bindings, &config.keybindings);

        resolver
    }

    fn load_into(
        target: &mut HashMap<KeyContext, HashMap<(KeyCode, KeyModifiers), Action>>,
        bindings: &[Keybinding],
    ) {
        for binding in bindings {
            let context = match binding.when.as_deref() {
                Some(when) => match KeyContext::from_when_clause(when) {
                    Some(context) => context,
                    None => {
                        tracing::warn!("Unknown keybinding context {:?}, skipping", when);
                        continue;
                    }
                },
                None => KeyContext::Global,
            };

            let Some(action) = Action::from_str(&binding.action, &binding.args) else {
                tracing::warn!("Unknown keybinding action {:?}, skipping", binding.action);
                continue;
            };

            let Some(key_code) = Self::parse_key(&binding.key) else {
                tracing::warn!("Unknown key {:?}, skipping", binding.key);
                continue;
            };
            let modifiers = Self::parse_modifiers(&binding.modifiers);

            target
                .entry(context)
                .or_default()
                .insert(normalize(key_code, modifiers), action);
        }
    }

    /// Resolve a key event to an action for the given editing mode
    pub fn resolve(&self, event: &KeyEvent, mode: EditorMode) -> Action {
        let key = normalize(event.code, event.modifiers);
        let context = KeyContext::for_mode(mode);
        tracing::trace!(
            "KeybindingResolver.resolve: key={:?}, context={:?}",
            key,
            context
        );

        // Custom bindings beat defaults; mode bindings beat global ones so a
        // user can rebind a global key in one mode only
        let search_order = [
            (&self.bindings, context, "custom mode"),
            (&self.default_bindings, context, "default mode"),
            (&self.bindings, KeyContext::Global, "custom global"),
            (&self.default_bindings, KeyContext::Global, "default global"),
        ];

        for (binding_map, bind_context, label) in search_order {
            if let Some(action) = binding_map.get(&bind_context).and_then(|m| m.get(&key)) {
                tracing::trace!("  -> Found in {} bindings: {:?}", label, action);
                return action.clone();
            }
        }

        // Regular character input
        if key.1.is_empty() || key.1 == KeyModifiers::SHIFT {
            if let KeyCode::Char(c) = event.code {
                return Action::InsertChar(c);
            }
        }

        tracing::trace!("  -> No binding found");
        Action::None
    }

    /// Key label bound to `action` in `mode`, for the status line
    pub fn find_keybinding_for_action(&self, action: &Action, mode: EditorMode) -> Option<String> {
        let context = KeyContext::for_mode(mode);
        let mut found: Vec<String> = [
            (&self.bindings, context),
            (&self.bindings, KeyContext::Global),
            (&self.default_bindings, context),
            (&self.default_bindings, KeyContext::Global),
        ]
        .into_iter()
        .filter_map(|(map, ctx)| map.get(&ctx))
        .flat_map(|m| m.iter())
        .filter(|(_, a)| *a == action)
        .map(|((code, mods), _)| format_keybinding(code, mods))
        .filter(|label| !label.is_empty())
        .collect();
        // HashMap order is arbitrary; prefer the shortest label, then alphabetical
        found.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        found.into_iter().next()
    }

    /// Parse a key string to a KeyCode
    pub fn parse_key(key: &str) -> Option<KeyCode> {
        let lower = key.to_lowercase();
        match lower.as_str() {
            "enter" => Some(KeyCode::Enter),
            "backspace" => Some(KeyCode::Backspace),
            "delete" | "del" => Some(KeyCode::Delete),
            "tab" => Some(KeyCode::Tab),
            "esc" | "escape" => Some(KeyCode::Esc),
            "space" => Some(KeyCode::Char(' ')),

            "left" => Some(KeyCode::Left),
            "right" => Some(KeyCode::Right),
            "up" => Some(KeyCode::Up),
            "down" => Some(KeyCode::Down),
            "home" => Some(KeyCode::Home),
            "end" => Some(KeyCode::End),

            s if s.chars().count() == 1 => s.chars().next().map(KeyCode::Char),
            // Function keys like "f1" ... "f12"
            s if s.starts_with('f') && s.len() >= 2 => s[1..].parse::<u8>().ok().map(KeyCode::F),
            _ => None,
        }
    }

    /// Parse modifiers from strings
    pub fn parse_modifiers(modifiers: &[String]) -> KeyModifiers {
        let mut result = KeyModifiers::empty();
        for m in modifiers {
            match m.to_lowercase().as_str() {
                "ctrl" | "control" => result |= KeyModifiers::CONTROL,
                "shift" => result |= KeyModifiers::SHIFT,
                "alt" => result |= KeyModifiers::ALT,
                _ => {}
            }
        }
        result
    }
}

/// Terminals report Shift+letter as an uppercase char, sometimes without the
/// SHIFT flag. Lowercase the char and set SHIFT so both spellings match.
fn normalize(code: KeyCode, modifiers: KeyModifiers) -> (KeyCode, KeyModifiers) {
    match code {
        KeyCode::Char(c) if c.is_ascii_uppercase() => {
            (KeyCode::Char(c.to_ascii_lowercase()), modifiers | KeyModifiers::SHIFT)
        }
        _ => (code, modifiers),
    }
}

fn bind(key: &str, modifiers: &[&str], action: &str, when: Option<&str>) -> Keybinding {
    Keybinding {
        key: key.to_string(),
        modifiers: modifiers.iter().map(|m| m.to_string()).collect(),
        action: action.to_string(),
        args: HashMap::new(),
        when: when.map(str::to_string),
    }
}

fn bind_with(
    key: &str,
    modifiers: &[&str],
    action: &str,
    args: &[(&str, &str)],
    when: Option<&str>,
) -> Keybinding {
    let mut binding = bind(key, modifiers, action, when);
    binding.args = args
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
        .collect();
    binding
}

fn format_binding(key: &str, modifiers: &[&str], command: &str, value: Option<&str>) -> Keybinding {
    let mut args = vec![("command", command)];
    if let Some(value) = value {
        args.push(("value", value));
    }
    bind_with(key, modifiers, "format", &args, Some("rich"))
}

/// Built-in keymap
pub fn default_keybindings() -> Vec<Keybinding> {
    let rich = Some("rich");

    vec![
        // Editing
        bind("enter", &[], "insert_newline", None),
        bind("tab", &[], "insert_tab", None),
        bind("backspace", &[], "delete_backward", None),
        bind("delete", &[], "delete_forward", None),
        // Movement
        bind("left", &[], "move_left", None),
        bind("right", &[], "move_right", None),
        bind("up", &[], "move_up", None),
        bind("down", &[], "move_down", None),
        bind("home", &["ctrl"], "move_document_start", None),
        bind("end", &["ctrl"], "move_document_end", None),
        bind("left", &["shift"], "select_left", None),
        bind("right", &["shift"], "select_right", None),
        bind("up", &["shift"], "select_up", None),
        bind("down", &["shift"], "select_down", None),
        bind("home", &["ctrl", "shift"], "select_document_start", None),
        bind("end", &["ctrl", "shift"], "select_document_end", None),
        bind("a", &["ctrl"], "select_all", None),
        // Clipboard
        bind("c", &["ctrl"], "copy", None),
        bind("x", &["ctrl"], "cut", None),
        bind("v", &["ctrl"], "paste", None),
        bind("v", &["ctrl", "shift"], "paste_plain_text", None),
        bind("v", &["alt"], "paste_plain_text", None),
        // History
        bind("z", &["ctrl"], "undo", None),
        bind("y", &["ctrl"], "redo", None),
        bind("z", &["ctrl", "shift"], "redo", None),
        // Files
        bind("n", &["ctrl"], "new", None),
        bind("o", &["ctrl"], "open", None),
        bind("s", &["ctrl"], "save", None),
        bind("s", &["ctrl", "alt"], "save_as", None),
        bind("f12", &[], "save_as", None),
        // Mode and output
        bind("t", &["ctrl"], "toggle_mode", None),
        bind("p", &["ctrl"], "preview", None),
        bind("q", &["ctrl"], "quit", None),
        // Rich formatting
        format_binding("b", &["ctrl"], "bold", None),
        format_binding("i", &["ctrl"], "italic", None),
        format_binding("u", &["ctrl"], "underline", None),
        format_binding("l", &["alt"], "justifyLeft", None),
        format_binding("e", &["alt"], "justifyCenter", None),
        format_binding("r", &["alt"], "justifyRight", None),
        format_binding("u", &["alt"], "insertUnorderedList", None),
        format_binding("o", &["alt"], "insertOrderedList", None),
        format_binding("1", &["alt"], "formatBlock", Some("h1")),
        format_binding("2", &["alt"], "formatBlock", Some("h2")),
        format_binding("3", &["alt"], "formatBlock", Some("h3")),
        format_binding("0", &["alt"], "formatBlock", Some("p")),
        bind("k", &["ctrl"], "insert_link", rich),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(KeybindingResolver::parse_key("enter"), Some(KeyCode::Enter));
        assert_eq!(KeybindingResolver::parse_key("F12"), Some(KeyCode::F(12)));
        assert_eq!(KeybindingResolver::parse_key("a"), Some(KeyCode::Char('a')));
        assert_eq!(KeybindingResolver::parse_key("nonsense"), None);
    }

    #[test]
    fn test_parse_modifiers() {
        let mods = vec!["ctrl".to_string(), "Shift".to_string()];
        assert_eq!(
            KeybindingResolver::parse_modifiers(&mods),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT
        );
    }

    #[test]
    fn test_default_bindings_resolve() {
        let resolver = KeybindingResolver::new(&Config::default());
        assert_eq!(
            resolver.resolve(&key(KeyCode::Char('s'), KeyModifiers::CONTROL), EditorMode::Plain),
            Action::Save
        );
        assert_eq!(
            resolver.resolve(&key(KeyCode::F(12), KeyModifiers::NONE), EditorMode::Rich),
            Action::SaveAs
        );
        assert_eq!(
            resolver.resolve(&key(KeyCode::Left, KeyModifiers::SHIFT), EditorMode::Plain),
            Action::Select(CursorDirection::Left)
        );
    }

    #[test]
    fn test_shifted_letter_matches_shift_binding() {
        let resolver = KeybindingResolver::new(&Config::default());
        // Some terminals send Ctrl+Shift+V as Ctrl+'V' without SHIFT
        assert_eq!(
            resolver.resolve(&key(KeyCode::Char('V'), KeyModifiers::CONTROL), EditorMode::Plain),
            Action::PastePlainText
        );
        assert_eq!(
            resolver.resolve(
                &key(KeyCode::Char('Z'), KeyModifiers::CONTROL | KeyModifiers::SHIFT),
                EditorMode::Plain
            ),
            Action::Redo
        );
    }

    #[test]
    fn test_format_bindings_only_in_rich_mode() {
        let resolver = KeybindingResolver::new(&Config::default());
        let ctrl_b = key(KeyCode::Char('b'), KeyModifiers::CONTROL);
        assert_eq!(
            resolver.resolve(&ctrl_b, EditorMode::Rich),
            Action::Format {
                command: "bold".to_string(),
                value: None
            }
        );
        assert_eq!(resolver.resolve(&ctrl_b, EditorMode::Plain), Action::None);

        let alt_1 = key(KeyCode::Char('1'), KeyModifiers::ALT);
        assert_eq!(
            resolver.resolve(&alt_1, EditorMode::Rich),
            Action::Format {
                command: "formatBlock".to_string(),
                value: Some("h1".to_string())
            }
        );
    }

    #[test]
    fn test_character_input() {
        let resolver = KeybindingResolver::new(&Config::default());
        assert_eq!(
            resolver.resolve(&key(KeyCode::Char('a'), KeyModifiers::NONE), EditorMode::Plain),
            Action::InsertChar('a')
        );
        assert_eq!(
            resolver.resolve(&key(KeyCode::Char('A'), KeyModifiers::SHIFT), EditorMode::Rich),
            Action::InsertChar('A')
        );
    }

    #[test]
    fn test_custom_binding_overrides_default() {
        let mut config = Config::default();
        config.keybindings.push(bind("s", &["ctrl"], "save_as", None));
        config.keybindings.push(bind("t", &["ctrl"], "none", Some("rich")));
        let resolver = KeybindingResolver::new(&config);

        let ctrl_s = key(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(resolver.resolve(&ctrl_s, EditorMode::Plain), Action::SaveAs);

        let ctrl_t = key(KeyCode::Char('t'), KeyModifiers::CONTROL);
        assert_eq!(resolver.resolve(&ctrl_t, EditorMode::Plain), Action::ToggleMode);
        assert_eq!(resolver.resolve(&ctrl_t, EditorMode::Rich), Action::None);
    }

    #[test]
    fn test_invalid_custom_bindings_are_skipped() {
        let mut config = Config::default();
        config.keybindings.push(bind("s", &["ctrl"], "no_such_action", None));
        config.keybindings.push(bind("s", &["ctrl"], "open", Some("nowhere")));
        let resolver = KeybindingResolver::new(&config);
        assert_eq!(
            resolver.resolve(&key(KeyCode::Char('s'), KeyModifiers::CONTROL), EditorMode::Plain),
            Action::Save
        );
    }

    #[test]
    fn test_action_from_str_with_args() {
        let mut args = HashMap::new();
        args.insert(
            "mode".to_string(),
            serde_json::Value::String("rich".to_string()),
        );
        assert_eq!(
            Action::from_str("set_mode", &args),
            Some(Action::SetMode(EditorMode::Rich))
        );
        assert_eq!(Action::from_str("format", &HashMap::new()), None);
    }

    #[test]
    fn test_find_keybinding_for_action() {
        let resolver = KeybindingResolver::new(&Config::default());
        assert_eq!(
            resolver.find_keybinding_for_action(&Action::Save, EditorMode::Plain),
            Some("Ctrl+S".to_string())
        );
        assert_eq!(
            resolver.find_keybinding_for_action(&Action::SaveAs, EditorMode::Plain),
            Some("F12".to_string())
        );
    }

    #[test]
    fn test_format_keybinding() {
        assert_eq!(
            format_keybinding(
                &KeyCode::Char('v'),
                &(KeyModifiers::CONTROL | KeyModifiers::SHIFT)
            ),
            "Ctrl+Shift+V"
        );
        assert_eq!(format_keybinding(&KeyCode::Left, &KeyModifiers::NONE), "←");
    }
}
