use crate::core::input::{self, Keymap};
use crate::core::space::Viewport;
use ini::Ini;
use log::{info, warn};
use std::path::Path;
use std::str::FromStr;
use std::sync::{LazyLock, Mutex};

const CONFIG_PATH: &str = "damareen.ini";

const OPTIONS: &str = "Options";
const KEYMAPS: &str = "Keymaps";
const OPTION_KEYS: [&str; 6] = [
    "AshSeed",
    "DisplayHeight",
    "DisplayWidth",
    "LogLevel",
    "ShowFps",
    "Windowed",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warn => "Warn",
            Self::Info => "Info",
            Self::Debug => "Debug",
            Self::Trace => "Trace",
        }
    }

    pub const fn as_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub display_width: u32,
    pub display_height: u32,
    pub windowed: bool,
    pub log_level: LogLevel,
    /// 0 = seed the ash field from the wall clock.
    pub ash_seed: u64,
    pub show_fps: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display_width: 1280,
            display_height: 720,
            windowed: true,
            log_level: LogLevel::Info,
            ash_seed: 0,
            show_fps: true,
        }
    }
}

impl Config {
    /// Size used whenever the window reports a degenerate dimension.
    pub fn display_viewport(&self) -> Viewport {
        Viewport::new(
            f64::from(self.display_width),
            f64::from(self.display_height),
        )
    }

    pub fn resolved_ash_seed(&self) -> u64 {
        if self.ash_seed != 0 {
            return self.ash_seed;
        }
        chrono::Utc::now()
            .timestamp_nanos_opt()
            .map_or(1, |n| n.unsigned_abs())
    }
}

// Global, mutable configuration instance.
static CONFIG: LazyLock<Mutex<Config>> = LazyLock::new(|| Mutex::new(Config::default()));

#[inline(always)]
pub fn get() -> Config {
    *CONFIG.lock().unwrap()
}

// --- Parsing ---

fn parse_bool(v: &str) -> Option<bool> {
    let v = v.trim();
    if v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes") || v.eq_ignore_ascii_case("on")
    {
        Some(true)
    } else if v.eq_ignore_ascii_case("false")
        || v.eq_ignore_ascii_case("no")
        || v.eq_ignore_ascii_case("off")
    {
        Some(false)
    } else {
        v.parse::<u8>().ok().map(|n| n != 0)
    }
}

/// Reads one `[Options]` key, keeping `default` when it is absent or malformed.
fn read<T>(conf: &Ini, key: &str, default: T, parse: impl Fn(&str) -> Option<T>) -> T {
    match conf.get_from(Some(OPTIONS), key) {
        None => default,
        Some(raw) => parse(raw).unwrap_or_else(|| {
            warn!("Invalid value '{raw}' for {OPTIONS}.{key}; using default.");
            default
        }),
    }
}

fn positive_u32(v: &str) -> Option<u32> {
    v.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

pub fn from_ini(conf: &Ini) -> (Config, Keymap) {
    let default = Config::default();
    let cfg = Config {
        display_width: read(conf, "DisplayWidth", default.display_width, positive_u32),
        display_height: read(conf, "DisplayHeight", default.display_height, positive_u32),
        windowed: read(conf, "Windowed", default.windowed, parse_bool),
        log_level: read(conf, "LogLevel", default.log_level, |v| v.parse().ok()),
        ash_seed: read(conf, "AshSeed", default.ash_seed, |v| v.trim().parse().ok()),
        show_fps: read(conf, "ShowFps", default.show_fps, parse_bool),
    };

    let keymap = match conf.section(Some(KEYMAPS)) {
        Some(section) => Keymap::from_entries(section.iter()),
        None => input::default_keymap(),
    };
    (cfg, keymap)
}

pub fn to_ini(cfg: &Config, keymap: &Keymap) -> Ini {
    let flag = |b: bool| if b { "1" } else { "0" };
    let mut conf = Ini::new();
    conf.with_section(Some(OPTIONS))
        .set("AshSeed", cfg.ash_seed.to_string())
        .set("DisplayHeight", cfg.display_height.to_string())
        .set("DisplayWidth", cfg.display_width.to_string())
        .set("LogLevel", cfg.log_level.as_str())
        .set("ShowFps", flag(cfg.show_fps))
        .set("Windowed", flag(cfg.windowed));
    for (key, value) in keymap.to_ini_lines() {
        conf.with_section(Some(KEYMAPS)).set(key, value);
    }
    conf
}

// --- File I/O ---

fn save(cfg: &Config, keymap: &Keymap) -> Result<(), std::io::Error> {
    to_ini(cfg, keymap).write_to_file(CONFIG_PATH)
}

pub fn load() {
    if !Path::new(CONFIG_PATH).exists() {
        info!("'{CONFIG_PATH}' not found, creating with default values.");
        if let Err(e) = save(&Config::default(), &input::default_keymap()) {
            warn!("Failed to create default config file: {e}");
        }
    }

    let conf = match Ini::load_from_file(CONFIG_PATH) {
        Ok(conf) => conf,
        Err(e) => {
            warn!("Failed to load '{CONFIG_PATH}': {e}. Using default values.");
            return;
        }
    };

    let (cfg, keymap) = from_ini(&conf);
    *CONFIG.lock().unwrap() = cfg;
    input::set_keymap(keymap.clone());
    info!("Configuration loaded from '{CONFIG_PATH}'.");

    let missing = OPTION_KEYS
        .iter()
        .any(|k| conf.get_from(Some(OPTIONS), k).is_none())
        || conf.section(Some(KEYMAPS)).is_none();
    if missing {
        match save(&cfg, &keymap) {
            Ok(()) => info!("'{CONFIG_PATH}' updated with default values for any missing fields."),
            Err(e) => warn!("Failed to update '{CONFIG_PATH}': {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::VirtualAction;
    use winit::keyboard::KeyCode;

    fn parse(text: &str) -> (Config, Keymap) {
        from_ini(&Ini::load_from_str(text).unwrap())
    }

    #[test]
    fn empty_file_gives_defaults() {
        let (cfg, km) = parse("");
        assert_eq!(cfg, Config::default());
        assert_eq!(km, input::default_keymap());
    }

    #[test]
    fn options_are_read_and_bad_values_fall_back() {
        let (cfg, _) = parse(
            "[Options]\nDisplayWidth=1920\nDisplayHeight=0\nWindowed=off\nLogLevel=debug\nAshSeed=77\nShowFps=maybe\n",
        );
        assert_eq!(cfg.display_width, 1920);
        assert_eq!(cfg.display_height, 720);
        assert!(!cfg.windowed);
        assert_eq!(cfg.log_level, LogLevel::Debug);
        assert_eq!(cfg.ash_seed, 77);
        assert!(cfg.show_fps);
        assert_eq!(cfg.resolved_ash_seed(), 77);
    }

    #[test]
    fn keymap_section_overrides_bindings() {
        let (_, km) = parse("[Keymaps]\nBack=KeyCode::Backspace\n");
        assert_eq!(km.bindings(VirtualAction::Back), &[KeyCode::Backspace]);
        assert_eq!(km.bindings(VirtualAction::Start), &[KeyCode::Enter]);
    }

    #[test]
    fn written_file_reads_back() {
        let cfg = Config {
            display_width: 800,
            display_height: 600,
            windowed: false,
            log_level: LogLevel::Trace,
            ash_seed: 5,
            show_fps: false,
        };
        let mut buf = Vec::new();
        to_ini(&cfg, &input::default_keymap())
            .write_to(&mut buf)
            .unwrap();
        let text = String::from_utf8(buf).unwrap();
        let (back, km) = parse(&text);
        assert_eq!(back, cfg);
        assert_eq!(km, input::default_keymap());
    }

    #[test]
    fn zero_seed_draws_from_the_clock() {
        assert_ne!(Config::default().resolved_ash_seed(), 0);
    }
}
