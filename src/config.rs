use crate::iface::scale::DEFAULT_DESIGN_SIZE;
use crate::ui::compose::{BuildOptions, DEFAULT_FONT_CELL};
use log::{info, warn};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

const CONFIG_PATH: &str = "fo-iface.ini";

// --- Minimal INI reader ---

/// One meaningful line of an ini file; blank lines and comments are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IniLine<'a> {
    Section(&'a str),
    Pair(&'a str, &'a str),
}

/// Walks `content` in file order. Duplicates are left to the caller.
pub fn ini_lines(content: &str) -> impl Iterator<Item = IniLine<'_>> {
    content.lines().filter_map(|raw_line| {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            return None;
        }

        // Section header: [SectionName]
        if line.starts_with('[') && line.ends_with(']') && line.len() >= 2 {
            return Some(IniLine::Section(line[1..line.len() - 1].trim()));
        }

        // Key/value pair: key=value
        let (key_raw, value_raw) = line.split_once('=')?;
        let key = key_raw.trim();
        if key.is_empty() {
            return None;
        }
        Some(IniLine::Pair(key, value_raw.trim()))
    })
}

#[derive(Debug, Default)]
pub struct SimpleIni {
    sections: HashMap<String, HashMap<String, String>>,
}

impl SimpleIni {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        self.parse_str(&content);
        Ok(())
    }

    /// Later duplicates overwrite earlier ones.
    pub fn parse_str(&mut self, content: &str) {
        self.sections.clear();

        let mut current_section = String::new();
        for line in ini_lines(content) {
            match line {
                IniLine::Section(name) => {
                    current_section = name.to_string();
                    self.sections.entry(current_section.clone()).or_default();
                }
                IniLine::Pair(key, value) => {
                    self.sections
                        .entry(current_section.clone())
                        .or_default()
                        .insert(key.to_string(), value.to_string());
                }
            }
        }
    }

    pub fn get(&self, section: &str, key: &str) -> Option<String> {
        self.sections.get(section).and_then(|s| s.get(key)).cloned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    const fn as_str(&self) -> &'static str {
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

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub log_level: LogLevel,
    /// Directory picture paths in interface files are relative to.
    pub art_dir: String,
    /// Design size used when a section's main picture cannot be read.
    pub design_width: u32,
    pub design_height: u32,
    /// Font cell at design resolution, in pixels.
    pub font_cell_width: f32,
    pub font_cell_height: f32,
    /// How fast split components walk their address space.
    pub address_steps_per_second: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Warn,
            art_dir: "data/art/intrface".to_string(),
            design_width: DEFAULT_DESIGN_SIZE[0],
            design_height: DEFAULT_DESIGN_SIZE[1],
            font_cell_width: DEFAULT_FONT_CELL[0],
            font_cell_height: DEFAULT_FONT_CELL[1],
            address_steps_per_second: 4.0,
        }
    }
}

impl Config {
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            design_fallback: [self.design_width, self.design_height],
            font_cell: [self.font_cell_width, self.font_cell_height],
            address_steps_per_second: self.address_steps_per_second,
        }
    }

    /// Reads `[Options]`, keeping defaults for missing or malformed keys.
    fn from_ini(conf: &SimpleIni) -> Self {
        let default = Self::default();
        let positive_u32 = |key: &str, fallback: u32| {
            conf.get("Options", key)
                .and_then(|v| v.trim().parse::<u32>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(fallback)
        };
        let positive_f32 = |key: &str, fallback: f32| {
            conf.get("Options", key)
                .and_then(|v| v.trim().parse::<f32>().ok())
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(fallback)
        };
        Self {
            log_level: conf
                .get("Options", "LogLevel")
                .and_then(|v| LogLevel::from_str(&v).ok())
                .unwrap_or(default.log_level),
            art_dir: conf
                .get("Options", "ArtDir")
                .filter(|v| !v.is_empty())
                .unwrap_or(default.art_dir),
            design_width: positive_u32("DesignWidth", default.design_width),
            design_height: positive_u32("DesignHeight", default.design_height),
            font_cell_width: positive_f32("FontCellWidth", default.font_cell_width),
            font_cell_height: positive_f32("FontCellHeight", default.font_cell_height),
            address_steps_per_second: positive_f32(
                "AddressStepsPerSecond",
                default.address_steps_per_second,
            ),
        }
    }
}

static CONFIG: std::sync::LazyLock<Mutex<Config>> =
    std::sync::LazyLock::new(|| Mutex::new(Config::default()));

// --- File I/O ---

fn default_config_content() -> String {
    let default = Config::default();
    let mut content = String::new();

    // [Options] section - keys in alphabetical order
    content.push_str("[Options]\n");
    content.push_str(&format!(
        "AddressStepsPerSecond={}\n",
        default.address_steps_per_second
    ));
    content.push_str(&format!("ArtDir={}\n", default.art_dir));
    content.push_str(&format!("DesignHeight={}\n", default.design_height));
    content.push_str(&format!("DesignWidth={}\n", default.design_width));
    content.push_str(&format!("FontCellHeight={}\n", default.font_cell_height));
    content.push_str(&format!("FontCellWidth={}\n", default.font_cell_width));
    content.push_str(&format!("LogLevel={}\n", default.log_level.as_str()));
    content
}

fn create_default_config_file() -> Result<(), std::io::Error> {
    info!("'{CONFIG_PATH}' not found, creating with default values.");
    std::fs::write(CONFIG_PATH, default_config_content())
}

pub fn load() {
    if !Path::new(CONFIG_PATH).exists()
        && let Err(e) = create_default_config_file()
    {
        warn!("Failed to create default config file: {e}");
    }

    let mut conf = SimpleIni::new();
    match conf.load(CONFIG_PATH) {
        Ok(()) => {
            let loaded = Config::from_ini(&conf);
            info!("Configuration loaded from '{CONFIG_PATH}': {loaded:?}");
            *CONFIG.lock().unwrap_or_else(PoisonError::into_inner) = loaded;
        }
        Err(e) => warn!("Failed to load '{CONFIG_PATH}', using defaults: {e}"),
    }
}

pub fn get() -> Config {
    CONFIG.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

/// Overrides the art directory for this run (command-line flag).
pub fn set_art_dir(dir: &str) {
    CONFIG.lock().unwrap_or_else(PoisonError::into_inner).art_dir = dir.to_string();
}

#[cfg(test)]
mod tests {
    use super::{Config, IniLine, LogLevel, SimpleIni, default_config_content, ini_lines};

    #[test]
    fn ini_reader_groups_pairs_by_section() {
        let mut ini = SimpleIni::new();
        ini.parse_str("top=1\n; comment\n[Options]\n LogLevel = debug \n\n[Other]\nx=y=z\n");
        assert_eq!(ini.get("", "top").as_deref(), Some("1"));
        assert_eq!(ini.get("Options", "LogLevel").as_deref(), Some("debug"));
        assert_eq!(ini.get("Other", "x").as_deref(), Some("y=z"));
        assert_eq!(ini.get("Missing", "x"), None);
    }

    #[test]
    fn line_walk_keeps_file_order_and_duplicates() {
        let lines: Vec<IniLine> = ini_lines("# c\n[A]\nk=1\n =skip\nk=2\n[ B ]\nnoeq\n").collect();
        assert_eq!(
            lines,
            [
                IniLine::Section("A"),
                IniLine::Pair("k", "1"),
                IniLine::Pair("k", "2"),
                IniLine::Section("B"),
            ]
        );
    }

    #[test]
    fn options_fall_back_per_key() {
        let mut ini = SimpleIni::new();
        ini.parse_str("[Options]\nLogLevel=trace\nDesignWidth=0\nFontCellHeight=abc\nArtDir=art\n");
        let cfg = Config::from_ini(&ini);
        let default = Config::default();
        assert_eq!(cfg.log_level, LogLevel::Trace);
        assert_eq!(cfg.art_dir, "art");
        assert_eq!(cfg.design_width, default.design_width, "zero is rejected");
        assert_eq!(cfg.font_cell_height, default.font_cell_height);
    }

    #[test]
    fn default_file_reads_back_as_defaults() {
        let mut ini = SimpleIni::new();
        ini.parse_str(&default_config_content());
        assert_eq!(Config::from_ini(&ini), Config::default());
    }
}
