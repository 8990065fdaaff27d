use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "DisplayConfig::default_width")]
    pub width: i32,
    #[serde(default = "DisplayConfig::default_height")]
    pub height: i32,
}

impl DisplayConfig {
    const fn default_width() -> i32 {
        960
    }
    const fn default_height() -> i32 {
        544
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { width: Self::default_width(), height: Self::default_height() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptConfig {
    #[serde(default = "ScriptConfig::default_path")]
    pub path: String,
    /// Script-thread iterations per second (each iteration ends in a swap).
    #[serde(default = "ScriptConfig::default_tick_hz")]
    pub tick_hz: u32,
}

impl ScriptConfig {
    fn default_path() -> String {
        "demos/deck.rhai".to_string()
    }
    const fn default_tick_hz() -> u32 {
        60
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self { path: Self::default_path(), tick_hz: Self::default_tick_hz() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventConfig {
    #[serde(default = "EventConfig::default_capacity")]
    pub capacity: usize,
}

impl EventConfig {
    const fn default_capacity() -> usize {
        256
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self { capacity: Self::default_capacity() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "DemoConfig::default_frames")]
    pub frames: usize,
}

impl DemoConfig {
    const fn default_frames() -> usize {
        180
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self { frames: Self::default_frames() }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub script: ScriptConfig,
    #[serde(default)]
    pub events: EventConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Default)]
pub struct AppConfigOverrides {
    pub script: Option<String>,
    pub frames: Option<usize>,
    pub tick_hz: Option<u32>,
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("Parsing {}", path.display()))
    }

    /// Loads the config file if it exists, otherwise falls back to defaults.
    /// A present-but-broken file is reported and ignored.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("[config] {err:#}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(mut self, overrides: AppConfigOverrides) -> Self {
        if let Some(script) = overrides.script {
            self.script.path = script;
        }
        if let Some(frames) = overrides.frames {
            self.demo.frames = frames;
        }
        if let Some(tick_hz) = overrides.tick_hz {
            self.script.tick_hz = tick_hz.max(1);
        }
        self
    }
}
