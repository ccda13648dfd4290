use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use cross_xdg::BaseDirs;

use crate::interpreter::DEFAULT_MEMORY_SIZE;

/// Default wall-clock budget for a single program run.
pub const DEFAULT_TIMEOUT_MS: u64 = 2_000;

/// Largest initial tape accepted from flags, `bf.toml` or the environment.
pub const MAX_MEMORY_SIZE: usize = 1 << 24;

/// Accept `cells` as an initial tape size, or explain why not.
pub fn check_memory_size(cells: usize) -> Result<usize, String> {
    if cells > MAX_MEMORY_SIZE {
        return Err(format!("memory size must be at most {MAX_MEMORY_SIZE} cells"));
    }
    Ok(cells)
}

/// Interpreter limits shared by the `run` command and the REPL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub memory_size: usize,
    pub max_steps: Option<u64>,
    pub timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_SIZE,
            max_steps: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Settings from `bf.toml` and the environment, resolved once per process.
pub fn settings() -> &'static Settings {
    SETTINGS.get_or_init(|| {
        let mut cfg = Settings::default();
        if let Some(content) = read_config_file() {
            cfg.apply(&parse_interpreter_section(&content));
        }
        cfg.apply_env(|key| env::var(key).ok());
        tracing::debug!(?cfg, "resolved interpreter settings");
        cfg
    })
}

impl Settings {
    /// Overlay `key = value` pairs from the `[interpreter]` section.
    fn apply(&mut self, map: &HashMap<String, String>) {
        macro_rules! set {
            ($field:ident, $key:literal) => {
                if let Some(raw) = map.get($key) {
                    match raw.parse() {
                        Ok(v) => self.$field = v,
                        Err(_) => tracing::warn!(key = $key, value = %raw, "ignoring invalid config value"),
                    }
                }
            };
        }

        if let Some(raw) = map.get("memory_size") {
            match raw.parse::<usize>().map_err(|e| e.to_string()).and_then(check_memory_size) {
                Ok(v) => self.memory_size = v,
                Err(reason) => tracing::warn!(key = "memory_size", value = %raw, %reason, "ignoring invalid config value"),
            }
        }
        set!(timeout_ms, "timeout_ms");
        if let Some(raw) = map.get("max_steps") {
            match raw.parse::<u64>() {
                Ok(v) => self.max_steps = Some(v),
                Err(_) => tracing::warn!(key = "max_steps", value = %raw, "ignoring invalid config value"),
            }
        }
    }

    /// Overlay `BF_MEMORY_SIZE`, `BF_MAX_STEPS` and `BF_TIMEOUT_MS`.
    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut map = HashMap::new();
        for (var, key) in [
            ("BF_MEMORY_SIZE", "memory_size"),
            ("BF_MAX_STEPS", "max_steps"),
            ("BF_TIMEOUT_MS", "timeout_ms"),
        ] {
            if let Some(v) = lookup(var) {
                map.insert(key.to_string(), v.trim().to_string());
            }
        }
        self.apply(&map);
    }
}

fn read_config_file() -> Option<String> {
    let base_dirs = BaseDirs::new().ok()?;

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let config_home = base_dirs.config_home();

    let mut path = PathBuf::from(config_home);
    path.push("bf.toml");

    let content = fs::read_to_string(&path).ok()?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Some(content)
}

/// Very small hand-rolled parser: collect `key = value` pairs from the
/// `[interpreter]` section. Values may be quoted.
fn parse_interpreter_section(content: &str) -> HashMap<String, String> {
    let mut in_section = false;
    let mut map: HashMap<String, String> = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }
        if line.starts_with('[') && line.ends_with(']') {
            in_section = line[1..line.len() - 1].trim() == "interpreter";
            continue;
        }
        if !in_section { continue; }
        if let Some((key, val_raw)) = line.split_once('=') {
            let val_raw = val_raw.trim();
            let val = val_raw
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(val_raw);
            map.insert(key.trim().to_string(), val.to_string());
        }
    }
    map
}
