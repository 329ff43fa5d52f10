use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

// ── Final (merged) config types ──

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub scan_enabled: bool,
    #[serde(default)]
    pub on_lookup_error: LookupFailurePolicy,
    #[serde(default)]
    pub support_contact: String,
    #[serde(default)]
    pub require_app_user_id: bool,
}

/// How the scanner treats an entry store failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupFailurePolicy {
    /// Abort the scan; the checkout is rejected.
    #[default]
    FailClosed,
    /// Log and treat the failed lookup as "no match".
    FailOpen,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct StoreConfig {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub level: String,
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    settings: SettingsOverlay,
    #[serde(default)]
    store: StoreOverlay,
    #[serde(default)]
    logging: LoggingOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct SettingsOverlay {
    scan_enabled: Option<bool>,
    on_lookup_error: Option<LookupFailurePolicy>,
    support_contact: Option<String>,
    require_app_user_id: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct StoreOverlay {
    path: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct LoggingOverlay {
    path: Option<String>,
    level: Option<String>,
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge the overlay at `path`, or ~/.config/order-gate/config.toml
    ///
    /// Overlay keys override defaults; omitted keys keep their default.
    pub fn load(path: Option<&Path>) -> Self {
        let mut config = Self::default_config();
        let path = path.map(Path::to_path_buf).or_else(default_overlay_path);
        if let Some(overlay) = path.and_then(|p| Self::load_overlay(&p)) {
            config.apply_overlay(overlay);
        }
        config
    }

    fn load_overlay(path: &Path) -> Option<ConfigOverlay> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                eprintln!("order-gate: config parse error: {e}");
                None
            }
        }
    }

    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        let s = overlay.settings;
        if let Some(v) = s.scan_enabled {
            self.settings.scan_enabled = v;
        }
        if let Some(v) = s.on_lookup_error {
            self.settings.on_lookup_error = v;
        }
        if let Some(v) = s.support_contact {
            self.settings.support_contact = v;
        }
        if let Some(v) = s.require_app_user_id {
            self.settings.require_app_user_id = v;
        }

        if let Some(v) = overlay.store.path {
            self.store.path = v;
        }

        let l = overlay.logging;
        if let Some(v) = l.path {
            self.logging.path = v;
        }
        if let Some(v) = l.level {
            self.logging.level = v;
        }
    }

    /// Entry store path with `~` and `$VAR` expanded.
    pub fn store_path(&self) -> PathBuf {
        expand_path(&self.store.path)
    }

    /// Scan log path with `~` and `$VAR` expanded.
    pub fn log_path(&self) -> PathBuf {
        expand_path(&self.logging.path)
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}

fn default_overlay_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(Path::new(&home).join(".config/order-gate/config.toml"))
}

// Unset variables leave the input untouched.
fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(raw),
    }
}
