use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::{fs, time::Duration};
use thiserror::Error;

/// Error type for config loading/validation. The only fatal error class in
/// the process: everything after startup degrades instead of aborting.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>, // "info" | "debug" | ...
    pub display: Option<DisplayConfig>,
}

/// Which output sink to drive. Selected once at startup and fixed for the
/// process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayKind {
    #[default]
    Virtual,
    EPaper,
    Tft,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub kind: DisplayKind,
    pub width: u32,
    pub height: u32,
    /// Driver-specific model identifier, e.g. "epd2in13_v2" or "st7789".
    pub model: Option<String>,
    pub bus: Option<BusConfig>,
    /// Where the virtual driver writes its frame artifact.
    pub output_path: Option<PathBuf>,
    /// Polling cadence of the update loop, seconds.
    pub update_interval_secs: f64,
    /// Minimum position advance (seconds, while playing) that warrants a
    /// redraw. Trades display wear against a live-looking progress bar.
    pub redraw_threshold_secs: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            kind: DisplayKind::Virtual,
            width: 250,
            height: 122,
            model: None,
            bus: None,
            output_path: None,
            update_interval_secs: 1.0,
            redraw_threshold_secs: 2.0,
        }
    }
}

impl DisplayConfig {
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs_f64(self.update_interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BusConfig {
    Spi {
        bus: String, // e.g. "/dev/spidev0.0"
        speed_hz: Option<u32>,
        dc_pin: u32, // BCM numbering
        rst_pin: Option<u32>,
        busy_pin: Option<u32>,
    },
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "inkbeat", version, about = "Now-playing display over MPRIS")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Enable debug log level (shorthand for --log-level debug)
    #[arg(short = 'v', long, action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub display_kind: Option<String>,
    #[arg(long)]
    pub display_width: Option<u32>,
    #[arg(long)]
    pub display_height: Option<u32>,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub output_path: Option<PathBuf>,
    #[arg(long)]
    pub update_interval: Option<f64>,
    #[arg(long)]
    pub redraw_threshold: Option<f64>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: parse CLI, read YAML, layer env + CLI, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();
    load_with(&cli)
}

pub fn load_with(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) environment overrides
    apply_env_overrides(&mut cfg)?;

    // 4) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli)?;

    // 5) validate
    validate(&cfg)?;

    if cli.dump_config {
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    if let Ok(p) = env::var("INKBEAT_CONFIG") {
        let p = PathBuf::from(p);
        if p.exists() {
            return Some(p);
        }
    }
    if let Some(home) = home_dir() {
        let p = home.join(".config/inkbeat/config.yaml");
        if p.exists() {
            return Some(p);
        }
    }
    let p = PathBuf::from("/etc/inkbeat/config.yaml");
    if p.exists() {
        return Some(p);
    }
    let p = PathBuf::from("inkbeat.yaml");
    if p.exists() {
        return Some(p);
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some() {
        dst.log_level = src.log_level;
    }
    if src.display.is_some() {
        dst.display = src.display;
    }
}

fn parse_kind(s: &str) -> Result<DisplayKind, ConfigError> {
    match s.to_ascii_lowercase().as_str() {
        "virtual" => Ok(DisplayKind::Virtual),
        "epaper" => Ok(DisplayKind::EPaper),
        "tft" => Ok(DisplayKind::Tft),
        other => Err(ConfigError::Validation(format!(
            "unknown display kind: {other} (expected virtual|epaper|tft)"
        ))),
    }
}

fn apply_env_overrides(cfg: &mut Config) -> Result<(), ConfigError> {
    let display = cfg.display.get_or_insert_with(DisplayConfig::default);

    if let Ok(v) = env::var("INKBEAT_DISPLAY_KIND") {
        display.kind = parse_kind(&v)?;
    }
    if let Ok(v) = env::var("INKBEAT_DISPLAY_WIDTH") {
        display.width = parse_env("INKBEAT_DISPLAY_WIDTH", &v)?;
    }
    if let Ok(v) = env::var("INKBEAT_DISPLAY_HEIGHT") {
        display.height = parse_env("INKBEAT_DISPLAY_HEIGHT", &v)?;
    }
    if let Ok(v) = env::var("INKBEAT_DISPLAY_MODEL") {
        display.model = Some(v);
    }
    if let Ok(v) = env::var("INKBEAT_UPDATE_INTERVAL") {
        display.update_interval_secs = parse_env("INKBEAT_UPDATE_INTERVAL", &v)?;
    }
    if let Ok(v) = env::var("INKBEAT_LOG_LEVEL") {
        cfg.log_level = Some(v);
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Validation(format!("invalid value for {key}: {value}")))
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) -> Result<(), ConfigError> {
    if cli.log_level.is_some() {
        cfg.log_level = cli.log_level.clone();
    }
    if cli.debug {
        cfg.log_level = Some("debug".to_string());
    }

    let display = cfg.display.get_or_insert_with(DisplayConfig::default);
    if let Some(kind) = cli.display_kind.as_deref() {
        display.kind = parse_kind(kind)?;
    }
    if let Some(w) = cli.display_width {
        display.width = w;
    }
    if let Some(h) = cli.display_height {
        display.height = h;
    }
    if cli.model.is_some() {
        display.model = cli.model.clone();
    }
    if cli.output_path.is_some() {
        display.output_path = cli.output_path.clone();
    }
    if let Some(i) = cli.update_interval {
        display.update_interval_secs = i;
    }
    if let Some(t) = cli.redraw_threshold {
        display.redraw_threshold_secs = t;
    }
    Ok(())
}

/// Geometry and cadence invariants. A display of invalid geometry cannot be
/// reasoned about, so these are checked once at startup and are fatal.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    let Some(display) = cfg.display.as_ref() else {
        return Ok(()); // defaults apply
    };
    if display.width == 0 || display.height == 0 {
        return Err(ConfigError::Validation(
            "display width/height must be > 0".into(),
        ));
    }
    if !(display.update_interval_secs > 0.0) {
        return Err(ConfigError::Validation(
            "update_interval_secs must be > 0".into(),
        ));
    }
    if !(display.redraw_threshold_secs > 0.0) {
        return Err(ConfigError::Validation(
            "redraw_threshold_secs must be > 0".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_zero_geometry() {
        let cfg = Config {
            display: Some(DisplayConfig {
                width: 0,
                height: 122,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_validate_bad_interval() {
        let cfg = Config {
            display: Some(DisplayConfig {
                update_interval_secs: 0.0,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_validate_defaults_ok() {
        let cfg = Config {
            display: Some(DisplayConfig::default()),
            ..Default::default()
        };
        assert!(validate(&cfg).is_ok());
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("epaper").unwrap(), DisplayKind::EPaper);
        assert_eq!(parse_kind("Virtual").unwrap(), DisplayKind::Virtual);
        assert!(parse_kind("oled").is_err());
    }
}
