//! Command-line arguments.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Barista: the coffee shop's conversational recommendation service.
#[derive(Parser, Debug)]
#[command(name = "barista", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Directory holding the catalog database.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Load the built-in demo catalog into empty tables.
    #[arg(long = "seed-demo")]
    pub seed_demo: bool,
}

impl CliArgs {
    /// Priority: --config > BARISTA_CONFIG > ~/.barista/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("BARISTA_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Priority: --port > BARISTA_PORT > config value.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        std::env::var("BARISTA_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(config_port)
    }

    /// `--data-dir` if given.
    pub fn resolve_data_dir(&self) -> Option<String> {
        self.data_dir
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
    }

    /// `--log-level` if given.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }
}

fn default_config_path() -> PathBuf {
    match home_dir() {
        Some(home) => home.join(".barista").join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}

pub fn home_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let var = "USERPROFILE";
    #[cfg(not(target_os = "windows"))]
    let var = "HOME";
    std::env::var(var).ok().map(PathBuf::from)
}

/// Expand a leading `~/` against the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        (Some(rest), None) => PathBuf::from(".").join(rest),
        (None, _) => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::parse_from(std::iter::once("barista").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert!(args.config.is_none());
        assert!(args.port.is_none());
        assert!(!args.seed_demo);
        assert!(args.resolve_log_level().is_none());
    }

    #[test]
    fn test_flags() {
        let args = parse(&[
            "--config",
            "/tmp/b.toml",
            "-p",
            "8080",
            "--data-dir",
            "/srv/barista",
            "--log-level",
            "debug",
            "--seed-demo",
        ]);
        assert_eq!(args.resolve_config_path(), PathBuf::from("/tmp/b.toml"));
        assert_eq!(args.resolve_port(3040), 8080);
        assert_eq!(args.resolve_data_dir().as_deref(), Some("/srv/barista"));
        assert_eq!(args.resolve_log_level().as_deref(), Some("debug"));
        assert!(args.seed_demo);
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        assert!(!expand_home("~/data").to_string_lossy().starts_with('~'));
        assert!(expand_home("~/data").ends_with("data"));
    }
}
