//! Driver configuration.
//!
//! Values come from positional arguments (input, then optional output path)
//! and a handful of environment variables:
//!
//! - `HASHSTREAM_WINDOW_SECS`: window length in seconds (default 60)
//! - `HASHSTREAM_START` / `HASHSTREAM_STOP`: sequence range of triggering events
//! - `HASHSTREAM_DATABASE`: optional SQLite file for statistics

use crate::event::SequenceRange;
use crate::window::{WindowConfig, WindowError, DEFAULT_WINDOW_SECS};
use std::path::PathBuf;

/// Errors raised while assembling a configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No input path was supplied
    MissingInput,
    /// An environment variable could not be parsed
    InvalidValue { key: String, value: String },
    /// Window parameters were rejected
    Window(WindowError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingInput => write!(f, "Missing input path"),
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid value for {}: {}", key, value)
            }
            ConfigError::Window(err) => write!(f, "Invalid window: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<WindowError> for ConfigError {
    fn from(err: WindowError) -> Self {
        ConfigError::Window(err)
    }
}

/// Configuration for one pass over an input file.
#[derive(Debug, Clone, PartialEq)]
pub struct HashStreamConfig {
    /// Line-delimited JSON input
    pub input_path: PathBuf,
    /// Text file for the statistics matrix (optional)
    pub output_path: Option<PathBuf>,
    /// SQLite file for the statistics matrix (optional)
    pub database_path: Option<PathBuf>,
    /// Window length in seconds (default: 60)
    pub window_secs: i64,
    /// First triggering sequence index (default: 0)
    pub start: usize,
    /// Sequence index at which reading stops (default: unbounded)
    pub stop: Option<usize>,
}

impl Default for HashStreamConfig {
    fn default() -> Self {
        HashStreamConfig {
            input_path: PathBuf::from("tweet_input/tweets.txt"),
            output_path: None,
            database_path: None,
            window_secs: DEFAULT_WINDOW_SECS,
            start: 0,
            stop: None,
        }
    }
}

impl HashStreamConfig {
    /// Defaults for everything but the input path.
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        HashStreamConfig {
            input_path: input_path.into(),
            ..Self::default()
        }
    }

    /// Builds a configuration from positional arguments and an environment
    /// lookup. `args` excludes the program name.
    pub fn from_args_and_env<I, F>(args: I, env: F) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut args = args.into_iter();
        let input = args.next().ok_or(ConfigError::MissingInput)?;
        let mut config = Self::new(input);
        config.output_path = args.next().map(PathBuf::from);

        if let Some(value) = env("HASHSTREAM_WINDOW_SECS") {
            config.window_secs = parse_value("HASHSTREAM_WINDOW_SECS", &value)?;
        }
        if let Some(value) = env("HASHSTREAM_START") {
            config.start = parse_value("HASHSTREAM_START", &value)?;
        }
        if let Some(value) = env("HASHSTREAM_STOP") {
            config.stop = Some(parse_value("HASHSTREAM_STOP", &value)?);
        }
        config.database_path = env("HASHSTREAM_DATABASE").map(PathBuf::from);

        config.window()?;
        Ok(config)
    }

    /// Reads `std::env::args` and the process environment.
    pub fn from_env_and_args() -> Result<Self, ConfigError> {
        Self::from_args_and_env(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// Validated window parameters.
    pub fn window(&self) -> Result<WindowConfig, ConfigError> {
        Ok(WindowConfig::from_secs(self.window_secs)?)
    }

    /// Range of triggering sequence indices.
    pub fn range(&self) -> SequenceRange {
        SequenceRange::new(self.start, self.stop.unwrap_or(usize::MAX))
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let config = HashStreamConfig::from_args_and_env(args(&["in.txt"]), env_of(&[])).unwrap();
        assert_eq!(config.input_path, PathBuf::from("in.txt"));
        assert_eq!(config.output_path, None);
        assert_eq!(config.window_secs, 60);
        assert_eq!(config.range(), SequenceRange::full());
    }

    #[test]
    fn test_positional_output_and_env_overrides() {
        let config = HashStreamConfig::from_args_and_env(
            args(&["in.txt", "out.txt"]),
            env_of(&[
                ("HASHSTREAM_WINDOW_SECS", "5"),
                ("HASHSTREAM_START", "10"),
                ("HASHSTREAM_STOP", "20"),
                ("HASHSTREAM_DATABASE", "stats.db"),
            ]),
        )
        .unwrap();

        assert_eq!(config.output_path, Some(PathBuf::from("out.txt")));
        assert_eq!(config.database_path, Some(PathBuf::from("stats.db")));
        assert_eq!(config.range(), SequenceRange::new(10, 20));
        assert_eq!(config.window().unwrap().window_length().num_seconds(), 5);
    }

    #[test]
    fn test_missing_input() {
        assert_eq!(
            HashStreamConfig::from_args_and_env(Vec::new(), env_of(&[])),
            Err(ConfigError::MissingInput)
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = HashStreamConfig::from_args_and_env(
            args(&["in.txt"]),
            env_of(&[("HASHSTREAM_WINDOW_SECS", "abc")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = HashStreamConfig::from_args_and_env(
            args(&["in.txt"]),
            env_of(&[("HASHSTREAM_WINDOW_SECS", "0")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Window(WindowError::NonPositiveWindow(_))));
    }
}
