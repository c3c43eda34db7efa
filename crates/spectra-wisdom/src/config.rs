//! Wisdom transport configuration.

use std::path::PathBuf;

/// Where the platform default wisdom lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WisdomConfig {
    /// File read by system-default imports.
    pub system_path: PathBuf,
}

impl WisdomConfig {
    /// Default location of the system wisdom file.
    pub const DEFAULT_SYSTEM_PATH: &'static str = "/etc/spectra/wisdom";

    /// Environment variable overriding [`DEFAULT_SYSTEM_PATH`](Self::DEFAULT_SYSTEM_PATH).
    pub const SYSTEM_PATH_ENV: &'static str = "SPECTRA_SYSTEM_WISDOM";

    /// Config reading the system wisdom from `system_path`.
    pub fn new(system_path: impl Into<PathBuf>) -> Self {
        Self {
            system_path: system_path.into(),
        }
    }

    /// Default config, with the system path taken from
    /// `SPECTRA_SYSTEM_WISDOM` when it is set and non-empty.
    pub fn from_env() -> Self {
        match std::env::var_os(Self::SYSTEM_PATH_ENV) {
            Some(path) if !path.is_empty() => Self::new(path),
            _ => Self::default(),
        }
    }
}

impl Default for WisdomConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SYSTEM_PATH)
    }
}
