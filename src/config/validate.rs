// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PollwatchError, Result};
use crate::watch::ignore::IgnoreSet;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = PollwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.listener, raw.watch))
    }
}

pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_listener(cfg)?;
    validate_watch_entries(cfg)?;
    Ok(())
}

fn validate_listener(cfg: &RawConfigFile) -> Result<()> {
    if cfg.listener.interval_ms == 0 {
        return Err(PollwatchError::ConfigError(
            "[listener].interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    IgnoreSet::new(&cfg.listener.ignore)?;
    Ok(())
}

fn validate_watch_entries(cfg: &RawConfigFile) -> Result<()> {
    for (i, entry) in cfg.watch.iter().enumerate() {
        if entry.path.as_os_str().is_empty() {
            return Err(PollwatchError::ConfigError(format!(
                "[[watch]] entry #{} has an empty path",
                i + 1
            )));
        }
    }
    Ok(())
}
