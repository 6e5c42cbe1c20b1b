use std::str::FromStr;

use serde::Deserialize;

/// Which listener backend to run.
///
/// - `Auto`: native when the platform supports it, otherwise polling.
/// - `Polling`: always scan; works everywhere, including network mounts.
/// - `Native`: kernel events through `notify`; fails if unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Auto,
    Polling,
    Native,
}

impl Default for BackendKind {
    fn default() -> Self {
        BackendKind::Auto
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(BackendKind::Auto),
            "polling" | "poll" => Ok(BackendKind::Polling),
            "native" => Ok(BackendKind::Native),
            other => Err(format!(
                "invalid backend: {other} (expected \"auto\", \"polling\" or \"native\")"
            )),
        }
    }
}
