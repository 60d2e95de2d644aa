use std::fmt;

use clap::ValueEnum;

/// Workspace crates all log under targets starting with `people`.
const TARGET: &str = "people";

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogLevel {
    /// Completely disables logging
    Off,
    /// Only errors from the gateway crates
    Error,
    /// Warnings and errors from the gateway crates
    Warn,
    /// Info, warning and error messages from the gateway crates
    #[default]
    Info,
    /// Debug, info, warning and error messages from the gateway crates
    Debug,
    /// Everything, dependencies included
    Trace,
}

impl LogLevel {
    /// An `EnvFilter` directive for this level.
    pub(crate) fn filter(self) -> String {
        let level = match self {
            LogLevel::Off => return "off".to_string(),
            LogLevel::Trace => return "trace".to_string(),
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };

        format!("{TARGET}={level},off")
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub(super) enum LogStyle {
    /// Standard text, colored on terminals
    Text,
    /// One JSON object per line
    Json,
}

// clap renders `default_value_t` through Display
impl fmt::Display for LogStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogStyle::Text => "text",
            LogStyle::Json => "json",
        })
    }
}
