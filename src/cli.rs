//! Command-line argument parsing and exit-code mapping.

use crate::error::ErrorKind;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Verbose,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Verbose => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Userspace driver daemon for Valve's Steam Deck integrated controller.
#[derive(Debug, Parser)]
#[command(name = "opensdd", version, about)]
pub struct Cli {
    /// Minimum severity to log.
    #[arg(short, long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Profile file to load at startup. Defaults to the XDG default profile.
    #[arg(short, long)]
    pub profile: Option<PathBuf>,
}

/// Maps a driver error kind to a process exit code. Argument-parsing errors
/// are handled entirely by `clap` and exit `2` independently of this table.
pub fn exit_code_for(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::CannotOpen | ErrorKind::NoDevice => 2,
        ErrorKind::FileNotFound | ErrorKind::NotFound => 3,
        ErrorKind::InvalidFormat => 4,
        ErrorKind::NoPermission => 5,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_log_level_and_profile() {
        let cli = Cli::parse_from(["opensdd", "-l", "debug", "-p", "/tmp/my.ini"]);
        assert_eq!(cli.log_level, LogLevel::Debug);
        assert_eq!(cli.profile, Some(PathBuf::from("/tmp/my.ini")));
    }

    #[test]
    fn defaults_to_warn_with_no_profile() {
        let cli = Cli::parse_from(["opensdd"]);
        assert_eq!(cli.log_level, LogLevel::Warn);
        assert_eq!(cli.profile, None);
    }

    #[test]
    fn exit_code_mapping_is_stable_for_common_cases() {
        assert_eq!(exit_code_for(ErrorKind::CannotOpen), 2);
        assert_eq!(exit_code_for(ErrorKind::Unknown), 1);
    }
}
