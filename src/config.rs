//! Configuration management for the probe command line
//!
//! This module provides the configuration structure built from the
//! command line arguments and its validation logic.

use crate::error::{ConfigError, ConfigResult};
use std::path::PathBuf;

/// Options of one probe invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeConfig {
    /// File to read the ID3v2 tag from
    pub filename: PathBuf,
    /// Log progress and the decoded fields to stderr
    pub verbose: bool,
    /// Where to write a JSON diagnostics report
    pub report: Option<PathBuf>,
}

impl ProbeConfig {
    /// Create a configuration for `filename` with default options
    pub fn new(filename: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }

    /// Parse arguments, not including the program name
    ///
    /// Options may use one or two dashes and take their value either as the
    /// next argument or after `=`, so `-filename seg.aac`,
    /// `--filename=seg.aac` and `-filename=seg.aac` are equivalent.
    pub fn from_args<I, S>(args: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut filename = None;
        let mut verbose = false;
        let mut report = None;

        let mut args = args.into_iter().map(|arg| -> String { arg.into() });
        while let Some(arg) = args.next() {
            let trimmed = arg.trim_start_matches('-');
            if trimmed.len() == arg.len() || trimmed.is_empty() {
                return Err(ConfigError::UnknownOption(arg));
            }
            let (name, inline) = match trimmed.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (trimmed, None),
            };

            match name {
                "filename" | "f" => {
                    filename = Some(option_value(&arg, inline, &mut args)?);
                }
                "report" => {
                    report = Some(PathBuf::from(option_value(&arg, inline, &mut args)?));
                }
                "v" | "verbose" => verbose = true,
                "h" | "help" => return Err(ConfigError::HelpRequested),
                _ => return Err(ConfigError::UnknownOption(arg)),
            }
        }

        let filename = filename
            .filter(|name| !name.is_empty())
            .ok_or(ConfigError::MissingFilename)?;

        Ok(Self {
            filename: PathBuf::from(filename),
            verbose,
            report,
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.filename.is_file() {
            return Err(ConfigError::FileNotFound(
                self.filename.display().to_string(),
            ));
        }
        Ok(())
    }

    /// Log level for this run
    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Info
        } else {
            log::LevelFilter::Error
        }
    }
}

fn option_value(
    arg: &str,
    inline: Option<String>,
    rest: &mut impl Iterator<Item = String>,
) -> ConfigResult<String> {
    inline
        .or_else(|| rest.next())
        .ok_or_else(|| ConfigError::MissingValue(arg.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_go_style_flags() {
        let config = ProbeConfig::from_args(["-filename", "segment0.aac", "-v"]).unwrap();
        assert_eq!(config.filename, PathBuf::from("segment0.aac"));
        assert!(config.verbose);
        assert_eq!(config.report, None);
        assert_eq!(config.log_level(), log::LevelFilter::Info);
    }

    #[test]
    fn test_parse_inline_values() {
        let config =
            ProbeConfig::from_args(["--filename=a.aac", "--report=out.json"]).unwrap();
        assert_eq!(config.filename, PathBuf::from("a.aac"));
        assert_eq!(config.report, Some(PathBuf::from("out.json")));
        assert!(!config.verbose);
        assert_eq!(config.log_level(), log::LevelFilter::Error);
    }

    #[test]
    fn test_missing_filename() {
        assert_eq!(
            ProbeConfig::from_args(["-v"]),
            Err(ConfigError::MissingFilename)
        );
        assert_eq!(
            ProbeConfig::from_args(["-filename="]),
            Err(ConfigError::MissingFilename)
        );
    }

    #[test]
    fn test_missing_value() {
        assert_eq!(
            ProbeConfig::from_args(["-filename"]),
            Err(ConfigError::MissingValue("-filename".to_string()))
        );
    }

    #[test]
    fn test_unknown_and_positional_arguments() {
        assert_eq!(
            ProbeConfig::from_args(["-x"]),
            Err(ConfigError::UnknownOption("-x".to_string()))
        );
        assert_eq!(
            ProbeConfig::from_args(["segment.aac"]),
            Err(ConfigError::UnknownOption("segment.aac".to_string()))
        );
        assert_eq!(
            ProbeConfig::from_args(["--"]),
            Err(ConfigError::UnknownOption("--".to_string()))
        );
    }

    #[test]
    fn test_help() {
        assert_eq!(
            ProbeConfig::from_args(["-filename", "a", "-h"]),
            Err(ConfigError::HelpRequested)
        );
    }

    #[test]
    fn test_validate_missing_file() {
        let config = ProbeConfig::new("/nonexistent/pts-probe/segment.aac");
        assert!(matches!(config.validate(), Err(ConfigError::FileNotFound(_))));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 100,
            failure_persistence: None,
            ..ProptestConfig::default()
        })]

        #[test]
        fn test_filename_round_trips(name in "[a-zA-Z0-9_./]{1,40}", dashes in 1usize..=2) {
            let flag = format!("{}filename", "-".repeat(dashes));
            let config = ProbeConfig::from_args(vec![flag, name.clone()]).unwrap();
            prop_assert_eq!(config.filename, PathBuf::from(name));
        }
    }
}
