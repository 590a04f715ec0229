//! Saved defaults: an rc-file holding command-line flag tokens.
//!
//! The global file sits in the platform config directory. A `.richnoterc`
//! in the working directory overrides it, and flags given on the command
//! line override both.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;

const APP_DIR: &str = "richnote";
const LOCAL_FILE: &str = ".richnoterc";

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Stored markup
    Markup,
    /// Text without styles
    Plain,
    /// Text, spans and pending style as JSON
    Json,
    /// Text with terminal attributes
    Ansi,
}

/// Flags that can be saved as defaults.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub stats: bool,
    pub format: Option<OutputFormat>,
    pub log_file: Option<PathBuf>,
}

impl ConfigFlags {
    /// Layer `other` on top: switches accumulate, valued flags from `other`
    /// win when set.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            stats: self.stats || other.stats,
            format: other.format.or(self.format),
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
        }
    }

    /// One line per set flag, in the form [`parse_flag_tokens`] reads back.
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.stats {
            lines.push("--stats".to_string());
        }
        if let Some(value) = self.format.and_then(|format| format.to_possible_value()) {
            lines.push(format!("--format {}", value.get_name()));
        }
        if let Some(path) = &self.log_file {
            lines.push(format!("--log-file {}", path.display()));
        }
        lines
    }
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(PathBuf::from)
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join("Library").join("Application Support"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
    }
}

/// `<config dir>/richnote/config`, or the local file when no config
/// directory can be found.
pub fn global_config_path() -> PathBuf {
    platform_config_dir().map_or_else(
        || PathBuf::from(LOCAL_FILE),
        |dir| dir.join(APP_DIR).join("config"),
    )
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(LOCAL_FILE)
}

/// Read flags from an rc-file. A missing file yields no flags.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(ConfigFlags::default()),
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to read config {}", path.display()));
        }
    };
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    let mut content = String::from("# richnote defaults (saved with --save)\n");
    for line in flags.to_lines() {
        content.push_str(&line);
        content.push('\n');
    }
    fs::write(path, content).with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => {
            Err(err).with_context(|| format!("Failed to remove {}", path.display()))
        }
        _ => Ok(()),
    }
}

/// Pick the saveable flags out of a token list. Both `--flag value` and
/// `--flag=value` are accepted; everything else is skipped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut tokens = tokens.iter().map(String::as_str);
    while let Some(token) = tokens.next() {
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        match name {
            "--stats" => flags.stats = true,
            "--format" | "-f" => {
                if let Some(value) = inline.or_else(|| tokens.next()) {
                    flags.format = OutputFormat::from_str(value, true).ok();
                }
            }
            "--log-file" => {
                if let Some(value) = inline.or_else(|| tokens.next()) {
                    flags.log_file = Some(PathBuf::from(value));
                }
            }
            _ => {}
        }
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let flags = parse_flag_tokens(&tokens(&[
            "richnote",
            "--stats",
            "--format",
            "json",
            "--log-file=edit.log",
            "--write",
            "note.txt",
        ]));
        assert!(flags.stats);
        assert_eq!(flags.format, Some(OutputFormat::Json));
        assert_eq!(flags.log_file, Some(PathBuf::from("edit.log")));
    }

    #[test]
    fn test_parse_flag_tokens_short_format_and_case() {
        let flags = parse_flag_tokens(&tokens(&["-f", "PLAIN"]));
        assert_eq!(flags.format, Some(OutputFormat::Plain));
    }

    #[test]
    fn test_unknown_format_is_ignored() {
        assert_eq!(parse_flag_tokens(&tokens(&["--format=html"])).format, None);
    }

    #[test]
    fn test_trailing_valued_flag_without_value() {
        assert_eq!(parse_flag_tokens(&tokens(&["--log-file"])), ConfigFlags::default());
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            stats: true,
            format: Some(OutputFormat::Plain),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            format: Some(OutputFormat::Markup),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.stats);
        assert_eq!(merged.format, Some(OutputFormat::Markup));
    }

    #[test]
    fn test_saved_lines_parse_back() {
        let flags = ConfigFlags {
            stats: true,
            format: Some(OutputFormat::Ansi),
            log_file: Some(PathBuf::from("edit.log")),
        };
        let lines = flags.to_lines();
        assert_eq!(lines, vec!["--stats", "--format ansi", "--log-file edit.log"]);
        let reparsed: Vec<String> = lines
            .iter()
            .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
            .collect();
        assert_eq!(parse_flag_tokens(&reparsed), flags);
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(".richnoterc");
        let flags = ConfigFlags {
            stats: true,
            format: Some(OutputFormat::Markup),
            log_file: None,
        };

        save_config_flags(&path, &flags).unwrap();
        assert_eq!(load_config_flags(&path).unwrap(), flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
        clear_config_flags(&path).unwrap();
    }

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempdir().unwrap();
        let loaded = load_config_flags(&dir.path().join("absent")).unwrap();
        assert_eq!(loaded, ConfigFlags::default());
    }
}
