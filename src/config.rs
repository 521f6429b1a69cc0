use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::normalize::UnsupportedPolicy;
use crate::pretty::PrettyOptions;

pub const IGNORE_ENV: &str = "DECORATOR_SEARCH_IGNORE";
pub const DEFAULT_WIDTH: usize = 80;

/// Everything the binary needs, resolved from flags, then environment, then
/// defaults.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub root: PathBuf,
    pub ignore: BTreeSet<String>,
    pub jobs: Option<usize>,
    pub policy: UnsupportedPolicy,
    pub pretty: PrettyOptions,
}

impl SearchConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let env_ignore = env::var(IGNORE_ENV).ok();
        let no_color_env = env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        let columns = env::var("COLUMNS").ok();

        Ok(Self {
            root: resolve_root(&cli.folder)?,
            ignore: resolve_ignore(&cli.ignore, env_ignore.as_deref()),
            jobs: resolve_jobs(cli.jobs)?,
            policy: if cli.keep_unsupported {
                UnsupportedPolicy::KeepName
            } else {
                UnsupportedPolicy::Drop
            },
            pretty: PrettyOptions {
                color: resolve_color(cli.no_color, no_color_env, std::io::stdout().is_terminal()),
                width: resolve_width(cli.width, columns.as_deref()),
            },
        })
    }
}

/// The scan root must be an existing, listable directory.
pub fn resolve_root(folder: &Path) -> Result<PathBuf> {
    let meta = std::fs::metadata(folder)
        .with_context(|| format!("Failed to access folder: {}", folder.display()))?;
    if !meta.is_dir() {
        anyhow::bail!("Not a directory: {}", folder.display());
    }
    std::fs::read_dir(folder)
        .with_context(|| format!("Failed to read folder: {}", folder.display()))?;
    Ok(folder.to_path_buf())
}

/// Flag values plus the comma separated environment list; blanks dropped.
pub fn resolve_ignore(flags: &[String], env_value: Option<&str>) -> BTreeSet<String> {
    flags
        .iter()
        .map(String::as_str)
        .chain(env_value.into_iter().flat_map(|v| v.split(',')))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn resolve_jobs(jobs: Option<usize>) -> Result<Option<usize>> {
    match jobs {
        Some(0) => anyhow::bail!("--jobs must be at least 1"),
        other => Ok(other),
    }
}

pub fn resolve_color(no_color_flag: bool, no_color_env: bool, stdout_is_terminal: bool) -> bool {
    !no_color_flag && !no_color_env && stdout_is_terminal
}

pub fn resolve_width(flag: Option<usize>, columns: Option<&str>) -> usize {
    flag.or_else(|| columns.and_then(|c| c.trim().parse().ok()))
        .filter(|w| *w > 0)
        .unwrap_or(DEFAULT_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignore_merges_flags_and_environment() {
        let flags = vec!["test".to_string(), "build".to_string()];
        let ignore = resolve_ignore(&flags, Some("target, ,.git,test"));
        let names: Vec<&str> = ignore.iter().map(String::as_str).collect();
        assert_eq!(names, vec![".git", "build", "target", "test"]);
        assert!(resolve_ignore(&[], None).is_empty());
    }

    #[test]
    fn color_needs_a_terminal_and_no_opt_out() {
        assert!(resolve_color(false, false, true));
        assert!(!resolve_color(true, false, true));
        assert!(!resolve_color(false, true, true));
        assert!(!resolve_color(false, false, false));
    }

    #[test]
    fn width_prefers_flag_then_columns() {
        assert_eq!(resolve_width(Some(100), Some("120")), 100);
        assert_eq!(resolve_width(None, Some("120")), 120);
        assert_eq!(resolve_width(None, Some("wide")), DEFAULT_WIDTH);
        assert_eq!(resolve_width(Some(0), None), DEFAULT_WIDTH);
    }

    #[test]
    fn zero_jobs_is_rejected() {
        assert!(resolve_jobs(Some(0)).is_err());
        assert_eq!(resolve_jobs(Some(4)).unwrap(), Some(4));
        assert_eq!(resolve_jobs(None).unwrap(), None);
    }

    #[test]
    fn root_must_be_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("A.java");
        std::fs::write(&file, "class A {}").unwrap();

        assert!(resolve_root(dir.path()).is_ok());
        assert!(resolve_root(&file).is_err());
        assert!(resolve_root(&dir.path().join("missing")).is_err());
    }
}
