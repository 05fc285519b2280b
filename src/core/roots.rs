//! Root specification resolution
//!
//! Turns what the user typed (or the configured defaults) into an ordered
//! map of display alias to absolute search paths. A display alias is kept
//! exactly as typed (`$work`, `~/src`, `../other`) so output can later be
//! written relative to it.

use std::io;
use std::path::{Component, Path, PathBuf};

use super::error::SweepError;
use super::settings::Settings;

/// One display alias and the absolute paths it stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootSpec {
    pub display_alias: String,
    pub resolved_paths: Vec<PathBuf>,
}

/// Ordered mapping of display alias to resolved paths
///
/// Insertion order is preserved; inserting an existing alias merges its paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootMap {
    specs: Vec<RootSpec>,
}

impl RootMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, alias: impl Into<String>, paths: impl IntoIterator<Item = PathBuf>) {
        let alias = alias.into();
        let index = match self.specs.iter().position(|s| s.display_alias == alias) {
            Some(index) => index,
            None => {
                self.specs.push(RootSpec {
                    display_alias: alias,
                    resolved_paths: Vec::new(),
                });
                self.specs.len() - 1
            }
        };
        let resolved = &mut self.specs[index].resolved_paths;
        for path in paths {
            if !resolved.contains(&path) {
                resolved.push(path);
            }
        }
    }

    pub fn get(&self, alias: &str) -> Option<&[PathBuf]> {
        self.specs
            .iter()
            .find(|s| s.display_alias == alias)
            .map(|s| s.resolved_paths.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &RootSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Resolves root arguments against the process environment
pub fn resolve_roots(args: &[String], settings: &Settings) -> Result<RootMap, SweepError> {
    resolve_roots_with(args, &settings.default_roots, |name| {
        std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
    })
}

/// Resolves root arguments with an explicit environment lookup
///
/// With no `args`, every name in `default_roots` becomes alias `$name`;
/// undefined defaults are skipped. Explicit `$NAME` references that are
/// undefined fail the whole resolution.
pub fn resolve_roots_with<F>(
    args: &[String],
    default_roots: &[String],
    lookup: F,
) -> Result<RootMap, SweepError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut roots = RootMap::new();

    if args.is_empty() {
        for name in default_roots {
            let name = name.trim_start_matches('$');
            match lookup(name) {
                Some(value) => roots.insert(format!("${name}"), split_paths(&value)?),
                None => tracing::debug!(variable = name, "default root not set, skipping"),
            }
        }
        return Ok(roots);
    }

    for token in args.iter().flat_map(|arg| arg.split_whitespace()) {
        let token = token.trim_matches('\'');
        if token.is_empty() {
            continue;
        }
        match token.strip_prefix('$') {
            Some(name) if !name.is_empty() => {
                let value = lookup(name).ok_or_else(|| SweepError::UndefinedVariable {
                    name: name.to_string(),
                    token: token.to_string(),
                })?;
                roots.insert(token, split_paths(&value)?);
            }
            _ => roots.insert(token, [expand_path(token)?]),
        }
    }

    Ok(roots)
}

fn split_paths(value: &str) -> Result<Vec<PathBuf>, SweepError> {
    value.split_whitespace().map(expand_path).collect()
}

/// Expands `~`, anchors relative paths at the current directory and
/// normalizes `.`/`..` without touching the filesystem
///
/// Fails for a relative path when the current directory is unavailable.
pub fn expand_path(token: &str) -> Result<PathBuf, SweepError> {
    let expanded = match token.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(token),
        },
        _ => PathBuf::from(token),
    };

    anchor(token, expanded, std::env::current_dir)
}

fn anchor(
    token: &str,
    path: PathBuf,
    current_dir: impl FnOnce() -> io::Result<PathBuf>,
) -> Result<PathBuf, SweepError> {
    if path.is_absolute() {
        return Ok(normalize(&path));
    }
    let base = current_dir().map_err(|source| SweepError::UnresolvedRoot {
        token: token.to_string(),
        source,
    })?;
    Ok(normalize(&base.join(path)))
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
