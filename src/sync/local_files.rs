// sitesync/src/sync/local_files.rs
use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use walkdir::WalkDir;

use crate::config::IncludePattern;

impl IncludePattern {
    /// Compiles a shell glob over `/`-separated relative paths.
    ///
    /// `*` and `?` never cross a `/`, `**/` spans any number of directories.
    pub fn compile(glob: &str) -> Result<Self, globset::Error> {
        let matcher = glob_matcher(glob)?;
        let dot_segments = glob
            .split('/')
            .filter(|segment| segment.starts_with('.'))
            .map(glob_matcher)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(IncludePattern { glob: glob.to_string(), matcher, dot_segments })
    }

    /// Hidden components (leading `.`) are only reachable through a glob
    /// segment that itself starts with `.`, as with shell globbing.
    pub fn admits(&self, path: &str) -> bool {
        path.split('/')
            .filter(|component| component.starts_with('.'))
            .all(|component| self.dot_segments.iter().any(|m| m.is_match(component)))
            && self.matcher.is_match(path)
    }
}

fn glob_matcher(glob: &str) -> Result<GlobMatcher, globset::Error> {
    Ok(GlobBuilder::new(glob)
        .literal_separator(true)
        .backslash_escape(true)
        .build()?
        .compile_matcher())
}

/// Lists files under `root` matching any include pattern and none of the exclude patterns.
///
/// Paths are relative to `root` with `/` separators. Directories are never returned.
/// Exclude patterns are searched anywhere in the relative path, not anchored.
/// Files whose names are not valid UTF-8 cannot become object keys and are skipped.
pub fn enumerate_local_files(
    root: &Path,
    include: &[IncludePattern],
    exclude: &[Regex],
) -> Result<Vec<String>> {
    let mut candidates = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk directory {}", root.display()))?;
        // `Path::is_file` follows symlinks, matching what a browser would be served.
        if !entry.path().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .with_context(|| format!("{} is not under {}", entry.path().display(), root.display()))?;
        let components = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<Vec<_>>>();
        match components {
            Some(components) => candidates.push(components.join("/")),
            None => tracing::warn!(
                path = %entry.path().display(),
                "skipping file with a non UTF-8 name"
            ),
        }
    }

    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for pattern in include {
        let mut matched = 0;
        for path in candidates.iter().filter(|p| pattern.admits(p)) {
            matched += 1;
            if seen.insert(path.as_str()) {
                files.push(path.clone());
            }
        }
        tracing::debug!(glob = %pattern.glob, matched, "applied include pattern");
    }

    files.retain(|file| !exclude.iter().any(|pattern| pattern.is_match(file)));
    Ok(files)
}
