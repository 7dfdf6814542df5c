//! Scanner - recursive walk looking for dangling symlinks

use glob::Pattern;
use serde::Serialize;
use shared::{DuneCiError, LinkcheckConfig, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// A symlink whose target does not exist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLink {
    /// Link location, as reached from the scan root
    pub path: PathBuf,
    /// Link target; relative targets are joined to the link's directory
    pub target: PathBuf,
}

/// Walk options
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Paths (relative to the root) matching any pattern are skipped
    pub exclude: Vec<Pattern>,
}

impl ScanOptions {
    /// Compile the glob patterns from the config
    pub fn from_config(config: &LinkcheckConfig) -> Result<Self> {
        let exclude = config
            .exclude
            .iter()
            .map(|p| {
                Pattern::new(p)
                    .map_err(|e| DuneCiError::Config(format!("invalid exclude pattern '{}': {}", p, e)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { exclude })
    }

    fn is_excluded(&self, rel: &Path) -> bool {
        // the repository's own .git directory is never scanned
        if rel == Path::new(".git") {
            return true;
        }
        self.exclude.iter().any(|p| p.matches_path(rel))
    }
}

/// Scan result
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub broken: Vec<BrokenLink>,
    /// Number of symlinks inspected
    pub checked: usize,
}

impl Report {
    pub fn is_clean(&self) -> bool {
        self.broken.is_empty()
    }

    /// Human-readable listing, one `path --> target` per line
    pub fn render(&self) -> String {
        let lines: Vec<String> = self
            .broken
            .iter()
            .map(|b| format!("{} --> {}", b.path.display(), b.target.display()))
            .collect();
        format!("broken symlink(s) found: {}", lines.join("\n"))
    }
}

fn resolve_target(link: &Path) -> Result<PathBuf> {
    let target = fs::read_link(link)?;
    if target.is_absolute() {
        return Ok(target);
    }
    let parent = link.parent().unwrap_or_else(|| Path::new(""));
    Ok(parent.join(target))
}

fn walk(dir: &Path, root: &Path, options: &ScanOptions, report: &mut Report) -> Result<()> {
    let mut entries: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(rd) => rd.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(e) => {
            tracing::warn!("skipping unreadable directory {}: {}", dir.display(), e);
            return Ok(());
        }
    };
    entries.sort();

    for path in entries {
        let rel = path.strip_prefix(root).unwrap_or(&path);
        if options.is_excluded(rel) {
            tracing::debug!("excluded {}", rel.display());
            continue;
        }

        let meta = fs::symlink_metadata(&path)?;
        if meta.file_type().is_symlink() {
            report.checked += 1;
            // metadata() follows the link chain
            if fs::metadata(&path).is_err() {
                let target = resolve_target(&path)?;
                tracing::debug!("broken: {} --> {}", path.display(), target.display());
                report.broken.push(BrokenLink { path, target });
            }
        } else if meta.is_dir() {
            walk(&path, root, options, report)?;
        }
    }

    Ok(())
}

/// Recursively scan `root` without following symlinked directories
pub fn scan(root: &Path, options: &ScanOptions) -> Result<Report> {
    if !root.is_dir() {
        return Err(DuneCiError::Config(format!("{} is not a directory", root.display())));
    }
    let mut report = Report::default();
    walk(root, root, options, &mut report)?;
    report.broken.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(report)
}
