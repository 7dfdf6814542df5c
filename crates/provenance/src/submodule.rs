//! Parsing of `git submodule status` lines

use serde::Serialize;
use shared::{DuneCiError, Result};

/// State prefix of a `git submodule status` line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmoduleState {
    /// ` ` - checked out at the recorded commit
    UpToDate,
    /// `+` - checked out commit differs from the recorded one
    Modified,
    /// `-` - not initialized
    Uninitialized,
    /// `U` - merge conflicts
    Conflict,
}

impl SubmoduleState {
    fn from_marker(c: char) -> Option<Self> {
        match c {
            ' ' => Some(Self::UpToDate),
            '+' => Some(Self::Modified),
            '-' => Some(Self::Uninitialized),
            'U' => Some(Self::Conflict),
            _ => None,
        }
    }

    pub fn marker(&self) -> char {
        match self {
            Self::UpToDate => ' ',
            Self::Modified => '+',
            Self::Uninitialized => '-',
            Self::Conflict => 'U',
        }
    }
}

/// One submodule entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmoduleStatus {
    pub state: SubmoduleState,
    pub sha: String,
    pub path: String,
    /// `git describe` output, without the parentheses
    pub describe: Option<String>,
}

impl SubmoduleStatus {
    /// Parse one line
    ///
    /// A line without a state marker (as left behind when an INI value was
    /// trimmed) counts as up to date.
    pub fn parse(line: &str) -> Result<Self> {
        let mut chars = line.chars();
        let (state, rest) = match chars.next().and_then(SubmoduleState::from_marker) {
            Some(state) => (state, chars.as_str()),
            None => (SubmoduleState::UpToDate, line),
        };

        let mut parts = rest.trim().splitn(3, ' ');
        let sha = parts.next().filter(|s| !s.is_empty());
        let path = parts.next().filter(|s| !s.is_empty());
        let (sha, path) = match (sha, path) {
            (Some(sha), Some(path)) if sha.chars().all(|c| c.is_ascii_hexdigit()) => (sha, path),
            _ => {
                return Err(DuneCiError::Parse(format!(
                    "invalid submodule status line '{}'",
                    line
                )))
            }
        };

        let describe = parts
            .next()
            .map(|d| d.trim().trim_start_matches('(').trim_end_matches(')').to_string())
            .filter(|d| !d.is_empty());

        Ok(Self {
            state,
            sha: sha.to_string(),
            path: path.to_string(),
            describe,
        })
    }

    /// Parse every non-empty line
    pub fn parse_all(status: &str) -> Result<Vec<Self>> {
        status
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(Self::parse)
            .collect()
    }
}
