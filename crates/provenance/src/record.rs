//! SuperRecord - super-repository identity stored in `.gitsuper`

use crate::submodule::SubmoduleStatus;
use serde::Serialize;
use shared::{run_checked, CommandRunner, CommandSpec, DuneCiError, Ini, Result};
use std::path::Path;

/// File name written at the root of the nested checkout
pub const GITSUPER_FILE: &str = ".gitsuper";

/// INI section holding the record
pub const SECTION: &str = "supermodule";

/// Remote, submodule status and commit of the super-repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuperRecord {
    pub remote: String,
    /// Raw `git submodule status` output
    pub status: String,
    pub commit: String,
}

impl SuperRecord {
    /// Query git inside `super_dir`
    pub fn capture(runner: &dyn CommandRunner, super_dir: &Path) -> Result<Self> {
        let git = |args: &[&str]| -> Result<String> {
            let spec = CommandSpec::new("git")
                .args(args.iter().copied())
                .current_dir(super_dir);
            Ok(run_checked(runner, &spec)?.trim_end().to_string())
        };

        let remote = git(&["remote", "get-url", "origin"])?;
        let status = git(&["submodule", "status"])?;
        let commit = git(&["rev-parse", "HEAD"])?;

        tracing::debug!("captured super-repository {} at {}", remote, commit);

        Ok(Self {
            remote,
            status,
            commit,
        })
    }

    /// INI form: one `[supermodule]` section
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        ini.set(SECTION, "remote", self.remote.as_str());
        ini.set(SECTION, "status", self.status.as_str());
        ini.set(SECTION, "commit", self.commit.as_str());
        ini
    }

    /// Read back from INI
    pub fn from_ini(ini: &Ini) -> Result<Self> {
        let field = |key: &str| {
            ini.get(SECTION, key)
                .map(str::to_string)
                .ok_or_else(|| DuneCiError::Parse(format!("missing '{}' in [{}]", key, SECTION)))
        };
        Ok(Self {
            remote: field("remote")?,
            status: field("status")?,
            commit: field("commit")?,
        })
    }

    /// Write the record to `path`
    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_ini().to_string())?;
        tracing::info!("recorded super-repository commit {} in {}", self.commit, path.display());
        Ok(())
    }

    /// Read a record from `path`
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ini(&Ini::parse(&text)?)
    }

    /// Parsed submodule lines
    pub fn submodules(&self) -> Result<Vec<SubmoduleStatus>> {
        SubmoduleStatus::parse_all(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{CommandOutput, RecordingRunner};

    const STATUS: &str = " 1a2b3c4d dune-common (v2.7.0)\n+5e6f7a8b dune-xt (heads/master)\n-9c0d1e2f dune-gdt\n";

    fn runner() -> RecordingRunner {
        RecordingRunner::with_responses([
            CommandOutput::ok("https://example.org/dune/super.git\n"),
            CommandOutput::ok(STATUS),
            CommandOutput::ok("0123456789abcdef\n"),
        ])
    }

    #[test]
    fn test_capture_runs_git_in_super_dir() {
        let runner = runner();
        let record = SuperRecord::capture(&runner, Path::new("/work/super")).unwrap();

        assert_eq!(record.remote, "https://example.org/dune/super.git");
        assert_eq!(record.commit, "0123456789abcdef");
        // leading state marker of the first line survives
        assert!(record.status.starts_with(" 1a2b3c4d"));
        assert!(!record.status.ends_with('\n'));

        assert_eq!(
            runner.command_lines(),
            vec!["git remote get-url origin", "git submodule status", "git rev-parse HEAD"]
        );
        assert!(runner
            .calls()
            .iter()
            .all(|c| c.cwd.as_deref() == Some(Path::new("/work/super"))));
    }

    #[test]
    fn test_capture_fails_outside_git() {
        let runner = RecordingRunner::with_responses([CommandOutput::failed(2, "error: No such remote 'origin'")]);
        let err = SuperRecord::capture(&runner, Path::new(".")).unwrap_err();
        assert_eq!(err.exit_code(), Some(2));
    }

    #[test]
    fn test_ini_layout() {
        let record = SuperRecord::capture(&runner(), Path::new(".")).unwrap();
        let text = record.to_ini().to_string();
        assert_eq!(
            text,
            "[supermodule]\n\
             remote = https://example.org/dune/super.git\n\
             status =  1a2b3c4d dune-common (v2.7.0)\n\
             \t+5e6f7a8b dune-xt (heads/master)\n\
             \t-9c0d1e2f dune-gdt\n\
             commit = 0123456789abcdef\n\n"
        );
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(GITSUPER_FILE);

        let record = SuperRecord::capture(&runner(), Path::new(".")).unwrap();
        record.write(&path).unwrap();

        let read = SuperRecord::read(&path).unwrap();
        assert_eq!(read.remote, record.remote);
        assert_eq!(read.commit, record.commit);

        let submodules = read.submodules().unwrap();
        assert_eq!(submodules.len(), 3);
        assert_eq!(submodules[0].path, "dune-common");
        assert_eq!(submodules[1].path, "dune-xt");
    }

    #[test]
    fn test_read_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(GITSUPER_FILE);
        std::fs::write(&path, "[supermodule]\nremote = x\n").unwrap();
        assert!(matches!(SuperRecord::read(&path), Err(DuneCiError::Parse(_))));
    }
}
