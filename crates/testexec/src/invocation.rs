//! TestInvocation - command line of a single test run

use serde::Serialize;
use shared::{CommandRunner, CommandSpec, Ini, Result, Timer};
use std::path::{Path, PathBuf};

/// Root-level ini key naming the option that introduces the ini file
pub const INIFILE_OPTION_KEY: &str = "__inifile_optionkey";

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// A fully assembled test command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestInvocation {
    pub program: String,
    pub args: Vec<String>,
    /// gtest XML report file
    pub xml_output: PathBuf,
}

/// Result of a finished test run
#[derive(Debug, Clone, Serialize)]
pub struct TestOutcome {
    pub exit_code: i32,
    pub seconds: f64,
}

impl TestInvocation {
    /// Assemble `./<exec> [<optionkey>] [<ini>] <extra..> --gtest_output=xml:<report>`
    pub fn build(exec: &str, ini: Option<&Path>, extra: &[String]) -> Result<Self> {
        let exec_path = Path::new(exec);
        let program = if exec_path.is_absolute() || exec.starts_with("./") {
            exec.to_string()
        } else {
            format!("./{}", exec)
        };

        let mut args = Vec::new();
        let xml_output = match ini {
            Some(ini_path) => {
                let parsed = Ini::parse(&std::fs::read_to_string(ini_path)?)?;
                if let Some(option) = parsed.get("", INIFILE_OPTION_KEY) {
                    args.push(option.to_string());
                }
                args.push(ini_path.display().to_string());
                PathBuf::from(format!("{}_{}.xml", stem(exec_path), stem(ini_path)))
            }
            None => PathBuf::from(format!("{}.xml", stem(exec_path))),
        };

        args.extend(extra.iter().cloned());
        args.push(format!("--gtest_output=xml:{}", xml_output.display()));

        Ok(Self {
            program,
            args,
            xml_output,
        })
    }

    /// The test streams its output to ours while it runs
    pub fn command(&self) -> CommandSpec {
        CommandSpec::new(self.program.as_str())
            .args(self.args.iter().cloned())
            .inherit_stdio()
    }

    /// Run the test and hand back its exit code
    pub fn run(&self, runner: &dyn CommandRunner) -> Result<TestOutcome> {
        let spec = self.command();
        tracing::info!("running {}", spec);

        let timer = Timer::start(self.program.as_str());
        let output = runner.run(&spec)?;
        let seconds = timer.stop();

        if !output.success() {
            tracing::warn!("{} exited with {}", self.program, output.status);
        }

        Ok(TestOutcome {
            exit_code: output.status,
            seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{CommandOutput, RecordingRunner};

    #[test]
    fn test_build_without_ini() {
        let inv = TestInvocation::build("test_grid", None, &[]).unwrap();
        assert_eq!(inv.program, "./test_grid");
        assert_eq!(inv.args, vec!["--gtest_output=xml:test_grid.xml"]);
        assert_eq!(inv.xml_output, PathBuf::from("test_grid.xml"));
    }

    #[test]
    fn test_build_with_ini_option_key() {
        let dir = tempfile::tempdir().unwrap();
        let ini = dir.path().join("la_container.ini");
        std::fs::write(&ini, "__inifile_optionkey = --ini\n\n[grid]\ncells = 8\n").unwrap();

        let extra = vec!["--verbose".to_string()];
        let inv = TestInvocation::build("test_la", Some(&ini), &extra).unwrap();
        assert_eq!(
            inv.args,
            vec![
                "--ini".to_string(),
                ini.display().to_string(),
                "--verbose".to_string(),
                "--gtest_output=xml:test_la_la_container.xml".to_string(),
            ]
        );
    }

    #[test]
    fn test_build_with_plain_ini() {
        let dir = tempfile::tempdir().unwrap();
        let ini = dir.path().join("params.ini");
        std::fs::write(&ini, "[grid]\ncells = 8\n").unwrap();

        let inv = TestInvocation::build("./bin/test_x", Some(&ini), &[]).unwrap();
        assert_eq!(inv.program, "./bin/test_x");
        assert_eq!(inv.args.len(), 2);
        assert_eq!(inv.args[0], ini.display().to_string());
        assert_eq!(inv.xml_output, PathBuf::from("test_x_params.xml"));
    }

    #[test]
    fn test_build_missing_ini_fails() {
        assert!(TestInvocation::build("t", Some(Path::new("/nonexistent/x.ini")), &[]).is_err());
    }

    #[test]
    fn test_run_returns_exit_code() {
        let inv = TestInvocation::build("test_fail", None, &[]).unwrap();
        let runner = RecordingRunner::with_responses([CommandOutput::failed(3, "1 test failed")]);
        let outcome = inv.run(&runner).unwrap();
        assert_eq!(outcome.exit_code, 3);
        assert_eq!(
            runner.command_lines(),
            vec!["./test_fail --gtest_output=xml:test_fail.xml"]
        );
        assert!(runner.calls()[0].inherit_stdio);
    }
}
