//! Compiler invocation and side-car report files

use crate::graph::{format_cycle, IncludeGraph};
use shared::{CommandRunner, CommandSpec, DuneCiError, Result};
use std::path::{Path, PathBuf};

const SOURCE_EXTENSIONS: &[&str] = &["cc", "cxx", "cpp", "c", "C"];

/// Run the compiler, writing stdout then stderr to `out_file`
///
/// Returns the compiler's exit status.
pub fn capture(runner: &dyn CommandRunner, compiler_cmd: &[String], out_file: &Path) -> Result<i32> {
    let (program, args) = compiler_cmd
        .split_first()
        .ok_or_else(|| DuneCiError::Config("no compiler command given".to_string()))?;
    let spec = CommandSpec::new(program.as_str()).args(args.iter().cloned());

    let output = runner.run(&spec)?;
    std::fs::write(out_file, output.combined())?;
    if !output.success() {
        tracing::warn!("compiler exited with status {}", output.status);
    }
    Ok(output.status)
}

/// Last compiler argument naming a C/C++ source file, else `<root>`
pub fn guess_root(compiler_cmd: &[String]) -> String {
    compiler_cmd
        .iter()
        .skip(1)
        .rev()
        .find(|arg| {
            Path::new(arg)
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| SOURCE_EXTENSIONS.contains(&e))
        })
        .cloned()
        .unwrap_or_else(|| "<root>".to_string())
}

/// `<path><suffix>`, e.g. `trace.txt` -> `trace.txt.cycles`
pub fn side_car_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Write `<out_file>.cycles`, one cycle per line; nothing when acyclic
pub fn write_cycles(graph: &IncludeGraph, out_file: &Path) -> Result<Option<PathBuf>> {
    let cycles = graph.named_cycles();
    if cycles.is_empty() {
        return Ok(None);
    }

    let path = side_car_path(out_file, ".cycles");
    let text: String = cycles
        .iter()
        .map(|c| format!("{}\n", format_cycle(c)))
        .collect();
    std::fs::write(&path, text)?;
    tracing::warn!("{} include cycle(s) written to {}", cycles.len(), path.display());
    Ok(Some(path))
}

/// Write `<out_file>.dot`
pub fn write_dot(graph: &IncludeGraph, out_file: &Path) -> Result<PathBuf> {
    let path = side_car_path(out_file, ".dot");
    std::fs::write(&path, graph.to_dot())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{IncludeTree, ParseOptions};
    use shared::{CommandOutput, RecordingRunner};

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_capture_writes_combined_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("trace.txt");
        let runner = RecordingRunner::with_responses([CommandOutput {
            status: 0,
            stdout: "compiled\n".to_string(),
            stderr: ". a.hh\n.. b.hh\n".to_string(),
        }]);

        let status = capture(&runner, &argv(&["g++", "-H", "-c", "test.cc"]), &out).unwrap();
        assert_eq!(status, 0);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "compiled\n. a.hh\n.. b.hh\n");
        assert_eq!(runner.command_lines(), vec!["g++ -H -c test.cc"]);
    }

    #[test]
    fn test_capture_returns_compiler_status() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("trace.txt");
        let runner = RecordingRunner::with_responses([CommandOutput::failed(1, "error: boom\n")]);
        assert_eq!(capture(&runner, &argv(&["g++", "x.cc"]), &out).unwrap(), 1);
        assert!(capture(&runner, &[], &out).is_err());
    }

    #[test]
    fn test_guess_root() {
        assert_eq!(guess_root(&argv(&["g++", "-o", "t.o", "-c", "dune/xt/test.cc"])), "dune/xt/test.cc");
        assert_eq!(guess_root(&argv(&["cc", "a.c", "b.cpp", "-o", "x"])), "b.cpp");
        assert_eq!(guess_root(&argv(&["g++", "-E", "header.hh"])), "<root>");
        assert_eq!(guess_root(&argv(&["main.cc"])), "<root>");
    }

    #[test]
    fn test_side_car_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("trace.txt");

        let acyclic = IncludeTree::parse(". a.hh\n.. b.hh\n", &ParseOptions::default());
        assert_eq!(write_cycles(&acyclic.graph, &out).unwrap(), None);
        assert!(!side_car_path(&out, ".cycles").exists());

        let cyclic = IncludeTree::parse(". a.hh\n.. b.hh\n... a.hh\n", &ParseOptions::default());
        let path = write_cycles(&cyclic.graph, &out).unwrap().unwrap();
        assert_eq!(path, dir.path().join("trace.txt.cycles"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a.hh -> b.hh -> a.hh\n");

        let dot = write_dot(&cyclic.graph, &out).unwrap();
        assert!(std::fs::read_to_string(dot).unwrap().contains("\"a.hh\" -> \"b.hh\""));
    }
}
