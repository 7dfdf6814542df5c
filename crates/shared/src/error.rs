//! Error types for dune-ci

use thiserror::Error;

/// Error thrown when a subprocess exits unsuccessfully
#[derive(Debug, Error)]
#[error("Command '{program} {}' failed with exit code {code}: {}", args.join(" "), output.trim())]
pub struct CommandFailedError {
    pub program: String,
    pub args: Vec<String>,
    pub code: i32,
    pub output: String,
}

impl CommandFailedError {
    /// Full command line, for log messages
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(|s| s.as_str()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Error thrown when a template references a key missing from the context
#[derive(Debug, Error)]
#[error("Unresolved placeholder '{{{{ {placeholder} }}}}'. Available keys: {}", available_keys.join(", "))]
pub struct UnresolvedPlaceholderError {
    pub placeholder: String,
    pub available_keys: Vec<String>,
}

/// General dune-ci error type
#[derive(Debug, Error)]
pub enum DuneCiError {
    #[error(transparent)]
    CommandFailed(#[from] CommandFailedError),

    #[error(transparent)]
    UnresolvedPlaceholder(#[from] UnresolvedPlaceholderError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("INI error on line {line}: {message}")]
    Ini { line: usize, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DuneCiError {
    /// Exit code of a failed subprocess, if this error wraps one
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            DuneCiError::CommandFailed(e) => Some(e.code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DuneCiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_message() {
        let err = CommandFailedError {
            program: "git".to_string(),
            args: vec!["rev-parse".to_string(), "HEAD".to_string()],
            code: 128,
            output: "fatal: not a git repository\n".to_string(),
        };
        assert_eq!(err.command_line(), "git rev-parse HEAD");
        assert_eq!(
            err.to_string(),
            "Command 'git rev-parse HEAD' failed with exit code 128: fatal: not a git repository"
        );

        let err: DuneCiError = err.into();
        assert_eq!(err.exit_code(), Some(128));
    }

    #[test]
    fn test_unresolved_placeholder_message() {
        let err = UnresolvedPlaceholderError {
            placeholder: "compiler.fc".to_string(),
            available_keys: vec!["compiler".to_string(), "image".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Unresolved placeholder '{{ compiler.fc }}'. Available keys: compiler, image"
        );
    }
}
