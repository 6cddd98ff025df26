//! Error handling for supman.
use std::{io, path::PathBuf};

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, SupmanError>;

/// Defines all possible errors raised while compiling configuration or driving supervisor.
#[derive(Debug, Error)]
pub enum SupmanError {
    /// The manifest path does not exist.
    #[error("Manifest not found: {}", path.display())]
    ManifestNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// Error reading the manifest file.
    #[error("Failed to read manifest {}: {source}", path.display())]
    ManifestRead {
        /// Manifest path.
        path: PathBuf,
        /// The underlying error that occurred.
        #[source]
        source: io::Error,
    },

    /// Error parsing the manifest as TOML.
    #[error("Invalid TOML in manifest {}: {source}", path.display())]
    ManifestParse {
        /// Manifest path.
        path: PathBuf,
        /// The underlying error that occurred.
        #[source]
        source: toml::de::Error,
    },

    /// A required top-level manifest key is absent.
    #[error("Manifest is missing required key '{key}'")]
    MissingKey {
        /// Name of the absent key.
        key: String,
    },

    /// A service entry is not a table of settings.
    #[error("Service '{service}' must be a table of settings")]
    InvalidService {
        /// Offending service name.
        service: String,
    },

    /// A service name cannot be written as a section header.
    #[error("Service name {service:?} cannot be used as a section name")]
    InvalidServiceName {
        /// Offending service name.
        service: String,
    },

    /// A setting key would be read back differently from how it was written.
    #[error("Service '{service}' has setting {key:?} that cannot be written as a config key")]
    InvalidSettingKey {
        /// Service declaring the key.
        service: String,
        /// Offending key.
        key: String,
    },

    /// The template path does not exist.
    #[error("Template not found: {}", path.display())]
    TemplateNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// Error reading the template file.
    #[error("Failed to read template {}: {source}", path.display())]
    TemplateRead {
        /// Template path.
        path: PathBuf,
        /// The underlying error that occurred.
        #[source]
        source: io::Error,
    },

    /// The template is not a valid sectioned document.
    #[error("Invalid template {}: {source}", path.display())]
    TemplateParse {
        /// Template path.
        path: PathBuf,
        /// The underlying error that occurred.
        #[source]
        source: DocumentError,
    },

    /// Error writing the compiled configuration.
    #[error("Failed to write config {}: {source}", path.display())]
    ConfigWrite {
        /// Output path.
        path: PathBuf,
        /// The underlying error that occurred.
        #[source]
        source: io::Error,
    },

    /// An external supervisor command exited unsuccessfully.
    #[error("Command `{command}` failed with {}{}", describe_code(*code), describe_output(stdout, stderr))]
    SupervisorCommand {
        /// Rendered command line.
        command: String,
        /// Exit code, if the process exited normally.
        code: Option<i32>,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },

    /// The launcher or control client is not on the execution path.
    #[error("Executable not found: {program}")]
    ExecutableNotFound {
        /// Program that could not be located.
        program: String,
    },

    /// Any other failure to spawn an external program.
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        /// Program that failed to spawn.
        program: String,
        /// The underlying error that occurred.
        #[source]
        source: io::Error,
    },
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "termination by signal".to_string(),
    }
}

fn describe_output(stdout: &str, stderr: &str) -> String {
    let mut detail = String::new();
    for stream in [stdout.trim(), stderr.trim()] {
        if !stream.is_empty() {
            detail.push('\n');
            detail.push_str(stream);
        }
    }
    detail
}

/// Syntax error in a sectioned document.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct DocumentError {
    /// One-based line number of the offending line.
    pub line: usize,
    /// Human-readable description.
    pub message: String,
}

impl DocumentError {
    pub(crate) fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}
