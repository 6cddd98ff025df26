//! Runtime settings shared by every command.
use std::path::{Path, PathBuf};

use strum_macros::{AsRefStr, EnumString};

/// Default manifest file name, looked up in the working directory.
pub const DEFAULT_MANIFEST: &str = "manifest.toml";
/// Default template file name, looked up in the working directory.
pub const DEFAULT_TEMPLATE: &str = "supervisord_template.conf";
/// Default compiled configuration file name, written to the working directory.
pub const DEFAULT_CONFIG: &str = "supervisord.conf";
/// Default daemon launcher program.
pub const DEFAULT_DAEMON_PROGRAM: &str = "supervisord";
/// Default control client program.
pub const DEFAULT_CLIENT_PROGRAM: &str = "supervisorctl";

/// How the liveness probe interprets a failed status query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ProbePolicy {
    /// Only a status query that reaches the daemon counts as running.
    #[default]
    Strict,
    /// Every probe outcome counts as running, including an unreachable socket.
    FailOpen,
}

/// Paths and programs used by the compiler and the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Base configuration supplying the non-program sections.
    pub template_path: PathBuf,
    /// Compiled configuration, handed to both supervisor programs via `-c`.
    pub config_path: PathBuf,
    /// Daemon launcher executable.
    pub daemon_program: String,
    /// Control client executable.
    pub client_program: String,
    /// Liveness probe behaviour.
    pub probe: ProbePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            template_path: PathBuf::from(DEFAULT_TEMPLATE),
            config_path: PathBuf::from(DEFAULT_CONFIG),
            daemon_program: DEFAULT_DAEMON_PROGRAM.to_string(),
            client_program: DEFAULT_CLIENT_PROGRAM.to_string(),
            probe: ProbePolicy::default(),
        }
    }
}

impl Settings {
    /// Anchors relative file paths at `base` so later stages never depend on the
    /// working directory.
    pub fn resolve(mut self, base: &Path) -> Self {
        self.template_path = resolve_path(base, &self.template_path);
        self.config_path = resolve_path(base, &self.config_path);
        self
    }
}

/// Joins `path` onto `base` unless it is already absolute.
pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
