//! Command-line interface for supman.
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::{
    dispatch::{CommandInvocation, ControlVerb},
    settings::{
        DEFAULT_CLIENT_PROGRAM, DEFAULT_CONFIG, DEFAULT_DAEMON_PROGRAM, DEFAULT_MANIFEST,
        DEFAULT_TEMPLATE, ProbePolicy, Settings,
    },
};

/// Log level accepted either by name ("warn", "debug", ...) or as a number from
/// 0 (off) to 5 (trace).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogLevelArg(LevelFilter);

impl LogLevelArg {
    /// Directive suitable for an `EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        match self.0 {
            LevelFilter::OFF => "off",
            LevelFilter::ERROR => "error",
            LevelFilter::WARN => "warn",
            LevelFilter::INFO => "info",
            LevelFilter::DEBUG => "debug",
            LevelFilter::TRACE => "trace",
        }
    }
}

const LEVELS: [LevelFilter; 6] = [
    LevelFilter::OFF,
    LevelFilter::ERROR,
    LevelFilter::WARN,
    LevelFilter::INFO,
    LevelFilter::DEBUG,
    LevelFilter::TRACE,
];

impl FromStr for LogLevelArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if let Ok(number) = trimmed.parse::<usize>() {
            return LEVELS
                .get(number)
                .copied()
                .map(LogLevelArg)
                .ok_or_else(|| format!("log level {number} out of range (expected 0-5)"));
        }

        let level = match trimmed.to_ascii_lowercase().as_str() {
            "off" => LevelFilter::OFF,
            "error" => LevelFilter::ERROR,
            "warn" | "warning" => LevelFilter::WARN,
            "info" => LevelFilter::INFO,
            "debug" => LevelFilter::DEBUG,
            "trace" => LevelFilter::TRACE,
            _ => return Err(format!("invalid log level '{trimmed}'")),
        };
        Ok(LogLevelArg(level))
    }
}

/// Command-line interface for supman.
#[derive(Parser)]
#[command(name = "supman", version, author)]
#[command(
    about = "Compile a service manifest into supervisord configuration and control its services",
    long_about = None
)]
pub struct Cli {
    /// Override the logging verbosity for this invocation only.
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Template supplying the non-program sections.
    #[arg(long, env = "SUPMAN_TEMPLATE", default_value = DEFAULT_TEMPLATE, global = true)]
    pub template: PathBuf,

    /// Compiled supervisord configuration.
    #[arg(short, long, env = "SUPMAN_CONFIG", default_value = DEFAULT_CONFIG, global = true)]
    pub config: PathBuf,

    /// Daemon launcher executable.
    #[arg(long, env = "SUPMAN_SUPERVISORD", default_value = DEFAULT_DAEMON_PROGRAM, global = true)]
    pub supervisord: String,

    /// Control client executable.
    #[arg(long, env = "SUPMAN_SUPERVISORCTL", default_value = DEFAULT_CLIENT_PROGRAM, global = true)]
    pub supervisorctl: String,

    /// How to read a failed status probe: `strict` treats it as not running,
    /// `fail-open` always assumes the daemon is up.
    #[arg(long, value_name = "POLICY", env = "SUPMAN_PROBE", default_value = "strict", global = true)]
    pub probe: ProbePolicy,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for supman.
#[derive(Subcommand)]
pub enum Commands {
    /// Create the supervisor config file.
    Init {
        /// Path to a manifest.toml file.
        #[arg(short, long, env = "SUPMAN_MANIFEST", default_value = DEFAULT_MANIFEST)]
        manifest: PathBuf,
    },

    /// Start services (all when none are named).
    Start {
        /// Services to start.
        services: Vec<String>,
    },

    /// Stop services (all when none are named).
    Stop {
        /// Services to stop.
        services: Vec<String>,
    },

    /// Restart services (all when none are named).
    Restart {
        /// Services to restart.
        services: Vec<String>,
    },

    /// Display the status of services.
    Status {
        /// Services to show.
        services: Vec<String>,
    },

    /// Shut down all services and the daemon.
    Shutdown,
}

impl Cli {
    /// Settings assembled from the global flags, before path resolution.
    pub fn settings(&self) -> Settings {
        Settings {
            template_path: self.template.clone(),
            config_path: self.config.clone(),
            daemon_program: self.supervisord.clone(),
            client_program: self.supervisorctl.clone(),
            probe: self.probe,
        }
    }
}

/// What a parsed command asks supman to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action<'a> {
    /// Compile the manifest at this path.
    Init { manifest: &'a Path },
    /// Forward a control request to the supervisor.
    Control(CommandInvocation),
}

impl Commands {
    /// Maps the subcommand onto the action it requests.
    pub fn action(&self) -> Action<'_> {
        let (verb, services) = match self {
            Commands::Init { manifest } => return Action::Init { manifest },
            Commands::Start { services } => (ControlVerb::Start, services.clone()),
            Commands::Stop { services } => (ControlVerb::Stop, services.clone()),
            Commands::Restart { services } => (ControlVerb::Restart, services.clone()),
            Commands::Status { services } => (ControlVerb::Status, services.clone()),
            Commands::Shutdown => (ControlVerb::Shutdown, Vec::new()),
        };
        Action::Control(CommandInvocation::new(verb, services))
    }
}

/// Parses command-line arguments and returns a `Cli` struct.
pub fn parse_args() -> Cli {
    Cli::parse()
}
