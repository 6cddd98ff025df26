//! Supman turns a declarative `manifest.toml` into a `supervisord.conf` and forwards
//! start, stop, restart, status and shutdown requests to `supervisorctl`, launching
//! `supervisord` first when it does not appear to be running. All actual process
//! supervision is left to supervisor itself.

/// CLI interface.
pub mod cli;

/// Manifest to supervisor configuration compiler.
pub mod compiler;

/// Command dispatch against the supervisor daemon.
pub mod dispatch;

/// Ordered sectioned key/value documents (supervisor's INI dialect).
pub mod document;

/// Error handling.
pub mod error;

/// Service manifest reader.
pub mod manifest;

/// External process invocation.
pub mod process;

/// Resolved runtime settings.
pub mod settings;

/// Supervisor daemon and control client wrapper.
pub mod supervisor;
