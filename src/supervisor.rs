//! Thin wrapper around the `supervisord` launcher and the `supervisorctl` client.
use tracing::{debug, info, warn};

use crate::{
    error::Result,
    process::{CommandOutput, CommandRunner, Invocation, OutputMode},
    settings::{ProbePolicy, Settings},
};

/// `supervisorctl status` exit code when the daemon answered but some programs are
/// not in the RUNNING state.
pub const STATUS_PROGRAMS_NOT_RUNNING: i32 = 3;

/// Builds and runs supervisor invocations for one compiled configuration.
pub struct SupervisorClient<R> {
    settings: Settings,
    runner: R,
}

impl<R: CommandRunner> SupervisorClient<R> {
    /// Creates a client that runs commands through `runner`.
    pub fn new(settings: Settings, runner: R) -> Self {
        Self { settings, runner }
    }

    /// Runner used for every invocation.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// `supervisord -c <config>`.
    pub fn daemon_invocation(&self) -> Invocation {
        Invocation::new(&self.settings.daemon_program).config(&self.settings.config_path)
    }

    /// `supervisorctl -c <config> <verb> [targets...]`.
    pub fn control_invocation(&self, verb: &str, targets: &[String]) -> Invocation {
        Invocation::new(&self.settings.client_program)
            .config(&self.settings.config_path)
            .arg(verb)
            .args(targets.iter().cloned())
    }

    /// Reports whether the daemon appears to be running, according to the
    /// configured [`ProbePolicy`].
    pub fn is_running(&self) -> bool {
        let invocation = self.control_invocation("status", &[]);
        let outcome = self.runner.run(&invocation, OutputMode::Capture);

        match self.settings.probe {
            ProbePolicy::FailOpen => {
                if let Err(err) = &outcome {
                    debug!("Ignoring failed liveness probe: {err}");
                }
                true
            }
            ProbePolicy::Strict => match outcome {
                Ok(output) => {
                    let reachable = matches!(
                        output.code,
                        Some(0) | Some(STATUS_PROGRAMS_NOT_RUNNING)
                    );
                    if !reachable {
                        debug!(
                            "supervisord unreachable (exit {:?}): {}",
                            output.code,
                            output.stdout.trim()
                        );
                    }
                    reachable
                }
                Err(err) => {
                    warn!("Liveness probe failed: {err}");
                    false
                }
            },
        }
    }

    /// Starts the daemon and waits for the launcher to exit. This does not wait for
    /// the daemon to finish initialising.
    pub fn launch(&self) -> Result<()> {
        let invocation = self.daemon_invocation();
        info!("Starting supervisord with {}", self.settings.config_path.display());
        self.runner
            .run(&invocation, OutputMode::Inherit)?
            .check(&invocation)?;
        Ok(())
    }

    /// Runs a control command, failing on a non-zero exit.
    pub fn control(&self, verb: &str, targets: &[String]) -> Result<CommandOutput> {
        let invocation = self.control_invocation(verb, targets);
        self.runner
            .run(&invocation, OutputMode::Capture)?
            .check(&invocation)
    }
}
