//! Routes user commands to `supervisorctl`, launching `supervisord` on demand.
use strum_macros::{AsRefStr, EnumString};
use tracing::info;

use crate::{
    error::Result,
    process::{CommandOutput, CommandRunner},
    supervisor::SupervisorClient,
};

/// Target token `supervisorctl` understands as every program.
pub const ALL_TARGETS: &str = "all";

/// Control verbs forwarded to `supervisorctl`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ControlVerb {
    /// Start programs, launching the daemon first if needed.
    Start,
    /// Stop programs, launching the daemon first if needed.
    Stop,
    /// Restart programs, launching the daemon first if needed.
    Restart,
    /// Report program states; never launches the daemon.
    Status,
    /// Stop every program and the daemon itself.
    Shutdown,
}

/// A verb and the services it applies to. No targets means every service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandInvocation {
    /// What to ask `supervisorctl` to do.
    pub verb: ControlVerb,
    /// Service names as given on the command line, possibly empty.
    pub targets: Vec<String>,
}

impl CommandInvocation {
    /// Request for `verb` on `targets`; pass no targets to address every service.
    pub fn new(verb: ControlVerb, targets: Vec<String>) -> Self {
        Self { verb, targets }
    }

    /// Arguments that follow the verb on the `supervisorctl` command line.
    ///
    /// Mutating verbs spell "every service" as the literal `all`, whereas `status`
    /// spells it as no arguments: `supervisorctl status all` would look up a program
    /// literally named `all`. `shutdown` never takes targets.
    pub fn target_args(&self) -> Vec<String> {
        match self.verb {
            ControlVerb::Shutdown => Vec::new(),
            ControlVerb::Status => self.targets.clone(),
            ControlVerb::Start | ControlVerb::Stop | ControlVerb::Restart => {
                if self.targets.is_empty() {
                    vec![ALL_TARGETS.to_string()]
                } else {
                    self.targets.clone()
                }
            }
        }
    }
}

/// What happened to a dispatched command.
#[derive(Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The control command ran successfully.
    Completed {
        /// Whether the daemon was launched first.
        launched: bool,
        /// Output of the control command.
        output: CommandOutput,
    },
    /// `status` was requested while the daemon is down.
    NotStarted,
}

/// Applies [`CommandInvocation`]s against a supervisor daemon.
pub struct Dispatcher<R> {
    client: SupervisorClient<R>,
}

impl<R: CommandRunner> Dispatcher<R> {
    /// Dispatcher that talks to the daemon through `client`.
    pub fn new(client: SupervisorClient<R>) -> Self {
        Self { client }
    }

    /// The underlying supervisor client.
    pub fn client(&self) -> &SupervisorClient<R> {
        &self.client
    }

    /// Runs `command`.
    ///
    /// `start`, `stop` and `restart` launch the daemon when the probe says it is
    /// down. `status` reports [`DispatchOutcome::NotStarted`] instead of launching.
    /// `shutdown` is sent without probing at all.
    pub fn dispatch(&self, command: &CommandInvocation) -> Result<DispatchOutcome> {
        let mut launched = false;

        match command.verb {
            ControlVerb::Shutdown => {}
            ControlVerb::Status => {
                if !self.client.is_running() {
                    return Ok(DispatchOutcome::NotStarted);
                }
            }
            ControlVerb::Start | ControlVerb::Stop | ControlVerb::Restart => {
                if !self.client.is_running() {
                    info!("supervisord is not running; launching it");
                    self.client.launch()?;
                    launched = true;
                }
            }
        }

        let output = self
            .client
            .control(command.verb.as_ref(), &command.target_args())?;
        Ok(DispatchOutcome::Completed { launched, output })
    }
}
