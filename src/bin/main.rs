use std::{
    error::Error,
    io::{self, Write},
    process::ExitCode,
};

use tracing::debug;
use tracing_subscriber::EnvFilter;

use supman::{
    cli::{Action, Cli, parse_args},
    compiler,
    dispatch::{DispatchOutcome, Dispatcher},
    process::SystemRunner,
    settings::resolve_path,
    supervisor::SupervisorClient,
};

fn main() -> ExitCode {
    let args = parse_args();
    init_logging(&args);

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let cwd = std::env::current_dir()?;
    let settings = args.settings().resolve(&cwd);
    debug!("Resolved settings: {settings:?}");

    let invocation = match args.command.action() {
        Action::Init { manifest } => {
            compiler::init(&settings, &resolve_path(&cwd, manifest))?;
            return Ok(ExitCode::SUCCESS);
        }
        Action::Control(invocation) => invocation,
    };

    let dispatcher = Dispatcher::new(SupervisorClient::new(settings, SystemRunner));
    match dispatcher.dispatch(&invocation)? {
        DispatchOutcome::NotStarted => {
            println!("Services not started");
            Ok(ExitCode::from(1))
        }
        DispatchOutcome::Completed { output, .. } => {
            io::stdout().write_all(output.stdout.as_bytes())?;
            io::stderr().write_all(output.stderr.as_bytes())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_logging(args: &Cli) {
    let filter = if let Some(level) = args.log_level {
        EnvFilter::new(level.as_str())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
