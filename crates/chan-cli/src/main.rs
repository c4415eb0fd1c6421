//! `channel-tool` binary

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use chan_cli::{cli, execute, open_session, Console, GlobalOptions};
use clap::ArgMatches;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn init_tracing(global: &GlobalOptions) {
    // -v wins over RUST_LOG; logs go to stderr so stdout stays parseable.
    let filter = if global.verbose {
        EnvFilter::new("debug,reqwest=warn,hyper=warn,rustls=warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let layer = fmt::layer().with_target(false).with_writer(io::stderr);
    tracing_subscriber::registry().with(layer.with_filter(filter)).init();
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let (global, invocation) = cli::parse(matches)?;
    init_tracing(&global);

    let cwd = std::env::current_dir().context("cannot determine the working directory")?;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut session = open_session(&global, &cwd, |name| std::env::var(name).ok(), Console::new(&mut input, &mut out))?;
    execute(&mut session, invocation, None)?;
    Ok(())
}

fn main() -> ExitCode {
    let matches = cli::command().get_matches();
    let debug = matches.get_flag("debug");
    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if debug {
                eprintln!("Error: {err:?}");
            } else {
                eprintln!("Error: {err}");
                eprintln!("(Tip: Use the --debug flag to get a full stack trace.)");
            }
            ExitCode::FAILURE
        }
    }
}
