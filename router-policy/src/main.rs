use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod init_cmd;
mod path_guard;
mod render_cmd;
mod validate_cmd;

use cli::{Cli, Command};

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Init(args) => init_cmd::run_init(args),
        Command::Validate(args) => validate_cmd::run_validate(args),
        Command::Render(args) => render_cmd::run_render(args, cli.settings.as_deref()),
        Command::Diff(_) => not_implemented("diff"),
        Command::AiSuggest(_) => not_implemented("ai-suggest"),
        Command::LabTest(_) => not_implemented("lab-test"),
    }
}

/// Logs go to stderr so rendered output on stdout stays clean.
/// `RUST_LOG` overrides the default `router_policy=warn`.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("router_policy=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn not_implemented(command: &str) -> Result<()> {
    bail!("{command} is not implemented")
}
