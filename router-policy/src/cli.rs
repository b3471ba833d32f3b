use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "router-policy")]
#[command(about = "Compile vendor-neutral router policies into device configuration")]
pub struct Cli {
    /// Render settings file (TOML). Defaults to the embedded settings.
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Write a starter policy file.
    Init(InitArgs),
    /// Check a policy for semantic errors.
    Validate(ValidateArgs),
    /// Validate a policy and render it for one target.
    Render(RenderArgs),
    /// Compare a rendered policy against a running device (not implemented).
    Diff(UnimplementedArgs),
    /// Suggest policy improvements (not implemented).
    AiSuggest(UnimplementedArgs),
    /// Apply a rendered policy to a lab device (not implemented).
    LabTest(UnimplementedArgs),
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    #[arg(short, long, default_value = "policy.yaml")]
    pub output: PathBuf,
    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    pub policy: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct RenderArgs {
    pub policy: PathBuf,
    /// routeros or openwrt. Falls back to meta.target.vendor.
    #[arg(long)]
    pub target: Option<String>,
    /// Output file (routeros) or directory (openwrt).
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Fail instead of emitting placeholders for unresolved secrets.
    #[arg(long)]
    pub strict_secrets: bool,
}

/// Arguments accepted by commands that exist only for interface
/// compatibility.
#[derive(Parser, Debug)]
pub struct UnimplementedArgs {
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
