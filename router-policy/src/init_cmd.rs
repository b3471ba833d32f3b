use std::fs;

use anyhow::{bail, Context, Result};
use colored::Colorize;

use crate::cli::InitArgs;

const TEMPLATE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/templates/policy.yaml"
));

pub fn run_init(args: InitArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        bail!(
            "{} already exists (pass --force to overwrite)",
            args.output.display()
        );
    }
    fs::write(&args.output, TEMPLATE)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!("{} {}", "created".green(), args.output.display());
    println!("next: router-policy validate {}", args.output.display());
    Ok(())
}
