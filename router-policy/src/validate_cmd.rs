use anyhow::{bail, Context, Result};
use router_policy::loader::load_policy;
use router_policy::validate::{build_validation_report, render_validation_text};

use crate::cli::{OutputFormat, ValidateArgs};

/// Secrets are left unresolved here; validation never needs their values.
pub fn run_validate(args: ValidateArgs) -> Result<()> {
    let policy = load_policy(&args.policy, None)
        .with_context(|| format!("failed to load {}", args.policy.display()))?;
    let report = build_validation_report(&policy);

    match args.format {
        OutputFormat::Text => println!("{}", render_validation_text(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if report.errors > 0 {
        bail!("validation failed: {} errors", report.errors);
    }
    Ok(())
}
