use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use colored::Colorize;
use router_policy::backend::{render, resolve_target};
use router_policy::loader::load_policy;
use router_policy::secrets::{unresolved_secrets, EnvSecretStore, SecretResolver};
use router_policy::settings::load_settings_with_source;
use router_policy::validate::{build_validation_report, render_validation_text};

use crate::cli::RenderArgs;
use crate::path_guard;

pub fn run_render(args: RenderArgs, settings_path: Option<&Path>) -> Result<()> {
    let store = EnvSecretStore;
    let resolver = SecretResolver::new(&store);
    let policy = load_policy(&args.policy, Some(&resolver))
        .with_context(|| format!("failed to load {}", args.policy.display()))?;

    let report = build_validation_report(&policy);
    if !report.is_clean() {
        eprintln!("{}", render_validation_text(&report));
        bail!("validation failed: {} errors", report.errors);
    }

    let target = resolve_target(args.target.as_deref(), &policy)?;

    let unresolved = unresolved_secrets(&policy);
    if args.strict_secrets && !unresolved.is_empty() {
        let fields = unresolved
            .iter()
            .map(|secret| secret.field.as_str())
            .collect::<Vec<_>>();
        bail!(
            "{} unresolved secrets: {}",
            unresolved.len(),
            fields.join(", ")
        );
    }
    for secret in &unresolved {
        tracing::warn!(
            field = %secret.field,
            key = %resolver.store_key(&secret.name),
            "unresolved secret; emitting placeholder"
        );
    }

    let (settings, source) = load_settings_with_source(settings_path);
    tracing::debug!(%source, "render settings");

    let output = args
        .out
        .unwrap_or_else(|| PathBuf::from(target.default_output()));
    path_guard::ensure_output_not_same(&output, &[args.policy.as_path()])?;

    let rendered = render(&policy, target, &settings);
    rendered
        .write_to(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "{} policy={} target={} output={}",
        "rendered".green(),
        policy.meta.name,
        target,
        output.display()
    );
    for name in rendered.file_names() {
        println!("- {name}");
    }
    Ok(())
}
