use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Refuse an output path that is one of the inputs or a directory holding
/// one. Directory outputs are replaced wholesale, so an input inside one
/// would be lost.
pub fn ensure_output_not_same(output: &Path, inputs: &[&Path]) -> Result<()> {
    let out_abs = absolute(output)
        .with_context(|| format!("failed to resolve output path {}", output.display()))?;

    for input in inputs {
        let in_abs = absolute(input)
            .with_context(|| format!("failed to resolve input path {}", input.display()))?;
        if out_abs == in_abs {
            bail!(
                "refusing to overwrite source file: output {} matches input {}",
                output.display(),
                input.display()
            );
        }
        if in_abs.starts_with(&out_abs) {
            bail!(
                "refusing to replace directory {}: it contains input {}",
                output.display(),
                input.display()
            );
        }
    }
    Ok(())
}

/// Canonical path when it exists, otherwise the cwd-joined path with `.`
/// and `..` folded lexically.
fn absolute(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return path
            .canonicalize()
            .with_context(|| format!("canonicalize {}", path.display()));
    }
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().context("current_dir")?.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    Ok(out)
}
