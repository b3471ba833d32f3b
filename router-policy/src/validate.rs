use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use crate::model::Policy;
use crate::validate_dns::dns_findings;
use crate::validate_firewall::firewall_findings;
use crate::validate_lans::lan_findings;
use crate::validate_nat::nat_findings;
use crate::validate_vpn::vpn_findings;
use crate::validate_wan::wan_findings;
use crate::validate_wifi::wifi_findings;

/// One semantic problem found in a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Stable machine-readable identifier, e.g. `lan_subnet_overlap`.
    pub code: String,
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub policy: String,
    pub errors: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Run every rule group and concatenate their diagnostics. Groups are
/// independent, so one bad field never hides an unrelated problem.
pub fn validate_policy(policy: &Policy) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    out.extend(wan_findings(policy));
    out.extend(lan_findings(policy));
    out.extend(wifi_findings(policy));
    out.extend(vpn_findings(policy));
    out.extend(firewall_findings(policy));
    out.extend(nat_findings(policy));
    out.extend(dns_findings(policy));
    tracing::debug!(
        policy = %policy.meta.name,
        diagnostics = out.len(),
        "validation finished"
    );
    out
}

pub fn build_validation_report(policy: &Policy) -> ValidationReport {
    let diagnostics = validate_policy(policy);
    ValidationReport {
        policy: policy.meta.name.clone(),
        errors: diagnostics.len(),
        diagnostics,
    }
}

pub fn render_validation_text(report: &ValidationReport) -> String {
    let mut out = Vec::new();
    out.push(format!("validate policy={}", report.policy));
    out.push(format!("result errors={}", report.errors));
    out.push("diagnostics".to_string());
    if report.diagnostics.is_empty() {
        out.push("- none".to_string());
        return out.join("\n");
    }
    for diagnostic in &report.diagnostics {
        out.push(format!("- [error] {}: {}", diagnostic.code, diagnostic.message));
    }
    out.join("\n")
}

/// Names that occur more than once, sorted and reported once each.
pub(crate) fn duplicate_names<'a, I>(names: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts = BTreeMap::new();
    for name in names {
        *counts.entry(name).or_insert(0usize) += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, _)| name)
        .collect()
}
