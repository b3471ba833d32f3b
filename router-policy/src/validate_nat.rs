use std::net::Ipv4Addr;

use crate::model::Policy;
use crate::validate::{duplicate_names, Diagnostic};

/// Port-forward checks: unique names, IPv4 internal target, non-zero ports.
pub fn nat_findings(policy: &Policy) -> Vec<Diagnostic> {
    let Some(nat) = policy.nat.as_ref() else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for forward in &nat.port_forwards {
        if forward.internal_ip.trim().parse::<Ipv4Addr>().is_err() {
            out.push(Diagnostic::new(
                "nat_invalid_internal_ip",
                format!(
                    "Port forward '{}': internal_ip '{}' is not a valid IPv4 address",
                    forward.name, forward.internal_ip
                ),
            ));
        }
        if forward.external_port == 0 || forward.internal_port == 0 {
            out.push(Diagnostic::new(
                "nat_invalid_port",
                format!("Port forward '{}': ports must be 1-65535", forward.name),
            ));
        }
    }

    let duplicates = duplicate_names(nat.port_forwards.iter().map(|pf| pf.name.as_str()));
    if !duplicates.is_empty() {
        out.push(Diagnostic::new(
            "nat_duplicate_forward",
            format!("Duplicate port forward names: {}", duplicates.join(", ")),
        ));
    }
    out
}
