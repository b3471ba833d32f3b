//! Firewall rule validation.
//!
//! ## Checks Performed
//!
//! 1. **Zone references**: every `from`/`to` zone is a LAN name, `wan` or `vpn`
//! 2. **Port/protocol pairing**: a port needs a protocol that carries ports
//! 3. **Port syntax**: `N`, `N-M` or comma lists of those, within 1-65535
//! 4. **Rule names**: unique across the rule list

use crate::model::{FirewallRule, Policy, Protocol};
use crate::validate::{duplicate_names, Diagnostic};

/// Find all firewall configuration problems. A policy without a firewall
/// section has nothing to check.
pub fn firewall_findings(policy: &Policy) -> Vec<Diagnostic> {
    let Some(firewall) = policy.firewall.as_ref() else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for rule in &firewall.rules {
        for zone in rule.from.iter().chain(&rule.to) {
            if !policy.zone_exists(zone) {
                out.push(Diagnostic::new(
                    "firewall_unknown_zone",
                    format!("Firewall rule '{}': Unknown zone '{zone}'", rule.name),
                ));
            }
        }
        out.extend(port_findings(rule));
    }

    let duplicates = duplicate_names(firewall.rules.iter().map(|rule| rule.name.as_str()));
    if !duplicates.is_empty() {
        out.push(Diagnostic::new(
            "firewall_duplicate_rule",
            format!("Duplicate firewall rule names: {}", duplicates.join(", ")),
        ));
    }
    out
}

fn port_findings(rule: &FirewallRule) -> Vec<Diagnostic> {
    let Some(port) = rule.port.as_deref() else {
        return Vec::new();
    };
    let mut out = Vec::new();
    match rule.protocol {
        None => out.push(Diagnostic::new(
            "firewall_port_without_protocol",
            format!(
                "Firewall rule '{}': Port specified but protocol is missing",
                rule.name
            ),
        )),
        Some(proto @ (Protocol::Icmp | Protocol::All)) => out.push(Diagnostic::new(
            "firewall_port_without_protocol",
            format!(
                "Firewall rule '{}': Port specified but protocol '{}' has no ports",
                rule.name,
                proto.as_str()
            ),
        )),
        Some(Protocol::Tcp | Protocol::Udp) => {}
    }
    if !is_valid_port_spec(port) {
        out.push(Diagnostic::new(
            "firewall_invalid_port",
            format!("Firewall rule '{}': Invalid port '{port}'", rule.name),
        ));
    }
    out
}

/// `443`, `8000-8080`, `80,443,8000-8080`.
pub(crate) fn is_valid_port_spec(spec: &str) -> bool {
    spec.split(',').all(|part| {
        let part = part.trim();
        match part.split_once('-') {
            Some((lo, hi)) => match (parse_port(lo), parse_port(hi)) {
                (Some(lo), Some(hi)) => lo <= hi,
                _ => false,
            },
            None => parse_port(part).is_some(),
        }
    })
}

fn parse_port(text: &str) -> Option<u16> {
    text.trim().parse::<u16>().ok().filter(|port| *port > 0)
}
