//! WAN validation.
//!
//! ## Checks Performed
//!
//! 1. **Interface**: every WAN type needs an interface name
//! 2. **Per-type fields**: PPPoE needs credentials, static needs an address,
//!    netmask and gateway
//! 3. **Address syntax**: static addresses and upstream resolvers parse as
//!    IPv4
//!
//! The netmask is deliberately not checked against a table here; backends
//! fall back to /24 for masks they do not recognize.

use std::net::Ipv4Addr;

use crate::model::{Policy, WanKind};
use crate::validate::Diagnostic;

/// Find all WAN configuration problems.
pub fn wan_findings(policy: &Policy) -> Vec<Diagnostic> {
    let wan = &policy.wan;
    let mut out = Vec::new();
    if wan.interface.trim().is_empty() {
        out.push(missing("WAN: interface is required"));
    }

    match &wan.kind {
        WanKind::Pppoe { username, password } => {
            if username.is_none() {
                out.push(missing("WAN: PPPoE requires username"));
            }
            if password.is_none() {
                out.push(missing("WAN: PPPoE requires password_ref"));
            }
        }
        WanKind::Dhcp => {}
        WanKind::Static {
            ip_address,
            netmask,
            gateway,
        } => {
            for (field, value) in [
                ("ip_address", ip_address),
                ("netmask", netmask),
                ("gateway", gateway),
            ] {
                match value {
                    None => out.push(missing(format!("WAN: Static type requires {field}"))),
                    Some(value) if field != "netmask" => {
                        out.extend(address_finding(field, value));
                    }
                    Some(_) => {}
                }
            }
        }
    }

    for server in &wan.dns {
        out.extend(address_finding("dns", server));
    }
    out
}

fn missing(message: impl Into<String>) -> Diagnostic {
    Diagnostic::new("wan_missing_field", message)
}

fn address_finding(field: &str, value: &str) -> Option<Diagnostic> {
    if value.trim().parse::<Ipv4Addr>().is_ok() {
        return None;
    }
    Some(Diagnostic::new(
        "wan_invalid_address",
        format!("WAN: {field} '{value}' is not a valid IPv4 address"),
    ))
}
