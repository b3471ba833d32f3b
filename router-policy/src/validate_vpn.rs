//! VPN validation.
//!
//! Servers need a listen port, clients need a remote endpoint, and every
//! allowed-IP entry must be an IPv4 network (a bare address counts as a /32).
//! VPNs are identified by position (`VPN #1`) because they carry no name.

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;

use crate::model::{Policy, Vpn, VpnRole};
use crate::validate::Diagnostic;

pub fn vpn_findings(policy: &Policy) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for (idx, vpn) in policy.vpn.iter().enumerate() {
        let vpn_id = format!("VPN #{}", idx + 1);
        out.extend(role_findings(&vpn_id, vpn));
        for cidr in &vpn.allowed_ips {
            if cidr.trim().parse::<Ipv4Addr>().is_ok() {
                continue;
            }
            if let Err(err) = cidr.trim().parse::<Ipv4Net>() {
                out.push(Diagnostic::new(
                    "vpn_invalid_allowed_ip",
                    format!("{vpn_id}: Invalid allowed IP '{cidr}': {err}"),
                ));
            }
        }
    }
    out
}

fn role_findings(vpn_id: &str, vpn: &Vpn) -> Vec<Diagnostic> {
    let missing = |field: &str| {
        Diagnostic::new(
            "vpn_missing_field",
            format!(
                "{vpn_id}: {} role requires {field}",
                match vpn.role {
                    VpnRole::Server => "Server",
                    VpnRole::Client => "Client",
                }
            ),
        )
    };

    let mut out = Vec::new();
    match vpn.role {
        VpnRole::Server => {
            if vpn.listen_port.unwrap_or(0) == 0 {
                out.push(missing("listen_port"));
            }
        }
        VpnRole::Client => {
            if vpn.remote_host.is_none() {
                out.push(missing("remote_host"));
            }
            if vpn.remote_port.unwrap_or(0) == 0 {
                out.push(missing("remote_port"));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::vpn_findings;
    use crate::validate::test_support::{codes, policy_with};

    #[test]
    fn server_requires_listen_port() {
        let p = policy_with("vpn:\n  - {type: wireguard, role: server}\n");
        let findings = vpn_findings(&p);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message, "VPN #1: Server role requires listen_port");
    }

    #[test]
    fn client_requires_remote_endpoint() {
        let p = policy_with(
            "vpn:\n  - {type: wireguard, role: server, listen_port: 51820}\n  - {type: openvpn, role: client}\n",
        );
        let messages = vpn_findings(&p)
            .into_iter()
            .map(|d| d.message)
            .collect::<Vec<_>>();
        assert_eq!(
            messages,
            vec![
                "VPN #2: Client role requires remote_host".to_string(),
                "VPN #2: Client role requires remote_port".to_string(),
            ]
        );
    }

    #[test]
    fn allowed_ips_must_be_networks() {
        let p = policy_with(
            "vpn:\n  - type: wireguard\n    role: server\n    listen_port: 51820\n    allowed_ips: [10.8.0.0/24, 10.9.0.5, not-a-net]\n",
        );
        assert_eq!(codes(&vpn_findings(&p)), vec!["vpn_invalid_allowed_ip"]);
    }
}
