//! LAN consistency validation.
//!
//! ## Checks Performed
//!
//! 1. **Presence**: at least one LAN is defined
//! 2. **Uniqueness**: LAN names and VLAN ids are unique
//! 3. **Addressing**: subnet is CIDR, gateway is inside it, DHCP range is
//!    inside it with start before end
//! 4. **Overlap**: every unordered pair of subnets is checked once
//! 5. **Isolation**: `isolated_from` names a LAN or a reserved zone, never
//!    the LAN itself

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;

use crate::model::{Lan, Policy};
use crate::validate::{duplicate_names, Diagnostic};

const VLAN_IDS: std::ops::RangeInclusive<u32> = 1..=4094;

/// Find all LAN configuration problems.
pub fn lan_findings(policy: &Policy) -> Vec<Diagnostic> {
    if policy.lans.is_empty() {
        return vec![Diagnostic::new(
            "lan_missing",
            "At least one LAN must be defined",
        )];
    }

    let mut out = Vec::new();
    let duplicates = duplicate_names(policy.lans.iter().map(|lan| lan.name.as_str()));
    if !duplicates.is_empty() {
        out.push(Diagnostic::new(
            "lan_duplicate_name",
            format!("Duplicate LAN names: {}", duplicates.join(", ")),
        ));
    }

    let mut networks = Vec::new();
    for lan in &policy.lans {
        match lan.subnet.trim().parse::<Ipv4Net>() {
            Ok(net) => {
                let net = net.trunc();
                out.extend(addressing_findings(lan, net));
                networks.push((lan.name.as_str(), net));
            }
            Err(err) => out.push(Diagnostic::new(
                "lan_invalid_subnet",
                format!("LAN '{}': Invalid subnet {}: {err}", lan.name, lan.subnet),
            )),
        }
    }
    out.extend(overlap_findings(&networks));
    out.extend(isolation_findings(policy));
    out.extend(vlan_findings(&policy.lans));
    out
}

fn addressing_findings(lan: &Lan, net: Ipv4Net) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    match lan.gateway.trim().parse::<Ipv4Addr>() {
        Ok(gateway) if !net.contains(&gateway) => out.push(Diagnostic::new(
            "lan_gateway_outside_subnet",
            format!(
                "LAN '{}': Gateway {} not in subnet {}",
                lan.name, lan.gateway, lan.subnet
            ),
        )),
        Ok(_) => {}
        Err(_) => out.push(Diagnostic::new(
            "lan_invalid_gateway",
            format!("LAN '{}': Invalid gateway address {}", lan.name, lan.gateway),
        )),
    }

    if let Some(range) = lan.enabled_dhcp().and_then(|dhcp| dhcp.range.as_deref()) {
        out.extend(dhcp_range_findings(lan, net, range));
    }
    if let Some(dhcp) = lan.enabled_dhcp() {
        for server in &dhcp.dns {
            if server.trim().parse::<Ipv4Addr>().is_err() {
                out.push(range_error(
                    lan,
                    format!("DHCP dns server '{server}' is not a valid IPv4 address"),
                ));
            }
        }
    }
    out
}

fn dhcp_range_findings(lan: &Lan, net: Ipv4Net, range: &str) -> Vec<Diagnostic> {
    let Some((start, end)) = range.split_once('-') else {
        return vec![range_error(
            lan,
            "Invalid DHCP range format (use x.x.x.x-y.y.y.y)".to_string(),
        )];
    };
    let (start, end) = match (start.trim().parse::<Ipv4Addr>(), end.trim().parse::<Ipv4Addr>()) {
        (Ok(start), Ok(end)) => (start, end),
        _ => return vec![range_error(lan, format!("Invalid DHCP range IP in '{range}'"))],
    };

    let mut out = Vec::new();
    if !net.contains(&start) {
        out.push(range_error(lan, format!("DHCP range start {start} not in subnet")));
    }
    if !net.contains(&end) {
        out.push(range_error(lan, format!("DHCP range end {end} not in subnet")));
    }
    if start >= end {
        out.push(range_error(
            lan,
            "DHCP range start must be less than end".to_string(),
        ));
    }
    out
}

fn range_error(lan: &Lan, detail: String) -> Diagnostic {
    Diagnostic::new("lan_dhcp_range", format!("LAN '{}': {detail}", lan.name))
}

/// CIDR blocks either nest or are disjoint, so intersection reduces to a
/// containment test in one direction or the other.
fn overlap_findings(networks: &[(&str, Ipv4Net)]) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for (idx, (name_a, a)) in networks.iter().enumerate() {
        for (name_b, b) in &networks[idx + 1..] {
            if a.contains(&b.network()) || b.contains(&a.network()) {
                out.push(Diagnostic::new(
                    "lan_subnet_overlap",
                    format!("LANs '{name_a}' and '{name_b}' have overlapping subnets"),
                ));
            }
        }
    }
    out
}

fn isolation_findings(policy: &Policy) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for lan in &policy.lans {
        for zone in &lan.isolated_from {
            if *zone == lan.name {
                out.push(Diagnostic::new(
                    "lan_self_isolation",
                    format!("LAN '{}': cannot be isolated from itself", lan.name),
                ));
            } else if !policy.zone_exists(zone) {
                out.push(Diagnostic::new(
                    "lan_unknown_isolation_ref",
                    format!(
                        "LAN '{}': References unknown zone '{zone}' in isolated_from",
                        lan.name
                    ),
                ));
            }
        }
    }
    out
}

fn vlan_findings(lans: &[Lan]) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for lan in lans {
        if let Some(id) = lan.vlan_id.filter(|id| !VLAN_IDS.contains(id)) {
            out.push(Diagnostic::new(
                "lan_invalid_vlan",
                format!("LAN '{}': VLAN id {id} is outside 1-4094", lan.name),
            ));
        }
    }

    let ids = lans
        .iter()
        .filter_map(|lan| lan.vlan_id.map(|id| id.to_string()))
        .collect::<Vec<_>>();
    let duplicates = duplicate_names(ids.iter().map(String::as_str));
    if !duplicates.is_empty() {
        out.push(Diagnostic::new(
            "lan_duplicate_vlan",
            format!("Duplicate VLAN IDs: {}", duplicates.join(", ")),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::lan_findings;
    use crate::validate::test_support::{codes, policy};

    fn lans(body: &str) -> crate::model::Policy {
        policy(&format!(
            "meta: {{name: t}}\nwan: {{type: dhcp, interface: eth0}}\nlans:\n{body}"
        ))
    }

    #[test]
    fn requires_at_least_one_lan() {
        let p = policy("meta: {name: t}\nwan: {type: dhcp, interface: eth0}\n");
        assert_eq!(codes(&lan_findings(&p)), vec!["lan_missing"]);
    }

    #[test]
    fn adjacent_subnets_do_not_overlap() {
        let p = lans(
            "  - {name: a, subnet: 10.0.0.0/25, gateway: 10.0.0.1}\n  - {name: b, subnet: 10.0.0.128/25, gateway: 10.0.0.129}\n",
        );
        assert!(lan_findings(&p).is_empty());
    }

    #[test]
    fn identical_and_nested_subnets_overlap() {
        let p = lans(
            "  - {name: a, subnet: 10.0.0.0/24, gateway: 10.0.0.1}\n  - {name: b, subnet: 10.0.0.0/24, gateway: 10.0.0.2}\n  - {name: c, subnet: 10.0.0.0/16, gateway: 10.0.9.1}\n",
        );
        let findings = lan_findings(&p);
        assert_eq!(
            codes(&findings),
            vec!["lan_subnet_overlap", "lan_subnet_overlap", "lan_subnet_overlap"]
        );
        assert_eq!(
            findings[0].message,
            "LANs 'a' and 'b' have overlapping subnets"
        );
    }

    #[test]
    fn gateway_outside_subnet_reports_once() {
        let p = lans("  - {name: a, subnet: 192.168.1.0/24, gateway: 192.168.2.1}\n");
        let findings = lan_findings(&p);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("not in subnet"));

        let p = lans("  - {name: a, subnet: 192.168.1.0/24, gateway: 192.168.1.254}\n");
        assert!(lan_findings(&p).is_empty());
    }

    #[test]
    fn dhcp_range_bounds_are_checked() {
        let p = lans(
            "  - name: a\n    subnet: 192.168.1.0/24\n    gateway: 192.168.1.1\n    dhcp: {enabled: true, range: 192.168.1.200-192.168.2.10}\n",
        );
        let messages = lan_findings(&p)
            .into_iter()
            .map(|d| d.message)
            .collect::<Vec<_>>();
        assert_eq!(
            messages,
            vec![
                "LAN 'a': DHCP range end 192.168.2.10 not in subnet".to_string(),
                "LAN 'a': DHCP range start must be less than end".to_string(),
            ]
        );
    }

    #[test]
    fn disabled_dhcp_range_is_ignored() {
        let p = lans(
            "  - name: a\n    subnet: 192.168.1.0/24\n    gateway: 192.168.1.1\n    dhcp: {enabled: false, range: garbage}\n",
        );
        assert!(lan_findings(&p).is_empty());
    }

    #[test]
    fn malformed_range_and_subnet() {
        let p = lans(
            "  - name: a\n    subnet: 192.168.1.0/24\n    gateway: 192.168.1.1\n    dhcp: {enabled: true, range: 192.168.1.10}\n  - {name: b, subnet: 10.0.0/99, gateway: 10.0.0.1}\n",
        );
        assert_eq!(
            codes(&lan_findings(&p)),
            vec!["lan_dhcp_range", "lan_invalid_subnet"]
        );
    }

    #[test]
    fn isolation_references_resolve() {
        let p = lans(
            "  - {name: a, subnet: 10.0.1.0/24, gateway: 10.0.1.1, isolated_from: [b, wan, a, ghost]}\n  - {name: b, subnet: 10.0.2.0/24, gateway: 10.0.2.1}\n",
        );
        assert_eq!(
            codes(&lan_findings(&p)),
            vec!["lan_self_isolation", "lan_unknown_isolation_ref"]
        );
    }

    #[test]
    fn vlan_ids_are_unique_and_in_range() {
        let p = lans(
            "  - {name: a, subnet: 10.0.1.0/24, gateway: 10.0.1.1, vlan_id: 10}\n  - {name: b, subnet: 10.0.2.0/24, gateway: 10.0.2.1, vlan_id: 10}\n  - {name: c, subnet: 10.0.3.0/24, gateway: 10.0.3.1, vlan_id: 5000}\n",
        );
        let findings = lan_findings(&p);
        assert_eq!(codes(&findings), vec!["lan_invalid_vlan", "lan_duplicate_vlan"]);
        assert_eq!(findings[1].message, "Duplicate VLAN IDs: 10");
    }

    #[test]
    fn duplicate_names_are_listed() {
        let p = lans(
            "  - {name: a, subnet: 10.0.1.0/24, gateway: 10.0.1.1}\n  - {name: a, subnet: 10.0.2.0/24, gateway: 10.0.2.1}\n",
        );
        assert_eq!(codes(&lan_findings(&p)), vec!["lan_duplicate_name"]);
    }
}
