use std::net::Ipv4Addr;

use crate::model::Policy;
use crate::validate::Diagnostic;

/// Forwarders and static record addresses must be IPv4; record names must
/// not be blank.
pub fn dns_findings(policy: &Policy) -> Vec<Diagnostic> {
    let Some(dns) = policy.dns.as_ref() else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for forwarder in &dns.forwarders {
        if forwarder.trim().parse::<Ipv4Addr>().is_err() {
            out.push(Diagnostic::new(
                "dns_invalid_address",
                format!("DNS: forwarder '{forwarder}' is not a valid IPv4 address"),
            ));
        }
    }
    for record in &dns.static_records {
        if record.name.trim().is_empty() {
            out.push(Diagnostic::new(
                "dns_missing_field",
                format!("DNS: static record for {} has no name", record.ip),
            ));
        }
        if record.ip.trim().parse::<Ipv4Addr>().is_err() {
            out.push(Diagnostic::new(
                "dns_invalid_address",
                format!(
                    "DNS: record '{}' has invalid address '{}'",
                    record.name, record.ip
                ),
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::dns_findings;
    use crate::validate::test_support::{codes, policy_with};

    #[test]
    fn addresses_must_parse() {
        let p = policy_with(
            "dns:\n  forwarders: [1.1.1.1, dns.google]\n  static_records:\n    - {name: nas, ip: 192.168.1.10}\n    - {name: '', ip: 192.168.1.300}\n",
        );
        assert_eq!(
            codes(&dns_findings(&p)),
            vec!["dns_invalid_address", "dns_missing_field", "dns_invalid_address"]
        );
    }
}
