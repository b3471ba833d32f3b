//! Backend emitters: lower a validated [`Policy`] into vendor syntax.
//!
//! Backends assume the policy passed validation and never re-check it. A
//! field that validation would have required but is absent anyway (an
//! unresolved secret, for example) renders as a visible placeholder
//! ([`CHANGE_ME`] for credentials, [`TODO`] for everything else).

pub mod netmask;
pub mod openwrt;
pub mod routeros;

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::net::Ipv4Addr;
use std::path::Path;
use std::str::FromStr;

use router_syntax_core::{write_dir_atomic, write_file_atomic, WriteError};
use thiserror::Error;

use crate::model::{Lan, Policy, Vendor};
use crate::secrets::SecretValue;
use crate::settings::{DhcpDefaults, RenderSettings};

pub const CHANGE_ME: &str = "CHANGE_ME";
pub const TODO: &str = "TODO";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("unknown target '{0}' (expected routeros or openwrt)")]
    UnknownTarget(String),
    #[error("no target selected: pass --target or set meta.target.vendor in the policy")]
    NoTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    RouterOs,
    OpenWrt,
}

impl Target {
    pub fn as_str(self) -> &'static str {
        match self {
            Target::RouterOs => "routeros",
            Target::OpenWrt => "openwrt",
        }
    }

    /// Output path used when the caller does not pick one.
    pub fn default_output(self) -> &'static str {
        match self {
            Target::RouterOs => "routeros-config.rsc",
            Target::OpenWrt => "openwrt-config",
        }
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "routeros" | "mikrotik" => Ok(Target::RouterOs),
            "openwrt" => Ok(Target::OpenWrt),
            _ => Err(RenderError::UnknownTarget(s.to_string())),
        }
    }
}

impl From<Vendor> for Target {
    fn from(vendor: Vendor) -> Self {
        match vendor {
            Vendor::Routeros => Target::RouterOs,
            Vendor::Openwrt => Target::OpenWrt,
        }
    }
}

/// Pick the target: an explicit request wins, then the policy's own hint.
pub fn resolve_target(requested: Option<&str>, policy: &Policy) -> Result<Target, RenderError> {
    if let Some(requested) = requested {
        return requested.parse();
    }
    policy
        .meta
        .target
        .as_ref()
        .map(|target| Target::from(target.vendor))
        .ok_or(RenderError::NoTarget)
}

/// Rendered output, fully in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// One script file.
    Script(String),
    /// File name to contents, written into one directory.
    Files(BTreeMap<String, String>),
}

impl Rendered {
    /// Persist all output or none of it.
    pub fn write_to(&self, path: &Path) -> Result<(), WriteError> {
        match self {
            Rendered::Script(text) => write_file_atomic(path, text),
            Rendered::Files(files) => write_dir_atomic(path, files),
        }
    }

    /// Names of the files this output produces.
    pub fn file_names(&self) -> Vec<&str> {
        match self {
            Rendered::Script(_) => Vec::new(),
            Rendered::Files(files) => files.keys().map(String::as_str).collect(),
        }
    }
}

pub fn render(policy: &Policy, target: Target, settings: &RenderSettings) -> Rendered {
    tracing::debug!(
        policy = %policy.meta.name,
        %target,
        wan = policy.wan.kind.as_str(),
        "rendering policy"
    );
    match target {
        Target::RouterOs => Rendered::Script(routeros::render(policy, settings)),
        Target::OpenWrt => Rendered::Files(openwrt::render(policy, settings)),
    }
}

/// Value for a secret-bearing field, or [`CHANGE_ME`] when it is absent or
/// did not resolve.
pub(crate) fn secret_text(value: Option<&SecretValue>) -> String {
    value
        .and_then(SecretValue::emit_value)
        .unwrap_or_else(|| CHANGE_ME.to_string())
}

/// First and last address handed out by a LAN's DHCP pool.
///
/// A declared range inside the subnet is used as-is. Otherwise the pool is
/// derived from `defaults` as offsets from the network address, clamped to
/// the usable host range. `None` only when the subnet does not parse.
pub(crate) fn dhcp_pool_bounds(lan: &Lan, defaults: &DhcpDefaults) -> Option<(Ipv4Addr, Ipv4Addr)> {
    let net = lan.network()?;
    let declared = lan
        .enabled_dhcp()
        .and_then(|dhcp| dhcp.range.as_deref())
        .and_then(|range| range.split_once('-'))
        .and_then(|(start, end)| {
            Some((
                start.trim().parse::<Ipv4Addr>().ok()?,
                end.trim().parse::<Ipv4Addr>().ok()?,
            ))
        })
        .filter(|(start, end)| net.contains(start) && net.contains(end) && start <= end);
    if declared.is_some() {
        return declared;
    }

    let base = u32::from(net.network());
    let broadcast = u32::from(net.broadcast());
    let (first_host, last_host) = if net.prefix_len() >= 31 {
        (base, broadcast)
    } else {
        (base + 1, broadcast - 1)
    };
    let start = base.saturating_add(defaults.start);
    let end = start.saturating_add(defaults.limit.saturating_sub(1)).min(last_host);
    if start < first_host || start > last_host {
        return Some((Ipv4Addr::from(first_host), Ipv4Addr::from(last_host)));
    }
    Some((Ipv4Addr::from(start), Ipv4Addr::from(end)))
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::{dhcp_pool_bounds, resolve_target, secret_text, RenderError, Target};
    use crate::model::{DhcpConfig, Lan};
    use crate::secrets::SecretValue;
    use crate::settings::DhcpDefaults;
    use crate::validate::test_support::{policy, policy_with};

    fn lan(subnet: &str, range: Option<&str>) -> Lan {
        Lan {
            name: "main".to_string(),
            subnet: subnet.to_string(),
            gateway: "192.168.1.1".to_string(),
            vlan_id: None,
            dhcp: Some(DhcpConfig {
                enabled: true,
                range: range.map(str::to_string),
                lease_time: None,
                dns: Vec::new(),
            }),
            isolated_from: Vec::new(),
        }
    }

    #[test]
    fn explicit_target_wins_over_hint() {
        let p = policy("meta: {name: t, target: {vendor: openwrt}}\nwan: {type: dhcp, interface: eth0}\n");
        assert_eq!(resolve_target(None, &p), Ok(Target::OpenWrt));
        assert_eq!(resolve_target(Some("routeros"), &p), Ok(Target::RouterOs));
        assert_eq!(
            resolve_target(Some("cisco"), &p),
            Err(RenderError::UnknownTarget("cisco".to_string()))
        );
    }

    #[test]
    fn missing_target_is_an_error() {
        assert_eq!(resolve_target(None, &policy_with("")), Err(RenderError::NoTarget));
    }

    #[test]
    fn unresolved_secret_becomes_placeholder() {
        let unresolved = SecretValue::Unresolved("wifi".to_string());
        assert_eq!(secret_text(Some(&unresolved)), "CHANGE_ME");
        assert_eq!(secret_text(None), "CHANGE_ME");
        let literal = SecretValue::Literal("k".to_string());
        assert_eq!(secret_text(Some(&literal)), "k");
    }

    #[test]
    fn declared_range_is_kept() {
        let bounds = dhcp_pool_bounds(
            &lan("192.168.1.0/24", Some("192.168.1.100-192.168.1.200")),
            &DhcpDefaults::default(),
        );
        assert_eq!(
            bounds,
            Some((Ipv4Addr::new(192, 168, 1, 100), Ipv4Addr::new(192, 168, 1, 200)))
        );
    }

    #[test]
    fn missing_range_uses_defaults_clamped_to_hosts() {
        let bounds = dhcp_pool_bounds(&lan("192.168.1.0/24", None), &DhcpDefaults::default());
        assert_eq!(
            bounds,
            Some((Ipv4Addr::new(192, 168, 1, 100), Ipv4Addr::new(192, 168, 1, 249)))
        );

        let bounds = dhcp_pool_bounds(&lan("10.0.0.0/25", None), &DhcpDefaults::default());
        assert_eq!(
            bounds,
            Some((Ipv4Addr::new(10, 0, 0, 100), Ipv4Addr::new(10, 0, 0, 126)))
        );

        let bounds = dhcp_pool_bounds(&lan("10.0.0.0/28", None), &DhcpDefaults::default());
        assert_eq!(
            bounds,
            Some((Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 14)))
        );
    }
}
