//! Policy document loading.
//!
//! Translates a YAML policy document into the [`Policy`] model one field at a
//! time. The loader fails fast on structural problems (missing file, malformed
//! YAML, empty document, missing required field, unknown enum value) and
//! never performs cross-field checks; those belong to [`crate::validate`].
//!
//! Blank optional strings load as absent so the validator sees one notion of
//! "missing".

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::model::{
    Band, DhcpConfig, Dns, DnsRecord, Firewall, FirewallAction, FirewallRule, ForwardProtocol,
    Lan, Meta, Nat, Policy, PortForward, Protocol, Vendor, VendorTarget, Vpn, VpnKind, VpnRole,
    Wan, WanKind, Wifi, WifiEncryption, WifiMode, WifiSecurity,
};
use crate::secrets::{SecretResolver, SecretValue};

/// Errors returned when a policy document cannot be turned into a [`Policy`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("policy file not found: {path}")]
    NotFound { path: String },
    #[error("failed to read policy file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid YAML: {0}")]
    Yaml(#[source] serde_yaml::Error),
    #[error("empty policy document")]
    Empty,
    #[error("invalid policy structure: {0}")]
    Structure(#[source] serde_yaml::Error),
}

/// Load a policy file. Secret references are resolved only when a resolver
/// is supplied.
pub fn load_policy(path: &Path, resolver: Option<&SecretResolver<'_>>) -> Result<Policy, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.display().to_string(),
        });
    }
    tracing::debug!(path = %path.display(), resolve_secrets = resolver.is_some(), "loading policy");
    let raw = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_policy(&raw, resolver)
}

/// Parse policy YAML text.
pub fn parse_policy(raw: &str, resolver: Option<&SecretResolver<'_>>) -> Result<Policy, LoadError> {
    if raw.trim().is_empty() {
        return Err(LoadError::Empty);
    }
    let value: serde_yaml::Value = serde_yaml::from_str(raw).map_err(LoadError::Yaml)?;
    let is_empty = match &value {
        serde_yaml::Value::Null => true,
        serde_yaml::Value::Mapping(map) => map.is_empty(),
        _ => false,
    };
    if is_empty {
        return Err(LoadError::Empty);
    }

    // Re-read as the typed document so structure errors keep line/column.
    let doc: RawPolicy = serde_yaml::from_str(raw).map_err(LoadError::Structure)?;
    let secrets = SecretPass { resolver };
    let policy = doc.into_policy(&secrets);
    tracing::debug!(
        policy = %policy.meta.name,
        lans = policy.lans.len(),
        wifi = policy.wifi.len(),
        vpn = policy.vpn.len(),
        "policy loaded"
    );
    Ok(policy)
}

struct SecretPass<'r, 'a> {
    resolver: Option<&'r SecretResolver<'a>>,
}

impl SecretPass<'_, '_> {
    fn apply(&self, raw: Option<String>) -> Option<SecretValue> {
        let raw = non_blank(raw)?;
        Some(match self.resolver {
            Some(resolver) => resolver.resolve(&raw),
            None => SecretValue::passthrough(&raw),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Deserialize)]
struct RawPolicy {
    meta: RawMeta,
    wan: RawWan,
    #[serde(default)]
    lans: Vec<RawLan>,
    #[serde(default)]
    wifi: Vec<RawWifi>,
    #[serde(default)]
    vpn: Vec<RawVpn>,
    firewall: Option<RawFirewall>,
    nat: Option<RawNat>,
    dns: Option<RawDns>,
}

impl RawPolicy {
    fn into_policy(self, secrets: &SecretPass<'_, '_>) -> Policy {
        Policy {
            meta: self.meta.into_meta(),
            wan: self.wan.into_wan(secrets),
            lans: self.lans.into_iter().map(RawLan::into_lan).collect(),
            wifi: self
                .wifi
                .into_iter()
                .map(|wifi| wifi.into_wifi(secrets))
                .collect(),
            vpn: self
                .vpn
                .into_iter()
                .map(|vpn| vpn.into_vpn(secrets))
                .collect(),
            firewall: self.firewall.map(RawFirewall::into_firewall),
            nat: self.nat.map(RawNat::into_nat),
            dns: self.dns.map(RawDns::into_dns),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawMeta {
    name: String,
    description: Option<String>,
    target: Option<RawTarget>,
}

impl RawMeta {
    fn into_meta(self) -> Meta {
        Meta {
            name: self.name,
            description: non_blank(self.description),
            target: self.target.map(|t| VendorTarget {
                vendor: t.vendor,
                version: non_blank(t.version),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawTarget {
    #[serde(default = "default_vendor")]
    vendor: Vendor,
    version: Option<String>,
}

fn default_vendor() -> Vendor {
    Vendor::Routeros
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum WanType {
    Pppoe,
    Dhcp,
    Static,
}

#[derive(Debug, Deserialize)]
struct RawWan {
    #[serde(rename = "type")]
    kind: WanType,
    interface: String,
    username: Option<String>,
    password_ref: Option<String>,
    ip_address: Option<String>,
    netmask: Option<String>,
    gateway: Option<String>,
    #[serde(default)]
    dns: Vec<String>,
    mtu: Option<u32>,
}

impl RawWan {
    fn into_wan(self, secrets: &SecretPass<'_, '_>) -> Wan {
        let kind = match self.kind {
            WanType::Pppoe => WanKind::Pppoe {
                username: non_blank(self.username),
                password: secrets.apply(self.password_ref),
            },
            WanType::Dhcp => WanKind::Dhcp,
            WanType::Static => WanKind::Static {
                ip_address: non_blank(self.ip_address),
                netmask: non_blank(self.netmask),
                gateway: non_blank(self.gateway),
            },
        };
        Wan {
            interface: self.interface,
            kind,
            dns: self.dns,
            mtu: self.mtu,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawDhcp {
    #[serde(default)]
    enabled: bool,
    range: Option<String>,
    lease_time: Option<String>,
    #[serde(default)]
    dns: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawLan {
    name: String,
    subnet: String,
    gateway: String,
    vlan_id: Option<u32>,
    dhcp: Option<RawDhcp>,
    #[serde(default)]
    isolated_from: Vec<String>,
}

impl RawLan {
    fn into_lan(self) -> Lan {
        Lan {
            name: self.name,
            subnet: self.subnet,
            gateway: self.gateway,
            vlan_id: self.vlan_id,
            dhcp: self.dhcp.map(|d| DhcpConfig {
                enabled: d.enabled,
                range: non_blank(d.range),
                lease_time: non_blank(d.lease_time),
                dns: d.dns,
            }),
            isolated_from: self.isolated_from,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSecurity {
    #[serde(default = "default_encryption")]
    encryption: WifiEncryption,
    password_ref: Option<String>,
}

impl Default for RawSecurity {
    fn default() -> Self {
        Self {
            encryption: default_encryption(),
            password_ref: None,
        }
    }
}

fn default_encryption() -> WifiEncryption {
    WifiEncryption::Wpa2Psk
}

#[derive(Debug, Deserialize)]
struct RawWifi {
    name: String,
    lan: String,
    ssid: String,
    mode: WifiMode,
    #[serde(default)]
    security: RawSecurity,
    band: Option<Band>,
    channel: Option<u32>,
    #[serde(default)]
    guest: bool,
    #[serde(default)]
    hidden: bool,
}

impl RawWifi {
    fn into_wifi(self, secrets: &SecretPass<'_, '_>) -> Wifi {
        Wifi {
            name: self.name,
            lan: self.lan,
            ssid: self.ssid,
            mode: self.mode,
            security: WifiSecurity {
                encryption: self.security.encryption,
                password: secrets.apply(self.security.password_ref),
            },
            band: self.band,
            channel: self.channel,
            guest: self.guest,
            hidden: self.hidden,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawVpn {
    #[serde(rename = "type")]
    kind: VpnKind,
    role: VpnRole,
    listen_port: Option<u16>,
    remote_host: Option<String>,
    remote_port: Option<u16>,
    #[serde(default)]
    allowed_ips: Vec<String>,
    public_key_ref: Option<String>,
    private_key_ref: Option<String>,
    preshared_key_ref: Option<String>,
}

impl RawVpn {
    fn into_vpn(self, secrets: &SecretPass<'_, '_>) -> Vpn {
        Vpn {
            kind: self.kind,
            role: self.role,
            listen_port: self.listen_port,
            remote_host: non_blank(self.remote_host),
            remote_port: self.remote_port,
            allowed_ips: self.allowed_ips,
            public_key: secrets.apply(self.public_key_ref),
            private_key: secrets.apply(self.private_key_ref),
            preshared_key: secrets.apply(self.preshared_key_ref),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawFirewall {
    #[serde(default = "default_policy")]
    default_policy: FirewallAction,
    #[serde(default)]
    rules: Vec<RawRule>,
}

fn default_policy() -> FirewallAction {
    FirewallAction::Drop
}

impl RawFirewall {
    fn into_firewall(self) -> Firewall {
        Firewall {
            default_policy: self.default_policy,
            rules: self.rules.into_iter().map(RawRule::into_rule).collect(),
        }
    }
}

/// Ports may be written as a bare number or as text (`80,443`, `8000-8080`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPort {
    Number(u32),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct RawRule {
    name: String,
    action: FirewallAction,
    #[serde(default)]
    from: Vec<String>,
    #[serde(default)]
    to: Vec<String>,
    protocol: Option<Protocol>,
    port: Option<RawPort>,
    comment: Option<String>,
}

impl RawRule {
    fn into_rule(self) -> FirewallRule {
        let port = match self.port {
            Some(RawPort::Number(n)) => Some(n.to_string()),
            Some(RawPort::Text(text)) => non_blank(Some(text)),
            None => None,
        };
        FirewallRule {
            name: self.name,
            action: self.action,
            from: self.from,
            to: self.to,
            protocol: self.protocol,
            port,
            comment: non_blank(self.comment),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawNat {
    #[serde(default = "default_true")]
    masquerade: bool,
    #[serde(default)]
    port_forwards: Vec<RawForward>,
}

fn default_true() -> bool {
    true
}

impl RawNat {
    fn into_nat(self) -> Nat {
        Nat {
            masquerade: self.masquerade,
            port_forwards: self
                .port_forwards
                .into_iter()
                .map(|pf| PortForward {
                    name: pf.name,
                    external_port: pf.external_port,
                    internal_ip: pf.internal_ip,
                    internal_port: pf.internal_port,
                    protocol: pf.protocol,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawForward {
    name: String,
    external_port: u16,
    internal_ip: String,
    internal_port: u16,
    #[serde(default)]
    protocol: ForwardProtocol,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    name: String,
    ip: String,
}

#[derive(Debug, Deserialize)]
struct RawDns {
    #[serde(default)]
    forwarders: Vec<String>,
    local_domain: Option<String>,
    #[serde(default)]
    static_records: Vec<RawRecord>,
}

impl RawDns {
    fn into_dns(self) -> Dns {
        Dns {
            forwarders: self.forwarders,
            local_domain: non_blank(self.local_domain),
            static_records: self
                .static_records
                .into_iter()
                .map(|r| DnsRecord {
                    name: r.name,
                    ip: r.ip,
                })
                .collect(),
        }
    }
}
