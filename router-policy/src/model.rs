//! Vendor-neutral router policy model.
//!
//! These types are the intermediate representation shared by the loader,
//! the validator, and every backend. They carry no behavior beyond lookups:
//! the loader is the only writer, and cross-field invariants (unique names,
//! non-overlapping subnets, resolvable zones) are checked by
//! [`crate::validate`], not enforced at construction.

use std::fmt::{self, Display, Formatter};
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;

use ipnet::Ipv4Net;
use serde::Deserialize;

use crate::secrets::SecretValue;

/// Zone names that are always valid in firewall rules and isolation lists.
pub const RESERVED_ZONES: [&str; 2] = ["wan", "vpn"];

#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    pub meta: Meta,
    pub wan: Wan,
    pub lans: Vec<Lan>,
    pub wifi: Vec<Wifi>,
    pub vpn: Vec<Vpn>,
    pub firewall: Option<Firewall>,
    pub nat: Option<Nat>,
    pub dns: Option<Dns>,
}

impl Policy {
    /// Find a LAN by name.
    pub fn lan(&self, name: &str) -> Option<&Lan> {
        self.lans.iter().find(|lan| lan.name == name)
    }

    /// All Wi-Fi networks bridged into the named LAN.
    pub fn wifi_for_lan<'a>(&'a self, lan: &'a str) -> impl Iterator<Item = &'a Wifi> + 'a {
        self.wifi.iter().filter(move |wifi| wifi.lan == lan)
    }

    /// True when `name` is a LAN name or a reserved zone.
    pub fn zone_exists(&self, name: &str) -> bool {
        RESERVED_ZONES.contains(&name) || self.lan(name).is_some()
    }

    /// True when a firewall rule or a LAN's `isolated_from` names `zone`.
    pub fn zone_referenced(&self, zone: &str) -> bool {
        self.firewall
            .iter()
            .flat_map(|fw| fw.rules.iter())
            .flat_map(|rule| rule.from.iter().chain(&rule.to))
            .chain(self.lans.iter().flat_map(|lan| lan.isolated_from.iter()))
            .any(|name| name == zone)
    }

    pub fn has_isolation(&self) -> bool {
        self.lans.iter().any(|lan| !lan.isolated_from.is_empty())
    }

    /// First LAN whose subnet contains `ip`. Unparseable subnets never match.
    pub fn lan_containing(&self, ip: Ipv4Addr) -> Option<&Lan> {
        self.lans
            .iter()
            .find(|lan| lan.network().is_some_and(|net| net.contains(&ip)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    Routeros,
    Openwrt,
}

impl Vendor {
    pub fn as_str(self) -> &'static str {
        match self {
            Vendor::Routeros => "routeros",
            Vendor::Openwrt => "openwrt",
        }
    }
}

impl Display for Vendor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorTarget {
    pub vendor: Vendor,
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meta {
    pub name: String,
    pub description: Option<String>,
    pub target: Option<VendorTarget>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wan {
    pub interface: String,
    pub kind: WanKind,
    /// Upstream resolvers, in preference order.
    pub dns: Vec<String>,
    pub mtu: Option<u32>,
}

/// Connection type plus the fields that type needs. Fields stay optional so
/// the validator can report every missing one.
#[derive(Debug, Clone, PartialEq)]
pub enum WanKind {
    Pppoe {
        username: Option<String>,
        password: Option<SecretValue>,
    },
    Dhcp,
    Static {
        ip_address: Option<String>,
        netmask: Option<String>,
        gateway: Option<String>,
    },
}

impl WanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WanKind::Pppoe { .. } => "pppoe",
            WanKind::Dhcp => "dhcp",
            WanKind::Static { .. } => "static",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhcpConfig {
    pub enabled: bool,
    /// `start-end`, e.g. `192.168.1.100-192.168.1.200`.
    pub range: Option<String>,
    pub lease_time: Option<String>,
    pub dns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lan {
    pub name: String,
    /// CIDR, e.g. `192.168.1.0/24`.
    pub subnet: String,
    pub gateway: String,
    pub vlan_id: Option<u32>,
    pub dhcp: Option<DhcpConfig>,
    /// Zones this LAN must not forward traffic to.
    pub isolated_from: Vec<String>,
}

impl Lan {
    /// Parsed subnet with host bits cleared, if the subnet is valid CIDR.
    pub fn network(&self) -> Option<Ipv4Net> {
        self.subnet.trim().parse::<Ipv4Net>().ok().map(|net| net.trunc())
    }

    /// Prefix length taken from the subnet text, defaulting to 24.
    pub fn prefix_len(&self) -> u8 {
        self.network().map_or(24, |net| net.prefix_len())
    }

    /// DHCP settings only when the server is switched on.
    pub fn enabled_dhcp(&self) -> Option<&DhcpConfig> {
        self.dhcp.as_ref().filter(|dhcp| dhcp.enabled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WifiMode {
    Ap,
    Station,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WifiEncryption {
    Open,
    Wep,
    WpaPsk,
    Wpa2Psk,
    Wpa3Sae,
    Wpa2Enterprise,
}

impl WifiEncryption {
    pub fn as_str(self) -> &'static str {
        match self {
            WifiEncryption::Open => "open",
            WifiEncryption::Wep => "wep",
            WifiEncryption::WpaPsk => "wpa-psk",
            WifiEncryption::Wpa2Psk => "wpa2-psk",
            WifiEncryption::Wpa3Sae => "wpa3-sae",
            WifiEncryption::Wpa2Enterprise => "wpa2-enterprise",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub enum Band {
    #[serde(rename = "2.4GHz", alias = "2.4ghz", alias = "2g")]
    Ghz2_4,
    #[serde(rename = "5GHz", alias = "5ghz", alias = "5g")]
    Ghz5,
}

impl Band {
    pub const ALL: [Band; 2] = [Band::Ghz2_4, Band::Ghz5];

    /// Channels a radio may use on this band.
    pub fn channels(self) -> RangeInclusive<u32> {
        match self {
            Band::Ghz2_4 => 1..=14,
            Band::Ghz5 => 36..=165,
        }
    }

    /// Band whose channel plan contains `channel`.
    pub fn for_channel(channel: u32) -> Option<Band> {
        Band::ALL
            .into_iter()
            .find(|band| band.channels().contains(&channel))
    }

    /// Center frequency in MHz for `channel`.
    pub fn frequency_mhz(self, channel: u32) -> u32 {
        match self {
            Band::Ghz2_4 if channel == 14 => 2484,
            Band::Ghz2_4 => 2407 + 5 * channel,
            Band::Ghz5 => 5000 + 5 * channel,
        }
    }
}

impl Display for Band {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Band::Ghz2_4 => f.write_str("2.4GHz"),
            Band::Ghz5 => f.write_str("5GHz"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiSecurity {
    pub encryption: WifiEncryption,
    pub password: Option<SecretValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wifi {
    pub name: String,
    /// Name of the LAN this SSID is bridged into.
    pub lan: String,
    pub ssid: String,
    pub mode: WifiMode,
    pub security: WifiSecurity,
    pub band: Option<Band>,
    pub channel: Option<u32>,
    pub guest: bool,
    pub hidden: bool,
}

impl Wifi {
    /// Declared band, else the band implied by the channel, else `default`.
    pub fn resolved_band(&self, default: Band) -> Band {
        self.band
            .or_else(|| self.channel.and_then(Band::for_channel))
            .unwrap_or(default)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VpnKind {
    Wireguard,
    Openvpn,
    L2tp,
    Ipsec,
    Pptp,
}

impl VpnKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VpnKind::Wireguard => "wireguard",
            VpnKind::Openvpn => "openvpn",
            VpnKind::L2tp => "l2tp",
            VpnKind::Ipsec => "ipsec",
            VpnKind::Pptp => "pptp",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VpnRole {
    Server,
    Client,
}

impl VpnRole {
    pub fn as_str(self) -> &'static str {
        match self {
            VpnRole::Server => "server",
            VpnRole::Client => "client",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vpn {
    pub kind: VpnKind,
    pub role: VpnRole,
    pub listen_port: Option<u16>,
    pub remote_host: Option<String>,
    pub remote_port: Option<u16>,
    /// CIDR networks routed through the tunnel.
    pub allowed_ips: Vec<String>,
    pub public_key: Option<SecretValue>,
    pub private_key: Option<SecretValue>,
    pub preshared_key: Option<SecretValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirewallAction {
    Accept,
    Drop,
    Reject,
}

impl FirewallAction {
    pub fn as_str(self) -> &'static str {
        match self {
            FirewallAction::Accept => "accept",
            FirewallAction::Drop => "drop",
            FirewallAction::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
    All,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Icmp => "icmp",
            Protocol::All => "all",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Firewall {
    /// Applied to traffic no rule matched.
    pub default_policy: FirewallAction,
    pub rules: Vec<FirewallRule>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirewallRule {
    pub name: String,
    pub action: FirewallAction,
    pub from: Vec<String>,
    pub to: Vec<String>,
    pub protocol: Option<Protocol>,
    /// `443`, `8000-8080` or `80,443`.
    pub port: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForwardProtocol {
    #[default]
    Tcp,
    Udp,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nat {
    pub masquerade: bool,
    pub port_forwards: Vec<PortForward>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortForward {
    pub name: String,
    pub external_port: u16,
    pub internal_ip: String,
    pub internal_port: u16,
    pub protocol: ForwardProtocol,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    pub name: String,
    pub ip: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dns {
    pub forwarders: Vec<String>,
    pub local_domain: Option<String>,
    pub static_records: Vec<DnsRecord>,
}
