//! RouterOS script backend.
//!
//! Sections are emitted in a fixed order (WAN, LAN, Wi-Fi, VPN, firewall,
//! NAT, DNS) as a structured [`Script`] and serialized once at the end.
//!
//! Firewall zones become interface lists named `zone-<zone>`: `wan` holds the
//! WAN (or PPPoE client) interface, each LAN holds its bridge, and `vpn`
//! holds the client-side tunnel interfaces.

use std::collections::BTreeSet;

use router_syntax_core::{Command, Script, ScriptSection};

use crate::backend::netmask::{netmask_to_prefix, FALLBACK_NETMASK};
use crate::backend::{dhcp_pool_bounds, secret_text, CHANGE_ME, TODO};
use crate::model::{
    Band, DhcpConfig, Dns, Firewall, FirewallAction, FirewallRule, ForwardProtocol, Lan, Nat,
    Policy, Protocol, Vpn, VpnKind, VpnRole, WanKind, Wifi, WifiEncryption, WifiMode,
    WifiSecurity,
};
use crate::settings::RenderSettings;

pub fn render(policy: &Policy, settings: &RenderSettings) -> String {
    let mut script = Script::new();
    let version = policy
        .meta
        .target
        .as_ref()
        .and_then(|target| target.version.as_deref())
        .unwrap_or(&settings.routeros.version);
    script.header_line("RouterOS Configuration Script");
    script.header_line(format!("Generated from policy: {}", policy.meta.name));
    if let Some(description) = &policy.meta.description {
        script.header_line(description.clone());
    }
    script.header_line(format!("Target: RouterOS {version}"));
    script.header_line("");
    script.header_line("WARNING: Review this configuration before applying to production!");

    script.push_section(wan_section(policy, settings));
    script.push_section(lan_section(policy, settings));
    if !policy.wifi.is_empty() {
        script.push_section(wifi_section(policy, settings));
    }
    if !policy.vpn.is_empty() {
        script.push_section(vpn_section(&policy.vpn));
    }
    if policy.firewall.is_some() || policy.has_isolation() {
        script.push_section(firewall_section(policy, policy.firewall.as_ref(), settings));
    }
    if let Some(nat) = &policy.nat {
        let section = nat_section(nat, wan_interface(policy, settings));
        if !section.is_empty() {
            script.push_section(section);
        }
    }
    if let Some(dns) = &policy.dns {
        let section = dns_section(dns);
        if !section.is_empty() {
            script.push_section(section);
        }
    }
    script.render()
}

/// Interface traffic leaves through: the PPPoE client when there is one.
fn wan_interface<'a>(policy: &'a Policy, settings: &'a RenderSettings) -> &'a str {
    match policy.wan.kind {
        WanKind::Pppoe { .. } => &settings.routeros.pppoe_interface,
        WanKind::Dhcp | WanKind::Static { .. } => &policy.wan.interface,
    }
}

fn bridge_name(lan: &str) -> String {
    format!("bridge-{lan}")
}

fn zone_list(zone: &str) -> String {
    format!("zone-{zone}")
}

fn wan_section(policy: &Policy, settings: &RenderSettings) -> ScriptSection {
    let wan = &policy.wan;
    let mut section = ScriptSection::new("WAN Configuration");
    match &wan.kind {
        WanKind::Pppoe { username, password } => {
            section
                .comment(format!("PPPoE WAN on {}", wan.interface))
                .menu("/interface pppoe-client")
                .command(
                    Command::add()
                        .arg("name", &settings.routeros.pppoe_interface)
                        .arg("interface", &wan.interface)
                        .quoted("user", username.as_deref().unwrap_or(CHANGE_ME))
                        .quoted("password", secret_text(password.as_ref()))
                        .arg_opt("max-mtu", wan.mtu)
                        .arg("add-default-route", "yes")
                        .arg("disabled", "no"),
                );
        }
        WanKind::Dhcp => {
            section
                .comment(format!("DHCP WAN on {}", wan.interface))
                .menu("/ip dhcp-client")
                .command(
                    Command::add()
                        .arg("interface", &wan.interface)
                        .arg("disabled", "no"),
                );
        }
        WanKind::Static {
            ip_address,
            netmask,
            gateway,
        } => {
            let prefix = netmask_to_prefix(netmask.as_deref().unwrap_or(FALLBACK_NETMASK));
            section
                .comment(format!("Static WAN on {}", wan.interface))
                .menu("/ip address")
                .command(
                    Command::add()
                        .arg(
                            "address",
                            format!("{}/{prefix}", ip_address.as_deref().unwrap_or(TODO)),
                        )
                        .arg("interface", &wan.interface),
                )
                .menu("/ip route")
                .command(
                    Command::add()
                        .arg("dst-address", "0.0.0.0/0")
                        .arg("gateway", gateway.as_deref().unwrap_or(TODO)),
                );
        }
    }

    if !matches!(wan.kind, WanKind::Pppoe { .. }) {
        if let Some(mtu) = wan.mtu {
            section.menu("/interface ethernet").command(
                Command::set()
                    .find(format!("default-name={}", wan.interface))
                    .arg("mtu", mtu),
            );
        }
    }
    if !wan.dns.is_empty() {
        section
            .menu("/ip dns")
            .command(Command::set().arg("servers", wan.dns.join(",")));
    }
    section
}

fn lan_section(policy: &Policy, settings: &RenderSettings) -> ScriptSection {
    let mut section = ScriptSection::new("LAN Configuration");
    let local_domain = policy.dns.as_ref().and_then(|dns| dns.local_domain.as_deref());
    for (idx, lan) in policy.lans.iter().enumerate() {
        if idx > 0 {
            section.blank();
        }
        let bridge = bridge_name(&lan.name);
        section
            .comment(format!("LAN: {}", lan.name))
            .menu("/interface bridge")
            .command(Command::add().arg("name", &bridge))
            .menu("/ip address")
            .command(
                Command::add()
                    .arg("address", format!("{}/{}", lan.gateway, lan.prefix_len()))
                    .arg("interface", &bridge),
            );

        if let Some(vlan) = lan.vlan_id {
            section
                .comment(format!("VLAN {vlan} for {}", lan.name))
                .menu("/interface vlan")
                .command(
                    Command::add()
                        .arg("name", format!("vlan{vlan}"))
                        .arg("vlan-id", vlan)
                        .arg("interface", &bridge),
                );
        }
        if let Some(dhcp) = lan.enabled_dhcp() {
            dhcp_server(&mut section, lan, dhcp, local_domain, settings);
        }
    }
    section
}

fn dhcp_server(
    section: &mut ScriptSection,
    lan: &Lan,
    dhcp: &DhcpConfig,
    local_domain: Option<&str>,
    settings: &RenderSettings,
) {
    let pool = format!("dhcp-pool-{}", lan.name);
    let ranges = dhcp_pool_bounds(lan, &settings.dhcp)
        .map_or_else(|| TODO.to_string(), |(start, end)| format!("{start}-{end}"));
    let network = lan
        .network()
        .map_or_else(|| lan.subnet.clone(), |net| net.to_string());
    let dns = (!dhcp.dns.is_empty()).then(|| dhcp.dns.join(","));

    section
        .menu("/ip pool")
        .command(Command::add().arg("name", &pool).arg("ranges", ranges))
        .menu("/ip dhcp-server")
        .command(
            Command::add()
                .arg("name", format!("dhcp-{}", lan.name))
                .arg("interface", bridge_name(&lan.name))
                .arg("address-pool", &pool)
                .arg_opt("lease-time", dhcp.lease_time.as_deref())
                .arg("disabled", "no"),
        )
        .menu("/ip dhcp-server network")
        .command(
            Command::add()
                .arg("address", network)
                .arg("gateway", &lan.gateway)
                .arg_opt("dns-server", dns)
                .arg_opt("domain", local_domain),
        );
}

fn wifi_section(policy: &Policy, settings: &RenderSettings) -> ScriptSection {
    let mut section = ScriptSection::new("Wi-Fi Configuration");
    let mut claimed = BTreeSet::new();
    let mut ports = Vec::new();

    for wifi in &policy.wifi {
        let band = wifi.resolved_band(settings.wifi.default_band);
        let radio = &settings.routeros.radios.get(band).interface;
        let profile = format!("sec-{}", wifi.name);
        section
            .comment(format!("Wi-Fi: {} ({})", wifi.name, wifi.ssid))
            .menu("/interface wireless security-profiles")
            .command(security_profile(&profile, &wifi.security))
            .menu("/interface wireless");

        // First SSID on a band configures the physical radio; the rest are
        // virtual APs on top of it.
        let interface = if claimed.insert(band) {
            let command = Command::set()
                .find(format!("default-name={radio}"))
                .arg("band", band_mode(band))
                .arg_opt("frequency", wifi.channel.map(|ch| band.frequency_mhz(ch)));
            section.command(wifi_args(command, wifi, &profile));
            radio.clone()
        } else {
            let name = format!("{radio}-{}", wifi.name);
            let command = Command::add()
                .arg("name", &name)
                .arg("master-interface", radio);
            section.command(wifi_args(command, wifi, &profile));
            name
        };
        ports.push((bridge_name(&wifi.lan), interface));
        section.blank();
    }

    section.menu("/interface bridge port");
    for (bridge, interface) in ports {
        section.command(
            Command::add()
                .arg("bridge", bridge)
                .arg("interface", interface),
        );
    }
    section
}

fn wifi_args(command: Command, wifi: &Wifi, profile: &str) -> Command {
    let mode = match wifi.mode {
        WifiMode::Ap => "ap-bridge",
        WifiMode::Station => "station",
    };
    command
        .quoted("ssid", &wifi.ssid)
        .arg("mode", mode)
        .arg("security-profile", profile)
        .arg_opt("hide-ssid", wifi.hidden.then_some("yes"))
        .arg_opt("default-forwarding", wifi.guest.then_some("no"))
        .arg("disabled", "no")
}

fn band_mode(band: Band) -> &'static str {
    match band {
        Band::Ghz2_4 => "2ghz-b/g/n",
        Band::Ghz5 => "5ghz-a/n/ac",
    }
}

fn security_profile(name: &str, security: &WifiSecurity) -> Command {
    let command = Command::add().arg("name", name);
    let key = || secret_text(security.password.as_ref());
    match security.encryption {
        WifiEncryption::Open => command.arg("mode", "none"),
        WifiEncryption::Wep => command
            .arg("mode", "static-keys-required")
            .arg("static-algo-0", "104bit-wep")
            .quoted("static-key-0", key()),
        WifiEncryption::WpaPsk => command
            .arg("mode", "dynamic-keys")
            .arg("authentication-types", "wpa-psk")
            .quoted("wpa-pre-shared-key", key()),
        WifiEncryption::Wpa2Psk => command
            .arg("mode", "dynamic-keys")
            .arg("authentication-types", "wpa2-psk")
            .quoted("wpa2-pre-shared-key", key()),
        WifiEncryption::Wpa3Sae => command
            .arg("mode", "dynamic-keys")
            .arg("authentication-types", "wpa3-psk")
            .quoted("wpa3-pre-shared-key", key()),
        WifiEncryption::Wpa2Enterprise => command
            .arg("mode", "dynamic-keys")
            .arg("authentication-types", "wpa2-eap")
            .arg("eap-methods", "passthrough"),
    }
}

/// Interface a VPN adds to the `vpn` zone. Server-side tunnels are created
/// per connection and have no fixed name.
fn vpn_interface(vpn: &Vpn, number: usize) -> Option<String> {
    match (vpn.kind, vpn.role) {
        (VpnKind::Wireguard, _) => Some(format!("wireguard{number}")),
        (VpnKind::Openvpn, VpnRole::Client) => Some(format!("ovpn-out{number}")),
        (VpnKind::L2tp, VpnRole::Client) => Some(format!("l2tp-out{number}")),
        (VpnKind::Pptp, VpnRole::Client) => Some(format!("pptp-out{number}")),
        (VpnKind::Openvpn | VpnKind::L2tp | VpnKind::Pptp, VpnRole::Server) | (VpnKind::Ipsec, _) => {
            None
        }
    }
}

fn vpn_section(vpns: &[Vpn]) -> ScriptSection {
    let mut section = ScriptSection::new("VPN Configuration");
    for (idx, vpn) in vpns.iter().enumerate() {
        let number = idx + 1;
        if idx > 0 {
            section.blank();
        }
        section.comment(format!(
            "{} VPN #{number} ({})",
            vpn.kind.as_str(),
            vpn.role.as_str()
        ));
        let host = vpn.remote_host.as_deref().unwrap_or(TODO);
        match vpn.kind {
            VpnKind::Wireguard => wireguard(&mut section, vpn, number),
            VpnKind::Openvpn => match vpn.role {
                VpnRole::Server => {
                    section.menu("/interface ovpn-server server").command(
                        Command::set()
                            .arg("enabled", "yes")
                            .arg_opt("port", vpn.listen_port),
                    );
                }
                VpnRole::Client => {
                    section.menu("/interface ovpn-client").command(
                        Command::add()
                            .arg("name", format!("ovpn-out{number}"))
                            .arg("connect-to", host)
                            .arg_opt("port", vpn.remote_port)
                            .arg("disabled", "no"),
                    );
                }
            },
            VpnKind::L2tp => {
                let command = match vpn.role {
                    VpnRole::Server => {
                        section.menu("/interface l2tp-server server");
                        Command::set().arg("enabled", "yes")
                    }
                    VpnRole::Client => {
                        section.menu("/interface l2tp-client");
                        Command::add()
                            .arg("name", format!("l2tp-out{number}"))
                            .arg("connect-to", host)
                    }
                };
                let command = match &vpn.preshared_key {
                    Some(psk) => command
                        .arg("use-ipsec", "yes")
                        .quoted("ipsec-secret", secret_text(Some(psk))),
                    None => command,
                };
                let command = match vpn.role {
                    VpnRole::Server => command,
                    VpnRole::Client => command.arg("disabled", "no"),
                };
                section.command(command);
            }
            VpnKind::Pptp => match vpn.role {
                VpnRole::Server => {
                    section
                        .menu("/interface pptp-server server")
                        .command(Command::set().arg("enabled", "yes"));
                }
                VpnRole::Client => {
                    section.menu("/interface pptp-client").command(
                        Command::add()
                            .arg("name", format!("pptp-out{number}"))
                            .arg("connect-to", host)
                            .arg("disabled", "no"),
                    );
                }
            },
            VpnKind::Ipsec => ipsec(&mut section, vpn, number),
        }
    }
    section
}

fn wireguard(section: &mut ScriptSection, vpn: &Vpn, number: usize) {
    let interface = format!("wireguard{number}");
    let mut command = Command::add()
        .arg("name", &interface)
        .arg_opt("listen-port", vpn.listen_port);
    if let Some(key) = &vpn.private_key {
        command = command.quoted("private-key", secret_text(Some(key)));
    }
    section
        .menu("/interface wireguard")
        .command(command.arg("disabled", "no"));

    let is_client = vpn.role == VpnRole::Client;
    if !is_client && vpn.allowed_ips.is_empty() && vpn.public_key.is_none() {
        return;
    }
    let allowed = if vpn.allowed_ips.is_empty() && is_client {
        Some("0.0.0.0/0".to_string())
    } else {
        (!vpn.allowed_ips.is_empty()).then(|| vpn.allowed_ips.join(","))
    };
    let mut peer = Command::add()
        .arg("interface", &interface)
        .quoted("public-key", secret_text(vpn.public_key.as_ref()));
    if is_client {
        peer = peer
            .arg("endpoint-address", vpn.remote_host.as_deref().unwrap_or(TODO))
            .arg_opt("endpoint-port", vpn.remote_port);
    }
    peer = peer.arg_opt("allowed-address", allowed);
    if let Some(psk) = &vpn.preshared_key {
        peer = peer.quoted("preshared-key", secret_text(Some(psk)));
    }
    if is_client {
        peer = peer.arg("persistent-keepalive", "25s");
    }
    section.menu("/interface wireguard peers").command(peer);
}

fn ipsec(section: &mut ScriptSection, vpn: &Vpn, number: usize) {
    let peer_name = format!("peer{number}");
    let peer = Command::add().arg("name", &peer_name);
    let peer = match vpn.role {
        VpnRole::Server => peer.arg("passive", "yes").arg_opt("port", vpn.listen_port),
        VpnRole::Client => peer
            .arg("address", vpn.remote_host.as_deref().unwrap_or(TODO))
            .arg_opt("port", vpn.remote_port),
    };
    section
        .menu("/ip ipsec peer")
        .command(peer.arg("exchange-mode", "ike2"))
        .menu("/ip ipsec identity")
        .command(
            Command::add()
                .arg("peer", &peer_name)
                .arg("auth-method", "pre-shared-key")
                .quoted("secret", secret_text(vpn.preshared_key.as_ref())),
        );
    if !vpn.allowed_ips.is_empty() {
        section.menu("/ip ipsec policy");
        for cidr in &vpn.allowed_ips {
            section.command(
                Command::add()
                    .arg("peer", &peer_name)
                    .arg("dst-address", cidr)
                    .arg("tunnel", "yes"),
            );
        }
    }
}

/// Zone name to member interfaces, in a stable order.
fn zone_members(policy: &Policy, settings: &RenderSettings) -> Vec<(String, Vec<String>)> {
    let mut zones = vec![(
        "wan".to_string(),
        vec![wan_interface(policy, settings).to_string()],
    )];
    for lan in &policy.lans {
        zones.push((lan.name.clone(), vec![bridge_name(&lan.name)]));
    }

    if !policy.vpn.is_empty() || policy.zone_referenced("vpn") {
        let members = policy
            .vpn
            .iter()
            .enumerate()
            .filter_map(|(idx, vpn)| vpn_interface(vpn, idx + 1))
            .collect();
        zones.push(("vpn".to_string(), members));
    }
    zones
}

/// Zone lists and filter rules. Without a `firewall` block only the
/// isolation drops are emitted.
fn firewall_section(
    policy: &Policy,
    firewall: Option<&Firewall>,
    settings: &RenderSettings,
) -> ScriptSection {
    let mut section = ScriptSection::new("Firewall Configuration");
    let zones = zone_members(policy, settings);

    section.comment("Zone interface lists").menu("/interface list");
    for (zone, _) in &zones {
        section.command(Command::add().arg("name", zone_list(zone)));
    }
    section.menu("/interface list member");
    for (zone, members) in &zones {
        for member in members {
            section.command(
                Command::add()
                    .arg("list", zone_list(zone))
                    .arg("interface", member),
            );
        }
    }

    section
        .blank()
        .comment("Firewall filter rules")
        .menu("/ip firewall filter");
    for chain in ["input", "forward"] {
        section.command(
            Command::add()
                .arg("chain", chain)
                .arg("connection-state", "established,related")
                .arg("action", "accept")
                .quoted("comment", "Allow established/related"),
        );
    }

    for lan in &policy.lans {
        for zone in &lan.isolated_from {
            section.command(
                Command::add()
                    .arg("chain", "forward")
                    .arg("in-interface-list", zone_list(&lan.name))
                    .arg("out-interface-list", zone_list(zone))
                    .arg("action", "drop")
                    .quoted("comment", format!("Isolate {} from {zone}", lan.name)),
            );
        }
    }

    let Some(firewall) = firewall else {
        return section;
    };
    for rule in &firewall.rules {
        for command in rule_commands(rule) {
            section.command(command);
        }
    }

    let trailing = match firewall.default_policy {
        FirewallAction::Accept => None,
        FirewallAction::Drop => Some(("drop", "Drop")),
        FirewallAction::Reject => Some(("reject", "Reject")),
    };
    if let Some((action, verb)) = trailing {
        for chain in ["input", "forward"] {
            section.command(
                Command::add()
                    .arg("chain", chain)
                    .arg("action", action)
                    .quoted("comment", format!("{verb} all other {chain}")),
            );
        }
    }
    section
}

/// One filter rule per (from, to) zone pair. A rule without a destination
/// zone targets the router itself.
fn rule_commands(rule: &FirewallRule) -> Vec<Command> {
    let comment = rule.comment.as_deref().unwrap_or(&rule.name);
    let froms = zones_or_any(&rule.from);
    let tos = zones_or_any(&rule.to);
    let protocol = rule
        .protocol
        .filter(|proto| *proto != Protocol::All)
        .map(Protocol::as_str);

    let mut out = Vec::new();
    for &from in &froms {
        for &to in &tos {
            let chain = if to.is_some() { "forward" } else { "input" };
            out.push(
                Command::add()
                    .arg("chain", chain)
                    .arg_opt("in-interface-list", from.map(zone_list))
                    .arg_opt("out-interface-list", to.map(zone_list))
                    .arg_opt("protocol", protocol)
                    .arg_opt("dst-port", rule.port.as_deref())
                    .arg("action", rule.action.as_str())
                    .quoted("comment", comment),
            );
        }
    }
    out
}

fn zones_or_any(zones: &[String]) -> Vec<Option<&str>> {
    if zones.is_empty() {
        vec![None]
    } else {
        zones.iter().map(|zone| Some(zone.as_str())).collect()
    }
}

fn nat_section(nat: &Nat, wan_interface: &str) -> ScriptSection {
    let mut section = ScriptSection::new("NAT Configuration");
    if !nat.masquerade && nat.port_forwards.is_empty() {
        return section;
    }
    section.menu("/ip firewall nat");
    if nat.masquerade {
        section.command(
            Command::add()
                .arg("chain", "srcnat")
                .arg("out-interface", wan_interface)
                .arg("action", "masquerade")
                .quoted("comment", "Masquerade to WAN"),
        );
    }
    for forward in &nat.port_forwards {
        let protocol = match forward.protocol {
            ForwardProtocol::Tcp => "tcp",
            ForwardProtocol::Udp => "udp",
            ForwardProtocol::Both => "tcp,udp",
        };
        section.comment(format!("Port forward: {}", forward.name)).command(
            Command::add()
                .arg("chain", "dstnat")
                .arg("in-interface", wan_interface)
                .arg("protocol", protocol)
                .arg("dst-port", forward.external_port)
                .arg("action", "dst-nat")
                .arg("to-addresses", &forward.internal_ip)
                .arg("to-ports", forward.internal_port),
        );
    }
    section
}

fn dns_section(dns: &Dns) -> ScriptSection {
    let mut section = ScriptSection::new("DNS Configuration");
    if !dns.forwarders.is_empty() {
        section.menu("/ip dns").command(
            Command::set()
                .arg("servers", dns.forwarders.join(","))
                .arg("allow-remote-requests", "yes"),
        );
    }
    if !dns.static_records.is_empty() {
        section.menu("/ip dns static");
        for record in &dns.static_records {
            section.command(
                Command::add()
                    .arg("name", &record.name)
                    .arg("address", &record.ip),
            );
        }
    }
    section
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::render;
    use crate::settings::RenderSettings;
    use crate::validate::test_support::{policy, policy_with};

    /// Joins wrapped commands back onto one line.
    fn flat(out: String) -> String {
        out.replace(" \\\n    ", " ")
    }

    fn script(extra: &str) -> String {
        flat(render(&policy_with(extra), &RenderSettings::default()))
    }

    #[test]
    fn header_names_policy_and_version() {
        let out = script("");
        assert!(out.starts_with(
            "# RouterOS Configuration Script\n# Generated from policy: test\n# Target: RouterOS v7\n#\n"
        ));
    }

    #[test]
    fn sections_follow_fixed_order() {
        let out = script(
            "dns:\n  forwarders: [1.1.1.1]\nnat:\n  masquerade: true\nfirewall:\n  rules: []\nwifi:\n  - {name: home, lan: main, ssid: Home, mode: ap, security: {encryption: open}}\n",
        );
        let banners = out
            .lines()
            .filter(|line| line.starts_with("# === "))
            .collect::<Vec<_>>();
        assert_eq!(
            banners,
            vec![
                "# === WAN Configuration ===",
                "# === LAN Configuration ===",
                "# === Wi-Fi Configuration ===",
                "# === Firewall Configuration ===",
                "# === NAT Configuration ===",
                "# === DNS Configuration ===",
            ]
        );
    }

    #[test]
    fn lan_renders_bridge_address_vlan_and_dhcp() {
        let p = policy(
            r#"
meta: {name: t}
wan: {type: dhcp, interface: ether1}
lans:
  - name: iot
    subnet: 10.20.0.0/24
    gateway: 10.20.0.1
    vlan_id: 20
    dhcp: {enabled: true, range: 10.20.0.50-10.20.0.99, lease_time: 1h, dns: [10.20.0.1]}
dns: {local_domain: home.arpa}
"#,
        );
        let out = flat(render(&p, &RenderSettings::default()));
        for expected in [
            "/interface bridge\nadd name=bridge-iot",
            "add address=10.20.0.1/24 interface=bridge-iot",
            "add name=vlan20 vlan-id=20 interface=bridge-iot",
            "add name=dhcp-pool-iot ranges=10.20.0.50-10.20.0.99",
            "add name=dhcp-iot interface=bridge-iot address-pool=dhcp-pool-iot lease-time=1h disabled=no",
            "add address=10.20.0.0/24 gateway=10.20.0.1 dns-server=10.20.0.1 domain=home.arpa",
        ] {
            assert!(out.contains(expected), "missing {expected:?} in\n{out}");
        }
    }

    #[test]
    fn pppoe_uses_placeholders_for_missing_credentials() {
        let p = policy(
            "meta: {name: t}\nwan: {type: pppoe, interface: ether1, password_ref: 'secret:isp'}\nlans: []\n",
        );
        let out = flat(render(&p, &RenderSettings::default()));
        assert!(out.contains("add name=pppoe-out1 interface=ether1 user=\"CHANGE_ME\""));
        assert!(out.contains("password=\"secret:isp\""));
    }

    #[test]
    fn static_wan_converts_netmask_with_fallback() {
        let p = policy(
            "meta: {name: t}\nwan: {type: static, interface: ether1, ip_address: 203.0.113.10, netmask: 255.255.255.248, gateway: 203.0.113.9}\n",
        );
        let out = flat(render(&p, &RenderSettings::default()));
        assert!(out.contains("add address=203.0.113.10/29 interface=ether1"));
        assert!(out.contains("add dst-address=0.0.0.0/0 gateway=203.0.113.9"));

        let p = policy(
            "meta: {name: t}\nwan: {type: static, interface: ether1, ip_address: 203.0.113.10, netmask: 255.255.254.0, gateway: 203.0.113.9}\n",
        );
        let out = flat(render(&p, &RenderSettings::default()));
        assert!(out.contains("add address=203.0.113.10/24 interface=ether1"));
    }

    #[test]
    fn second_ssid_on_a_band_becomes_virtual_ap() {
        let out = script(
            r#"wifi:
  - {name: home, lan: main, ssid: Home Net, mode: ap, band: 2.4GHz, channel: 6, security: {password_ref: k}}
  - {name: guest, lan: main, ssid: Guest, mode: ap, band: 2.4GHz, guest: true, hidden: true, security: {encryption: open}}
  - {name: fast, lan: main, ssid: Fast, mode: ap, channel: 36, security: {encryption: wpa3-sae, password_ref: k5}}
"#,
        );
        assert!(out.contains("add name=sec-home mode=dynamic-keys authentication-types=wpa2-psk wpa2-pre-shared-key=\"k\""));
        assert!(out.contains("set [ find default-name=wlan1 ] band=2ghz-b/g/n frequency=2437 ssid=\"Home Net\""));
        assert!(out.contains("add name=wlan1-guest master-interface=wlan1 ssid=\"Guest\" mode=ap-bridge security-profile=sec-guest hide-ssid=yes default-forwarding=no disabled=no"));
        assert!(out.contains("set [ find default-name=wlan2 ] band=5ghz-a/n/ac frequency=5180"));
        assert!(out.contains("add bridge=bridge-main interface=wlan1-guest"));
    }

    #[test]
    fn firewall_expands_zone_pairs_and_trailing_drops() {
        let out = script(
            r#"firewall:
  default_policy: drop
  rules:
    - {name: main-to-wan, action: accept, from: [main], to: [wan]}
    - {name: ssh, action: accept, from: [main], protocol: tcp, port: 22, comment: SSH to router}
"#,
        );
        assert!(out.contains("add list=zone-main interface=bridge-main"));
        assert!(out.contains(
            "add chain=forward in-interface-list=zone-main out-interface-list=zone-wan action=accept comment=\"main-to-wan\""
        ));
        assert!(out.contains(
            "add chain=input in-interface-list=zone-main protocol=tcp dst-port=22 action=accept comment=\"SSH to router\""
        ));
        assert!(out.contains("add chain=input action=drop comment=\"Drop all other input\""));
        assert!(out.contains("add chain=forward action=drop comment=\"Drop all other forward\""));
    }

    #[test]
    fn isolation_becomes_drop_rules() {
        let p = policy(
            r#"
meta: {name: t}
wan: {type: dhcp, interface: ether1}
lans:
  - {name: main, subnet: 10.0.1.0/24, gateway: 10.0.1.1}
  - {name: guest, subnet: 10.0.2.0/24, gateway: 10.0.2.1, isolated_from: [main]}
firewall: {default_policy: accept}
"#,
        );
        let out = flat(render(&p, &RenderSettings::default()));
        assert!(out.contains(
            "add chain=forward in-interface-list=zone-guest out-interface-list=zone-main action=drop comment=\"Isolate guest from main\""
        ));
        assert!(!out.contains("all other"));
    }

    #[test]
    fn isolation_without_firewall_block_still_drops() {
        let p = policy(
            r#"
meta: {name: t}
wan: {type: dhcp, interface: ether1}
lans:
  - {name: main, subnet: 10.0.1.0/24, gateway: 10.0.1.1}
  - {name: guest, subnet: 10.0.2.0/24, gateway: 10.0.2.1, isolated_from: [main]}
"#,
        );
        let out = flat(render(&p, &RenderSettings::default()));
        assert!(out.contains("# === Firewall Configuration ==="));
        assert!(out.contains(
            "add chain=forward in-interface-list=zone-guest out-interface-list=zone-main action=drop comment=\"Isolate guest from main\""
        ));
        assert!(!out.contains("all other"));
    }

    #[test]
    fn multi_line_description_stays_in_the_header_comment() {
        let p = policy(
            "meta:\n  name: t\n  description: |\n    Home router\n    /system reset-configuration no-defaults=yes\nwan: {type: dhcp, interface: ether1}\nlans: [{name: main, subnet: 10.0.1.0/24, gateway: 10.0.1.1}]\n",
        );
        let out = render(&p, &RenderSettings::default());
        assert!(out.contains("# Home router\n# /system reset-configuration no-defaults=yes\n# Target: RouterOS"));
        assert!(!out.lines().any(|line| line.starts_with("/system")));
    }

    #[test]
    fn nat_masquerades_out_of_pppoe_and_expands_both() {
        let p = policy(
            r#"
meta: {name: t}
wan: {type: pppoe, interface: ether1, username: u, password_ref: p}
lans: [{name: main, subnet: 192.168.1.0/24, gateway: 192.168.1.1}]
nat:
  port_forwards:
    - {name: game, external_port: 3074, internal_ip: 192.168.1.20, internal_port: 3074, protocol: both}
"#,
        );
        let out = flat(render(&p, &RenderSettings::default()));
        assert!(out.contains("add chain=srcnat out-interface=pppoe-out1 action=masquerade"));
        assert!(out.contains("# Port forward: game\nadd chain=dstnat in-interface=pppoe-out1 protocol=tcp,udp"));
    }

    #[test]
    fn all_vpn_kinds_render() {
        let out = script(
            r#"vpn:
  - {type: wireguard, role: server, listen_port: 51820, private_key_ref: wgpriv, allowed_ips: [10.8.0.2/32]}
  - {type: openvpn, role: client, remote_host: vpn.example.net, remote_port: 1194}
  - {type: l2tp, role: server, listen_port: 1701, preshared_key_ref: psk}
  - {type: pptp, role: client, remote_host: 198.51.100.1, remote_port: 1723}
  - {type: ipsec, role: client, remote_host: 198.51.100.2, remote_port: 500, allowed_ips: [10.50.0.0/16]}
"#,
        );
        for expected in [
            "add name=wireguard1 listen-port=51820 private-key=\"wgpriv\" disabled=no",
            "add interface=wireguard1 public-key=\"CHANGE_ME\" allowed-address=10.8.0.2/32",
            "add name=ovpn-out2 connect-to=vpn.example.net port=1194 disabled=no",
            "/interface l2tp-server server\nset enabled=yes use-ipsec=yes ipsec-secret=\"psk\"",
            "add name=pptp-out4 connect-to=198.51.100.1 disabled=no",
            "add name=peer5 address=198.51.100.2 port=500 exchange-mode=ike2",
            "add peer=peer5 dst-address=10.50.0.0/16 tunnel=yes",
        ] {
            assert!(out.contains(expected), "missing {expected:?} in\n{out}");
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        let p = policy_with("dns:\n  forwarders: [1.1.1.1]\n  static_records: [{name: nas.lan, ip: 192.168.1.5}]\n");
        let settings = RenderSettings::default();
        assert_eq!(render(&p, &settings), render(&p, &settings));
    }
}
