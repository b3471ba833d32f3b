//! OpenWrt UCI backend: one document per `/etc/config` file.
//!
//! `network` and `dhcp` are always produced; `wireless` only when Wi-Fi is
//! configured, `firewall` only when the policy has firewall or NAT settings.
//! The `vpn` zone is declared whenever a VPN exists or a rule names it.

use std::collections::BTreeMap;

use router_syntax_core::{UciConfig, UciSection};

use crate::backend::netmask::{netmask_to_prefix, prefix_to_netmask, FALLBACK_NETMASK};
use crate::backend::{dhcp_pool_bounds, secret_text, CHANGE_ME, TODO};
use crate::model::{
    Band, Firewall, FirewallRule, ForwardProtocol, Lan, Nat, Policy, Vpn, VpnKind, VpnRole,
    WanKind, Wifi, WifiEncryption, WifiMode,
};
use crate::settings::RenderSettings;

pub fn render(policy: &Policy, settings: &RenderSettings) -> BTreeMap<String, String> {
    let mut files = BTreeMap::new();
    files.insert("network".to_string(), network(policy, settings).render());
    if !policy.wifi.is_empty() {
        files.insert("wireless".to_string(), wireless(policy, settings).render());
    }
    if policy.firewall.is_some() || policy.nat.is_some() {
        files.insert("firewall".to_string(), firewall(policy).render());
    } else if policy.has_isolation() {
        tracing::warn!(
            policy = %policy.meta.name,
            "LAN isolation needs a firewall or nat block; no firewall file written"
        );
    }
    files.insert("dhcp".to_string(), dhcp(policy, settings).render());
    files
}

fn document(title: &str, policy: &Policy) -> UciConfig {
    let mut config = UciConfig::new();
    config.header_line(format!("OpenWrt {title} Configuration"));
    config.header_line(format!("Generated from policy: {}", policy.meta.name));
    config
}

/// Network a VPN contributes to the `vpn` firewall zone.
fn vpn_network(vpn: &Vpn, number: usize) -> Option<String> {
    match (vpn.kind, vpn.role) {
        (VpnKind::Wireguard, _) => Some(format!("wg{number}")),
        (VpnKind::L2tp, VpnRole::Client) => Some(format!("l2tp{number}")),
        (VpnKind::Pptp, VpnRole::Client) => Some(format!("pptp{number}")),
        _ => None,
    }
}

fn network(policy: &Policy, settings: &RenderSettings) -> UciConfig {
    let mut config = document("Network", policy);
    config.push(
        UciSection::named("interface", "loopback")
            .option("device", "lo")
            .option("proto", "static")
            .option("ipaddr", "127.0.0.1")
            .option("netmask", "255.0.0.0"),
    );

    let wan = &policy.wan;
    let section = UciSection::named("interface", "wan")
        .with_comment("WAN Configuration")
        .option("device", &wan.interface);
    let section = match &wan.kind {
        WanKind::Pppoe { username, password } => section
            .option("proto", "pppoe")
            .option("username", username.as_deref().unwrap_or(CHANGE_ME))
            .option("password", secret_text(password.as_ref())),
        WanKind::Dhcp => section.option("proto", "dhcp"),
        WanKind::Static {
            ip_address,
            netmask,
            gateway,
        } => {
            let prefix = netmask_to_prefix(netmask.as_deref().unwrap_or(FALLBACK_NETMASK));
            section
                .option("proto", "static")
                .option("ipaddr", ip_address.as_deref().unwrap_or(TODO))
                .option("netmask", prefix_to_netmask(prefix))
                .option("gateway", gateway.as_deref().unwrap_or(TODO))
        }
    };
    let section = section.option_opt("mtu", wan.mtu);
    let section = if wan.dns.is_empty() {
        section
    } else {
        section.option("peerdns", 0).lists("dns", &wan.dns)
    };
    config.push(section);

    for lan in &policy.lans {
        let ifname = match lan.vlan_id {
            Some(vlan) => format!("{}.{vlan}", settings.openwrt.lan_device),
            None => settings.openwrt.lan_device.clone(),
        };
        config.push(
            UciSection::named("interface", &lan.name)
                .with_comment(format!("LAN: {}", lan.name))
                .option("proto", "static")
                .option("ipaddr", &lan.gateway)
                .option("netmask", prefix_to_netmask(lan.prefix_len()))
                .option("type", "bridge")
                .option("ifname", ifname),
        );
    }

    for (idx, vpn) in policy.vpn.iter().enumerate() {
        let number = idx + 1;
        let host = vpn.remote_host.as_deref().unwrap_or(TODO);
        match (vpn.kind, vpn.role) {
            (VpnKind::Wireguard, _) => wireguard(&mut config, vpn, number),
            (VpnKind::L2tp, VpnRole::Client) => config.push(
                UciSection::named("interface", format!("l2tp{number}"))
                    .with_comment(format!("L2TP VPN #{number}"))
                    .option("proto", "l2tp")
                    .option("server", host),
            ),
            (VpnKind::Pptp, VpnRole::Client) => config.push(
                UciSection::named("interface", format!("pptp{number}"))
                    .with_comment(format!("PPTP VPN #{number}"))
                    .option("proto", "pptp")
                    .option("server", host),
            ),
            (kind, role) => config.note(format!(
                "TODO: {} {} VPN #{number} has no UCI network equivalent; configure it manually",
                kind.as_str(),
                role.as_str()
            )),
        }
    }
    config
}

fn wireguard(config: &mut UciConfig, vpn: &Vpn, number: usize) {
    let interface = format!("wg{number}");
    config.push(
        UciSection::named("interface", &interface)
            .with_comment(format!("WireGuard VPN #{number}"))
            .option("proto", "wireguard")
            .option("private_key", secret_text(vpn.private_key.as_ref()))
            .option_opt("listen_port", vpn.listen_port),
    );

    let is_client = vpn.role == VpnRole::Client;
    let peer = UciSection::new(format!("wireguard_{interface}"))
        .option("public_key", secret_text(vpn.public_key.as_ref()))
        .option_opt(
            "preshared_key",
            vpn.preshared_key.as_ref().map(|psk| secret_text(Some(psk))),
        );
    let peer = if is_client {
        peer.option("endpoint_host", vpn.remote_host.as_deref().unwrap_or(TODO))
            .option_opt("endpoint_port", vpn.remote_port)
            .option("persistent_keepalive", 25)
    } else {
        peer
    };
    let peer = if vpn.allowed_ips.is_empty() && is_client {
        peer.list("allowed_ips", "0.0.0.0/0")
    } else {
        peer.lists("allowed_ips", &vpn.allowed_ips)
    };
    config.push(peer.option("route_allowed_ips", 1));
}

fn wireless(policy: &Policy, settings: &RenderSettings) -> UciConfig {
    let mut config = document("Wireless", policy);
    let default_band = settings.wifi.default_band;

    let mut bands: Vec<Band> = Vec::new();
    for wifi in &policy.wifi {
        let band = wifi.resolved_band(default_band);
        if !bands.contains(&band) {
            bands.push(band);
        }
    }
    for band in bands {
        let radio = settings.openwrt.radios.get(band);
        // First network on the band that names a channel picks it.
        let channel = policy
            .wifi
            .iter()
            .filter(|wifi| wifi.resolved_band(default_band) == band)
            .find_map(|wifi| wifi.channel)
            .map_or_else(|| "auto".to_string(), |ch| ch.to_string());
        config.push(
            UciSection::named("wifi-device", &radio.device)
                .option("type", "mac80211")
                .option("band", &radio.band)
                .option("channel", channel)
                .option("htmode", &radio.htmode)
                .option("disabled", 0),
        );
    }

    for (idx, wifi) in policy.wifi.iter().enumerate() {
        let radio = settings.openwrt.radios.get(wifi.resolved_band(default_band));
        config.push(wifi_iface(wifi, idx, &radio.device));
    }
    config
}

fn wifi_iface(wifi: &Wifi, idx: usize, device: &str) -> UciSection {
    let mode = match wifi.mode {
        WifiMode::Ap => "ap",
        WifiMode::Station => "sta",
    };
    let section = UciSection::named("wifi-iface", format!("wifinet{idx}"))
        .with_comment(format!("Wi-Fi: {}", wifi.name))
        .option("device", device)
        .option("network", &wifi.lan)
        .option("mode", mode)
        .option("ssid", &wifi.ssid);

    let key = || secret_text(wifi.security.password.as_ref());
    let section = match wifi.security.encryption {
        WifiEncryption::Open => section.option("encryption", "none"),
        WifiEncryption::Wep => section.option("encryption", "wep-open").option("key", key()),
        WifiEncryption::WpaPsk => section.option("encryption", "psk").option("key", key()),
        WifiEncryption::Wpa2Psk => section.option("encryption", "psk2").option("key", key()),
        WifiEncryption::Wpa3Sae => section.option("encryption", "sae").option("key", key()),
        WifiEncryption::Wpa2Enterprise => section
            .option("encryption", "wpa2")
            .option("auth_server", TODO),
    };
    section
        .option_opt("hidden", wifi.hidden.then_some(1))
        .option_opt("isolate", wifi.guest.then_some(1))
}

fn firewall(policy: &Policy) -> UciConfig {
    let mut config = document("Firewall", policy);
    let forward = policy
        .firewall
        .as_ref()
        .map_or("REJECT".to_string(), |fw| fw.default_policy.as_str().to_uppercase());
    config.push(
        UciSection::new("defaults")
            .option("input", "REJECT")
            .option("output", "ACCEPT")
            .option("forward", forward)
            .option("synflood_protect", 1),
    );

    let masquerade = policy.nat.as_ref().map_or(true, |nat| nat.masquerade);
    config.push(
        UciSection::new("zone")
            .with_comment("WAN Zone")
            .option("name", "wan")
            .list("network", "wan")
            .option("input", "REJECT")
            .option("output", "ACCEPT")
            .option("forward", "REJECT")
            .option("masq", u8::from(masquerade))
            .option("mtu_fix", 1),
    );

    for lan in &policy.lans {
        let forward = if lan.isolated_from.is_empty() {
            "ACCEPT"
        } else {
            "REJECT"
        };
        config.push(
            UciSection::new("zone")
                .with_comment(format!("Zone: {}", lan.name))
                .option("name", &lan.name)
                .list("network", &lan.name)
                .option("input", "ACCEPT")
                .option("output", "ACCEPT")
                .option("forward", forward),
        );
    }

    let has_vpn = !policy.vpn.is_empty() || policy.zone_referenced("vpn");
    if has_vpn {
        let networks = policy
            .vpn
            .iter()
            .enumerate()
            .filter_map(|(idx, vpn)| vpn_network(vpn, idx + 1));
        config.push(
            UciSection::new("zone")
                .with_comment("VPN Zone")
                .option("name", "vpn")
                .lists("network", networks)
                .option("input", "ACCEPT")
                .option("output", "ACCEPT")
                .option("forward", "REJECT"),
        );
    }

    for lan in &policy.lans {
        let isolated = |zone: &str| lan.isolated_from.iter().any(|z| z == zone);
        let mut dests = vec!["wan"];
        if has_vpn {
            dests.push("vpn");
        }
        for dest in dests.into_iter().filter(|&dest| !isolated(dest)) {
            config.push(
                UciSection::new("forwarding")
                    .with_comment("Zone forwarding")
                    .option("src", &lan.name)
                    .option("dest", dest),
            );
        }
    }

    if let Some(firewall) = &policy.firewall {
        push_rules(&mut config, firewall);
    }
    if let Some(nat) = &policy.nat {
        push_redirects(&mut config, nat, policy);
    }
    config
}

/// One `rule` per (src, dest) pair. Empty `from` matches any zone; empty
/// `to` targets the router itself.
fn push_rules(config: &mut UciConfig, firewall: &Firewall) {
    for rule in &firewall.rules {
        let froms = if rule.from.is_empty() {
            vec!["*"]
        } else {
            rule.from.iter().map(String::as_str).collect()
        };
        let tos: Vec<Option<&str>> = if rule.to.is_empty() {
            vec![None]
        } else {
            rule.to.iter().map(|zone| Some(zone.as_str())).collect()
        };
        for src in &froms {
            for &dest in &tos {
                config.push(rule_section(rule, src, dest));
            }
        }
    }
}

fn rule_section(rule: &FirewallRule, src: &str, dest: Option<&str>) -> UciSection {
    UciSection::new("rule")
        .with_comment(format!("Rule: {}", rule.name))
        .option("name", &rule.name)
        .option("src", src)
        .option_opt("dest", dest)
        .option_opt("proto", rule.protocol.map(|proto| proto.as_str()))
        .option_opt("dest_port", rule.port.as_deref())
        .option("target", rule.action.as_str().to_uppercase())
}

fn push_redirects(config: &mut UciConfig, nat: &Nat, policy: &Policy) {
    for forward in &nat.port_forwards {
        let proto = match forward.protocol {
            ForwardProtocol::Tcp => "tcp",
            ForwardProtocol::Udp => "udp",
            ForwardProtocol::Both => "tcp udp",
        };
        let dest = forward
            .internal_ip
            .parse()
            .ok()
            .and_then(|ip| policy.lan_containing(ip))
            .map(|lan| lan.name.as_str());
        config.push(
            UciSection::new("redirect")
                .with_comment(format!("Port forward: {}", forward.name))
                .option("name", &forward.name)
                .option("src", "wan")
                .option_opt("dest", dest)
                .option("proto", proto)
                .option("src_dport", forward.external_port)
                .option("dest_ip", &forward.internal_ip)
                .option("dest_port", forward.internal_port)
                .option("target", "DNAT"),
        );
    }
}

fn dhcp(policy: &Policy, settings: &RenderSettings) -> UciConfig {
    let mut config = document("DHCP", policy);
    let dns = policy.dns.as_ref();
    let domain = dns
        .and_then(|dns| dns.local_domain.as_deref())
        .unwrap_or("lan");
    config.push(
        UciSection::new("dnsmasq")
            .option("domainneeded", 1)
            .option("boguspriv", 1)
            .option("filterwin2k", 0)
            .option("localise_queries", 1)
            .option("rebind_protection", 1)
            .option("rebind_localhost", 1)
            .option("local", format!("/{domain}/"))
            .option("domain", domain)
            .option("expandhosts", 1)
            .option("nonegcache", 0)
            .option("authoritative", 1)
            .option("readethers", 1)
            .option("leasefile", "/tmp/dhcp.leases")
            .option("resolvfile", "/tmp/resolv.conf.d/resolv.conf.auto"),
    );
    config.push(
        UciSection::named("dhcp", "wan")
            .option("interface", "wan")
            .option("ignore", 1),
    );

    for lan in &policy.lans {
        if let Some(section) = dhcp_pool(lan, settings) {
            config.push(section);
        }
    }

    if let Some(dns) = dns {
        for server in &dns.forwarders {
            config.push(UciSection::new("server").option("server", server));
        }
        for record in &dns.static_records {
            config.push(
                UciSection::new("domain")
                    .option("name", &record.name)
                    .option("ip", &record.ip),
            );
        }
    }
    config
}

/// `start` and `limit` are offsets from the network address, the way
/// dnsmasq on OpenWrt expects them.
fn dhcp_pool(lan: &Lan, settings: &RenderSettings) -> Option<UciSection> {
    let dhcp = lan.enabled_dhcp()?;
    let defaults = &settings.dhcp;
    let (start, limit) = match (lan.network(), dhcp_pool_bounds(lan, defaults)) {
        (Some(net), Some((first, last))) => {
            let base = u32::from(net.network());
            let first = u32::from(first);
            (first - base, u32::from(last) - first + 1)
        }
        _ => (defaults.start, defaults.limit),
    };
    let lease_time = dhcp.lease_time.as_deref().unwrap_or(&defaults.lease_time);
    let section = UciSection::named("dhcp", &lan.name)
        .with_comment(format!("DHCP for {}", lan.name))
        .option("interface", &lan.name)
        .option("start", start)
        .option("limit", limit)
        .option("leasetime", lease_time);
    Some(if dhcp.dns.is_empty() {
        section
    } else {
        section.list("dhcp_option", format!("6,{}", dhcp.dns.join(",")))
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::render;
    use crate::settings::RenderSettings;
    use crate::validate::test_support::{policy, policy_with};

    fn files(extra: &str) -> std::collections::BTreeMap<String, String> {
        render(&policy_with(extra), &RenderSettings::default())
    }

    #[test]
    fn minimal_policy_writes_network_and_dhcp_only() {
        let out = files("");
        assert_eq!(
            out.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["dhcp", "network"]
        );
        assert!(out["network"].starts_with(
            "# OpenWrt Network Configuration\n# Generated from policy: test\n\nconfig interface 'loopback'\n"
        ));
    }

    #[test]
    fn lan_becomes_bridge_interface_with_vlan_device() {
        let p = policy(
            r#"
meta: {name: t}
wan: {type: dhcp, interface: eth1}
lans:
  - {name: main, subnet: 192.168.1.0/24, gateway: 192.168.1.1}
  - {name: iot, subnet: 10.20.0.0/25, gateway: 10.20.0.1, vlan_id: 20}
"#,
        );
        let network = &render(&p, &RenderSettings::default())["network"];
        assert!(network.contains(
            "# LAN: iot\nconfig interface 'iot'\n\toption proto 'static'\n\toption ipaddr '10.20.0.1'\n\toption netmask '255.255.255.128'\n\toption type 'bridge'\n\toption ifname 'eth0.20'\n"
        ));
        assert!(network.contains("\toption ifname 'eth0'\n"));
    }

    #[test]
    fn pppoe_wan_uses_placeholders() {
        let p = policy(
            "meta: {name: t}\nwan: {type: pppoe, interface: eth1, username: isp-user}\nlans: []\n",
        );
        let network = &render(&p, &RenderSettings::default())["network"];
        assert!(network.contains(
            "\toption proto 'pppoe'\n\toption username 'isp-user'\n\toption password 'CHANGE_ME'\n"
        ));
    }

    #[test]
    fn dhcp_pool_offsets_follow_declared_range() {
        let out = files("");
        assert!(!out["dhcp"].contains("config dhcp 'main'"));

        let p = policy(
            r#"
meta: {name: t}
wan: {type: dhcp, interface: eth1}
lans:
  - name: main
    subnet: 192.168.1.0/24
    gateway: 192.168.1.1
    dhcp: {enabled: true, range: 192.168.1.100-192.168.1.200, dns: [192.168.1.1]}
dns: {forwarders: [1.1.1.1], local_domain: home.arpa, static_records: [{name: nas, ip: 192.168.1.5}]}
"#,
        );
        let dhcp = &render(&p, &RenderSettings::default())["dhcp"];
        assert!(dhcp.contains(
            "# DHCP for main\nconfig dhcp 'main'\n\toption interface 'main'\n\toption start '100'\n\toption limit '101'\n\toption leasetime '12h'\n\tlist dhcp_option '6,192.168.1.1'\n"
        ));
        assert!(dhcp.contains("\toption local '/home.arpa/'\n\toption domain 'home.arpa'\n"));
        assert!(dhcp.contains("config server\n\toption server '1.1.1.1'\n"));
        assert!(dhcp.contains("config domain\n\toption name 'nas'\n\toption ip '192.168.1.5'\n"));
    }

    #[test]
    fn radios_follow_first_seen_band_order() {
        let out = files(
            r#"wifi:
  - {name: fast, lan: main, ssid: Fast, mode: ap, band: 5GHz, security: {encryption: wpa3-sae, password_ref: k}}
  - {name: home, lan: main, ssid: Bob's Net, mode: ap, channel: 11, security: {password_ref: 'secret:wifi'}}
  - {name: guest, lan: main, ssid: Guest, mode: ap, hidden: true, guest: true, security: {encryption: open}}
"#,
        );
        let wireless = &out["wireless"];
        let radio1 = wireless.find("config wifi-device 'radio1'").expect("5GHz radio");
        let radio0 = wireless.find("config wifi-device 'radio0'").expect("2.4GHz radio");
        assert!(radio1 < radio0);
        assert!(wireless.contains("\toption band '5g'\n\toption channel 'auto'\n\toption htmode 'VHT80'\n"));
        assert!(wireless.contains("\toption band '2g'\n\toption channel '11'\n"));
        assert!(wireless.contains("\toption ssid 'Bob'\\''s Net'\n\toption encryption 'psk2'\n\toption key 'secret:wifi'\n"));
        assert!(wireless.contains(
            "config wifi-iface 'wifinet2'\n\toption device 'radio0'\n\toption network 'main'\n\toption mode 'ap'\n\toption ssid 'Guest'\n\toption encryption 'none'\n\toption hidden '1'\n\toption isolate '1'\n"
        ));
    }

    #[test]
    fn firewall_zones_forwardings_rules_and_redirects() {
        let p = policy(
            r#"
meta: {name: t}
wan: {type: dhcp, interface: eth1}
lans:
  - {name: main, subnet: 192.168.1.0/24, gateway: 192.168.1.1}
  - {name: guest, subnet: 192.168.2.0/24, gateway: 192.168.2.1, isolated_from: [main]}
  - {name: lab, subnet: 192.168.3.0/24, gateway: 192.168.3.1, isolated_from: [wan]}
firewall:
  default_policy: drop
  rules:
    - {name: web, action: accept, from: [main, guest], to: [wan], protocol: tcp, port: "80,443"}
nat:
  masquerade: false
  port_forwards:
    - {name: nas, external_port: 8443, internal_ip: 192.168.1.5, internal_port: 443, protocol: both}
"#,
        );
        let firewall = &render(&p, &RenderSettings::default())["firewall"];
        assert!(firewall.contains("config defaults\n\toption input 'REJECT'\n\toption output 'ACCEPT'\n\toption forward 'DROP'\n"));
        assert!(firewall.contains("\toption masq '0'\n"));
        assert!(firewall.contains("# Zone: guest\nconfig zone\n\toption name 'guest'\n\tlist network 'guest'\n\toption input 'ACCEPT'\n\toption output 'ACCEPT'\n\toption forward 'REJECT'\n"));
        assert!(firewall.contains("\toption src 'guest'\n\toption dest 'wan'\n"));
        assert!(!firewall.contains("\toption src 'lab'\n\toption dest 'wan'\n"));
        assert_eq!(firewall.matches("# Rule: web\n").count(), 2);
        assert!(firewall.contains(
            "\toption name 'web'\n\toption src 'guest'\n\toption dest 'wan'\n\toption proto 'tcp'\n\toption dest_port '80,443'\n\toption target 'ACCEPT'\n"
        ));
        assert!(firewall.contains(
            "# Port forward: nas\nconfig redirect\n\toption name 'nas'\n\toption src 'wan'\n\toption dest 'main'\n\toption proto 'tcp udp'\n\toption src_dport '8443'\n"
        ));
    }

    #[test]
    fn vpn_zone_is_declared_when_only_a_rule_names_it() {
        let out = files(
            "firewall:\n  rules:\n    - {name: vpn-in, action: accept, from: [vpn], to: [main]}\n",
        );
        let firewall = &out["firewall"];
        assert!(firewall.contains(
            "# VPN Zone\nconfig zone\n\toption name 'vpn'\n\toption input 'ACCEPT'\n\toption output 'ACCEPT'\n\toption forward 'REJECT'\n"
        ));
        assert!(firewall.contains("\toption name 'vpn-in'\n\toption src 'vpn'\n\toption dest 'main'\n"));
        assert!(!files("firewall: {rules: []}\n")["firewall"].contains("option name 'vpn'"));
    }

    #[test]
    fn static_wan_netmask_matches_script_translation() {
        let wan = |netmask: &str| {
            let p = policy(&format!(
                "meta: {{name: t}}\nwan: {{type: static, interface: eth1, ip_address: 203.0.113.10, netmask: {netmask}, gateway: 203.0.113.9}}\nlans: []\n"
            ));
            render(&p, &RenderSettings::default())["network"].clone()
        };
        assert!(wan("255.255.255.248").contains(
            "\toption proto 'static'\n\toption ipaddr '203.0.113.10'\n\toption netmask '255.255.255.248'\n\toption gateway '203.0.113.9'\n"
        ));
        assert!(wan("255.255.254.0").contains("\toption netmask '255.255.255.0'\n"));
    }

    #[test]
    fn vpn_interfaces_and_manual_notes() {
        let out = files(
            r#"vpn:
  - {type: wireguard, role: client, remote_host: vpn.example.net, remote_port: 51820, public_key_ref: pub}
  - {type: openvpn, role: server, listen_port: 1194}
  - {type: l2tp, role: client, remote_host: 198.51.100.1, remote_port: 1701}
firewall: {rules: []}
"#,
        );
        let network = &out["network"];
        assert!(network.contains("config interface 'wg1'\n\toption proto 'wireguard'\n\toption private_key 'CHANGE_ME'\n"));
        assert!(network.contains(
            "config wireguard_wg1\n\toption public_key 'pub'\n\toption endpoint_host 'vpn.example.net'\n\toption endpoint_port '51820'\n\toption persistent_keepalive '25'\n\tlist allowed_ips '0.0.0.0/0'\n\toption route_allowed_ips '1'\n"
        ));
        assert!(network.contains("config interface 'l2tp3'\n\toption proto 'l2tp'\n\toption server '198.51.100.1'\n"));
        assert!(network.contains("# TODO: openvpn server VPN #2 has no UCI network equivalent"));
        assert!(out["firewall"].contains("\tlist network 'wg1'\n\tlist network 'l2tp3'\n"));
        assert!(out["firewall"].contains("\toption src 'main'\n\toption dest 'vpn'\n"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let p = policy_with("wifi:\n  - {name: home, lan: main, ssid: Home, mode: ap, security: {encryption: open}}\n");
        let settings = RenderSettings::default();
        assert_eq!(render(&p, &settings), render(&p, &settings));
    }
}
