//! Wi-Fi consistency validation: LAN reference, encryption/password pairing,
//! per-band channel legality and name uniqueness.

use crate::model::{Band, Policy, Wifi, WifiEncryption};
use crate::validate::{duplicate_names, Diagnostic};

pub fn wifi_findings(policy: &Policy) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for wifi in &policy.wifi {
        if policy.lan(&wifi.lan).is_none() {
            out.push(Diagnostic::new(
                "wifi_unknown_lan",
                format!(
                    "Wi-Fi '{}': References non-existent LAN '{}'",
                    wifi.name, wifi.lan
                ),
            ));
        }
        if wifi.ssid.trim().is_empty() {
            out.push(Diagnostic::new(
                "wifi_missing_field",
                format!("Wi-Fi '{}': ssid is required", wifi.name),
            ));
        }
        if wifi.security.encryption != WifiEncryption::Open && wifi.security.password.is_none() {
            out.push(Diagnostic::new(
                "wifi_missing_password",
                format!("Wi-Fi '{}': Encrypted network requires password_ref", wifi.name),
            ));
        }
        out.extend(channel_finding(wifi));
    }

    let duplicates = duplicate_names(policy.wifi.iter().map(|wifi| wifi.name.as_str()));
    if !duplicates.is_empty() {
        out.push(Diagnostic::new(
            "wifi_duplicate_name",
            format!("Duplicate Wi-Fi names: {}", duplicates.join(", ")),
        ));
    }
    out
}

fn channel_finding(wifi: &Wifi) -> Option<Diagnostic> {
    let channel = wifi.channel?;
    let message = match wifi.band {
        Some(band) if !band.channels().contains(&channel) => {
            format!("Wi-Fi '{}': Invalid {band} channel {channel}", wifi.name)
        }
        Some(_) => return None,
        None if Band::for_channel(channel).is_none() => {
            format!("Wi-Fi '{}': Channel {channel} is not valid on any band", wifi.name)
        }
        None => return None,
    };
    Some(Diagnostic::new("wifi_invalid_channel", message))
}
