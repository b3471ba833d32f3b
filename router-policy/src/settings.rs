//! Render settings: device-specific knobs the policy document does not carry.
//!
//! Settings come from an embedded TOML file and may be replaced wholesale by
//! a file given with `--settings`. Radio tables are keyed by band, so every
//! table names each band exactly once or fails to load.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::model::Band;

const EMBEDDED: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/settings/default.toml"
));

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSettings {
    pub routeros: RouterOsSettings,
    pub openwrt: OpenWrtSettings,
    pub wifi: WifiSettings,
    pub dhcp: DhcpDefaults,
}

/// Per-band lookup table. Both bands are required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BandTable<T> {
    #[serde(rename = "2.4GHz")]
    pub ghz2_4: T,
    #[serde(rename = "5GHz")]
    pub ghz5: T,
}

impl<T> BandTable<T> {
    pub fn get(&self, band: Band) -> &T {
        match band {
            Band::Ghz2_4 => &self.ghz2_4,
            Band::Ghz5 => &self.ghz5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterOsSettings {
    pub version: String,
    pub pppoe_interface: String,
    pub radios: BandTable<RouterOsRadio>,
}

impl Default for RouterOsSettings {
    fn default() -> Self {
        Self {
            version: "v7".to_string(),
            pppoe_interface: "pppoe-out1".to_string(),
            radios: BandTable {
                ghz2_4: RouterOsRadio {
                    interface: "wlan1".to_string(),
                },
                ghz5: RouterOsRadio {
                    interface: "wlan2".to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouterOsRadio {
    pub interface: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpenWrtSettings {
    pub lan_device: String,
    pub radios: BandTable<OpenWrtRadio>,
}

impl Default for OpenWrtSettings {
    fn default() -> Self {
        Self {
            lan_device: "eth0".to_string(),
            radios: BandTable {
                ghz2_4: OpenWrtRadio {
                    device: "radio0".to_string(),
                    band: "2g".to_string(),
                    htmode: "HT20".to_string(),
                },
                ghz5: OpenWrtRadio {
                    device: "radio1".to_string(),
                    band: "5g".to_string(),
                    htmode: "VHT80".to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenWrtRadio {
    /// `wifi-device` section name, e.g. `radio0`.
    pub device: String,
    /// UCI band code (`2g`, `5g`).
    pub band: String,
    pub htmode: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WifiSettings {
    pub default_band: Band,
}

impl Default for WifiSettings {
    fn default() -> Self {
        Self {
            default_band: Band::Ghz2_4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DhcpDefaults {
    pub start: u32,
    pub limit: u32,
    pub lease_time: String,
}

impl Default for DhcpDefaults {
    fn default() -> Self {
        Self {
            start: 100,
            limit: 150,
            lease_time: "12h".to_string(),
        }
    }
}

impl RenderSettings {
    /// Cross-field checks serde cannot express.
    fn check(&self) -> Result<(), SettingsError> {
        let routeros = Band::ALL.map(|band| self.routeros.radios.get(band).interface.as_str());
        let openwrt = Band::ALL.map(|band| self.openwrt.radios.get(band).device.as_str());
        for (table, names) in [("routeros.radios", routeros), ("openwrt.radios", openwrt)] {
            if names.iter().any(|name| name.trim().is_empty()) {
                return Err(SettingsError::Invalid(format!("{table} has an empty name")));
            }
            if names.iter().collect::<BTreeSet<_>>().len() != names.len() {
                return Err(SettingsError::Invalid(format!(
                    "{table} assigns one radio to several bands"
                )));
            }
        }
        if self.routeros.pppoe_interface.trim().is_empty() {
            return Err(SettingsError::Invalid(
                "routeros.pppoe_interface is empty".to_string(),
            ));
        }
        if self.openwrt.lan_device.trim().is_empty() {
            return Err(SettingsError::Invalid("openwrt.lan_device is empty".to_string()));
        }
        if self.dhcp.limit == 0 {
            return Err(SettingsError::Invalid("dhcp.limit must be positive".to_string()));
        }
        Ok(())
    }
}

pub fn parse_settings(raw: &str) -> Result<RenderSettings, SettingsError> {
    let settings = toml::from_str::<RenderSettings>(raw)?;
    settings.check()?;
    Ok(settings)
}

pub fn load_settings_file(path: &Path) -> Result<RenderSettings, SettingsError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_settings(&raw)
}

pub fn embedded_settings() -> RenderSettings {
    parse_settings(EMBEDDED).unwrap_or_else(|err| {
        tracing::warn!(%err, "embedded settings are invalid; using built-in defaults");
        RenderSettings::default()
    })
}

/// Settings plus where they came from (`embedded` or `file:<path>`). A file
/// that fails to load is reported and replaced by the embedded defaults.
pub fn load_settings_with_source(path: Option<&Path>) -> (RenderSettings, String) {
    let Some(path) = path else {
        return (embedded_settings(), "embedded".to_string());
    };
    match load_settings_file(path) {
        Ok(settings) => {
            tracing::debug!(path = %path.display(), "loaded render settings");
            (settings, format!("file:{}", path.display()))
        }
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                %err,
                "failed to load settings; using embedded defaults"
            );
            (embedded_settings(), "embedded".to_string())
        }
    }
}
