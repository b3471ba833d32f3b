//! Router policy compiler.
//!
//! A router's intended configuration (WAN, LANs, Wi-Fi, VPN, firewall, NAT,
//! DNS) is written once as a vendor-neutral YAML policy and compiled into
//! artifacts for concrete platforms: a RouterOS script or a directory of
//! OpenWrt UCI files.
//!
//! # Pipeline
//!
//! 1. [`loader`] parses YAML into the [`model`] IR, resolving secret
//!    references through [`secrets`] when asked to.
//! 2. [`validate`] runs the semantic checks a schema cannot express and
//!    returns every finding at once.
//! 3. [`backend`] lowers a clean policy into target syntax, with device
//!    specifics supplied by [`settings`].
//!
//! Backends never fail on a validated policy; fields that are still missing
//! (an unresolved secret, say) render as visible placeholders.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use router_policy::backend::{render, resolve_target};
//! use router_policy::loader::load_policy;
//! use router_policy::settings::embedded_settings;
//! use router_policy::validate::validate_policy;
//!
//! let policy = load_policy(Path::new("policy.yaml"), None).unwrap();
//! assert!(validate_policy(&policy).is_empty());
//! let target = resolve_target(Some("openwrt"), &policy).unwrap();
//! let output = render(&policy, target, &embedded_settings());
//! output.write_to(Path::new("openwrt-config")).unwrap();
//! ```

pub mod backend;
pub mod loader;
pub mod model;
pub mod secrets;
pub mod settings;
pub mod validate;
pub mod validate_dns;
pub mod validate_firewall;
pub mod validate_lans;
pub mod validate_nat;
pub mod validate_vpn;
pub mod validate_wan;
pub mod validate_wifi;
