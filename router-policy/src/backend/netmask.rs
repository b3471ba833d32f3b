//! Netmask <-> prefix translation shared by both backends.
//!
//! Only the masks routers are commonly configured with are recognized. Anything
//! else falls back to /24 and logs a warning instead of failing the render.

const TABLE: [(u8, &str); 9] = [
    (8, "255.0.0.0"),
    (16, "255.255.0.0"),
    (24, "255.255.255.0"),
    (25, "255.255.255.128"),
    (26, "255.255.255.192"),
    (27, "255.255.255.224"),
    (28, "255.255.255.240"),
    (29, "255.255.255.248"),
    (30, "255.255.255.252"),
];

pub const FALLBACK_PREFIX: u8 = 24;
pub const FALLBACK_NETMASK: &str = "255.255.255.0";

pub fn netmask_to_prefix(netmask: &str) -> u8 {
    let netmask = netmask.trim();
    match TABLE.iter().find(|(_, mask)| *mask == netmask) {
        Some((prefix, _)) => *prefix,
        None => {
            tracing::warn!(netmask, fallback = FALLBACK_PREFIX, "unrecognized netmask");
            FALLBACK_PREFIX
        }
    }
}

pub fn prefix_to_netmask(prefix: u8) -> &'static str {
    match TABLE.iter().find(|(p, _)| *p == prefix) {
        Some((_, mask)) => mask,
        None => {
            tracing::warn!(prefix, fallback = FALLBACK_NETMASK, "unrecognized prefix length");
            FALLBACK_NETMASK
        }
    }
}
