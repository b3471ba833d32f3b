//! Secret reference resolution.
//!
//! A policy field written as `secret:<name>` is a deferred reference. When the
//! loader is asked to resolve secrets it looks the name up in an injected
//! [`SecretStore`] under `ROUTER_SECRET_<NAME>`; otherwise the reference is
//! carried through untouched so static review never needs the store.

use std::collections::{BTreeMap, HashMap};

use crate::model::Policy;

/// Marker that turns a string field into a secret reference.
pub const SECRET_MARKER: &str = "secret:";
/// Key prefix used when looking a reference up in the store.
pub const DEFAULT_KEY_PREFIX: &str = "ROUTER_SECRET_";

/// The value of a secret-bearing field after loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretValue {
    /// Plain text from the document, or a reference that resolved.
    Literal(String),
    /// Reference kept as-is because resolution was not requested.
    Deferred(String),
    /// Resolution was requested but the store had no value.
    Unresolved(String),
}

impl SecretValue {
    /// Classify a raw field without consulting any store.
    pub fn passthrough(raw: &str) -> Self {
        match raw.strip_prefix(SECRET_MARKER) {
            Some(name) => SecretValue::Deferred(name.to_string()),
            None => SecretValue::Literal(raw.to_string()),
        }
    }

    /// Text to place in generated output. `None` means a placeholder is
    /// needed because the secret never resolved.
    pub fn emit_value(&self) -> Option<String> {
        match self {
            SecretValue::Literal(value) => Some(value.clone()),
            SecretValue::Deferred(name) => Some(format!("{SECRET_MARKER}{name}")),
            SecretValue::Unresolved(_) => None,
        }
    }
}

/// Key-value capability the resolver reads from.
pub trait SecretStore {
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Reads secrets from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretStore;

impl SecretStore for EnvSecretStore {
    fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl SecretStore for BTreeMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl SecretStore for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

pub struct SecretResolver<'a> {
    prefix: String,
    store: &'a dyn SecretStore,
}

impl<'a> SecretResolver<'a> {
    pub fn new(store: &'a dyn SecretStore) -> Self {
        Self::with_prefix(store, DEFAULT_KEY_PREFIX)
    }

    pub fn with_prefix(store: &'a dyn SecretStore, prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            store,
        }
    }

    /// Store key for a reference name, e.g. `pppoe_password` ->
    /// `ROUTER_SECRET_PPPOE_PASSWORD`.
    pub fn store_key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name.to_uppercase())
    }

    /// Resolve one raw field value. Literals come back unchanged; a missing
    /// secret is reported as [`SecretValue::Unresolved`] rather than an error.
    pub fn resolve(&self, raw: &str) -> SecretValue {
        let Some(name) = raw.strip_prefix(SECRET_MARKER) else {
            return SecretValue::Literal(raw.to_string());
        };
        let key = self.store_key(name);
        match self.store.lookup(&key) {
            Some(value) => SecretValue::Literal(value),
            None => {
                tracing::warn!(secret = name, key = %key, "secret reference did not resolve");
                SecretValue::Unresolved(name.to_string())
            }
        }
    }
}

/// A secret-bearing field whose reference did not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedSecret {
    /// Location in the policy document, e.g. `wifi[home].security.password_ref`.
    pub field: String,
    pub name: String,
}

/// List every field that will fall back to a placeholder when rendered.
pub fn unresolved_secrets(policy: &Policy) -> Vec<UnresolvedSecret> {
    let mut out = Vec::new();
    let mut check = |field: String, value: Option<&SecretValue>| {
        if let Some(SecretValue::Unresolved(name)) = value {
            out.push(UnresolvedSecret {
                field,
                name: name.clone(),
            });
        }
    };

    if let crate::model::WanKind::Pppoe { password, .. } = &policy.wan.kind {
        check("wan.password_ref".to_string(), password.as_ref());
    }
    for wifi in &policy.wifi {
        check(
            format!("wifi[{}].security.password_ref", wifi.name),
            wifi.security.password.as_ref(),
        );
    }
    for (idx, vpn) in policy.vpn.iter().enumerate() {
        check(format!("vpn[{idx}].public_key_ref"), vpn.public_key.as_ref());
        check(format!("vpn[{idx}].private_key_ref"), vpn.private_key.as_ref());
        check(
            format!("vpn[{idx}].preshared_key_ref"),
            vpn.preshared_key.as_ref(),
        );
    }
    out
}
