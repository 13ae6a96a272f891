use crate::issuer::IssuerConfig;
use crate::token::{ClaimMapperKind, ClaimValue, ParsedClaim};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;

/// The default claim-name → [ClaimMapperKind] dispatch table. A fixed, closed set per
/// design notes: no dynamic registration at runtime from untrusted sources. An issuer's
/// `claim_mapping_overrides` takes precedence over this table; anything in neither falls
/// back to [ClaimMapperKind::Identity].
const DEFAULT_DISPATCH_TABLE: &[(&str, ClaimMapperKind)] = &[
    ("scope", ClaimMapperKind::StringList),
    ("scp", ClaimMapperKind::StringList),
    ("roles", ClaimMapperKind::StringList),
    ("groups", ClaimMapperKind::StringList),
    ("exp", ClaimMapperKind::DateTime),
    ("nbf", ClaimMapperKind::DateTime),
    ("iat", ClaimMapperKind::DateTime),
    ("auth_time", ClaimMapperKind::DateTime),
    ("realm_access", ClaimMapperKind::KeycloakRealmRoles),
];

/// Converts JSON claim values from a token payload into typed [ClaimValue]s.
pub struct ClaimMapper;

impl ClaimMapper {
    /// Resolves the [ClaimMapperKind] for `claim_name`: the issuer's override if any,
    /// otherwise the default dispatch table, otherwise [ClaimMapperKind::Identity].
    pub fn kind_for(claim_name: &str, issuer_config: &IssuerConfig) -> ClaimMapperKind {
        if let Some(kind) = issuer_config.claim_mapping_overrides.get(claim_name) {
            return *kind;
        }

        DEFAULT_DISPATCH_TABLE
            .iter()
            .find(|(name, _)| *name == claim_name)
            .map(|(_, kind)| *kind)
            .unwrap_or(ClaimMapperKind::Identity)
    }

    /// Maps a single claim's JSON `value` using `kind`. `payload` is the full token
    /// payload, needed only by [ClaimMapperKind::KeycloakRealmRoles] to reach the nested
    /// `realm_access.roles` structure.
    pub fn map(kind: ClaimMapperKind, value: &Value, payload: &HashMap<String, Value>) -> ClaimValue {
        let parsed = match kind {
            ClaimMapperKind::Identity => ParsedClaim::String(identity_string(value)),
            ClaimMapperKind::StringList => ParsedClaim::StringList(string_or_list(value)),
            ClaimMapperKind::Number => ParsedClaim::Number(value.as_f64().unwrap_or_default()),
            ClaimMapperKind::DateTime => ParsedClaim::DateTime(epoch_seconds_to_date_time(value)),
            ClaimMapperKind::KeycloakRealmRoles => ParsedClaim::StringList(realm_access_roles(payload)),
        };

        ClaimValue {
            original: value.clone(),
            parsed,
        }
    }
}

fn identity_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn string_or_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items.iter().filter_map(|v| v.as_str().map(String::from)).collect(),
        _ => Vec::new(),
    }
}

fn epoch_seconds_to_date_time(value: &Value) -> DateTime<Utc> {
    value
        .as_i64()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_else(|| DateTime::from_timestamp(0, 0).expect("epoch zero is always valid"))
}

/// Reads `realm_access.roles` as a string list. Absent structure yields an empty list,
/// never an error.
fn realm_access_roles(payload: &HashMap<String, Value>) -> Vec<String> {
    payload
        .get("realm_access")
        .and_then(|v| v.get("roles"))
        .and_then(Value::as_array)
        .map(|roles| roles.iter().filter_map(|v| v.as_str().map(String::from)).collect())
        .unwrap_or_default()
}
