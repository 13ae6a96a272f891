use serde::Deserialize;

/// Which [crate::pipeline::ClaimMapper] a claim name is dispatched to.
///
/// This is pure data: an [crate::issuer::IssuerConfig] carries a `HashMap<String,
/// ClaimMapperKind>` overriding the pipeline's default dispatch table for specific
/// claim names, without the issuer module depending on the pipeline module.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Deserialize)]
pub enum ClaimMapperKind {
    Identity,
    StringList,
    Number,
    DateTime,
    KeycloakRealmRoles,
}
