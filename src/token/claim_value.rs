use chrono::{DateTime, Utc};

/// The parsed form of a [ClaimValue], tagged by the claim mapper that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedClaim {
    String(String),
    StringList(Vec<String>),
    Number(f64),
    DateTime(DateTime<Utc>),
    Boolean(bool),
    Map(serde_json::Value),
}

/// A typed claim value, carrying both the original JSON form (for round-tripping /
/// re-serialization) and the [ParsedClaim] a [crate::pipeline::ClaimMapper] produced from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimValue {
    /// The original JSON value of this claim, as it appeared in the token payload.
    pub original: serde_json::Value,

    /// The typed, parsed form of this claim.
    pub parsed: ParsedClaim,
}

impl ClaimValue {
    /// Returns this claim's value as a string, if its [ParsedClaim] is [ParsedClaim::String].
    pub fn as_str(&self) -> Option<&str> {
        match &self.parsed {
            ParsedClaim::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns this claim's value as a string list, if its [ParsedClaim] is [ParsedClaim::StringList].
    pub fn as_string_list(&self) -> Option<&[String]> {
        match &self.parsed {
            ParsedClaim::StringList(list) => Some(list.as_slice()),
            _ => None,
        }
    }

    /// Returns this claim's value as a number, if its [ParsedClaim] is [ParsedClaim::Number].
    pub fn as_number(&self) -> Option<f64> {
        match &self.parsed {
            ParsedClaim::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns this claim's value as a [DateTime], if its [ParsedClaim] is [ParsedClaim::DateTime].
    pub fn as_date_time(&self) -> Option<DateTime<Utc>> {
        match &self.parsed {
            ParsedClaim::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Returns this claim's value as a boolean, if its [ParsedClaim] is [ParsedClaim::Boolean].
    pub fn as_bool(&self) -> Option<bool> {
        match &self.parsed {
            ParsedClaim::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}
