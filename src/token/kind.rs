/// The kind of token a [crate::Validator] call is building.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum TokenKind {
    Access,
    Id,
    Refresh,
}
