/// A pipeline step whose duration [crate::monitor::Monitor] can record.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, serde::Deserialize)]
#[repr(usize)]
pub enum MeasurementType {
    TokenParse,
    IssuerExtract,
    IssuerConfigResolve,
    HeaderValidate,
    SignatureVerify,
    JwksOp,
    TokenBuild,
    ClaimsValidate,
    CacheLookup,
    CacheStore,
    CompleteValidation,
}

impl MeasurementType {
    /// Total number of [MeasurementType] variants, used to size the monitor's stripes.
    pub const COUNT: usize = (MeasurementType::CompleteValidation as usize) + 1;

    /// This variant's stable index into [crate::monitor::Monitor]'s stripes.
    pub const fn index(self) -> usize {
        self as usize
    }
}
