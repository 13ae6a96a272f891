use std::sync::atomic::{AtomicU8, Ordering};

/// Health state of a [crate::jwks::JwksLoader], reported without any I/O.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum LoaderStatus {
    Uninitialized,
    Loading,
    Ok,
    Error,
}

impl LoaderStatus {
    fn from_u8(value: u8) -> LoaderStatus {
        match value {
            0 => LoaderStatus::Uninitialized,
            1 => LoaderStatus::Loading,
            2 => LoaderStatus::Ok,
            _ => LoaderStatus::Error,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            LoaderStatus::Uninitialized => 0,
            LoaderStatus::Loading => 1,
            LoaderStatus::Ok => 2,
            LoaderStatus::Error => 3,
        }
    }
}

/// Lock-free storage for a [LoaderStatus], read by
/// [crate::jwks::JwksLoader::current_status] and `isHealthy` checks without blocking
/// regardless of network conditions.
#[derive(Debug)]
pub struct AtomicLoaderStatus(AtomicU8);

impl AtomicLoaderStatus {
    pub fn new(initial: LoaderStatus) -> AtomicLoaderStatus {
        AtomicLoaderStatus(AtomicU8::new(initial.as_u8()))
    }

    /// Non-blocking read of the current [LoaderStatus].
    pub fn get(&self) -> LoaderStatus {
        LoaderStatus::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, status: LoaderStatus) {
        self.0.store(status.as_u8(), Ordering::Release);
    }
}
