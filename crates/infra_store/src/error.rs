//! Store error types
//!
//! Adapters raise `StoreError` internally and translate it to `PortError`
//! at the port boundary.

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur while accessing an in-memory table
#[derive(Debug, Error)]
pub enum StoreError {
    /// The table has been taken offline
    #[error("Table '{0}' is offline")]
    Offline(&'static str),

    /// No more sequence numbers can be assigned
    #[error("Sequence exhausted in table '{0}'")]
    SequenceExhausted(&'static str),
}

impl From<StoreError> for PortError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Offline(table) => PortError::unavailable(table),
            StoreError::SequenceExhausted(_) => PortError::internal(error.to_string()),
        }
    }
}
