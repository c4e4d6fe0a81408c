//! Error type shared by the touch normalizer and its collaborators

use thiserror_no_std::Error;

/// Errors surfaced by touch operations.
///
/// Nothing in this crate retries on error. The caller's polling loop decides
/// whether a failure means "not touched" or something worse.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TouchError {
    /// The transport failed while talking to the controller (e.g. I2C NACK)
    #[error("I/O error during {operation}")]
    Io {
        /// What the driver was doing when the bus failed
        operation: &'static str,
    },

    /// The concrete controller does not implement this operation
    #[error("Operation not supported: {operation}")]
    UnsupportedOperation {
        /// Name of the missing hook
        operation: &'static str,
    },

    /// A caller-supplied value or the current configuration rules the call out
    #[error("Invalid argument: {reason}")]
    InvalidArgument {
        /// Why the argument was rejected
        reason: &'static str,
    },

    /// Enabling, disabling or attaching the interrupt line failed
    #[error("Interrupt line configuration failed: {stage}")]
    HardwareConfig {
        /// Step of the interrupt setup that failed
        stage: &'static str,
    },
}

impl TouchError {
    pub const fn io(operation: &'static str) -> Self {
        Self::Io { operation }
    }

    pub const fn unsupported(operation: &'static str) -> Self {
        Self::UnsupportedOperation { operation }
    }

    pub const fn invalid(reason: &'static str) -> Self {
        Self::InvalidArgument { reason }
    }

    pub const fn hardware(stage: &'static str) -> Self {
        Self::HardwareConfig { stage }
    }

    /// True for [`TouchError::UnsupportedOperation`]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedOperation { .. })
    }
}
