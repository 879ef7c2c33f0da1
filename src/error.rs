//! Crate-wide error type and the coarse error-kind taxonomy exposed to
//! transport layers.

use thiserror::Error;

use crate::lorawan::types::DevEui;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by the control-plane core.
///
/// Variants are specific enough for callers to act on (the frame-counter
/// mismatch carries the expected value so the caller can resynchronize);
/// [`Error::kind`] collapses them to the six kinds a transport layer maps
/// to status codes.
#[derive(Debug, Error)]
pub enum Error {
    #[error("device {0} does not exist")]
    DeviceNotFound(DevEui),
    #[error("device-profile {0} does not exist")]
    ProfileNotFound(String),
    #[error("no session for device {0}")]
    SessionNotFound(DevEui),
    /// Unicast downlink counter gate: the caller's counter must equal the
    /// stored downlink counter exactly.
    #[error("invalid frame-counter (expected {expected})")]
    InvalidFCnt { expected: u32 },
    #[error("invalid mac-command: {0}")]
    InvalidMacCommand(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("storage: {0}")]
    Storage(String),
    #[error("unavailable: {0}")]
    Unavailable(String),
    #[error("devaddr allocation exhausted after {attempts} attempts")]
    Exhausted { attempts: usize },
    #[error("internal: {0}")]
    Internal(String),
}

/// Coarse error classification, one per transport status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    Storage,
    Unavailable,
    Exhausted,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DeviceNotFound(_) | Error::ProfileNotFound(_) | Error::SessionNotFound(_) => {
                ErrorKind::NotFound
            }
            Error::InvalidFCnt { .. }
            | Error::InvalidMacCommand(_)
            | Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::Storage(_) => ErrorKind::Storage,
            Error::Unavailable(_) => ErrorKind::Unavailable,
            Error::Exhausted { .. } => ErrorKind::Exhausted,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether a caller may retry the operation unchanged. Frame-counter
    /// mismatches are excluded: the caller must resynchronize first.
    pub fn is_retriable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Storage | ErrorKind::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lorawan::types::DevEui;

    #[test]
    fn test_error_kind_mapping() {
        let eui = DevEui::from_bytes([1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(Error::DeviceNotFound(eui).kind(), ErrorKind::NotFound);
        assert_eq!(Error::SessionNotFound(eui).kind(), ErrorKind::NotFound);
        assert_eq!(
            Error::InvalidFCnt { expected: 5 }.kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            Error::Storage("write failed".into()).kind(),
            ErrorKind::Storage
        );
        assert_eq!(
            Error::Unavailable("session store get: deadline exceeded".into()).kind(),
            ErrorKind::Unavailable
        );
        assert_eq!(Error::Exhausted { attempts: 10 }.kind(), ErrorKind::Exhausted);
    }

    #[test]
    fn test_fcnt_mismatch_carries_expected() {
        let err = Error::InvalidFCnt { expected: 41 };
        assert_eq!(err.to_string(), "invalid frame-counter (expected 41)");
        assert!(!err.is_retriable());
    }

    #[test]
    fn test_retriable() {
        assert!(Error::Unavailable("queue clear timed out".into()).is_retriable());
        assert!(!Error::Exhausted { attempts: 3 }.is_retriable());
    }
}
