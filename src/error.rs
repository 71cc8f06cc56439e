//! Centralized error handling for Boson.
//!
//! Every failure surfaced by the codec is a [`BosonError`]; the library never
//! panics (`#![deny(clippy::panic)]`, `#![deny(clippy::unwrap_used)]`).
//!
//! Failures split into two families with different propagation policies:
//!
//! - **Structural failures** — a bad version byte, an undefined tag, input
//!   that ends mid-payload, a back-reference to a record that was never
//!   registered. These abort the whole encode/decode immediately.
//! - **Slot-level issues** — an unknown field name, a value that does not fit
//!   the declared slot. These are logged through `tracing` and the offending
//!   assignment is skipped so the rest of the graph still decodes; they never
//!   appear as a `BosonError`.

use std::io;

use thiserror::Error;

/// A specialized `Result` type for Boson operations.
pub type Result<T> = std::result::Result<T, BosonError>;

/// The wire format version this crate writes and the only version it reads.
pub const WIRE_VERSION: u8 = 1;

/// All failure conditions surfaced by the encoder, the decoder, and the typed
/// record layer.
#[derive(Debug, Error)]
pub enum BosonError {
    /// The first byte of the input is not [`WIRE_VERSION`].
    #[error("data version {found} is not compatible with this reader, which only reads version {WIRE_VERSION}")]
    VersionMismatch {
        /// The version byte actually present in the input.
        found: u8,
    },

    /// A tag byte outside the defined set of wire tags.
    #[error("byte {0} is not a valid boson type tag")]
    UnsupportedTag(u8),

    /// A payload read would pass the end of the input.
    #[error("input ended before the payload was complete; possible data corruption")]
    Truncated,

    /// A REFERENCE payload named an id that has not been registered yet.
    ///
    /// Back-references may only point at records that appeared earlier in the
    /// stream, so this always indicates a corrupt or hand-built message.
    #[error("reference {0} does not name a previously decoded record")]
    DanglingReference(i32),

    /// The target type has no zero-argument construction path.
    #[error("cannot construct an instance of {0}: no zero-argument constructor")]
    CannotConstruct(String),

    /// A wire class name could not be resolved against the requested type.
    #[error("cannot resolve the class {0}")]
    MissingClass(String),

    /// The encoder was asked to emit a value it cannot represent on the wire.
    #[error("unsupported value: {0}")]
    UnsupportedValue(String),

    /// An enum constant named on the wire does not exist on the target enum.
    #[error("{class_name} has no constant named {constant:?}")]
    UnknownEnumConstant {
        /// Wire class name of the enum.
        class_name: String,
        /// The constant name that failed to resolve.
        constant: String,
    },

    /// Structurally invalid data that is not covered by a more specific kind.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// An underlying I/O failure while reading a caller-provided stream.
    #[error("i/o error while reading input")]
    Io(#[from] io::Error),
}

impl BosonError {
    /// Maps stream errors onto the taxonomy: an early end of input is a
    /// [`BosonError::Truncated`], anything else stays an I/O failure.
    pub(crate) fn from_read(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::Truncated
        } else {
            Self::Io(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_eof_becomes_truncated() {
        let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        assert!(matches!(BosonError::from_read(eof), BosonError::Truncated));
    }

    #[test]
    fn other_io_errors_stay_io() {
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "no");
        assert!(matches!(BosonError::from_read(denied), BosonError::Io(_)));
    }
}
