use crate::Code;

/// Ways an 8-byte identification code can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeError {
    /// Byte 7 is not the CRC-8 of bytes 0-6. The usual cause is two devices answering a
    /// single-device read at once, or a device moving on the reader mid-transfer.
    ChecksumMismatch,
    /// All eight bytes are zero. Rejected even though seven zero bytes checksum to 0x00:
    /// a device sliding across the reader contacts can produce exactly this buffer.
    AllZero,
}

/// iButton protocol error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IButtonError<E> {
    /// Encapsulates the error type from the underlying transport.
    Bus(E),
    /// No device asserted presence at a reset point. Transient by nature; the caller may
    /// retry the whole operation once a device is back on the reader.
    NoDevice,
    /// A code read from the bus or passed in by the caller failed validation.
    InvalidCode {
        /// Which validation check failed.
        kind: CodeError,
        /// The raw bytes, kept so the caller can log what was actually seen.
        code: Code,
    },
    /// None of the probeable writable families matched, so an automatic write cannot
    /// choose a procedure.
    TypeNotDetectable,
    /// The caller named a type that is not a writable family.
    InvalidType,
    /// The caller named a writable family but the device on the bus failed that family's
    /// probe.
    TypeMismatch,
    /// A byte written to an RW2004 device read back differently. Bytes programmed before
    /// the failure stay programmed; there is no rollback.
    WriteFailed,
    /// The write sequence completed but re-reading the device did not yield the intended
    /// code.
    VerifyMismatch,
}

impl<E> From<E> for IButtonError<E> {
    fn from(other: E) -> Self {
        Self::Bus(other)
    }
}
