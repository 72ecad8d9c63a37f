use core::fmt;

use crate::{Code, CodeError, IButtonBus};

/// Computes the checksum an identification code must carry in byte 7: the bus CRC-8 over
/// bytes 0-6.
pub fn checksum<B: IButtonBus>(code: &Code) -> u8 {
    B::crc8(&code[..7])
}

/// Validates an identification code.
///
/// Byte 7 must be the CRC-8 of bytes 0-6, and the buffer must not be all zero. The
/// all-zero check is deliberate even though it looks redundant: seven zero bytes checksum
/// to 0x00, so a slipped contact that yields eight zeros passes the CRC and has to be
/// rejected on its own merits. Every other family-code value is accepted, 0x00 and 0xff
/// included; the documentation reserves neither.
pub fn validate<B: IButtonBus>(code: &Code) -> Result<(), CodeError> {
    if checksum::<B>(code) != code[7] {
        return Err(CodeError::ChecksumMismatch);
    }
    if code.iter().all(|&b| b == 0x00) {
        return Err(CodeError::AllZero);
    }
    Ok(())
}

/// Tests two identification codes for byte-wise equality.
pub fn equal(a: &Code, b: &Code) -> bool {
    a == b
}

/// Rewrites byte 7 with the checksum of bytes 0-6, in place. Idempotent.
pub fn update_checksum<B: IButtonBus>(code: &mut Code) {
    code[7] = checksum::<B>(code);
}

/// Renders an identification code as uppercase hexadecimal octets separated by single
/// spaces, through [core::fmt::Display].
///
/// [CodeHex::reversed] flips the byte order to match the sequence engraved on many iButton
/// cans; the underlying buffer is never changed.
#[derive(Debug, Clone, Copy)]
pub struct CodeHex<'a> {
    code: &'a Code,
    reversed: bool,
}

impl<'a> CodeHex<'a> {
    /// Renders `code` in received order, family code first.
    pub fn new(code: &'a Code) -> Self {
        Self {
            code,
            reversed: false,
        }
    }

    /// Renders `code` checksum first, the engraved convention.
    pub fn reversed(code: &'a Code) -> Self {
        Self {
            code,
            reversed: true,
        }
    }
}

impl fmt::Display for CodeHex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.code.len() {
            let byte = if self.reversed {
                self.code[self.code.len() - 1 - i]
            } else {
                self.code[i]
            };
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}
