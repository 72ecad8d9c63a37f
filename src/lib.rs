#![no_std]
#![deny(missing_docs)]
//! # ibutton-tag
//! A no-std protocol layer for iButton identification codes on a 1-Wire bus.
//!
//! This crate drives the command sequences that sit above a 1-Wire transport: reading the
//! 8-byte identification code of a single device, enumerating the codes of several devices
//! sharing the bus, probing which writable device family is present, and rewriting the code
//! on the four families that support it (RW1990 v1/v2, RW2004, TM01).
//!
//! The transport itself is consumed through the [IButtonBus] trait: reset/presence, byte and
//! bit transfers, the search primitive, and the Maxim CRC-8 all belong to the bus adapter.
//! Settle delays mandated by the writable devices run through
//! [embedded_hal::delay::DelayNs], so the crate works unchanged on bit-banged GPIO, bridge
//! chips, or a host-side adapter.
//!
//! Reading is non-destructive. Writing is not: a failed or interrupted write can leave a
//! device with a partially programmed code, which is reported, never retried. Retry policy
//! belongs to the caller.

mod code;
mod detect;
mod error;
mod reader;
mod traits;
mod writer;
pub use code::{CodeHex, checksum, equal, update_checksum, validate};
pub use detect::{WritableType, detect, probe_rw1990v1, probe_rw1990v2, probe_rw2004};
pub use error::{CodeError, IButtonError};
pub use reader::{begin_search, next_code, read_code};
pub use traits::IButtonBus;
pub use writer::CodeWriter;

/// Result type for iButton operations.
pub type IButtonResult<T, E> = Result<T, IButtonError<E>>;

/// An iButton identification code.
///
/// Byte 0 is the family code, bytes 1-6 the serial number, byte 7 the Maxim CRC-8 of
/// bytes 0-6. A code is a plain value: two codes are equal iff all eight bytes match.
pub type Code = [u8; 8];

/// Command to read the identification code of the single device on the bus (Read ROM).
pub const READ_ROM_CMD: u8 = 0x33;

/// Legacy read command for DS1990 devices, which predate [READ_ROM_CMD].
///
/// DS1990A, DS1990R and TM1990A answer both commands; other 1-Wire devices may misbehave
/// when they see this one, so it is opt-in via the `legacy` flag of
/// [read_code](crate::read_code).
pub const READ_ROM_LEGACY_CMD: u8 = 0x0f;

/// Data-write command shared by the RW1990 v1/v2 and TM01 families.
///
/// Only honored while the family's write-enable flag is set; the 64 code bits follow
/// LSB-first as individually settled bit writes.
pub const WRITE_ROM_CMD: u8 = 0xd5;

/// RW1990 v1 write-enable flag command. The flag bit that follows is inverted, like the
/// data bits of this family.
pub const RW1990V1_WRITE_ENABLE_CMD: u8 = 0xd1;

/// RW1990 v1 command to read back the write-enable flag.
pub const RW1990V1_WRITE_FLAG_CMD: u8 = 0xb5;

/// RW1990 v2 write-enable flag command. Non-inverted polarity.
pub const RW1990V2_WRITE_ENABLE_CMD: u8 = 0x1d;

/// RW1990 v2 command to read back the write-enable flag.
pub const RW1990V2_WRITE_FLAG_CMD: u8 = 0x1e;

/// TM01 write-enable flag command. TM01 offers no flag read-back, so the family cannot be
/// probed and must be selected explicitly by the operator.
pub const TM01_WRITE_ENABLE_CMD: u8 = 0xc1;

/// Byte answered by RW1990 v1/v2 devices when their write-enable flag is set.
pub const WRITE_FLAG_ARMED: u8 = 0xfe;

/// RW2004 status read command; followed by a two-byte register address, answered with the
/// CRC-8 of the three command bytes and one status byte.
pub const RW2004_STATUS_CMD: u8 = 0xaa;

/// RW2004 program command; followed by a two-byte register address, then one
/// write/pulse/verify cycle per code byte.
pub const RW2004_PROGRAM_CMD: u8 = 0x3c;

/// Hardware settle and programming delays used by the probe and write sequences.
///
/// The defaults are protocol requirements of the writable device families, not tuning
/// knobs; they are exposed as fields for adapters whose transport already inserts part of
/// the delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Pause after every flag or data bit written to an RW1990 v1/v2 or TM01 device.
    pub bit_settle_us: u32,
    /// RW2004: pause between the echoed CRC byte and the program pulse.
    pub program_setup_us: u32,
    /// RW2004: pause after the program pulse before the verify read.
    pub program_hold_us: u32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            bit_settle_us: 10_000,
            program_setup_us: 600,
            program_hold_us: 50_000,
        }
    }
}
