use embedded_hal::delay::DelayNs;
use log::debug;

use crate::{
    Code, IButtonBus, IButtonError, IButtonResult, RW1990V1_WRITE_ENABLE_CMD,
    RW1990V2_WRITE_ENABLE_CMD, RW2004_PROGRAM_CMD, TM01_WRITE_ENABLE_CMD, Timings, WRITE_ROM_CMD,
    code,
    detect::{WritableType, detect, probe_rw1990v1, probe_rw1990v2, probe_rw2004, settled_bit},
    reader::read_code,
};

/// Orchestrates rewriting the identification code of a writable device.
///
/// Validation, family resolution, the family-specific write sequence and the post-write
/// verification run strictly in that order, and the first failure wins. Nothing here
/// retries: a failed write can leave an RW2004 partially programmed, and re-running a
/// write sequence over such a device is an operator decision.
#[derive(Debug, Clone, Copy)]
pub struct CodeWriter {
    timings: Timings,
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeWriter {
    /// Creates a writer with the default hardware [Timings].
    pub fn new() -> Self {
        Self {
            timings: Timings::default(),
        }
    }

    /// Replaces the hardware delays. Only useful for adapters whose transport already
    /// inserts part of the settle time.
    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// Writes `code` to the device on the bus.
    ///
    /// `family` selects the write procedure. `None` probes the device via
    /// [detect]; a TM01 must be passed explicitly since it answers no probe, and it
    /// is then trusted as given. With `check` set the code is validated first and an
    /// explicit probeable family is re-probed before anything is written.
    ///
    /// # Errors
    /// - [IButtonError::InvalidCode] — `check` set and `code` failed validation.
    /// - [IButtonError::InvalidType] — explicit [WritableType::Unknown]; rejected before
    ///   any bus traffic.
    /// - [IButtonError::TypeNotDetectable] — automatic detection matched nothing.
    /// - [IButtonError::TypeMismatch] — `check` set and the named family's probe missed.
    /// - [IButtonError::NoDevice] — presence lost at any reset along the way.
    /// - [IButtonError::WriteFailed] — an RW2004 byte failed its read-back; earlier bytes
    ///   stay programmed.
    /// - [IButtonError::VerifyMismatch] — the final re-read disagreed with `code`.
    pub fn write<B: IButtonBus, D: DelayNs>(
        &self,
        bus: &mut B,
        delay: &mut D,
        code: &Code,
        family: Option<WritableType>,
        check: bool,
    ) -> IButtonResult<(), B::BusError> {
        if check {
            if let Err(kind) = code::validate::<B>(code) {
                return Err(IButtonError::InvalidCode { kind, code: *code });
            }
        }
        let family = match family {
            None => match detect(bus, delay, &self.timings)? {
                WritableType::Unknown => return Err(IButtonError::TypeNotDetectable),
                found => found,
            },
            Some(WritableType::Unknown) => return Err(IButtonError::InvalidType),
            Some(named) => {
                if check {
                    let matched = match named {
                        WritableType::Rw1990v1 => probe_rw1990v1(bus, delay, &self.timings)?,
                        WritableType::Rw1990v2 => probe_rw1990v2(bus, delay, &self.timings)?,
                        WritableType::Rw2004 => probe_rw2004(bus)?,
                        // TM01 answers no probe; Unknown was rejected above.
                        WritableType::Tm01 | WritableType::Unknown => true,
                    };
                    if !matched {
                        return Err(IButtonError::TypeMismatch);
                    }
                }
                named
            }
        };
        debug!("writing {code:02x?} as {family:?}");
        match family {
            WritableType::Rw1990v1 => {
                self.write_pulsed(bus, delay, code, RW1990V1_WRITE_ENABLE_CMD, true)?
            }
            WritableType::Rw1990v2 => {
                self.write_pulsed(bus, delay, code, RW1990V2_WRITE_ENABLE_CMD, false)?
            }
            WritableType::Tm01 => {
                self.write_pulsed(bus, delay, code, TM01_WRITE_ENABLE_CMD, false)?
            }
            WritableType::Rw2004 => self.program_bytes(bus, delay, code)?,
            WritableType::Unknown => return Err(IButtonError::InvalidType),
        }
        match read_code(bus, false) {
            Ok(readback) if code::equal(&readback, code) => Ok(()),
            Ok(_) | Err(IButtonError::InvalidCode { .. }) => Err(IButtonError::VerifyMismatch),
            Err(other) => Err(other),
        }
    }

    /// Common write sequence of the RW1990 v1/v2 and TM01 families: arm the write-enable
    /// flag, stream the 64 code bits LSB-first as settled bit slots, disarm.
    ///
    /// `invert` covers the RW1990 v1 quirk that both its flag and its data bits carry
    /// inverted polarity.
    fn write_pulsed<B: IButtonBus, D: DelayNs>(
        &self,
        bus: &mut B,
        delay: &mut D,
        code: &Code,
        enable_cmd: u8,
        invert: bool,
    ) -> IButtonResult<(), B::BusError> {
        let armed = !invert;
        if !bus.reset()? {
            return Err(IButtonError::NoDevice);
        }
        bus.write_byte(enable_cmd)?;
        settled_bit(bus, delay, &self.timings, armed)?;
        if !bus.reset()? {
            return Err(IButtonError::NoDevice);
        }
        bus.write_byte(WRITE_ROM_CMD)?;
        for &byte in code.iter() {
            for bit in 0..8 {
                let value = (byte >> bit) & 1 == 1;
                settled_bit(bus, delay, &self.timings, value ^ invert)?;
            }
        }
        if !bus.reset()? {
            return Err(IButtonError::NoDevice);
        }
        bus.write_byte(enable_cmd)?;
        settled_bit(bus, delay, &self.timings, !armed)?;
        Ok(())
    }

    /// RW2004 write sequence: program register 0x0000 byte by byte, each byte followed by
    /// a program pulse and a read-back verify.
    ///
    /// A verify miss aborts with the remaining bytes unwritten; the bytes already
    /// programmed are not rolled back.
    fn program_bytes<B: IButtonBus, D: DelayNs>(
        &self,
        bus: &mut B,
        delay: &mut D,
        code: &Code,
    ) -> IButtonResult<(), B::BusError> {
        if !bus.reset()? {
            return Err(IButtonError::NoDevice);
        }
        bus.write_byte(RW2004_PROGRAM_CMD)?;
        bus.write_byte(0x00)?;
        bus.write_byte(0x00)?;
        for &byte in code.iter() {
            bus.write_byte(byte)?;
            // The device answers what is probably a CRC of the byte; left unvalidated
            // until checked against real hardware.
            let _crc = bus.read_byte()?;
            delay.delay_us(self.timings.program_setup_us);
            bus.write_bit(true)?; // program pulse
            delay.delay_us(self.timings.program_hold_us);
            if bus.read_byte()? != byte {
                return Err(IButtonError::WriteFailed);
            }
        }
        Ok(())
    }
}
