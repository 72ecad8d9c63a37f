use embedded_hal::delay::DelayNs;
use log::debug;

use crate::{
    IButtonBus, IButtonError, IButtonResult, RW1990V1_WRITE_ENABLE_CMD, RW1990V1_WRITE_FLAG_CMD,
    RW1990V2_WRITE_ENABLE_CMD, RW1990V2_WRITE_FLAG_CMD, RW2004_STATUS_CMD, Timings,
    WRITE_FLAG_ARMED,
};

/// The writable device families whose identification code can be rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritableType {
    /// Device did not match any probe; it is either read-only or a TM01.
    Unknown,
    /// RW1990 v1: inverted data bits, write-enable flag readable via
    /// [RW1990V1_WRITE_FLAG_CMD].
    Rw1990v1,
    /// RW1990 v2: non-inverted data bits, flag readable via [RW1990V2_WRITE_FLAG_CMD];
    /// the probe re-disables the flag after a positive match.
    Rw1990v2,
    /// RW2004/TM2004: EEPROM register devices programmed byte by byte with a program
    /// pulse and read-back verify.
    Rw2004,
    /// TM01: answers no probe, so this family is only ever selected explicitly by the
    /// operator.
    Tm01,
}

/// Writes one bit and waits out the settle delay the writable families require between
/// bit slots.
pub(crate) fn settled_bit<B: IButtonBus, D: DelayNs>(
    bus: &mut B,
    delay: &mut D,
    timings: &Timings,
    bit: bool,
) -> Result<(), B::BusError> {
    bus.write_bit(bit)?;
    delay.delay_us(timings.bit_settle_us);
    Ok(())
}

/// Probes for an RW1990 v1 device.
///
/// Sets the family's write-enable flag (one raw 1 bit, settled), then reads the flag back
/// and compares against [WRITE_FLAG_ARMED]. An RW1990 v1 latches the flag *inverted*, so
/// the raw 1 leaves a genuine device disarmed and the probe is non-destructive.
///
/// # Errors
/// [IButtonError::NoDevice] when presence is lost at any reset.
pub fn probe_rw1990v1<B: IButtonBus, D: DelayNs>(
    bus: &mut B,
    delay: &mut D,
    timings: &Timings,
) -> IButtonResult<bool, B::BusError> {
    if !bus.reset()? {
        return Err(IButtonError::NoDevice);
    }
    bus.write_byte(RW1990V1_WRITE_ENABLE_CMD)?;
    settled_bit(bus, delay, timings, true)?;
    if !bus.reset()? {
        return Err(IButtonError::NoDevice);
    }
    bus.write_byte(RW1990V1_WRITE_FLAG_CMD)?;
    let flag = bus.read_byte()?;
    debug!("rw1990v1 flag answer {flag:#04x}");
    Ok(flag == WRITE_FLAG_ARMED)
}

/// Probes for an RW1990 v2 device.
///
/// Same flag round-trip as [probe_rw1990v1] with the v2 commands, but this family latches
/// the flag non-inverted: a positive match means the device is now armed, so the probe
/// must write the flag back to 0 before returning. Skipping the restore would leave the
/// device one [WRITE_ROM_CMD](crate::WRITE_ROM_CMD) away from losing its code.
///
/// # Errors
/// [IButtonError::NoDevice] when presence is lost at any reset, the restore included.
pub fn probe_rw1990v2<B: IButtonBus, D: DelayNs>(
    bus: &mut B,
    delay: &mut D,
    timings: &Timings,
) -> IButtonResult<bool, B::BusError> {
    if !bus.reset()? {
        return Err(IButtonError::NoDevice);
    }
    bus.write_byte(RW1990V2_WRITE_ENABLE_CMD)?;
    settled_bit(bus, delay, timings, true)?;
    if !bus.reset()? {
        return Err(IButtonError::NoDevice);
    }
    bus.write_byte(RW1990V2_WRITE_FLAG_CMD)?;
    let flag = bus.read_byte()?;
    debug!("rw1990v2 flag answer {flag:#04x}");
    if flag != WRITE_FLAG_ARMED {
        return Ok(false);
    }
    // Disarm before reporting the match.
    if !bus.reset()? {
        return Err(IButtonError::NoDevice);
    }
    bus.write_byte(RW1990V2_WRITE_ENABLE_CMD)?;
    settled_bit(bus, delay, timings, false)?;
    Ok(true)
}

/// Probes for an RW2004/TM2004 device.
///
/// Issues a status read of register 0x0000 and checks the echoed CRC-8 of the three
/// command bytes. On a match one further status byte is consumed; its meaning is
/// undocumented (probably another CRC) and it is not validated pending tests against real
/// hardware.
///
/// # Errors
/// [IButtonError::NoDevice] when presence is lost at a reset.
pub fn probe_rw2004<B: IButtonBus>(bus: &mut B) -> IButtonResult<bool, B::BusError> {
    if !bus.reset()? {
        return Err(IButtonError::NoDevice);
    }
    let query = [RW2004_STATUS_CMD, 0x00, 0x00];
    for &byte in query.iter() {
        bus.write_byte(byte)?;
    }
    let answer = bus.read_byte()?;
    debug!("rw2004 status crc answer {answer:#04x}");
    if answer != B::crc8(&query) {
        return Ok(false);
    }
    let _status = bus.read_byte()?;
    if !bus.reset()? {
        return Err(IButtonError::NoDevice);
    }
    Ok(true)
}

/// Classifies the writable family of the device on the bus.
///
/// Runs the probes in fixed order RW1990 v1, RW1990 v2, RW2004 and reports the first
/// match; [WritableType::Unknown] when all three miss. TM01 is never reported because it
/// cannot be probed.
///
/// # Errors
/// [IButtonError::NoDevice] ends detection immediately: a device that vanishes
/// mid-probing is gone, not worth finishing the remaining probes for.
pub fn detect<B: IButtonBus, D: DelayNs>(
    bus: &mut B,
    delay: &mut D,
    timings: &Timings,
) -> IButtonResult<WritableType, B::BusError> {
    if probe_rw1990v1(bus, delay, timings)? {
        return Ok(WritableType::Rw1990v1);
    }
    if probe_rw1990v2(bus, delay, timings)? {
        return Ok(WritableType::Rw1990v2);
    }
    if probe_rw2004(bus)? {
        return Ok(WritableType::Rw2004);
    }
    Ok(WritableType::Unknown)
}
