use log::trace;

use crate::{
    Code, IButtonBus, IButtonError, IButtonResult, READ_ROM_CMD, READ_ROM_LEGACY_CMD, code,
};

/// Reads the identification code of the single device on the bus.
///
/// With `legacy` set the DS1990-era [READ_ROM_LEGACY_CMD] is issued instead of
/// [READ_ROM_CMD]; DS1990A/DS1990R/TM1990A still answer it, most other 1-Wire devices do
/// not and may misbehave.
///
/// With more than one device connected the responses collide and the assembled buffer
/// fails the checksum. That is the expected outcome of this mode, not a transport fault;
/// use [begin_search]/[next_code] to enumerate a shared bus.
///
/// # Errors
/// [IButtonError::NoDevice] when nothing asserts presence,
/// [IButtonError::InvalidCode] carrying the raw bytes when validation fails.
pub fn read_code<B: IButtonBus>(bus: &mut B, legacy: bool) -> IButtonResult<Code, B::BusError> {
    if !bus.reset()? {
        return Err(IButtonError::NoDevice);
    }
    let cmd = if legacy {
        READ_ROM_LEGACY_CMD
    } else {
        READ_ROM_CMD
    };
    bus.write_byte(cmd)?;
    let mut code = [0u8; 8];
    for byte in code.iter_mut() {
        *byte = bus.read_byte()?;
    }
    trace!("read rom cmd {cmd:#04x}: {code:02x?}");
    match code::validate::<B>(&code) {
        Ok(()) => Ok(code),
        Err(kind) => Err(IButtonError::InvalidCode { kind, code }),
    }
}

/// Starts (or restarts) an enumeration of all device codes on the bus.
///
/// Resets the bus and rewinds the adapter's search cursor; enumerate with [next_code]
/// afterwards.
///
/// # Errors
/// [IButtonError::NoDevice] when nothing asserts presence.
pub fn begin_search<B: IButtonBus>(bus: &mut B) -> IButtonResult<(), B::BusError> {
    if !bus.reset()? {
        return Err(IButtonError::NoDevice);
    }
    bus.reset_search();
    Ok(())
}

/// Yields the next device code in an enumeration started with [begin_search].
///
/// `Ok(None)` means the enumeration finished cleanly. A validation failure usually means a
/// device moved on the reader mid-search; the search cursor is then best-effort and later
/// calls may yield inconsistent results, which this layer cannot repair.
///
/// # Errors
/// [IButtonError::InvalidCode] carrying the raw bytes when validation fails.
pub fn next_code<B: IButtonBus>(bus: &mut B) -> IButtonResult<Option<Code>, B::BusError> {
    let Some(code) = bus.search()? else {
        return Ok(None);
    };
    trace!("search yielded {code:02x?}");
    match code::validate::<B>(&code) {
        Ok(()) => Ok(Some(code)),
        Err(kind) => Err(IButtonError::InvalidCode { kind, code }),
    }
}
