use crate::Code;

/// Capability contract for the 1-Wire transport underneath this crate.
///
/// Implementations own everything electrical: reset/presence timing, bit slots, the search
/// state machine and the Maxim CRC-8. The protocol layer only sequences commands through
/// these operations and never touches the wire directly.
pub trait IButtonBus {
    /// The error type returned by the operations of this trait.
    /// This type is used to indicate errors in the underlying hardware or communication.
    type BusError;

    /// Resets the bus and samples the presence pulse.
    ///
    /// # Returns
    /// `true` iff at least one device asserted presence after the reset.
    ///
    /// # Errors
    /// This method returns an error if the reset operation fails in the transport.
    fn reset(&mut self) -> Result<bool, Self::BusError>;

    /// Writes a byte to the bus, LSB first.
    ///
    /// # Errors
    /// This method returns an error if the write operation fails.
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::BusError>;

    /// Reads a byte from the bus.
    ///
    /// # Errors
    /// This method returns an error if the read operation fails.
    fn read_byte(&mut self) -> Result<u8, Self::BusError>;

    /// Writes a single bit time slot.
    ///
    /// # Errors
    /// This method returns an error if the write operation fails.
    fn write_bit(&mut self, bit: bool) -> Result<(), Self::BusError>;

    /// Rewinds the search cursor so the next [search](IButtonBus::search) starts a fresh
    /// enumeration.
    fn reset_search(&mut self);

    /// Advances the 1-Wire search algorithm by one device.
    ///
    /// # Returns
    /// The 8-byte ROM of the next responding device, or `None` when the enumeration is
    /// exhausted.
    ///
    /// # Errors
    /// This method returns an error if the search sequence fails in the transport.
    fn search(&mut self) -> Result<Option<Code>, Self::BusError>;

    /// Computes the Maxim CRC-8 (polynomial 0x8c, LSB-first) over `data`.
    ///
    /// Associated rather than a method: the checksum is a property of the wire format, not
    /// of any particular bus instance.
    fn crc8(data: &[u8]) -> u8;
}
