//! Memory bus interface.

/// Memory bus interface.
///
/// Backing stores (RAM, ROM) sit behind this trait. The machine decides
/// which addresses reach them; the store only sees the offset it owns.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);

    /// Read without side effects (debuggers, snapshots).
    fn peek(&self, address: u16) -> u8;
}
