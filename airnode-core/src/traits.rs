//! Seams between the engine and the hardware
//!
//! The engine only ever talks to the sensor through [`RegisterBus`]. The
//! production implementation is [`PagedSpi`](crate::transport::PagedSpi);
//! tests substitute a simulated device.

pub use crate::time::TimeSource;

/// Addressed access to device registers
///
/// Addresses are the device's 8-bit logical register addresses. Any paging
/// needed to reach them is the implementation's business.
pub trait RegisterBus {
    /// Transport fault, propagated unchanged by the engine
    type Error;

    /// Burst-read `buf.len()` consecutive registers starting at `addr`
    fn read_register(&mut self, addr: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write `values` to consecutive registers starting at `addr`
    fn write_register(&mut self, addr: u8, values: &[u8]) -> Result<(), Self::Error>;

    /// Read a single register
    fn read_byte(&mut self, addr: u8) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.read_register(addr, &mut buf)?;
        Ok(buf[0])
    }
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    type Error = B::Error;

    fn read_register(&mut self, addr: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        (**self).read_register(addr, buf)
    }

    fn write_register(&mut self, addr: u8, values: &[u8]) -> Result<(), Self::Error> {
        (**self).write_register(addr, values)
    }
}
