//! Paged SPI register transport
//!
//! In SPI mode the sensor sees only seven address bits. The eighth bit of the
//! logical register address is replaced by a page bit in the status register,
//! which must be set before touching any other register. The status register
//! itself is reachable from both pages.
//!
//! ## Wire format
//!
//! - Read: one chip-select assertion carrying `addr | 0x80` and then the data
//!   phase. Consecutive registers are returned by auto-increment.
//! - Write: one chip-select assertion carrying `(addr & 0x7F, value)` pairs.
//!   Runs longer than [`MAX_BURST`] registers are split across assertions.

use embedded_hal::spi::{Operation, SpiDevice};
use heapless::Vec;

use crate::constants::registers::{
    PAGE_BOUNDARY, PAGE_PRIMARY, PAGE_SECONDARY, SPI_ADDR_MASK, SPI_READ, STATUS,
};
use crate::traits::RegisterBus;

/// Registers written per chip-select assertion
pub const MAX_BURST: usize = 8;

const FRAME_CAPACITY: usize = MAX_BURST * 2;

/// Page bit value that makes `addr` reachable
pub(crate) fn page_for(addr: u8) -> u8 {
    if addr < PAGE_BOUNDARY {
        PAGE_SECONDARY
    } else {
        PAGE_PRIMARY
    }
}

/// [`RegisterBus`] over an SPI device with page switching
#[derive(Debug)]
pub struct PagedSpi<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> PagedSpi<SPI> {
    /// Wrap a configured SPI device (mode 0 or 3)
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Give the SPI device back
    pub fn release(self) -> SPI {
        self.spi
    }

    fn select_page(&mut self, addr: u8) -> Result<(), SPI::Error> {
        if addr == STATUS {
            return Ok(());
        }
        let page = page_for(addr);
        trace!("page select {:#x} for register {:#x}", page, addr);
        // Raw frame: the status register needs no page of its own.
        self.spi.write(&[STATUS & SPI_ADDR_MASK, page])
    }
}

impl<SPI: SpiDevice> RegisterBus for PagedSpi<SPI> {
    type Error = SPI::Error;

    fn read_register(&mut self, addr: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.select_page(addr)?;
        let command = [(addr & SPI_ADDR_MASK) | SPI_READ];
        self.spi
            .transaction(&mut [Operation::Write(&command), Operation::Read(buf)])?;
        trace!("read {:#x} ({} bytes): {:?}", addr, buf.len(), buf);
        Ok(())
    }

    fn write_register(&mut self, addr: u8, values: &[u8]) -> Result<(), Self::Error> {
        self.select_page(addr)?;
        trace!("write {:#x}: {:?}", addr, values);

        for (index, chunk) in values.chunks(MAX_BURST).enumerate() {
            let start = addr.wrapping_add((index * MAX_BURST) as u8);
            let mut frame: Vec<u8, FRAME_CAPACITY> = Vec::new();
            // A chunk never exceeds MAX_BURST pairs.
            frame.extend(chunk.iter().enumerate().flat_map(|(offset, value)| {
                [start.wrapping_add(offset as u8) & SPI_ADDR_MASK, *value]
            }));
            self.spi.write(&frame)?;
        }
        Ok(())
    }
}
