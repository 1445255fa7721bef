//! Columns selected through 3-to-8 style demultiplexers.
//!
//! All chips share the address lines and each has its own enable line. The
//! first `CHIPS << ADDR` columns belong to the chips in order (column `c`
//! is output `c & mask` of chip `c >> ADDR`), and any columns after those
//! are wired straight to a pin each.
//!
//! For instance two 74HC237s plus two direct lines give 18 columns:
//!
//! ```text
//! col     enable  A2 A1 A0
//! 0       chip 0   0  0  0
//! 5       chip 0   1  0  1
//! 12      chip 1   1  0  0
//! 16      direct pin 0
//! 17      direct pin 1
//! ```

use embedded_hal::digital::v2::OutputPin;
use heapless::Vec;

use crate::pins::ColumnDriver;

pub struct DemuxColumns<O, const ADDR: usize, const CHIPS: usize, const DIRECT: usize> {
    address: Vec<O, ADDR>,
    enable: Vec<O, CHIPS>,
    direct: Vec<O, DIRECT>,
}

impl<O, const ADDR: usize, const CHIPS: usize, const DIRECT: usize>
    DemuxColumns<O, ADDR, CHIPS, DIRECT>
{
    /// Number of columns this driver can select
    pub const COLUMNS: usize = (CHIPS << ADDR) + DIRECT;
    const DEMUXED: usize = CHIPS << ADDR;

    /// `address[n]` drives address bit `n`, `enable[n]` enables chip `n`.
    /// Every line is active high.
    pub fn new(address: Vec<O, ADDR>, enable: Vec<O, CHIPS>, direct: Vec<O, DIRECT>) -> Self {
        DemuxColumns {
            address,
            enable,
            direct,
        }
    }
}

impl<E, O, const ADDR: usize, const CHIPS: usize, const DIRECT: usize> ColumnDriver
    for DemuxColumns<O, ADDR, CHIPS, DIRECT>
where
    O: OutputPin<Error = E>,
{
    type Error = E;

    fn select_column(&mut self, col: usize) -> Result<(), E> {
        if col < Self::DEMUXED {
            // Address first, so the chip never drives a stale output
            let line = col & ((1 << ADDR) - 1);
            for (bit, pin) in self.address.iter_mut().enumerate() {
                pin.set_state(((line >> bit) & 1 == 1).into())?;
            }
            self.enable[col >> ADDR].set_high()
        } else {
            self.direct[col - Self::DEMUXED].set_high()
        }
    }

    fn deselect_all_columns(&mut self) -> Result<(), E> {
        for pin in self
            .enable
            .iter_mut()
            .chain(self.direct.iter_mut())
            .chain(self.address.iter_mut())
        {
            pin.set_low()?;
        }
        Ok(())
    }
}
