//! Access to the matrix hardware: column selection and row sampling

use embedded_hal::digital::v2::{InputPin, OutputPin};
use heapless::Vec;

use crate::bits::RowBits;

/// Drives the column select lines
pub trait ColumnDriver {
    type Error;

    /// Puts every select line into its idle state. Called once before the
    /// first scan.
    fn configure(&mut self) -> Result<(), Self::Error> {
        self.deselect_all_columns()
    }

    /// Activates column `col`, assuming no other column is active
    fn select_column(&mut self, col: usize) -> Result<(), Self::Error>;

    fn deselect_all_columns(&mut self) -> Result<(), Self::Error>;
}

/// Reads the row lines of whichever column is selected
pub trait RowSampler {
    type Error;
    /// Bit `n` is row `n`
    type Sample: RowBits;

    fn configure(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn sample_rows(&mut self) -> Result<Self::Sample, Self::Error>;

    /// Extra keys wired outside the matrix, reported while column `col` is
    /// scanned. None by default.
    fn sample_auxiliary(&mut self, _col: usize) -> Result<Self::Sample, Self::Error> {
        Ok(Self::Sample::ZERO)
    }
}

/// One output pin per column
pub struct ColumnPins<O, const COLS: usize> {
    pins: Vec<O, COLS>,
    active_high: bool,
}

impl<O: OutputPin, const COLS: usize> ColumnPins<O, COLS> {
    pub fn new(pins: Vec<O, COLS>, active_high: bool) -> Self {
        ColumnPins { pins, active_high }
    }
}

impl<E, O: OutputPin<Error = E>, const COLS: usize> ColumnDriver for ColumnPins<O, COLS> {
    type Error = E;

    fn select_column(&mut self, col: usize) -> Result<(), E> {
        self.pins[col].set_state(self.active_high.into())
    }

    fn deselect_all_columns(&mut self) -> Result<(), E> {
        for pin in self.pins.iter_mut() {
            pin.set_state((!self.active_high).into())?;
        }
        Ok(())
    }
}

/// One input pin per row, pin `n` read into bit `n`
pub struct RowPins<I, const ROWS: usize> {
    pins: Vec<I, ROWS>,
    active_high: bool,
}

impl<I: InputPin, const ROWS: usize> RowPins<I, ROWS> {
    const FITS: () = assert!(ROWS as u32 <= u32::BITS, "too many rows for one sample");

    pub fn new(pins: Vec<I, ROWS>, active_high: bool) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::FITS;
        RowPins { pins, active_high }
    }
}

impl<E, I: InputPin<Error = E>, const ROWS: usize> RowSampler for RowPins<I, ROWS> {
    type Error = E;
    type Sample = u32;

    fn sample_rows(&mut self) -> Result<u32, E> {
        let mut rows = 0;
        for (row, pin) in self.pins.iter().enumerate() {
            if pin.is_high()? == self.active_high {
                rows |= u32::bit(row);
            }
        }
        Ok(rows)
    }
}

/// A key on its own input pin, reported as if it sat at (`row`, `column`)
/// of the matrix. The slot has to be one that no switch occupies.
pub struct AuxiliaryKey<S, P> {
    rows: S,
    pin: P,
    column: usize,
    row: usize,
    active_high: bool,
}

impl<S: RowSampler, P: InputPin> AuxiliaryKey<S, P> {
    /// # Panics
    ///
    /// If `row` does not fit in a row sample.
    pub fn new(rows: S, pin: P, column: usize, row: usize, active_high: bool) -> Self {
        assert!((row as u32) < S::Sample::WIDTH, "row {} out of range", row);
        AuxiliaryKey {
            rows,
            pin,
            column,
            row,
            active_high,
        }
    }
}

impl<E, S, P> RowSampler for AuxiliaryKey<S, P>
where
    S: RowSampler<Error = E>,
    P: InputPin<Error = E>,
{
    type Error = E;
    type Sample = S::Sample;

    fn configure(&mut self) -> Result<(), E> {
        self.rows.configure()
    }

    fn sample_rows(&mut self) -> Result<S::Sample, E> {
        self.rows.sample_rows()
    }

    fn sample_auxiliary(&mut self, col: usize) -> Result<S::Sample, E> {
        let mut sample = self.rows.sample_auxiliary(col)?;
        if col == self.column && self.pin.is_high()? == self.active_high {
            sample |= S::Sample::bit(self.row);
        }
        Ok(sample)
    }
}
