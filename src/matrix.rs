//! Scans a column-multiplexed keyboard matrix

use core::fmt;

use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use heapless::String;

use crate::bits::RowBits;
use crate::debounce::{Debouncer, Settle, DEFAULT_DEBOUNCE};
use crate::pins::{ColumnDriver, RowSampler};
use crate::state::KeyMatrix;

/// Busy-wait times of one scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanTiming {
    /// Wait between selecting a column and sampling its rows, for the select
    /// line (and any demultiplexer in front of it) to settle
    pub select_settle_us: u32,
    /// Wait after a pass that left the matrix settling, so the debounce
    /// countdown spans real time rather than back-to-back passes
    pub unsettled_backoff_ms: u32,
}

impl Default for ScanTiming {
    fn default() -> Self {
        ScanTiming {
            select_settle_us: 3,
            unsettled_backoff_ms: 1,
        }
    }
}

/// A debounced key matrix with `ROWS` rows and `COLS` columns, kept as one
/// `R` per row.
///
/// The matrix is either stable, with the committed state current, or
/// settling after some key changed during the last `DEBOUNCE` passes. The
/// committed state can be read in both; while settling it is the previous
/// stable snapshot.
pub struct Matrix<
    C,
    S,
    D,
    R,
    const ROWS: usize,
    const COLS: usize,
    const DEBOUNCE: u8 = { DEFAULT_DEBOUNCE },
> {
    columns: C,
    rows: S,
    delay: D,
    timing: ScanTiming,
    debouncer: Debouncer<R, ROWS, COLS, DEBOUNCE>,
}

impl<E, C, S, D, R, const ROWS: usize, const COLS: usize, const DEBOUNCE: u8>
    Matrix<C, S, D, R, ROWS, COLS, DEBOUNCE>
where
    C: ColumnDriver<Error = E>,
    S: RowSampler<Error = E>,
    D: DelayUs<u32> + DelayMs<u32>,
    R: RowBits,
{
    const ROWS_FIT: () = assert!(
        ROWS as u32 <= <S::Sample as RowBits>::WIDTH,
        "row sample is too narrow for the number of rows"
    );

    /// Puts the pins into their idle state and starts with every key released
    pub fn new(columns: C, rows: S, delay: D, timing: ScanTiming) -> Result<Self, E> {
        #[allow(clippy::let_unit_value)]
        let () = Self::ROWS_FIT;
        let mut matrix = Matrix {
            columns,
            rows,
            delay,
            timing,
            debouncer: Debouncer::new(),
        };
        matrix.columns.configure()?;
        matrix.rows.configure()?;
        Ok(matrix)
    }

    /// Forgets all key state, as right after [`new`](Self::new)
    pub fn reset(&mut self) {
        self.debouncer.reset();
    }

    /// Samples every column once and debounces the result.
    ///
    /// Returns whether the matrix is stable afterwards, i.e. the committed
    /// state may be read as current. It does not say that anything changed.
    pub fn scan(&mut self) -> Result<bool, E> {
        for col in 0..COLS {
            match self.scan_column(col) {
                Ok(sample) => {
                    self.debouncer.update(col, sample);
                }
                Err(err) => {
                    self.debouncer.discard_pass();
                    return Err(err);
                }
            }
        }

        match self.debouncer.settle() {
            Settle::Stable => Ok(true),
            Settle::Committed => {
                debug!("matrix committed, {=u32} keys down", self.active_key_count());
                Ok(true)
            }
            Settle::Settling(remaining) => {
                trace!("settling, {=u8} passes to go", remaining);
                self.delay.delay_ms(self.timing.unsettled_backoff_ms);
                Ok(false)
            }
        }
    }

    /// Selects `col`, samples its rows and deselects it again. The column is
    /// released even when selecting or sampling fails.
    fn scan_column(&mut self, col: usize) -> Result<S::Sample, E> {
        let sample = self.columns.select_column(col).and_then(|()| {
            self.delay.delay_us(self.timing.select_settle_us);
            Ok(self.rows.sample_rows()? | self.rows.sample_auxiliary(col)?)
        });
        let released = self.columns.deselect_all_columns();
        let sample = sample?;
        released?;
        Ok(sample)
    }
}

impl<C, S, D, R, const ROWS: usize, const COLS: usize, const DEBOUNCE: u8>
    Matrix<C, S, D, R, ROWS, COLS, DEBOUNCE>
where
    R: RowBits,
{
    pub fn rows(&self) -> usize {
        ROWS
    }

    pub fn cols(&self) -> usize {
        COLS
    }

    pub fn timing(&self) -> ScanTiming {
        self.timing
    }

    /// Whether no key changed during the last `DEBOUNCE` passes
    pub fn is_stable(&self) -> bool {
        self.debouncer.is_settled()
    }

    /// The committed snapshot
    pub fn state(&self) -> &KeyMatrix<R, ROWS, COLS> {
        self.debouncer.committed()
    }

    /// Committed bits of `row`, bit `n` being column `n`.
    ///
    /// # Panics
    ///
    /// If `row` is out of range.
    pub fn get_row(&self, row: usize) -> R {
        self.state().row(row)
    }

    /// # Panics
    ///
    /// If `row` or `col` is out of range.
    pub fn is_key_active(&self, row: usize, col: usize) -> bool {
        self.state().is_on(row, col)
    }

    pub fn active_key_count(&self) -> u32 {
        self.state().key_count()
    }

    /// Writes the committed state as a grid, see [`KeyMatrix`]'s `Display`
    pub fn dump<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        write!(out, "{}", self.state())
    }

    /// The grid as a string, failing if it takes more than `N` bytes
    /// ([`KeyMatrix::TEXT_LEN`] is always enough)
    pub fn dump_to_text<const N: usize>(&self) -> Result<String<N>, fmt::Error> {
        let mut text = String::new();
        self.dump(&mut text)?;
        Ok(text)
    }
}
