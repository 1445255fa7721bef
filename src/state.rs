//! Key matrix snapshots and the read-only queries over them

use core::fmt::{self, Write as _};

use crate::bits::RowBits;

/// One snapshot of the matrix: a bit per key, one row value per physical row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMatrix<R, const ROWS: usize, const COLS: usize> {
    rows: [R; ROWS],
}

impl<R: RowBits, const ROWS: usize, const COLS: usize> KeyMatrix<R, ROWS, COLS> {
    /// Bytes needed to render the matrix as text, header line included
    pub const TEXT_LEN: usize = (ROWS + 1) * (COLS + 5);

    const FITS: () = assert!(
        COLS as u32 <= R::WIDTH,
        "row type is too narrow for the number of columns"
    );

    /// All keys released
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::FITS;
        KeyMatrix {
            rows: [R::ZERO; ROWS],
        }
    }

    /// Whether the key at (`row`, `col`) is on.
    ///
    /// # Panics
    ///
    /// If `row` or `col` is out of range.
    pub fn is_on(&self, row: usize, col: usize) -> bool {
        assert!(col < COLS, "column {} out of range", col);
        self.rows[row].is_set(col)
    }

    /// # Panics
    ///
    /// If `row` is out of range.
    pub fn row(&self, row: usize) -> R {
        self.rows[row]
    }

    pub fn rows(&self) -> &[R; ROWS] {
        &self.rows
    }

    /// Number of keys that are on
    pub fn key_count(&self) -> u32 {
        self.rows.iter().map(|row| row.popcount()).sum()
    }

    pub(crate) fn toggle(&mut self, row: usize, col: usize) {
        self.rows[row] ^= R::bit(col);
    }

    pub(crate) fn clear(&mut self) {
        self.rows = [R::ZERO; ROWS];
    }
}

impl<R: RowBits, const ROWS: usize, const COLS: usize> Default for KeyMatrix<R, ROWS, COLS> {
    fn default() -> Self {
        Self::new()
    }
}

/// A grid with one line per row, column 0 leftmost:
///
/// ```text
/// r/c 012
/// 00: 100
/// 01: 001
/// ```
impl<R: RowBits, const ROWS: usize, const COLS: usize> fmt::Display for KeyMatrix<R, ROWS, COLS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("r/c ")?;
        for col in 0..COLS {
            write!(f, "{:X}", col % 16)?;
        }
        f.write_char('\n')?;

        for (index, row) in self.rows.iter().enumerate() {
            write!(f, "{:02X}: ", index)?;
            // Lowest bit first, i.e. the row value bit-reversed
            for col in 0..COLS {
                f.write_char(if row.is_set(col) { '1' } else { '0' })?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl<R: RowBits, const ROWS: usize, const COLS: usize> defmt::Format for KeyMatrix<R, ROWS, COLS> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", defmt::Display2Format(self))
    }
}
