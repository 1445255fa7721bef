//! Matrix-wide debouncing.
//!
//! Samples go into a pending copy of the matrix. Any flipped bit, anywhere,
//! restarts a single countdown of `DEBOUNCE` passes; when a pass ends with
//! the countdown expiring, the pending copy replaces the committed one in
//! one assignment. Busy frames therefore settle a little later than they
//! would with a counter per key, but the whole matrix costs one byte.

use core::marker::PhantomData;

use crate::bits::RowBits;
use crate::state::KeyMatrix;

/// Passes without change needed before a commit, unless configured otherwise
pub const DEFAULT_DEBOUNCE: u8 = 5;

/// Outcome of a completed scan pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Settle {
    /// Nothing in flux, the committed matrix is current
    Stable,
    /// The pending matrix was just committed
    Committed,
    /// Still settling, with this many passes to go
    Settling(u8),
}

impl Settle {
    pub fn is_stable(self) -> bool {
        !matches!(self, Settle::Settling(_))
    }
}

pub struct Debouncer<R, const ROWS: usize, const COLS: usize, const DEBOUNCE: u8 = { DEFAULT_DEBOUNCE }>
{
    committed: KeyMatrix<R, ROWS, COLS>,
    pending: KeyMatrix<R, ROWS, COLS>,
    debouncing: u8,
    changed: bool,
}

impl<R: RowBits, const ROWS: usize, const COLS: usize, const DEBOUNCE: u8>
    Debouncer<R, ROWS, COLS, DEBOUNCE>
{
    /// All keys released. The first commit happens once `DEBOUNCE` passes have
    /// gone by, so whatever is held down at power-up has settled first.
    pub fn new() -> Self {
        Debouncer {
            committed: KeyMatrix::new(),
            pending: KeyMatrix::new(),
            debouncing: DEBOUNCE,
            changed: false,
        }
    }

    pub fn reset(&mut self) {
        self.committed.clear();
        self.pending.clear();
        self.debouncing = DEBOUNCE;
        self.changed = false;
    }

    /// Feeds the rows sampled while column `col` was selected, bit `n` of
    /// `sample` being row `n`. Returns if any pending key flipped.
    ///
    /// Call once per column per pass, then [`settle`](Self::settle). A
    /// sample type narrower than `ROWS` bits fails to compile:
    ///
    /// ```compile_fail
    /// let mut debouncer = demux_matrix::Debouncer::<u8, 9, 1>::new();
    /// debouncer.update(0, 0u8);
    /// ```
    ///
    /// # Panics
    ///
    /// If `col` is out of range.
    pub fn update<S: RowBits>(&mut self, col: usize, sample: S) -> bool {
        #[allow(clippy::let_unit_value)]
        let () = SampleFits::<S, ROWS>::OK;
        let mut changed = false;
        for row in 0..ROWS {
            let prev_bit = self.pending.is_on(row, col);
            let curr_bit = sample.is_set(row);
            if prev_bit != curr_bit {
                self.pending.toggle(row, col);
                if self.debouncing > 0 {
                    debug!("bounce: {=u8}", self.debouncing);
                }
                self.debouncing = DEBOUNCE;
                changed = true;
            }
        }
        self.changed |= changed;
        changed
    }

    /// Ends a pass: counts down if nothing changed during it, and commits
    /// when the count runs out. With `DEBOUNCE == 0` every pass commits.
    pub fn settle(&mut self) -> Settle {
        let changed = core::mem::take(&mut self.changed);

        if DEBOUNCE == 0 {
            return if changed {
                self.commit();
                Settle::Committed
            } else {
                Settle::Stable
            };
        }

        if changed {
            return Settle::Settling(self.debouncing);
        }

        match self.debouncing {
            0 => Settle::Stable,
            1 => {
                self.debouncing = 0;
                self.commit();
                Settle::Committed
            }
            n => {
                self.debouncing = n - 1;
                Settle::Settling(n - 1)
            }
        }
    }

    /// Drops the change flag of a pass that could not be completed, so the
    /// next full pass counts down as if the partial one never happened. Bits
    /// already fed in stay pending.
    pub fn discard_pass(&mut self) {
        self.changed = false;
    }

    fn commit(&mut self) {
        self.committed = self.pending;
    }

    pub fn is_settled(&self) -> bool {
        self.debouncing == 0
    }

    /// Passes left before the next commit
    pub fn remaining(&self) -> u8 {
        self.debouncing
    }

    /// Last stable snapshot
    pub fn committed(&self) -> &KeyMatrix<R, ROWS, COLS> {
        &self.committed
    }

    /// Snapshot still being debounced
    pub fn pending(&self) -> &KeyMatrix<R, ROWS, COLS> {
        &self.pending
    }
}

struct SampleFits<S, const ROWS: usize>(PhantomData<S>);

impl<S: RowBits, const ROWS: usize> SampleFits<S, ROWS> {
    const OK: () = assert!(
        ROWS as u32 <= S::WIDTH,
        "row sample is too narrow for the number of rows"
    );
}

impl<R: RowBits, const ROWS: usize, const COLS: usize, const DEBOUNCE: u8> Default
    for Debouncer<R, ROWS, COLS, DEBOUNCE>
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    /// Runs one full pass where `columns[c]` holds the row bits seen on column `c`
    fn pass<const ROWS: usize, const COLS: usize, const D: u8>(
        debouncer: &mut Debouncer<u8, ROWS, COLS, D>,
        columns: [u8; COLS],
    ) -> Settle {
        for (col, sample) in columns.into_iter().enumerate() {
            debouncer.update(col, sample);
        }
        debouncer.settle()
    }

    fn settled<const ROWS: usize, const COLS: usize, const D: u8>() -> Debouncer<u8, ROWS, COLS, D> {
        let mut debouncer = Debouncer::new();
        while !pass(&mut debouncer, [0; COLS]).is_stable() {}
        debouncer
    }

    #[test]
    fn starts_settling() {
        let mut debouncer = Debouncer::<u8, 2, 3, 2>::new();
        assert!(!debouncer.is_settled());
        assert_eq!(pass(&mut debouncer, [0; 3]), Settle::Settling(1));
        assert_eq!(pass(&mut debouncer, [0; 3]), Settle::Committed);
        assert_eq!(pass(&mut debouncer, [0; 3]), Settle::Stable);
        assert_eq!(debouncer.committed(), &KeyMatrix::new());
    }

    #[test]
    fn press_commits_after_depth() {
        // 2 rows, 3 columns, depth 2; row 0 of column 0 goes down on pass 1
        let mut debouncer = settled::<2, 3, 2>();

        assert_eq!(pass(&mut debouncer, [0b01, 0, 0]), Settle::Settling(2));
        assert_eq!(debouncer.remaining(), 2);
        assert_eq!(debouncer.pending().row(0), 0b001);
        assert_eq!(debouncer.committed().row(0), 0);

        assert_eq!(pass(&mut debouncer, [0b01, 0, 0]), Settle::Settling(1));
        assert_eq!(debouncer.committed().row(0), 0);

        assert_eq!(pass(&mut debouncer, [0b01, 0, 0]), Settle::Committed);
        assert!(debouncer.is_settled());
        assert_eq!(debouncer.committed().row(0), 0b001);
        assert_eq!(debouncer.committed().row(1), 0);

        assert_eq!(pass(&mut debouncer, [0b01, 0, 0]), Settle::Stable);
        assert_eq!(debouncer.committed().row(0), 0b001);
    }

    #[test]
    fn short_glitch_never_commits() {
        const D: u8 = 3;
        for glitch in 1..=D as usize {
            let mut debouncer = settled::<2, 3, D>();
            for _ in 0..glitch {
                assert!(!pass(&mut debouncer, [0, 0b10, 0]).is_stable());
                assert_eq!(debouncer.committed().key_count(), 0);
            }
            let mut commits = 0;
            for _ in 0..2 * D {
                if pass(&mut debouncer, [0; 3]) == Settle::Committed {
                    commits += 1;
                }
                assert_eq!(debouncer.committed().key_count(), 0);
            }
            assert_eq!(commits, 1);
            assert!(debouncer.is_settled());
        }
    }

    #[test]
    fn sustained_press_commits_once() {
        const D: u8 = 3;
        let mut debouncer = settled::<2, 3, D>();
        let mut commits = 0;
        for cycle in 1..=(3 * D as usize) {
            if pass(&mut debouncer, [0, 0, 0b11]) == Settle::Committed {
                commits += 1;
                assert_eq!(cycle, D as usize + 1);
            }
        }
        assert_eq!(commits, 1);
        assert_eq!(debouncer.committed().row(0), 0b100);
        assert_eq!(debouncer.committed().row(1), 0b100);
    }

    #[test]
    fn second_change_restarts_countdown() {
        let mut debouncer = settled::<2, 3, 4>();
        assert_eq!(pass(&mut debouncer, [0b01, 0, 0]), Settle::Settling(4));
        assert_eq!(pass(&mut debouncer, [0b01, 0, 0]), Settle::Settling(3));
        assert_eq!(pass(&mut debouncer, [0b01, 0, 0]), Settle::Settling(2));
        // An unrelated key goes down two passes later
        assert_eq!(pass(&mut debouncer, [0b01, 0, 0b10]), Settle::Settling(4));
        for remaining in (1..4).rev() {
            assert_eq!(pass(&mut debouncer, [0b01, 0, 0b10]), Settle::Settling(remaining));
            assert_eq!(debouncer.committed().key_count(), 0);
        }
        assert_eq!(pass(&mut debouncer, [0b01, 0, 0b10]), Settle::Committed);
        assert_eq!(debouncer.committed().row(0), 0b001);
        assert_eq!(debouncer.committed().row(1), 0b100);
    }

    #[test]
    fn bounce_back_restarts_countdown() {
        let mut debouncer = settled::<1, 2, 1>();
        assert!(debouncer.update(0, 0b1u8));
        assert!(!debouncer.update(1, 0b0u8));
        assert_eq!(debouncer.settle(), Settle::Settling(1));
        assert!(debouncer.update(0, 0b0u8));
        assert_eq!(debouncer.settle(), Settle::Settling(1));
        assert_eq!(debouncer.pending().key_count(), 0);
        assert_eq!(debouncer.settle(), Settle::Committed);
        assert_eq!(debouncer.committed().key_count(), 0);
    }

    #[test]
    fn commit_is_whole_snapshot() {
        let mut debouncer = settled::<3, 2, 2>();
        pass(&mut debouncer, [0b001, 0b100]);
        let expected = *debouncer.pending();
        pass(&mut debouncer, [0b001, 0b100]);
        assert_eq!(debouncer.committed(), &KeyMatrix::new());
        pass(&mut debouncer, [0b001, 0b100]);
        assert_eq!(debouncer.committed(), &expected);
        assert_eq!(debouncer.committed(), debouncer.pending());
    }

    #[test]
    fn zero_depth_commits_every_pass() {
        let mut debouncer = Debouncer::<u8, 2, 2, 0>::new();
        assert!(debouncer.is_settled());
        for columns in [[0b01, 0b00], [0b11, 0b10], [0b00, 0b10], [0b00, 0b00]] {
            assert!(pass(&mut debouncer, columns).is_stable());
            assert!(debouncer.is_settled());
            assert_eq!(debouncer.committed(), debouncer.pending());
        }
        assert_eq!(pass(&mut debouncer, [0b10, 0]), Settle::Committed);
        assert_eq!(debouncer.committed().row(1), 0b01);
        assert_eq!(pass(&mut debouncer, [0b10, 0]), Settle::Stable);
    }

    #[test]
    fn discarded_pass_keeps_bits_but_not_the_restart() {
        let mut debouncer = settled::<1, 2, 2>();
        assert!(debouncer.update(0, 0b1u8));
        debouncer.discard_pass();
        assert_eq!(debouncer.pending().row(0), 0b01);

        assert_eq!(pass(&mut debouncer, [0b1, 0]), Settle::Settling(1));
        assert_eq!(pass(&mut debouncer, [0b1, 0]), Settle::Committed);
        assert_eq!(debouncer.committed().row(0), 0b01);
    }

    #[test]
    #[should_panic]
    fn update_column_out_of_range() {
        let mut debouncer = Debouncer::<u8, 1, 2, 1>::new();
        debouncer.update(2, 0b1u8);
    }

    #[test]
    fn reset_clears_everything() {
        let mut debouncer = settled::<2, 2, 1>();
        pass(&mut debouncer, [0b11, 0b11]);
        pass(&mut debouncer, [0b11, 0b11]);
        assert_eq!(debouncer.committed().key_count(), 4);
        debouncer.reset();
        assert_eq!(debouncer.committed().key_count(), 0);
        assert_eq!(debouncer.pending().key_count(), 0);
        assert_eq!(debouncer.remaining(), 1);
    }
}
