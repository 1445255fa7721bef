//! Bit-packed rows: bit `n` of a row value belongs to column `n`

use core::fmt::Debug;
use core::ops::{BitAnd, BitOr, BitOrAssign, BitXor, BitXorAssign};

/// An unsigned integer used as a row of key bits
pub trait RowBits:
    Copy
    + Default
    + Eq
    + Debug
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitOrAssign
    + BitXor<Output = Self>
    + BitXorAssign
{
    /// Number of columns (or rows, for a sample) that fit
    const WIDTH: u32;
    const ZERO: Self;

    /// The mask holding only bit `n`
    fn bit(n: usize) -> Self;

    fn popcount(self) -> u32;

    fn is_set(self, n: usize) -> bool {
        self & Self::bit(n) != Self::ZERO
    }
}

macro_rules! impl_row_bits {
    ($($int:ty),+) => {
        $(
            impl RowBits for $int {
                const WIDTH: u32 = <$int>::BITS;
                const ZERO: Self = 0;

                #[inline]
                fn bit(n: usize) -> Self {
                    1 << n
                }

                #[inline]
                fn popcount(self) -> u32 {
                    self.count_ones()
                }
            }
        )+
    };
}

impl_row_bits!(u8, u16, u32, u64);
