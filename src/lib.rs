//! Scans a column-multiplexed key matrix and debounces it into a stable
//! row bitmap.
//!
//! [`Matrix`] owns the column driver, the row sampler and the
//! [`Debouncer`]. Call [`Matrix::scan`] once per firmware tick and read the
//! committed state through its query methods.

#![no_std]

#[macro_use]
mod fmt;

pub mod bits;
pub mod debounce;
pub mod demux;
pub mod matrix;
pub mod pins;
pub mod state;

pub use bits::RowBits;
pub use debounce::{Debouncer, Settle, DEFAULT_DEBOUNCE};
pub use matrix::{Matrix, ScanTiming};
pub use pins::{ColumnDriver, RowSampler};
pub use state::KeyMatrix;
