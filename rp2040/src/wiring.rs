// Pin assignment of the 18x6 board.
//
// Rows 0-5 are GPIO16-21, read high through the switch diodes.
//
// Columns 0-15 go through two 74HC237 3-to-8 demultiplexers sharing
// A0-A2 on GPIO10-12; chip 0 is enabled by GPIO13, chip 1 by GPIO14.
// Column 16 is GPIO15, column 17 is GPIO9.
//
// The firmware key is on GPIO22, pulled up and shorted to ground when
// pressed. It reports as row 3 of column 12, a slot with no switch.

pub const ROWS: usize = 6;
pub const COLS: usize = 18;

pub const FIRMWARE_KEY_COL: usize = 12;
pub const FIRMWARE_KEY_ROW: usize = 3;

const _: () = assert!(demux_matrix::demux::DemuxColumns::<(), 3, 2, 2>::COLUMNS == COLS);

macro_rules! rows {
    ($pins:expr) => {{
        let mut rows = Vec::<_, ROWS>::new();
        rows.extend([
            $pins.gpio16.into_pull_down_input().into_dyn_pin(),
            $pins.gpio17.into_pull_down_input().into_dyn_pin(),
            $pins.gpio18.into_pull_down_input().into_dyn_pin(),
            $pins.gpio19.into_pull_down_input().into_dyn_pin(),
            $pins.gpio20.into_pull_down_input().into_dyn_pin(),
            $pins.gpio21.into_pull_down_input().into_dyn_pin(),
        ]);
        rows
    }};
}

macro_rules! columns {
    ($pins:expr) => {{
        let mut address = Vec::<_, 3>::new();
        address.extend([
            $pins.gpio10.into_push_pull_output().into_dyn_pin(),
            $pins.gpio11.into_push_pull_output().into_dyn_pin(),
            $pins.gpio12.into_push_pull_output().into_dyn_pin(),
        ]);

        let mut enable = Vec::<_, 2>::new();
        enable.extend([
            $pins.gpio13.into_push_pull_output().into_dyn_pin(),
            $pins.gpio14.into_push_pull_output().into_dyn_pin(),
        ]);

        let mut direct = Vec::<_, 2>::new();
        direct.extend([
            $pins.gpio15.into_push_pull_output().into_dyn_pin(),
            $pins.gpio9.into_push_pull_output().into_dyn_pin(),
        ]);

        DemuxColumns::<_, 3, 2, 2>::new(address, enable, direct)
    }};
}

macro_rules! firmware_key {
    ($pins:expr) => {{
        $pins.gpio22.into_pull_up_input().into_dyn_pin()
    }};
}

pub(crate) use {columns, firmware_key, rows};
