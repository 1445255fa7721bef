#![no_std]
#![no_main]

use defmt_rtt as _;
use panic_probe as _;

mod wiring;
use wiring::{columns, firmware_key, rows, COLS, FIRMWARE_KEY_COL, FIRMWARE_KEY_ROW, ROWS};

use rp_pico as bsp;

use bsp::entry;
use bsp::{hal, hal::pac};
use hal::fugit::ExtU64;
use hal::Clock;

use heapless::Vec;

use demux_matrix::demux::DemuxColumns;
use demux_matrix::pins::{AuxiliaryKey, RowPins};
use demux_matrix::{KeyMatrix, Matrix, ScanTiming};

/// Scan period
const TICK_US: u64 = 1_000;

defmt::timestamp!("{=u64:us}", {
    let timer = unsafe { &*pac::TIMER::ptr() };
    loop {
        let e = timer.timerawh.read().bits();
        let t = timer.timerawl.read().bits();
        let e2 = timer.timerawh.read().bits();
        if e == e2 {
            break ((e as u64) << 32) | (t as u64);
        }
    }
});

#[entry]
fn core0() -> ! {
    let core = pac::CorePeripherals::take().unwrap();
    let mut pac = pac::Peripherals::take().unwrap();
    let sio = hal::Sio::new(pac.SIO);

    // Set up the watchdog driver - needed by the clock setup code
    let mut watchdog = hal::watchdog::Watchdog::new(pac.WATCHDOG);
    // Configure the clocks
    let clocks = hal::clocks::init_clocks_and_plls(
        bsp::XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();
    let sys_clk = clocks.system_clock.freq();

    let timer = hal::Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);
    let delay = cortex_m::delay::Delay::new(core.SYST, sys_clk.to_Hz());

    let pins = bsp::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let columns = columns!(pins);
    let rows = AuxiliaryKey::new(
        RowPins::new(rows!(pins), true),
        firmware_key!(pins),
        FIRMWARE_KEY_COL,
        FIRMWARE_KEY_ROW,
        false,
    );

    let mut matrix: Matrix<_, _, _, u32, ROWS, COLS> =
        Matrix::new(columns, rows, delay, ScanTiming::default()).unwrap();
    defmt::info!(
        "scanning {}x{}, {}",
        matrix.rows(),
        matrix.cols(),
        matrix.timing()
    );

    let mut last = KeyMatrix::<u32, ROWS, COLS>::new();
    let mut next = timer.get_counter();

    loop {
        // Only stable snapshots that differ from the last one logged
        if matrix.scan().unwrap() && *matrix.state() != last {
            last = *matrix.state();
            defmt::info!("{} keys down\n{}", matrix.active_key_count(), last);
        }

        next += TICK_US.micros();
        while timer.get_counter() < next {}
    }
}
