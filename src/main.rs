//! Embedded entry point - nRF52840 with SoftDevice S140.
//!
//! Task layout:
//! - `softdevice_task` - SoftDevice event loop
//! - `ble_task`        - advertise / serve the bridge GATT service
//! - `usb_device_task` - embassy-usb device stack
//! - `usb_writer_task` - drains the HID report channel into endpoints
//! - main              - the bridge loop: applies link events, drains
//!                       the text queue, fires the mouse mover, paints
//!                       the display
//!
//! Write callbacks on the SoftDevice context share only the text queue
//! (critical-section mutex), the report channel and the stat counters
//! with the loop; everything else is loop-owned.

#![no_std]
#![no_main]

use core::cell::RefCell;
use core::mem;

use defmt::{info, unwrap};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_nrf::gpio::Pin;
use embassy_nrf::interrupt::Priority;
use embassy_nrf::{bind_interrupts, peripherals, twim};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_time::{Instant, Timer};
use embassy_usb::class::hid::HidWriter;
use embassy_usb::UsbDevice;
use nrf_softdevice::{raw, Softdevice};
use panic_probe as _;
use rand_core::RngCore;
use static_cell::StaticCell;

use keybridge::ble::server::{self, BridgeServer, SharedTextQueue};
use keybridge::clock::{elapsed, Millis};
use keybridge::config::{
    BLE_ATT_MTU, BLE_DEVICE_NAME, CHAR_INTERVAL_MS, DISPLAY_TICK_MS, NUDGE_SETTLE_MS,
};
use keybridge::hid::translate::char_reports;
use keybridge::hid::{HidReport, MouseReport};
use keybridge::led::StatusLed;
use keybridge::mode::{mover_may_fire, ConnectionEvent, ModeController};
use keybridge::queue::TextQueue;
use keybridge::status::{Stats, StatusSnapshot};
use keybridge::ui::display;
use keybridge::usb::hid_device::{self, UsbDriver};

bind_interrupts!(struct Irqs {
    TWISPI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

// Shared state between the SoftDevice callback context and the loop.
static TEXT_QUEUE: SharedTextQueue = Mutex::new(RefCell::new(TextQueue::new()));
static LINK_EVENTS: Channel<CriticalSectionRawMutex, ConnectionEvent, 4> = Channel::new();
static REPORTS: Channel<CriticalSectionRawMutex, HidReport, 16> = Channel::new();
static STATS: Stats = Stats::new();

static SERVER: StaticCell<BridgeServer> = StaticCell::new();

/// Delay jitter from the SoftDevice's RNG pool.
struct SoftdeviceRng(&'static Softdevice);

impl RngCore for SoftdeviceRng {
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        // The pool can run dry under BLE traffic; the RTC tick is an
        // acceptable fallback for jitter purposes.
        if nrf_softdevice::random_bytes(self.0, &mut bytes).is_err() {
            return Instant::now().as_ticks() as u32;
        }
        u32::from_le_bytes(bytes)
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        rand_core::impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t {
            att_mtu: BLE_ATT_MTU,
        }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: BLE_DEVICE_NAME.as_ptr() as _,
            current_len: BLE_DEVICE_NAME.len() as u16,
            max_len: BLE_DEVICE_NAME.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

/// Millisecond view of the monotonic clock, truncated to the wrapping
/// counter every scheduling decision runs on.
fn now_ms() -> Millis {
    Instant::now().as_millis() as Millis
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task]
async fn ble_task(sd: &'static Softdevice, server: &'static BridgeServer) -> ! {
    server::run(
        sd,
        server,
        &TEXT_QUEUE,
        LINK_EVENTS.sender(),
        REPORTS.sender(),
        &STATS,
    )
    .await
}

#[embassy_executor::task]
async fn usb_device_task(device: UsbDevice<'static, UsbDriver>) -> ! {
    hid_device::run_usb_device(device).await
}

#[embassy_executor::task]
async fn usb_writer_task(
    keyboard: HidWriter<'static, UsbDriver, 8>,
    mouse: HidWriter<'static, UsbDriver, 8>,
) -> ! {
    hid_device::hid_writer_task(keyboard, mouse, REPORTS.receiver()).await
}

/// One self-canceling nudge: +1 then -1 on the X axis, with the LED
/// dipped for the duration as the move indicator.
async fn nudge_mouse(led: &mut StatusLed) {
    led.off();
    REPORTS.send(HidReport::Mouse(MouseReport::nudge(1))).await;
    Timer::after_millis(NUDGE_SETTLE_MS).await;
    REPORTS.send(HidReport::Mouse(MouseReport::nudge(-1))).await;
    Timer::after_millis(NUDGE_SETTLE_MS).await;
    led.on();
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("KeyBridge + Mouse Mover starting");

    let mut nrf_config = embassy_nrf::config::Config::default();
    // The SoftDevice reserves the highest interrupt priorities.
    nrf_config.gpiote_interrupt_priority = Priority::P2;
    nrf_config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(nrf_config);

    let sd_mut = Softdevice::enable(&softdevice_config());
    let server = SERVER.init(unwrap!(BridgeServer::new(sd_mut)));
    // GATT registration is done; the rest of the system only needs the
    // shared reference.
    let sd: &'static Softdevice = unsafe { Softdevice::steal() };
    unwrap!(spawner.spawn(softdevice_task(sd)));

    // USB composite HID device.
    let usb = hid_device::init(p.USBD);
    unwrap!(spawner.spawn(usb_device_task(usb.device)));
    unwrap!(spawner.spawn(usb_writer_task(usb.keyboard_writer, usb.mouse_writer)));

    // Display and status LED.
    let i2c = twim::Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim::Config::default());
    let mut screen = display::init(i2c);
    display::draw_splash(&mut screen);
    let mut led = StatusLed::new(p.P0_06.degrade());

    unwrap!(spawner.spawn(ble_task(sd, server)));

    // Bridge loop state - all loop-owned.
    let mut rng = SoftdeviceRng(sd);
    let started_at = now_ms();
    let mut controller = ModeController::new(started_at, &mut rng);
    let mut last_char_at = started_at;
    let mut last_draw_at = started_at;

    led.on();
    info!("ready - default mode: mouse mover");

    loop {
        let now = now_ms();
        let mut refresh = false;

        // Apply link transitions funneled out of the BLE task.
        while let Ok(event) = LINK_EVENTS.try_receive() {
            refresh |= controller.on_event(event, now, &mut rng);
        }

        // Drain at most one queued character per interval.
        if elapsed(last_char_at, now) >= CHAR_INTERVAL_MS {
            if let Some(c) = TEXT_QUEUE.lock(|q| q.borrow_mut().dequeue_one()) {
                if let Some((press, release)) = char_reports(c) {
                    REPORTS.send(HidReport::Keyboard(press)).await;
                    REPORTS.send(HidReport::Keyboard(release)).await;
                    STATS.record_key();
                }
                last_char_at = now;
            }
        }

        // Mouse mover: only in mover mode with an empty queue.
        let depth = TEXT_QUEUE.lock(|q| q.borrow().depth());
        if mover_may_fire(controller.mode(), depth) && controller.countdown().is_due(now) {
            info!("moving mouse (count: {})", STATS.move_count() + 1);
            nudge_mouse(&mut led).await;
            STATS.record_move();
            controller.record_move(now_ms(), &mut rng);
        }

        if refresh || elapsed(last_draw_at, now) >= DISPLAY_TICK_MS {
            let snapshot = StatusSnapshot::capture(&controller, &STATS, depth, started_at, now);
            display::draw(&mut screen, &snapshot);
            last_draw_at = now;
        }

        Timer::after_millis(1).await;
    }
}
