//! BLE GATT server - the bridge service.
//!
//! Advertise → accept one connection → serve writes until disconnect →
//! re-advertise.  Write callbacks run in the SoftDevice event context
//! concurrent with the main loop, so everything they touch is either a
//! critical-section mutex, a channel `try_send`, or an atomic counter.

use core::cell::RefCell;

use defmt::{info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Sender;
use embassy_time::Timer;
use nrf_softdevice::ble::advertisement_builder::{
    Flag, LegacyAdvertisementBuilder, LegacyAdvertisementPayload, ServiceList,
};
use nrf_softdevice::ble::{gatt_server, peripheral};
use nrf_softdevice::Softdevice;

use crate::config::{ADV_RESTART_DELAY_MS, BLE_DEVICE_NAME};
use crate::error::Error;
use crate::hid::translate::{translate, KeyEvent};
use crate::hid::{HidReport, KeyboardReport};
use crate::mode::ConnectionEvent;
use crate::queue::TextQueue;
use crate::status::Stats;

/// Text queue shared between the write callback (producer) and the
/// main loop (consumer).
pub type SharedTextQueue = Mutex<CriticalSectionRawMutex, RefCell<TextQueue>>;

/// Bridge service UUID, little-endian
/// (`4fafc201-1fb5-459e-8fcc-c5c9c331914b`).
const SERVICE_UUID: [u8; 16] = [
    0x4b, 0x91, 0x31, 0xc3, 0xc9, 0xc5, 0xcc, 0x8f, //
    0x9e, 0x45, 0xb5, 0x1f, 0x01, 0xc2, 0xaf, 0x4f,
];

// The 128-bit UUID fills the advertising PDU; the device name rides in
// the scan response instead.
static ADV_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .flags(&[Flag::GeneralDiscovery, Flag::LE_Only])
    .services_128(ServiceList::Complete, &[SERVICE_UUID])
    .build();

static SCAN_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .full_name(BLE_DEVICE_NAME)
    .build();

/// The bridge service: two write-only inbound characteristics.
#[nrf_softdevice::gatt_service(uuid = "4fafc201-1fb5-459e-8fcc-c5c9c331914b")]
pub struct BridgeService {
    /// Free-text channel.  Up to ATT_MTU - 3 bytes per write.
    #[characteristic(
        uuid = "beb5483e-36e1-4688-b7f5-ea07361b26a8",
        write,
        write_without_response
    )]
    text: heapless::Vec<u8, 244>,

    /// Discrete-key channel: `(modifiers, keycode)`.
    #[characteristic(
        uuid = "beb5483e-36e1-4688-b7f5-ea07361b26a9",
        write,
        write_without_response
    )]
    key: heapless::Vec<u8, 8>,
}

#[nrf_softdevice::gatt_server]
pub struct BridgeServer {
    pub bridge: BridgeService,
}

/// Advertising + connection loop.  Never returns.
pub async fn run(
    sd: &'static Softdevice,
    server: &'static BridgeServer,
    queue: &'static SharedTextQueue,
    link_events: Sender<'static, CriticalSectionRawMutex, ConnectionEvent, 4>,
    reports: Sender<'static, CriticalSectionRawMutex, HidReport, 16>,
    stats: &'static Stats,
) -> ! {
    loop {
        let config = peripheral::Config::default();
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &ADV_DATA,
            scan_data: &SCAN_DATA,
        };

        let conn = match peripheral::advertise_connectable(sd, adv, &config).await {
            Ok(conn) => conn,
            Err(_e) => {
                warn!("BLE advertising failed, retrying");
                Timer::after_millis(ADV_RESTART_DELAY_MS).await;
                continue;
            }
        };

        info!("BLE connected - switching to bridge");
        link_events.send(ConnectionEvent::Connected).await;

        // Serve GATT writes until the peer drops the link.
        gatt_server::run(&conn, server, |event| match event {
            BridgeServerEvent::Bridge(e) => on_write(e, queue, &reports, stats),
        })
        .await;

        info!("BLE disconnected - resuming mouse mover");
        link_events.send(ConnectionEvent::Disconnected).await;

        Timer::after_millis(ADV_RESTART_DELAY_MS).await;
    }
}

/// Characteristic write dispatch.  Runs in the SoftDevice callback
/// context: bounded work only, nothing blocks.
fn on_write(
    event: BridgeServiceEvent,
    queue: &SharedTextQueue,
    reports: &Sender<'static, CriticalSectionRawMutex, HidReport, 16>,
    stats: &Stats,
) {
    match event {
        BridgeServiceEvent::TextWrite(data) => {
            let admitted = queue.lock(|q| q.borrow_mut().enqueue(&data));
            // Filtered bytes and queue overflow both show up as a
            // shortfall; the peer has no NACK channel either way.
            info!("text write: {} of {} bytes queued", admitted, data.len());
        }
        BridgeServiceEvent::KeyWrite(data) => match KeyEvent::parse(&data) {
            Ok(key) => emit_tap(key, reports, stats),
            Err(e) => warn!("discrete key rejected: {}", e),
        },
    }
}

/// Translate one discrete key event and push its press/release pair
/// straight into the report channel, ahead of any queued text.
fn emit_tap(
    key: KeyEvent,
    reports: &Sender<'static, CriticalSectionRawMutex, HidReport, 16>,
    stats: &Stats,
) {
    let tap = translate(key);
    if !tap.resolved() {
        warn!("{}", Error::UnmappedKeycode(key.keycode));
        if tap.modifiers == 0 {
            return;
        }
        // Modifiers alone still get tapped.
    }

    if reports
        .try_send(HidReport::Keyboard(tap.press_report()))
        .is_err()
    {
        warn!("report channel full - tap dropped");
        return;
    }
    let _ = reports.try_send(HidReport::Keyboard(KeyboardReport::RELEASE));

    if tap.resolved() {
        stats.record_key();
    }
}
