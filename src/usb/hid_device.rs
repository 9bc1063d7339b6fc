//! USB HID composite device - keyboard + mouse.
//!
//! Initialises the Embassy USB stack on the nRF52840 hardware USB
//! peripheral and exposes the two HID endpoints the bridge writes to.

use crate::config;
use crate::error::Error;
use crate::hid::keyboard::KEYBOARD_REPORT_DESCRIPTOR;
use crate::hid::mouse::MOUSE_REPORT_DESCRIPTOR;
use crate::hid::HidReport;
use defmt::{info, warn};
use embassy_nrf::usb::vbus_detect::SoftwareVbusDetect;
use embassy_nrf::usb::Driver;
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Receiver;
use embassy_usb::class::hid::{Config as HidConfig, HidWriter, State};
use embassy_usb::{Builder, Config, UsbDevice};
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    USBD => embassy_nrf::usb::InterruptHandler<peripherals::USBD>;
});

/// Concrete USB driver type.
///
/// VBUS state is reported in software: with the SoftDevice enabled the
/// POWER/CLOCK peripheral is not ours to touch.  The device is a USB
/// dongle, so "always powered" is the truth anyway.
pub type UsbDriver = Driver<'static, peripherals::USBD, &'static SoftwareVbusDetect>;

static VBUS_DETECT: StaticCell<SoftwareVbusDetect> = StaticCell::new();
static KB_STATE: StaticCell<State> = StaticCell::new();
static MOUSE_STATE: StaticCell<State> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 128]> = StaticCell::new();

/// Build result containing the USB device runner and the two HID writers.
pub struct UsbHidDevice {
    pub device: UsbDevice<'static, UsbDriver>,
    pub keyboard_writer: HidWriter<'static, UsbDriver, 8>,
    pub mouse_writer: HidWriter<'static, UsbDriver, 8>,
}

/// Initialise the USB stack and create the composite HID device.
///
/// Must be called exactly once.  All static buffers are consumed here.
pub fn init(usbd: peripherals::USBD) -> UsbHidDevice {
    let vbus = VBUS_DETECT.init(SoftwareVbusDetect::new(true, true));
    let driver = Driver::new(usbd, Irqs, &*vbus);

    // USB device-level configuration.
    let mut usb_config = Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(config::USB_SERIAL_NUMBER);
    usb_config.max_power = 100; // mA
    usb_config.max_packet_size_0 = 64;

    // Allocate static descriptor buffers.
    let config_desc = USB_CONFIG_DESC.init([0u8; 256]);
    let bos_desc = USB_BOS_DESC.init([0u8; 256]);
    let msos_desc = USB_MSOS_DESC.init([0u8; 256]);
    let ctrl_buf = USB_CTRL_BUF.init([0u8; 128]);

    let mut builder = Builder::new(
        driver,
        usb_config,
        config_desc,
        bos_desc,
        msos_desc,
        ctrl_buf,
    );

    let kb_state = KB_STATE.init(State::new());
    let kb_config = HidConfig {
        report_descriptor: KEYBOARD_REPORT_DESCRIPTOR,
        request_handler: None,
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: 8,
    };
    let keyboard_writer = HidWriter::new(&mut builder, kb_state, kb_config);

    let mouse_state = MOUSE_STATE.init(State::new());
    let mouse_config = HidConfig {
        report_descriptor: MOUSE_REPORT_DESCRIPTOR,
        request_handler: None,
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: 8,
    };
    let mouse_writer = HidWriter::new(&mut builder, mouse_state, mouse_config);

    let device = builder.build();

    info!("USB HID composite device initialised (keyboard + mouse)");

    UsbHidDevice {
        device,
        keyboard_writer,
        mouse_writer,
    }
}

/// Run the USB device stack - must be spawned as a dedicated Embassy task.
///
/// This handles USB enumeration, suspend/resume, and endpoint servicing.
pub async fn run_usb_device(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB device task started");
    device.run().await
}

/// HID report forwarding task - drains the report channel into the
/// matching USB endpoint, preserving channel order.
pub async fn hid_writer_task(
    mut keyboard: HidWriter<'static, UsbDriver, 8>,
    mut mouse: HidWriter<'static, UsbDriver, 8>,
    report_rx: Receiver<'static, CriticalSectionRawMutex, HidReport, 16>,
) -> ! {
    info!("HID writer task started - waiting for reports");

    let mut buf = [0u8; 8];

    loop {
        let report = report_rx.receive().await;
        let n = report.serialize(&mut buf);

        let result = match report {
            HidReport::Keyboard(_) => keyboard.write(&buf[..n]).await,
            HidReport::Mouse(_) => mouse.write(&buf[..n]).await,
        };
        if result.is_err() {
            warn!("{}", Error::UsbWrite);
        }
    }
}
